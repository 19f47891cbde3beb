//! Access decision engine.
//!
//! One call per request: verify the session, resolve the principal, then
//! grant by matrix or by self-access. Steps run strictly in order and the
//! first failure is returned as-is.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use folio_core::{AppError, UserId};

use crate::codec::SessionCodec;
use crate::permissions::{HttpMethod, Resource};
use crate::principal::Principal;
use crate::resolver::{IdentityStore, PermissionResolver};

/// What a route demands of its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequirement {
    pub resource: Resource,
    /// Callers without a matrix grant may still act on their own `users` record.
    pub can_be_consulted_by_self: bool,
}

impl AccessRequirement {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            can_be_consulted_by_self: false,
        }
    }

    pub fn consultable_by_self(mut self) -> Self {
        self.can_be_consulted_by_self = true;
        self
    }
}

/// Per-request inputs taken from the transport.
#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
    /// Raw `Authorization` header value, scheme included.
    pub authorization: Option<&'a str>,
    /// `None` for methods outside the matrix vocabulary (e.g. `HEAD`); such
    /// requests are never granted by the matrix.
    pub method: Option<HttpMethod>,
    /// Owner of the targeted record (the `userId` path parameter), if any.
    pub target_owner_id: Option<UserId>,
}

/// How access was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grant {
    Matrix,
    SelfAccess,
}

/// A successful decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub principal: Principal,
    pub grant: Grant,
}

const BEARER: &str = "Bearer ";

/// Extract the credential from an `Authorization` header value.
///
/// The scheme is matched case-insensitively. Returns `None` for anything
/// that is not a non-empty `Bearer` credential.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, rest) = header.split_at_checked(BEARER.len())?;
    if !scheme.eq_ignore_ascii_case(BEARER) {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() { None } else { Some(token) }
}

/// Decide on an already resolved principal (steps 4–8).
///
/// - No IO
/// - No panics
pub fn decide_access(
    principal: &Principal,
    requirement: &AccessRequirement,
    method: Option<HttpMethod>,
    target_owner_id: Option<UserId>,
) -> Result<Grant, AppError> {
    let granted = method
        .is_some_and(|method| PermissionResolver::is_allowed(principal, &requirement.resource, method));
    if granted {
        return Ok(Grant::Matrix);
    }

    if !requirement.can_be_consulted_by_self {
        return Err(AppError::invalid_access());
    }

    if requirement.resource != Resource::USERS || !principal.owns(target_owner_id) {
        return Err(AppError::invalid_access());
    }

    Ok(Grant::SelfAccess)
}

/// Combines the session codec and the permission resolver.
#[derive(Clone)]
pub struct AccessEngine {
    codec: Arc<dyn SessionCodec>,
    resolver: PermissionResolver,
}

impl AccessEngine {
    pub fn new(codec: Arc<dyn SessionCodec>, store: Arc<dyn IdentityStore>) -> Self {
        Self {
            codec,
            resolver: PermissionResolver::new(store),
        }
    }

    /// Authorize a request, returning the caller on success.
    pub async fn authorize(
        &self,
        request: &AccessRequest<'_>,
        requirement: &AccessRequirement,
        now: DateTime<Utc>,
    ) -> Result<Principal, AppError> {
        self.decide(request, requirement, now)
            .await
            .map(|authorization| authorization.principal)
    }

    /// Like [`authorize`](Self::authorize) but also reports how access was granted.
    pub async fn decide(
        &self,
        request: &AccessRequest<'_>,
        requirement: &AccessRequirement,
        now: DateTime<Utc>,
    ) -> Result<Authorization, AppError> {
        let verdict = self.evaluate(request, requirement, now).await;

        match &verdict {
            Ok(a) => tracing::debug!(
                user_id = %a.principal.user_id,
                resource = %requirement.resource,
                method = ?request.method,
                grant = ?a.grant,
                "access granted"
            ),
            Err(e) => tracing::debug!(
                resource = %requirement.resource,
                method = ?request.method,
                kind = ?e.kind(),
                "access denied"
            ),
        }

        verdict
    }

    async fn evaluate(
        &self,
        request: &AccessRequest<'_>,
        requirement: &AccessRequirement,
        now: DateTime<Utc>,
    ) -> Result<Authorization, AppError> {
        let token = request
            .authorization
            .and_then(bearer_token)
            .ok_or_else(AppError::invalid_session)?;

        let claim = self.codec.decode(token, now)?;

        let principal = self.resolver.resolve(claim.user_id).await?;

        let grant = decide_access(&principal, requirement, request.method, request.target_owner_id)?;

        Ok(Authorization { principal, grant })
    }
}
