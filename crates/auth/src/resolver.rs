//! Permission resolution: user id → role → parsed permission matrix.

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use folio_core::{AppError, AppResult, RoleId, UserId};

use crate::permissions::{HttpMethod, PermissionMatrix, Resource};
use crate::principal::Principal;
use crate::roles::{Role, RoleName};

/// The part of a user record the resolver needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub role_id: RoleId,
}

/// A role as stored: the permission matrix is still serialized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRecord {
    pub id: RoleId,
    pub name: String,
    pub permissions: String,
}

/// Read-only identity lookups backing the resolver.
///
/// `Ok(None)` means the record does not exist; `Err` is an infrastructure
/// failure.
#[async_trait::async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_user_by_id(&self, id: UserId) -> AppResult<Option<UserRecord>>;

    async fn find_role_with_permissions(&self, id: RoleId) -> AppResult<Option<RoleRecord>>;
}

#[async_trait::async_trait]
impl<S> IdentityStore for Arc<S>
where
    S: IdentityStore + ?Sized,
{
    async fn find_user_by_id(&self, id: UserId) -> AppResult<Option<UserRecord>> {
        (**self).find_user_by_id(id).await
    }

    async fn find_role_with_permissions(&self, id: RoleId) -> AppResult<Option<RoleRecord>> {
        (**self).find_role_with_permissions(id).await
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("user {0} no longer exists")]
    UnknownUser(UserId),

    #[error("role {0} no longer exists")]
    UnknownRole(RoleId),

    #[error("role {role_id} has an unrecognized name '{name}'")]
    UnknownRoleName { role_id: RoleId, name: String },

    #[error("permission matrix of role {role_id} is malformed: {reason}")]
    MalformedPermissions { role_id: RoleId, reason: String },

    #[error(transparent)]
    Store(AppError),
}

/// Everything that means "this session no longer maps to a usable identity"
/// becomes an invalid session; only storage failures keep their own kind.
impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Store(e) => e,
            _ => AppError::invalid_session(),
        }
    }
}

/// Loads the caller's role and matrix fresh on every call.
#[derive(Clone)]
pub struct PermissionResolver {
    store: Arc<dyn IdentityStore>,
}

impl PermissionResolver {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn resolve(&self, user_id: UserId) -> Result<Principal, ResolveError> {
        let user = self
            .store
            .find_user_by_id(user_id)
            .await
            .map_err(ResolveError::Store)?
            .ok_or(ResolveError::UnknownUser(user_id))?;

        let record = self
            .store
            .find_role_with_permissions(user.role_id)
            .await
            .map_err(ResolveError::Store)?
            .ok_or(ResolveError::UnknownRole(user.role_id))?;

        let name: RoleName = record
            .name
            .parse()
            .map_err(|_| ResolveError::UnknownRoleName {
                role_id: record.id,
                name: record.name.clone(),
            })?;

        let permissions = PermissionMatrix::parse(&record.permissions).map_err(|e| {
            ResolveError::MalformedPermissions {
                role_id: record.id,
                reason: e.to_string(),
            }
        })?;

        Ok(Principal {
            user_id: user.id,
            role: Role {
                id: record.id,
                name,
                permissions,
            },
        })
    }

    pub fn is_allowed(principal: &Principal, resource: &Resource, method: HttpMethod) -> bool {
        principal.is_allowed(resource, method)
    }
}
