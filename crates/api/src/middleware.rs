//! Request middleware: per-request tracing span and the access guard.

use std::collections::HashMap;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use chrono::Utc;
use tracing::Instrument;

use folio_auth::{AccessEngine, AccessRequest, AccessRequirement, HttpMethod};
use folio_core::UserId;

use crate::app::errors::ApiError;
use crate::context::SessionContext;

/// Path parameter naming the owner of the targeted record.
const OWNER_PARAM: &str = "userId";

/// Wrap every request in a span and log its outcome.
pub async fn trace_request(req: Request<Body>, next: Next) -> Response {
    let span = tracing::info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        user_id = tracing::field::Empty,
    );

    async move {
        let started = Instant::now();
        let response = next.run(req).await;
        tracing::info!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
        response
    }
    .instrument(span)
    .await
}

#[derive(Clone)]
pub struct AccessGuard {
    pub engine: AccessEngine,
    pub requirement: AccessRequirement,
}

/// Attach the access guard for `requirement` to every method of `route`.
pub fn guarded(route: MethodRouter, engine: &AccessEngine, requirement: AccessRequirement) -> MethodRouter {
    route.route_layer(axum::middleware::from_fn_with_state(
        AccessGuard {
            engine: engine.clone(),
            requirement,
        },
        require_access,
    ))
}

/// Runs before the handler; a denial means the handler never executes.
pub async fn require_access(
    State(guard): State<AccessGuard>,
    params: Option<Path<HashMap<String, String>>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // Unknown methods (HEAD, OPTIONS) still go through the session checks first.
    let method = req.method().as_str().parse::<HttpMethod>().ok();

    let target_owner_id = params
        .as_ref()
        .and_then(|Path(params)| params.get(OWNER_PARAM))
        .and_then(|raw| raw.parse::<UserId>().ok());

    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let request = AccessRequest {
        authorization: authorization.as_deref(),
        method,
        target_owner_id,
    };

    match guard.engine.authorize(&request, &guard.requirement, Utc::now()).await {
        Ok(principal) => {
            tracing::Span::current().record("user_id", principal.user_id.get());
            req.extensions_mut().insert(SessionContext::new(principal));
            next.run(req).await
        }
        Err(err) => ApiError(err).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{http::StatusCode, routing::get, Extension, Router};
    use tower::ServiceExt;

    use folio_auth::{Hs256SessionCodec, Resource};
    use folio_infra::InMemoryStore;

    const SECRET: &str = "guard-secret";

    fn engine() -> (AccessEngine, Hs256SessionCodec) {
        let store = Arc::new(InMemoryStore::seeded().unwrap());
        let codec = Hs256SessionCodec::new(SECRET);
        (AccessEngine::new(Arc::new(codec.clone()), store), codec)
    }

    async fn whoami(Extension(session): Extension<SessionContext>) -> String {
        session.user_id().to_string()
    }

    fn app(engine: &AccessEngine) -> Router {
        Router::new().route(
            "/users/:userId",
            guarded(
                get(whoami),
                engine,
                AccessRequirement::new(Resource::USERS).consultable_by_self(),
            ),
        )
    }

    #[tokio::test]
    async fn missing_header_never_reaches_the_handler() {
        let (engine, _) = engine();
        let res = app(&engine)
            .oneshot(Request::get("/users/1").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn granted_requests_carry_the_session_context() {
        let (engine, codec) = engine();
        let token = codec.issue(UserId::new(1), Utc::now()).unwrap();

        let res = app(&engine)
            .oneshot(
                Request::get("/users/1")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"1");
    }

    #[tokio::test]
    async fn head_requests_are_checked_for_a_session_before_the_method() {
        let (engine, codec) = engine();
        let app = Router::new().route(
            "/users",
            guarded(get(|| async { "ok" }), &engine, AccessRequirement::new(Resource::USERS)),
        );
        let head = |authorization: Option<String>| {
            let mut req = Request::head("/users");
            if let Some(value) = authorization {
                req = req.header(AUTHORIZATION, value);
            }
            req.body(Body::empty()).unwrap()
        };

        let res = app.clone().oneshot(head(None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let forged = Hs256SessionCodec::new("other").issue(UserId::new(1), Utc::now()).unwrap();
        let res = app.clone().oneshot(head(Some(format!("Bearer {forged}")))).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let token = codec.issue(UserId::new(1), Utc::now()).unwrap();
        let res = app.oneshot(head(Some(format!("Bearer {token}")))).await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
