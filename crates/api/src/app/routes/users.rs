use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Extension, Path, Query},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use folio_auth::{AccessRequirement, Resource, UserPatch};
use folio_core::{AppError, UserId};

use crate::app::dto::{self, ListQuery};
use crate::app::errors::ApiResult;
use crate::app::services::AppServices;
use crate::middleware::guarded;

pub fn router(services: &AppServices) -> Router {
    let engine = &services.engine;
    let users = AccessRequirement::new(Resource::USERS);
    let users_or_self = users.clone().consultable_by_self();

    Router::new()
        .route("/", guarded(get(list_users), engine, users.clone()))
        .route(
            "/:userId",
            guarded(get(get_user).patch(update_user), engine, users_or_self)
                .merge(guarded(axum::routing::delete(delete_user), engine, users)),
        )
}

fn parse_id(raw: &str) -> ApiResult<UserId> {
    Ok(raw.parse()?)
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    let pagination = query.pagination(services.pagination)?;

    let users = services.users.list_users(pagination).await?;
    Ok(dto::data(users))
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(user_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let user_id = parse_id(&user_id)?;

    let user = services
        .users
        .get_user(user_id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(dto::data(user))
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(user_id): Path<String>,
    body: Result<Json<UserPatch>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let user_id = parse_id(&user_id)?;
    let Json(patch) = body?;

    let user = services
        .users
        .update_user(user_id, &patch)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(dto::data(user))
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(user_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let user_id = parse_id(&user_id)?;

    let user = services
        .users
        .delete_user(user_id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(dto::data(user))
}
