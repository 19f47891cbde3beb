use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Extension, Path, Query},
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};

use folio_auth::{AccessRequirement, Resource};
use folio_content::{MenuSort, NavigationMenuPatch, NewNavigationMenu};
use folio_core::{AppError, NavigationMenuId};

use crate::app::dto::{self, ListQuery};
use crate::app::errors::ApiResult;
use crate::app::services::AppServices;
use crate::middleware::guarded;

pub fn router(services: &AppServices) -> Router {
    let engine = &services.engine;
    let menus = AccessRequirement::new(Resource::NAVIGATION_MENU);

    Router::new()
        .route(
            "/",
            get(list_menus).merge(guarded(post(create_menu), engine, menus.clone())),
        )
        .route(
            "/:navigationMenuId",
            get(get_menu).merge(guarded(patch(update_menu).delete(delete_menu), engine, menus)),
        )
}

fn parse_id(raw: &str) -> ApiResult<NavigationMenuId> {
    Ok(raw.parse()?)
}

pub async fn list_menus(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    let pagination = query.pagination(services.pagination)?;
    let sort: MenuSort = query.sort()?;

    let menus = services.menus.list_menus(sort, pagination).await?;
    Ok(dto::data(menus))
}

pub async fn get_menu(
    Extension(services): Extension<Arc<AppServices>>,
    Path(menu_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let menu_id = parse_id(&menu_id)?;

    let menu = services
        .menus
        .get_menu(menu_id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(dto::data(menu))
}

pub async fn create_menu(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewNavigationMenu>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    if body.name.trim().is_empty() {
        return Err(AppError::invalid_argument(["Name is required"]).into());
    }

    let menu = services.menus.create_menu(body).await?;
    Ok(dto::created(menu))
}

pub async fn update_menu(
    Extension(services): Extension<Arc<AppServices>>,
    Path(menu_id): Path<String>,
    body: Result<Json<NavigationMenuPatch>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let menu_id = parse_id(&menu_id)?;
    let Json(patch) = body?;

    let menu = services
        .menus
        .update_menu(menu_id, &patch)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(dto::data(menu))
}

pub async fn delete_menu(
    Extension(services): Extension<Arc<AppServices>>,
    Path(menu_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let menu_id = parse_id(&menu_id)?;

    let menu = services
        .menus
        .delete_menu(menu_id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(dto::data(menu))
}
