use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Extension, Path, Query},
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;

use folio_auth::{AccessRequirement, Resource};
use folio_content::{NewPage, Page, PagePatch, PageSort};
use folio_core::{AppError, PageId};

use crate::app::dto::{self, ListQuery};
use crate::app::errors::ApiResult;
use crate::app::services::AppServices;
use crate::context::SessionContext;
use crate::middleware::guarded;

pub fn router(services: &AppServices) -> Router {
    let engine = &services.engine;
    let pages = AccessRequirement::new(Resource::PAGES);

    Router::new()
        .route("/", guarded(post(create_page), engine, pages.clone()))
        .route("/draft", guarded(get(list_drafts), engine, pages.clone()))
        .route("/published", get(list_published))
        .route(
            "/:pageId",
            get(get_published_page)
                .merge(guarded(patch(update_page).delete(delete_page), engine, pages)),
        )
}

fn parse_id(raw: &str) -> ApiResult<PageId> {
    Ok(raw.parse()?)
}

async fn list(
    services: &AppServices,
    published: bool,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<Page>> {
    let Query(query) = query?;
    let pagination = query.pagination(services.pagination)?;
    let sort: PageSort = query.sort()?;

    Ok(services.pages.list_pages(published, sort, pagination).await?)
}

pub async fn list_drafts(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let pages = list(&services, false, query).await?;
    Ok(dto::data(pages))
}

pub async fn list_published(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let pages = list(&services, true, query).await?;
    Ok(dto::data(pages))
}

/// Public lookup: drafts are reported as missing.
pub async fn get_published_page(
    Extension(services): Extension<Arc<AppServices>>,
    Path(page_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let page_id = parse_id(&page_id)?;

    let page = services
        .pages
        .get_page(page_id)
        .await?
        .filter(|p| p.published)
        .ok_or_else(AppError::not_found)?;
    Ok(dto::data(page))
}

pub async fn create_page(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    body: Result<Json<NewPage>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    let draft = body.into_draft(session.user_id(), Utc::now());

    let page = services.pages.create_page(draft).await?;
    tracing::info!(page_id = %page.id, creator_id = %page.creator_id, "page created");
    Ok(dto::created(page))
}

pub async fn update_page(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(page_id): Path<String>,
    body: Result<Json<PagePatch>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let page_id = parse_id(&page_id)?;
    let Json(patch) = body?;

    let page = services
        .pages
        .update_page(page_id, &patch, session.user_id())
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(dto::data(page))
}

pub async fn delete_page(
    Extension(services): Extension<Arc<AppServices>>,
    Path(page_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let page_id = parse_id(&page_id)?;

    let page = services
        .pages
        .delete_page(page_id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(dto::data(page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    use folio_auth::Hs256SessionCodec;
    use folio_core::PaginationLimits;
    use folio_infra::{InMemoryStore, PageRepository};

    #[tokio::test]
    async fn published_listing_only_returns_published_pages() {
        let store = Arc::new(InMemoryStore::seeded().unwrap());
        for (title, published) in [("Public", true), ("Hidden", false)] {
            let draft = NewPage {
                title: title.to_string(),
                content: "x".to_string(),
                published,
            }
            .into_draft(folio_core::UserId::new(1), Utc::now());
            store.create_page(draft).await.unwrap();
        }
        let services = AppServices::new(store, Hs256SessionCodec::new("s"), PaginationLimits::default());
        let app = crate::app::build_app(services);

        let res = app
            .oneshot(Request::get("/pages/published").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("\"Public\""));
        assert!(!body.contains("Hidden"));
    }
}
