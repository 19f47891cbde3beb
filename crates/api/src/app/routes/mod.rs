use axum::{routing::get, Router};

use crate::app::services::AppServices;

pub mod navigation_menus;
pub mod pages;
pub mod system;
pub mod users;

/// Router for every resource endpoint; each route carries its own access guard.
pub fn router(services: &AppServices) -> Router {
    Router::new()
        .route("/health", get(system::health))
        .nest("/users", users::router(services))
        .nest("/pages", pages::router(services))
        .nest("/navigation-menus", navigation_menus::router(services))
}
