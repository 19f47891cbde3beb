use axum::{
    http::{Method, StatusCode, Uri},
    response::Response,
};

use folio_core::ErrorBody;

use crate::app::errors::json_error;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Fallback for unmatched routes.
pub async fn not_found(method: Method, uri: Uri) -> Response {
    json_error(
        StatusCode::NOT_FOUND,
        ErrorBody {
            err_code: "error.app.notFound".to_string(),
            err_messages: vec![format!("Cannot {method} {}", uri.path())],
        },
    )
}
