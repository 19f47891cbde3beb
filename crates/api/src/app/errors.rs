//! Consistent error responses: every failure renders as `{errCode, errMessages}`.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use folio_core::{AppError, ErrorBody};

/// HTTP wrapper around [`AppError`].
#[derive(Debug)]
pub struct ApiError(pub AppError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::invalid_argument([rejection.body_text()]))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::invalid_argument([rejection.body_text()]))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(AppError::invalid_argument([rejection.body_text()]))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        json_error(status, self.0.body())
    }
}

pub fn json_error(status: StatusCode, body: ErrorBody) -> Response {
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_error_kind() {
        let cases = [
            (AppError::not_found(), StatusCode::NOT_FOUND),
            (AppError::invalid_argument(["bad"]), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::invalid_session(), StatusCode::UNAUTHORIZED),
            (AppError::invalid_access(), StatusCode::FORBIDDEN),
            (AppError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError(err).into_response().status(), status);
        }
    }
}
