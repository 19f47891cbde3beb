//! Query parameters and response envelopes shared by the route modules.

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use folio_core::{AppResult, Pagination, PaginationLimits};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub sort: Option<String>,
}

impl ListQuery {
    pub fn pagination(&self, limits: PaginationLimits) -> AppResult<Pagination> {
        Pagination::resolve(self.limit, self.offset, limits)
    }

    /// Parsed `sort` key, or the type's default when absent.
    pub fn sort<T>(&self) -> AppResult<T>
    where
        T: std::str::FromStr<Err = folio_core::AppError> + Default,
    {
        match self.sort.as_deref() {
            Some(key) => key.parse(),
            None => Ok(T::default()),
        }
    }
}

// -------------------------
// Response envelopes
// -------------------------

/// `{"data": ...}` for reads, updates and deletes.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

/// `{"result": ...}` for creations.
#[derive(Debug, Serialize)]
pub struct Created<T> {
    pub result: T,
}

pub fn data<T: Serialize>(data: T) -> (StatusCode, Json<Data<T>>) {
    (StatusCode::OK, Json(Data { data }))
}

pub fn created<T: Serialize>(result: T) -> (StatusCode, Json<Created<T>>) {
    (StatusCode::OK, Json(Created { result }))
}
