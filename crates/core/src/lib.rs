//! `folio-core` — shared building blocks.
//!
//! Identifiers, the client-facing error taxonomy and pagination. No IO.

pub mod error;
pub mod id;
pub mod pagination;

pub use error::{AppError, AppResult, ErrorBody, ErrorKind};
pub use id::{NavigationMenuId, PageId, RoleId, UserId};
pub use pagination::{Pagination, PaginationLimits};
