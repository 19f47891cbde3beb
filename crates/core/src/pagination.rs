//! List pagination shared by every collection endpoint.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Bounds applied to client-supplied `limit` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationLimits {
    pub default: u32,
    pub min: u32,
    pub max: u32,
}

impl Default for PaginationLimits {
    fn default() -> Self {
        Self {
            default: 10,
            min: 1,
            max: 100,
        }
    }
}

/// Resolved pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of records to return.
    pub limit: u32,
    /// Offset for pagination (0-based).
    pub offset: u32,
}

impl Pagination {
    /// Apply defaults and bounds to raw query values.
    ///
    /// A missing `offset` is always 0, never the limit default.
    pub fn resolve(
        limit: Option<u32>,
        offset: Option<u32>,
        limits: PaginationLimits,
    ) -> AppResult<Self> {
        let limit = limit.unwrap_or(limits.default);
        if limit < limits.min {
            return Err(AppError::invalid_argument([format!(
                "Query Limit must be greater than or equal to {}",
                limits.min
            )]));
        }

        Ok(Self {
            limit: limit.min(limits.max),
            offset: offset.unwrap_or(0),
        })
    }

    /// Apply this window to an already ordered sequence.
    pub fn window<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn missing_values_use_defaults() {
        let p = Pagination::resolve(None, None, PaginationLimits::default()).unwrap();
        assert_eq!(p, Pagination { limit: 10, offset: 0 });
    }

    #[test]
    fn offset_default_is_independent_of_limit_default() {
        let limits = PaginationLimits {
            default: 25,
            ..PaginationLimits::default()
        };
        let p = Pagination::resolve(Some(5), None, limits).unwrap();
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn limit_below_minimum_is_rejected() {
        let err = Pagination::resolve(Some(0), None, PaginationLimits::default()).unwrap_err();
        assert_eq!(err.http_status(), 422);
    }

    #[test]
    fn limit_is_capped_at_maximum() {
        let p = Pagination::resolve(Some(5000), Some(3), PaginationLimits::default()).unwrap();
        assert_eq!(p.limit, 100);
        assert_eq!(p.offset, 3);
    }

    proptest! {
        #[test]
        fn window_never_exceeds_limit(len in 0usize..200, limit in 1u32..50, offset in 0u32..250) {
            let p = Pagination { limit, offset };
            let out = p.window(0..len);
            prop_assert!(out.len() <= limit as usize);
            if let Some(first) = out.first() {
                prop_assert_eq!(*first, offset as usize);
            }
        }
    }
}
