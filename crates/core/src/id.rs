//! Strongly-typed identifiers used across the domain.
//!
//! Records are keyed by database serial ids, so every identifier wraps a
//! positive `i64`.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Identifier of a user account.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

/// Identifier of a role.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(i64);

/// Identifier of a page.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(i64);

/// Identifier of a navigation menu.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavigationMenuId(i64);

macro_rules! impl_serial_newtype {
    ($t:ty) => {
        impl $t {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        /// Parses a path/query id. Only positive integers are accepted.
        impl FromStr for $t {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().parse::<i64>() {
                    Ok(v) if v >= 1 => Ok(Self(v)),
                    _ => Err(AppError::invalid_argument(["Invalid ID"])),
                }
            }
        }
    };
}

impl_serial_newtype!(UserId);
impl_serial_newtype!(RoleId);
impl_serial_newtype!(PageId);
impl_serial_newtype!(NavigationMenuId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_ids() {
        assert_eq!("7".parse::<UserId>().unwrap(), UserId::new(7));
        assert_eq!(" 12 ".parse::<PageId>().unwrap().get(), 12);
    }

    #[test]
    fn rejects_zero_negative_and_garbage() {
        for raw in ["0", "-3", "abc", "", "1.5"] {
            let err = raw.parse::<UserId>().unwrap_err();
            assert_eq!(err.http_status(), 422, "input {raw:?}");
        }
    }

    #[test]
    fn serializes_as_plain_integer() {
        let json = serde_json::to_string(&RoleId::new(3)).unwrap();
        assert_eq!(json, "3");
    }
}
