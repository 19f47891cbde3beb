//! Process configuration, read once from the environment at startup.

use chrono::Duration;
use thiserror::Error;

use folio_auth::DEFAULT_SESSION_TTL_SECS;
use folio_core::PaginationLimits;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid configuration: {}", .problems.join("; "))]
pub struct ConfigError {
    pub problems: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub jwt_secret: String,
    pub session_ttl: Duration,
    /// Absent means the in-memory store.
    pub database_url: Option<String>,
    pub pagination: PaginationLimits,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, collecting every problem found.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut problems = Vec::new();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT").map(|v| v.parse::<u16>()) {
            Some(Ok(port)) if port >= 80 => port,
            Some(_) => {
                problems.push("PORT must be an integer between 80 and 65535".to_string());
                0
            }
            None => {
                problems.push("PORT is required".to_string());
                0
            }
        };

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            problems.push("JWT_SECRET is required".to_string());
            String::new()
        });

        let session_ttl = match get("JWT_EXPIRES_IN_SECS").map(|v| v.parse::<i64>()) {
            None => Duration::seconds(DEFAULT_SESSION_TTL_SECS),
            Some(Ok(secs)) if secs > 0 => Duration::seconds(secs),
            Some(_) => {
                problems.push("JWT_EXPIRES_IN_SECS must be a positive integer".to_string());
                Duration::seconds(DEFAULT_SESSION_TTL_SECS)
            }
        };

        let defaults = PaginationLimits::default();
        let mut limit = |key: &str, fallback: u32| match get(key).map(|v| v.parse::<u32>()) {
            None => fallback,
            Some(Ok(n)) => n,
            Some(Err(_)) => {
                problems.push(format!("{key} must be a non-negative integer"));
                fallback
            }
        };
        let pagination = PaginationLimits {
            default: limit("PAGINATION_LIMIT_DEFAULT", defaults.default),
            min: limit("PAGINATION_LIMIT_MIN", defaults.min),
            max: limit("PAGINATION_LIMIT_MAX", defaults.max),
        };
        if !(pagination.min <= pagination.default && pagination.default <= pagination.max) {
            problems.push(
                "pagination limits must satisfy MIN <= DEFAULT <= MAX".to_string(),
            );
        }

        if !problems.is_empty() {
            return Err(ConfigError { problems });
        }

        Ok(Self {
            port,
            jwt_secret,
            session_ttl,
            database_url: get("DATABASE_URL"),
            pagination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = load(&[("PORT", "3000"), ("JWT_SECRET", "s3cret")]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.session_ttl, Duration::seconds(172_800));
        assert_eq!(config.database_url, None);
        assert_eq!(config.pagination, PaginationLimits::default());
    }

    #[test]
    fn every_problem_is_reported() {
        let err = load(&[("PORT", "22"), ("JWT_EXPIRES_IN_SECS", "-5")]).unwrap_err();

        assert_eq!(err.problems.len(), 3);
        assert!(err.to_string().contains("PORT"));
        assert!(err.to_string().contains("JWT_SECRET is required"));
    }

    #[test]
    fn inconsistent_pagination_is_rejected() {
        let err = load(&[
            ("PORT", "8080"),
            ("JWT_SECRET", "s3cret"),
            ("PAGINATION_LIMIT_DEFAULT", "500"),
        ])
        .unwrap_err();

        assert_eq!(err.problems.len(), 1);
    }
}
