use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP methods that can appear in a permission matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
    ];

    /// Matrix key for this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl core::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported http method '{0}'")]
pub struct UnsupportedMethod(pub String);

impl core::str::FromStr for HttpMethod {
    type Err = UnsupportedMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnsupportedMethod(s.to_string()))
    }
}

/// Resource name as used for the first level of a permission matrix.
///
/// Resources are opaque strings; the constants below name the ones the API
/// exposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource(Cow<'static, str>);

impl Resource {
    pub const USERS: Resource = Resource(Cow::Borrowed("users"));
    pub const PAGES: Resource = Resource(Cow::Borrowed("pages"));
    pub const NAVIGATION_MENU: Resource = Resource(Cow::Borrowed("navigationMenu"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Resource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
#[error("malformed permission matrix: {0}")]
pub struct MatrixParseError(#[from] serde_json::Error);

/// Per-role grants: resource → method → allowed.
///
/// Anything not present is denied. Unknown method keys in stored text are
/// kept but never match a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMatrix(HashMap<String, HashMap<String, bool>>);

impl PermissionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the serialized form stored next to a role.
    pub fn parse(text: &str) -> Result<Self, MatrixParseError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    /// Builder-style grant, used when seeding roles.
    pub fn grant(mut self, resource: &Resource, method: HttpMethod) -> Self {
        self.0
            .entry(resource.as_str().to_string())
            .or_default()
            .insert(method.as_str().to_string(), true);
        self
    }

    pub fn allows(&self, resource: &Resource, method: HttpMethod) -> bool {
        self.0
            .get(resource.as_str())
            .and_then(|methods| methods.get(method.as_str()))
            .copied()
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_stored_text() {
        let m = PermissionMatrix::parse(r#"{"pages":{"POST":true,"DELETE":false}}"#).unwrap();
        assert!(m.allows(&Resource::PAGES, HttpMethod::Post));
        assert!(!m.allows(&Resource::PAGES, HttpMethod::Delete));
        assert!(!m.allows(&Resource::PAGES, HttpMethod::Get));
        assert!(!m.allows(&Resource::USERS, HttpMethod::Post));
    }

    #[test]
    fn malformed_text_is_an_error_not_an_empty_matrix() {
        for text in ["", "null", "[]", r#"{"pages":{"POST":"yes"}}"#, r#"{"pages":true}"#] {
            assert!(PermissionMatrix::parse(text).is_err(), "input {text:?}");
        }
    }

    #[test]
    fn method_keys_are_case_sensitive() {
        let m = PermissionMatrix::parse(r#"{"users":{"get":true}}"#).unwrap();
        assert!(!m.allows(&Resource::USERS, HttpMethod::Get));
    }

    #[test]
    fn grant_round_trips_through_text() {
        let m = PermissionMatrix::new()
            .grant(&Resource::NAVIGATION_MENU, HttpMethod::Patch)
            .grant(&Resource::USERS, HttpMethod::Get);
        let parsed = PermissionMatrix::parse(&m.to_text().unwrap()).unwrap();
        assert_eq!(parsed, m);
    }

    #[test]
    fn methods_parse_from_request_names() {
        assert_eq!("PATCH".parse::<HttpMethod>(), Ok(HttpMethod::Patch));
        assert!("HEAD".parse::<HttpMethod>().is_err());
    }

    fn method() -> impl Strategy<Value = HttpMethod> {
        prop::sample::select(HttpMethod::ALL.to_vec())
    }

    proptest! {
        /// Property: only explicitly granted (resource, method) pairs are allowed.
        #[test]
        fn deny_by_default(
            grants in prop::collection::vec(("[a-z]{1,6}", method()), 0..8),
            probe_resource in "[a-z]{1,6}",
            probe_method in method(),
        ) {
            let mut m = PermissionMatrix::new();
            for (resource, method) in &grants {
                m = m.grant(&Resource::new(resource.clone()), *method);
            }

            let expected = grants.iter().any(|(r, me)| *r == probe_resource && *me == probe_method);
            prop_assert_eq!(m.allows(&Resource::new(probe_resource), probe_method), expected);
        }
    }
}
