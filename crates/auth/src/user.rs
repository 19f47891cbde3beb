//! User accounts as exposed by the API.

use serde::{Deserialize, Serialize};

use folio_core::{RoleId, UserId};

/// A user account. Credentials are never part of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role_id: RoleId,
}

/// Partial update of a user's profile. Absent or empty fields are left as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        non_empty(&self.first_name).is_none()
            && non_empty(&self.last_name).is_none()
            && non_empty(&self.email).is_none()
    }

    pub fn apply(&self, user: &mut User) {
        if let Some(first_name) = non_empty(&self.first_name) {
            user.first_name = first_name.to_string();
        }
        if let Some(last_name) = non_empty(&self.last_name) {
            user.last_name = last_name.to_string();
        }
        if let Some(email) = non_empty(&self.email) {
            user.email = email.to_string();
        }
    }
}
