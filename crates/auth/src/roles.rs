use serde::{Deserialize, Serialize};
use thiserror::Error;

use folio_core::RoleId;

use crate::permissions::{HttpMethod, PermissionMatrix, Resource};

/// Names a role can have. New accounts default to `editor`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleName {
    Admin,
    Manager,
    #[default]
    Editor,
}

impl RoleName {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Admin => "admin",
            RoleName::Manager => "manager",
            RoleName::Editor => "editor",
        }
    }
}

impl core::fmt::Display for RoleName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role name '{0}'")]
pub struct UnknownRoleName(pub String);

impl core::str::FromStr for RoleName {
    type Err = UnknownRoleName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(RoleName::Admin),
            "manager" => Ok(RoleName::Manager),
            "editor" => Ok(RoleName::Editor),
            other => Err(UnknownRoleName(other.to_string())),
        }
    }
}

/// A role with its parsed permission matrix.
///
/// The name carries no implicit grants: an `admin` role is only as powerful
/// as its matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: RoleName,
    pub permissions: PermissionMatrix,
}

impl Role {
    pub fn allows(&self, resource: &Resource, method: HttpMethod) -> bool {
        self.permissions.allows(resource, method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_round_trip() {
        for name in [RoleName::Admin, RoleName::Manager, RoleName::Editor] {
            assert_eq!(name.as_str().parse::<RoleName>(), Ok(name));
        }
        assert!("owner".parse::<RoleName>().is_err());
    }

    #[test]
    fn admin_name_grants_nothing_by_itself() {
        let role = Role {
            id: RoleId::new(1),
            name: RoleName::Admin,
            permissions: PermissionMatrix::new(),
        };
        for method in HttpMethod::ALL {
            assert!(!role.allows(&Resource::USERS, method));
        }
    }
}
