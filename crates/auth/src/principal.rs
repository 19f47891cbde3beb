use serde::Serialize;

use folio_core::UserId;

use crate::permissions::{HttpMethod, Resource};
use crate::roles::Role;

/// A caller resolved for the current request: who they are and which role
/// (with its permission matrix) they hold right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn is_allowed(&self, resource: &Resource, method: HttpMethod) -> bool {
        self.role.allows(resource, method)
    }

    pub fn owns(&self, owner_id: Option<UserId>) -> bool {
        owner_id == Some(self.user_id)
    }
}
