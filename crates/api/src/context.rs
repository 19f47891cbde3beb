use std::sync::Arc;

use folio_auth::{Principal, Role};
use folio_core::UserId;

/// Verified identity of the caller for the current request.
///
/// Inserted by the access guard; only present on guarded routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    principal: Arc<Principal>,
}

impl SessionContext {
    pub fn new(principal: Principal) -> Self {
        Self {
            principal: Arc::new(principal),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.principal.user_id
    }

    pub fn role(&self) -> &Role {
        &self.principal.role
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}
