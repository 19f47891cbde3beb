//! Service wiring: one storage backend behind every port the handlers use.

use std::sync::Arc;

use folio_auth::{AccessEngine, Hs256SessionCodec};
use folio_core::PaginationLimits;
use folio_infra::{NavigationMenuRepository, PageRepository, Store, UserRepository};

#[derive(Clone)]
pub struct AppServices {
    pub engine: AccessEngine,
    pub codec: Arc<Hs256SessionCodec>,
    pub users: Arc<dyn UserRepository>,
    pub pages: Arc<dyn PageRepository>,
    pub menus: Arc<dyn NavigationMenuRepository>,
    pub pagination: PaginationLimits,
}

impl AppServices {
    pub fn new<S>(store: Arc<S>, codec: Hs256SessionCodec, pagination: PaginationLimits) -> Self
    where
        S: Store + 'static,
    {
        let codec = Arc::new(codec);
        Self {
            engine: AccessEngine::new(codec.clone(), store.clone()),
            codec,
            users: store.clone(),
            pages: store.clone(),
            menus: store,
            pagination,
        }
    }
}
