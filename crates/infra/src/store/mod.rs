//! Storage interfaces used by the HTTP handlers.
//!
//! Identity lookups for the authorization core go through
//! [`folio_auth::IdentityStore`]; the repositories below serve the content
//! routes. Both adapters implement every trait.

use folio_auth::{IdentityStore, User, UserPatch};
use folio_content::{
    MenuSort, NavigationMenu, NavigationMenuPatch, NewNavigationMenu, Page, PageDraft, PagePatch,
    PageSort,
};
use folio_core::{AppResult, NavigationMenuId, PageId, Pagination, UserId};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

/// Mutations return `Ok(None)` when the target record does not exist.
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    async fn list_users(&self, pagination: Pagination) -> AppResult<Vec<User>>;

    async fn get_user(&self, id: UserId) -> AppResult<Option<User>>;

    async fn update_user(&self, id: UserId, patch: &UserPatch) -> AppResult<Option<User>>;

    async fn delete_user(&self, id: UserId) -> AppResult<Option<User>>;
}

#[async_trait::async_trait]
pub trait PageRepository: Send + Sync {
    async fn list_pages(
        &self,
        published: bool,
        sort: PageSort,
        pagination: Pagination,
    ) -> AppResult<Vec<Page>>;

    async fn get_page(&self, id: PageId) -> AppResult<Option<Page>>;

    async fn create_page(&self, draft: PageDraft) -> AppResult<Page>;

    async fn update_page(
        &self,
        id: PageId,
        patch: &PagePatch,
        modifier: UserId,
    ) -> AppResult<Option<Page>>;

    async fn delete_page(&self, id: PageId) -> AppResult<Option<Page>>;
}

#[async_trait::async_trait]
pub trait NavigationMenuRepository: Send + Sync {
    async fn list_menus(&self, sort: MenuSort, pagination: Pagination) -> AppResult<Vec<NavigationMenu>>;

    async fn get_menu(&self, id: NavigationMenuId) -> AppResult<Option<NavigationMenu>>;

    async fn create_menu(&self, menu: NewNavigationMenu) -> AppResult<NavigationMenu>;

    async fn update_menu(
        &self,
        id: NavigationMenuId,
        patch: &NavigationMenuPatch,
    ) -> AppResult<Option<NavigationMenu>>;

    async fn delete_menu(&self, id: NavigationMenuId) -> AppResult<Option<NavigationMenu>>;
}

/// Everything the API needs from one backend.
pub trait Store: IdentityStore + UserRepository + PageRepository + NavigationMenuRepository {}

impl<S> Store for S where S: IdentityStore + UserRepository + PageRepository + NavigationMenuRepository {}
