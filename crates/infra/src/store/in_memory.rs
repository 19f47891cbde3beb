//! In-memory backend for tests and local development.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use folio_auth::{IdentityStore, RoleRecord, User, UserPatch, UserRecord};
use folio_content::{
    MenuSort, NavigationMenu, NavigationMenuPatch, NewNavigationMenu, Page, PageDraft, PagePatch,
    PageSort,
};
use folio_core::{AppError, AppResult, NavigationMenuId, PageId, Pagination, RoleId, UserId};

use super::{NavigationMenuRepository, PageRepository, UserRepository};
use crate::seed;

#[derive(Debug, Default)]
struct Tables {
    roles: BTreeMap<RoleId, RoleRecord>,
    users: BTreeMap<UserId, User>,
    pages: BTreeMap<PageId, Page>,
    menus: BTreeMap<NavigationMenuId, NavigationMenu>,
    last_page_id: i64,
    last_menu_id: i64,
}

/// All tables behind one lock, so every operation sees a consistent snapshot.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the default roles and one admin account (user 1).
    pub fn seeded() -> AppResult<Self> {
        let store = Self::new();
        for role in seed::default_roles()? {
            store.insert_role(role)?;
        }
        store.insert_user(User {
            id: UserId::new(1),
            first_name: "Admin".to_string(),
            last_name: "Folio".to_string(),
            email: "admin@folio.local".to_string(),
            role_id: RoleId::new(1),
        })?;
        Ok(store)
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, Tables>> {
        self.inner
            .read()
            .map_err(|_| AppError::internal("in-memory store lock poisoned"))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, Tables>> {
        self.inner
            .write()
            .map_err(|_| AppError::internal("in-memory store lock poisoned"))
    }

    pub fn insert_role(&self, role: RoleRecord) -> AppResult<()> {
        self.write()?.roles.insert(role.id, role);
        Ok(())
    }

    pub fn insert_user(&self, user: User) -> AppResult<()> {
        self.write()?.users.insert(user.id, user);
        Ok(())
    }

    /// Replace the stored matrix text of a role (administrative edit).
    pub fn set_role_permissions(&self, id: RoleId, permissions: impl Into<String>) -> AppResult<()> {
        let mut tables = self.write()?;
        let role = tables.roles.get_mut(&id).ok_or_else(AppError::not_found)?;
        role.permissions = permissions.into();
        Ok(())
    }
}

fn title_taken(tables: &Tables, title: &str, except: Option<PageId>) -> bool {
    tables
        .pages
        .values()
        .any(|p| p.title == title && Some(p.id) != except)
}

fn duplicate_title() -> AppError {
    AppError::invalid_argument(["Title is already used by another page"])
}

#[async_trait::async_trait]
impl IdentityStore for InMemoryStore {
    async fn find_user_by_id(&self, id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self.read()?.users.get(&id).map(|u| UserRecord {
            id: u.id,
            role_id: u.role_id,
        }))
    }

    async fn find_role_with_permissions(&self, id: RoleId) -> AppResult<Option<RoleRecord>> {
        Ok(self.read()?.roles.get(&id).cloned())
    }
}

#[async_trait::async_trait]
impl UserRepository for InMemoryStore {
    async fn list_users(&self, pagination: Pagination) -> AppResult<Vec<User>> {
        Ok(pagination.window(self.read()?.users.values().cloned()))
    }

    async fn get_user(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn update_user(&self, id: UserId, patch: &UserPatch) -> AppResult<Option<User>> {
        let mut tables = self.write()?;
        Ok(tables.users.get_mut(&id).map(|user| {
            patch.apply(user);
            user.clone()
        }))
    }

    async fn delete_user(&self, id: UserId) -> AppResult<Option<User>> {
        let mut tables = self.write()?;
        if tables.pages.values().any(|p| p.creator_id == id) {
            return Err(AppError::invalid_argument(["User still owns pages"]));
        }
        Ok(tables.users.remove(&id))
    }
}

#[async_trait::async_trait]
impl PageRepository for InMemoryStore {
    async fn list_pages(
        &self,
        published: bool,
        sort: PageSort,
        pagination: Pagination,
    ) -> AppResult<Vec<Page>> {
        let mut pages: Vec<Page> = self
            .read()?
            .pages
            .values()
            .filter(|p| p.published == published)
            .cloned()
            .collect();
        sort.sort(&mut pages);
        Ok(pagination.window(pages))
    }

    async fn get_page(&self, id: PageId) -> AppResult<Option<Page>> {
        Ok(self.read()?.pages.get(&id).cloned())
    }

    async fn create_page(&self, draft: PageDraft) -> AppResult<Page> {
        let mut tables = self.write()?;
        if title_taken(&tables, &draft.title, None) {
            return Err(duplicate_title());
        }

        tables.last_page_id += 1;
        let page = draft.into_page(PageId::new(tables.last_page_id));
        tables.pages.insert(page.id, page.clone());
        Ok(page)
    }

    async fn update_page(
        &self,
        id: PageId,
        patch: &PagePatch,
        modifier: UserId,
    ) -> AppResult<Option<Page>> {
        let mut tables = self.write()?;
        let Some(mut page) = tables.pages.get(&id).cloned() else {
            return Ok(None);
        };

        patch.apply(&mut page, modifier);
        if title_taken(&tables, &page.title, Some(id)) {
            return Err(duplicate_title());
        }

        tables.pages.insert(id, page.clone());
        Ok(Some(page))
    }

    async fn delete_page(&self, id: PageId) -> AppResult<Option<Page>> {
        Ok(self.write()?.pages.remove(&id))
    }
}

#[async_trait::async_trait]
impl NavigationMenuRepository for InMemoryStore {
    async fn list_menus(&self, sort: MenuSort, pagination: Pagination) -> AppResult<Vec<NavigationMenu>> {
        let mut menus: Vec<NavigationMenu> = self.read()?.menus.values().cloned().collect();
        sort.sort(&mut menus);
        Ok(pagination.window(menus))
    }

    async fn get_menu(&self, id: NavigationMenuId) -> AppResult<Option<NavigationMenu>> {
        Ok(self.read()?.menus.get(&id).cloned())
    }

    async fn create_menu(&self, menu: NewNavigationMenu) -> AppResult<NavigationMenu> {
        let mut tables = self.write()?;
        tables.last_menu_id += 1;
        let menu = NavigationMenu {
            id: NavigationMenuId::new(tables.last_menu_id),
            name: menu.name,
            pages_id: BTreeMap::new(),
        };
        tables.menus.insert(menu.id, menu.clone());
        Ok(menu)
    }

    async fn update_menu(
        &self,
        id: NavigationMenuId,
        patch: &NavigationMenuPatch,
    ) -> AppResult<Option<NavigationMenu>> {
        let mut tables = self.write()?;
        Ok(tables.menus.get_mut(&id).map(|menu| {
            patch.apply(menu);
            menu.clone()
        }))
    }

    async fn delete_menu(&self, id: NavigationMenuId) -> AppResult<Option<NavigationMenu>> {
        Ok(self.write()?.menus.remove(&id))
    }
}
