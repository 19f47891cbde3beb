//! Postgres-backed store.
//!
//! Expects the tables created by the deployment's migrations:
//!
//! | table | columns |
//! |---|---|
//! | `roles` | `id`, `name`, `permissions` (text) |
//! | `users` | `id`, `"firstName"`, `"lastName"`, `email`, `"roleId"` |
//! | `pages` | `id`, `title` (unique), `content`, `slug`, `"creatorId"`, `"modifiersIds"` (json), `"publishedAt"` (timestamptz), `published` |
//! | `"navigationMenus"` | `id`, `name`, `"pagesId"` (json) |
//!
//! ## Error Mapping
//!
//! | PostgreSQL Error Code | AppError | Scenario |
//! |----------------------|----------|----------|
//! | `23505` | `InvalidArgument` | Unique violation (page title) |
//! | `23503` | `InvalidArgument` | Record still referenced (user owning pages) |
//! | anything else | `Internal` | Connection failures, schema drift, etc. |

use std::collections::BTreeMap;
use std::sync::Arc;

use sqlx::postgres::{PgPool, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use tracing::instrument;

use folio_auth::{IdentityStore, RoleRecord, User, UserPatch, UserRecord};
use folio_content::{
    MenuSort, NavigationMenu, NavigationMenuPatch, NewNavigationMenu, Page, PageDraft, PagePatch,
    PageSort,
};
use folio_core::{AppError, AppResult, NavigationMenuId, PageId, Pagination, RoleId, UserId};

use super::{NavigationMenuRepository, PageRepository, UserRepository};

const USER_COLUMNS: &str = r#"id::int8 AS id, "firstName", "lastName", email, "roleId"::int8 AS "roleId""#;

const PAGE_COLUMNS: &str = r#"id::int8 AS id, title, content, slug, "creatorId"::int8 AS "creatorId",
    "modifiersIds", "publishedAt", published"#;

const MENU_COLUMNS: &str = r#"id::int8 AS id, name, "pagesId""#;

/// Store backed by a shared SQLx connection pool (`Send + Sync`).
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => {
                return AppError::invalid_argument(["Title is already used by another page"]);
            }
            Some("23503") => return AppError::invalid_argument(["Record is still referenced"]),
            _ => {}
        }
    }
    AppError::internal(format!("database error in {operation}: {err}"))
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: UserId::new(row.try_get("id")?),
        first_name: row.try_get("firstName")?,
        last_name: row.try_get("lastName")?,
        email: row.try_get("email")?,
        role_id: RoleId::new(row.try_get("roleId")?),
    })
}

fn page_from_row(row: &PgRow) -> Result<Page, sqlx::Error> {
    let modifiers: Option<Json<Vec<UserId>>> = row.try_get("modifiersIds")?;
    Ok(Page {
        id: PageId::new(row.try_get("id")?),
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        slug: row.try_get("slug")?,
        creator_id: UserId::new(row.try_get("creatorId")?),
        modifiers_ids: modifiers.map(|m| m.0).unwrap_or_default(),
        published_at: row.try_get("publishedAt")?,
        published: row.try_get("published")?,
    })
}

fn menu_from_row(row: &PgRow) -> Result<NavigationMenu, sqlx::Error> {
    let pages: Option<Json<BTreeMap<String, PageId>>> = row.try_get("pagesId")?;
    Ok(NavigationMenu {
        id: NavigationMenuId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        pages_id: pages.map(|p| p.0).unwrap_or_default(),
    })
}

fn page_order(sort: PageSort) -> &'static str {
    match sort {
        PageSort::Id => "id",
        PageSort::Title => "title, id",
    }
}

fn menu_order(sort: MenuSort) -> &'static str {
    match sort {
        MenuSort::Id => "id",
        MenuSort::Name => "name, id",
    }
}

#[async_trait::async_trait]
impl IdentityStore for PostgresStore {
    #[instrument(level = "trace", skip(self))]
    async fn find_user_by_id(&self, id: UserId) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query(r#"SELECT id::int8 AS id, "roleId"::int8 AS "roleId" FROM users WHERE id = $1"#)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_id", e))?;

        row.map(|row| {
            Ok(UserRecord {
                id: UserId::new(row.try_get("id")?),
                role_id: RoleId::new(row.try_get("roleId")?),
            })
        })
        .transpose()
        .map_err(|e| map_sqlx_error("find_user_by_id", e))
    }

    #[instrument(level = "trace", skip(self))]
    async fn find_role_with_permissions(&self, id: RoleId) -> AppResult<Option<RoleRecord>> {
        let row = sqlx::query("SELECT id::int8 AS id, name::text AS name, permissions FROM roles WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_role_with_permissions", e))?;

        row.map(|row| {
            // A NULL matrix is stored as empty text so that it fails to parse.
            let permissions: Option<String> = row.try_get("permissions")?;
            Ok(RoleRecord {
                id: RoleId::new(row.try_get("id")?),
                name: row.try_get("name")?,
                permissions: permissions.unwrap_or_default(),
            })
        })
        .transpose()
        .map_err(|e| map_sqlx_error("find_role_with_permissions", e))
    }
}

#[async_trait::async_trait]
impl UserRepository for PostgresStore {
    async fn list_users(&self, pagination: Pagination) -> AppResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT $1 OFFSET $2");
        let rows = sqlx::query(&sql)
            .bind(i64::from(pagination.limit))
            .bind(i64::from(pagination.offset))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;

        rows.iter()
            .map(user_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_users", e))
    }

    async fn get_user(&self, id: UserId) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_user", e))?;

        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_user", e))
    }

    async fn update_user(&self, id: UserId, patch: &UserPatch) -> AppResult<Option<User>> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("begin", e))?;

        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_user", e))?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut user = user_from_row(&row).map_err(|e| map_sqlx_error("update_user", e))?;
        patch.apply(&mut user);

        sqlx::query(r#"UPDATE users SET "firstName" = $2, "lastName" = $3, email = $4 WHERE id = $1"#)
            .bind(id.get())
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_user", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(Some(user))
    }

    async fn delete_user(&self, id: UserId) -> AppResult<Option<User>> {
        let sql = format!("DELETE FROM users WHERE id = $1 RETURNING {USER_COLUMNS}");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_user", e))?;

        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("delete_user", e))
    }
}

#[async_trait::async_trait]
impl PageRepository for PostgresStore {
    async fn list_pages(
        &self,
        published: bool,
        sort: PageSort,
        pagination: Pagination,
    ) -> AppResult<Vec<Page>> {
        let sql = format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE published = $1 ORDER BY {} LIMIT $2 OFFSET $3",
            page_order(sort)
        );
        let rows = sqlx::query(&sql)
            .bind(published)
            .bind(i64::from(pagination.limit))
            .bind(i64::from(pagination.offset))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_pages", e))?;

        rows.iter()
            .map(page_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_pages", e))
    }

    async fn get_page(&self, id: PageId) -> AppResult<Option<Page>> {
        let sql = format!("SELECT {PAGE_COLUMNS} FROM pages WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_page", e))?;

        row.as_ref()
            .map(page_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_page", e))
    }

    async fn create_page(&self, draft: PageDraft) -> AppResult<Page> {
        let sql = format!(
            r#"INSERT INTO pages (title, content, slug, "creatorId", "modifiersIds", "publishedAt", published)
            VALUES ($1, $2, $3, $4, CAST($5 AS json), $6, $7)
            RETURNING {PAGE_COLUMNS}"#
        );
        let row = sqlx::query(&sql)
            .bind(&draft.title)
            .bind(&draft.content)
            .bind(&draft.slug)
            .bind(draft.creator_id.get())
            .bind(Json(Vec::<UserId>::new()))
            .bind(draft.published_at)
            .bind(draft.published)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_page", e))?;

        page_from_row(&row).map_err(|e| map_sqlx_error("create_page", e))
    }

    async fn update_page(
        &self,
        id: PageId,
        patch: &PagePatch,
        modifier: UserId,
    ) -> AppResult<Option<Page>> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("begin", e))?;

        let sql = format!("SELECT {PAGE_COLUMNS} FROM pages WHERE id = $1 FOR UPDATE");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_page", e))?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut page = page_from_row(&row).map_err(|e| map_sqlx_error("update_page", e))?;
        patch.apply(&mut page, modifier);

        sqlx::query(
            r#"UPDATE pages SET title = $2, content = $3, "modifiersIds" = CAST($4 AS json) WHERE id = $1"#,
        )
        .bind(id.get())
        .bind(&page.title)
        .bind(&page.content)
        .bind(Json(&page.modifiers_ids))
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_page", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(Some(page))
    }

    async fn delete_page(&self, id: PageId) -> AppResult<Option<Page>> {
        let sql = format!("DELETE FROM pages WHERE id = $1 RETURNING {PAGE_COLUMNS}");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_page", e))?;

        row.as_ref()
            .map(page_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("delete_page", e))
    }
}

#[async_trait::async_trait]
impl NavigationMenuRepository for PostgresStore {
    async fn list_menus(&self, sort: MenuSort, pagination: Pagination) -> AppResult<Vec<NavigationMenu>> {
        let sql = format!(
            r#"SELECT {MENU_COLUMNS} FROM "navigationMenus" ORDER BY {} LIMIT $1 OFFSET $2"#,
            menu_order(sort)
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(pagination.limit))
            .bind(i64::from(pagination.offset))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_menus", e))?;

        rows.iter()
            .map(menu_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_menus", e))
    }

    async fn get_menu(&self, id: NavigationMenuId) -> AppResult<Option<NavigationMenu>> {
        let sql = format!(r#"SELECT {MENU_COLUMNS} FROM "navigationMenus" WHERE id = $1"#);
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_menu", e))?;

        row.as_ref()
            .map(menu_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("get_menu", e))
    }

    async fn create_menu(&self, menu: NewNavigationMenu) -> AppResult<NavigationMenu> {
        let sql = format!(
            r#"INSERT INTO "navigationMenus" (name, "pagesId") VALUES ($1, CAST($2 AS json)) RETURNING {MENU_COLUMNS}"#
        );
        let row = sqlx::query(&sql)
            .bind(&menu.name)
            .bind(Json(BTreeMap::<String, PageId>::new()))
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_menu", e))?;

        menu_from_row(&row).map_err(|e| map_sqlx_error("create_menu", e))
    }

    async fn update_menu(
        &self,
        id: NavigationMenuId,
        patch: &NavigationMenuPatch,
    ) -> AppResult<Option<NavigationMenu>> {
        let mut tx = self.pool.begin().await.map_err(|e| map_sqlx_error("begin", e))?;

        let sql = format!(r#"SELECT {MENU_COLUMNS} FROM "navigationMenus" WHERE id = $1 FOR UPDATE"#);
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_menu", e))?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut menu = menu_from_row(&row).map_err(|e| map_sqlx_error("update_menu", e))?;
        patch.apply(&mut menu);

        sqlx::query(r#"UPDATE "navigationMenus" SET name = $2, "pagesId" = CAST($3 AS json) WHERE id = $1"#)
            .bind(id.get())
            .bind(&menu.name)
            .bind(Json(&menu.pages_id))
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_menu", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(Some(menu))
    }

    async fn delete_menu(&self, id: NavigationMenuId) -> AppResult<Option<NavigationMenu>> {
        let sql = format!(r#"DELETE FROM "navigationMenus" WHERE id = $1 RETURNING {MENU_COLUMNS}"#);
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_menu", e))?;

        row.as_ref()
            .map(menu_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("delete_menu", e))
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    use folio_core::ErrorKind;
    use sqlx::error::{DatabaseError, ErrorKind as SqlxErrorKind};

    use super::*;

    #[derive(Debug)]
    struct PgError {
        code: &'static str,
    }

    impl fmt::Display for PgError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "postgres error {}", self.code)
        }
    }

    impl StdError for PgError {}

    impl DatabaseError for PgError {
        fn message(&self) -> &str {
            "constraint violated"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.code))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> SqlxErrorKind {
            SqlxErrorKind::Other
        }
    }

    fn db_error(code: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(PgError { code }))
    }

    #[test]
    fn unique_violation_is_an_invalid_argument() {
        let err = map_sqlx_error("create_page", db_error("23505"));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.messages(), ["Title is already used by another page"]);
    }

    #[test]
    fn foreign_key_violation_is_an_invalid_argument() {
        let err = map_sqlx_error("delete_user", db_error("23503"));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.messages(), ["Record is still referenced"]);
    }

    #[test]
    fn other_database_codes_are_internal() {
        let err = map_sqlx_error("list_pages", db_error("42P01"));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn non_database_failures_are_internal() {
        let err = map_sqlx_error("find_user", sqlx::Error::RowNotFound);
        assert_eq!(err.kind(), ErrorKind::Internal);

        let err = map_sqlx_error("list_menus", sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn listings_order_by_sort_key_then_id() {
        assert_eq!(page_order(PageSort::Id), "id");
        assert_eq!(page_order(PageSort::Title), "title, id");
        assert_eq!(menu_order(MenuSort::Id), "id");
        assert_eq!(menu_order(MenuSort::Name), "name, id");
    }
}
