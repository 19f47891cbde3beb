//! `folio-content` — pages and navigation menus.
//!
//! Pure models and their update rules; storage lives in `folio-infra`.

pub mod navigation_menu;
pub mod page;

pub use navigation_menu::{MenuSort, NavigationMenu, NavigationMenuPatch, NewNavigationMenu};
pub use page::{slugify, NewPage, Page, PageDraft, PagePatch, PageSort};
