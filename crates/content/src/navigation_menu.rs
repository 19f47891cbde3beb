//! Navigation menus: named, ordered lists of page references.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use folio_core::{AppError, NavigationMenuId, PageId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationMenu {
    pub id: NavigationMenuId,
    pub name: String,
    /// Position (as a string key) → page.
    pub pages_id: BTreeMap<String, PageId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNavigationMenu {
    pub name: String,
}

/// Update request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationMenuPatch {
    pub name: Option<String>,
    /// Pages by position; merged over the existing entries.
    pub pages: Option<Vec<PageId>>,
}

impl NavigationMenuPatch {
    pub fn apply(&self, menu: &mut NavigationMenu) {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            menu.name = name.to_string();
        }
        if let Some(pages) = &self.pages {
            for (position, page_id) in pages.iter().enumerate() {
                menu.pages_id.insert(position.to_string(), *page_id);
            }
        }
    }
}

/// Sort keys accepted by menu listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuSort {
    #[default]
    Id,
    Name,
}

impl core::str::FromStr for MenuSort {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(MenuSort::Id),
            "name" => Ok(MenuSort::Name),
            _ => Err(AppError::invalid_argument(["Sort must be one of: id, name"])),
        }
    }
}

impl MenuSort {
    pub fn sort(&self, menus: &mut [NavigationMenu]) {
        match self {
            MenuSort::Id => menus.sort_by_key(|m| m.id),
            MenuSort::Name => menus.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> NavigationMenu {
        NavigationMenu {
            id: NavigationMenuId::new(1),
            name: "Main".to_string(),
            pages_id: BTreeMap::from([
                ("0".to_string(), PageId::new(10)),
                ("1".to_string(), PageId::new(11)),
                ("2".to_string(), PageId::new(12)),
            ]),
        }
    }

    #[test]
    fn pages_are_merged_by_position() {
        let mut m = menu();
        NavigationMenuPatch {
            name: None,
            pages: Some(vec![PageId::new(20)]),
        }
        .apply(&mut m);

        assert_eq!(m.pages_id["0"], PageId::new(20));
        assert_eq!(m.pages_id["1"], PageId::new(11));
        assert_eq!(m.pages_id.len(), 3);
        assert_eq!(m.name, "Main");
    }

    #[test]
    fn rename_keeps_pages() {
        let mut m = menu();
        NavigationMenuPatch {
            name: Some("Footer".to_string()),
            pages: None,
        }
        .apply(&mut m);

        assert_eq!(m.name, "Footer");
        assert_eq!(m.pages_id, menu().pages_id);
    }

    #[test]
    fn serializes_pages_under_pages_id() {
        let json = serde_json::to_value(menu()).unwrap();
        assert_eq!(json["pagesId"]["2"], 12);
    }
}
