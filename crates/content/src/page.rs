//! Pages: drafts, publication and modification history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::{AppError, PageId, UserId};

const SLUG_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: PageId,
    pub title: String,
    pub content: String,
    pub slug: String,
    pub creator_id: UserId,
    /// Every user who updated the page, in update order (repeats allowed).
    pub modifiers_ids: Vec<UserId>,
    pub published_at: Option<DateTime<Utc>>,
    pub published: bool,
}

/// Creation request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPage {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub published: bool,
}

/// A page ready to be stored (the store assigns the id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDraft {
    pub title: String,
    pub content: String,
    pub slug: String,
    pub creator_id: UserId,
    pub published_at: Option<DateTime<Utc>>,
    pub published: bool,
}

impl NewPage {
    pub fn into_draft(self, creator_id: UserId, now: DateTime<Utc>) -> PageDraft {
        PageDraft {
            slug: slugify(&self.title),
            published_at: self.published.then_some(now),
            title: self.title,
            content: self.content,
            creator_id,
            published: self.published,
        }
    }
}

impl PageDraft {
    pub fn into_page(self, id: PageId) -> Page {
        Page {
            id,
            title: self.title,
            content: self.content,
            slug: self.slug,
            creator_id: self.creator_id,
            modifiers_ids: Vec::new(),
            published_at: self.published_at,
            published: self.published,
        }
    }
}

/// Update request body. Absent or empty fields are left as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PagePatch {
    /// Apply the update on behalf of `modifier`, who is always recorded.
    pub fn apply(&self, page: &mut Page, modifier: UserId) {
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            page.title = title.to_string();
        }
        if let Some(content) = self.content.as_deref().filter(|c| !c.is_empty()) {
            page.content = content.to_string();
        }
        page.modifiers_ids.push(modifier);
    }
}

/// URL slug for a title: lowercase, only word characters, whitespace and
/// dashes kept, whitespace runs turned into a single dash, at most 50 chars.
pub fn slugify(title: &str) -> String {
    let kept: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    let mut slug = String::with_capacity(kept.len());
    let mut in_space = false;
    for c in kept.chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.push(c);
            in_space = false;
        }
    }

    slug.chars().take(SLUG_MAX_CHARS).collect()
}

/// Sort keys accepted by page listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageSort {
    #[default]
    Id,
    Title,
}

impl core::str::FromStr for PageSort {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(PageSort::Id),
            "title" => Ok(PageSort::Title),
            _ => Err(AppError::invalid_argument(["Sort must be one of: id, title"])),
        }
    }
}

impl PageSort {
    pub fn sort(&self, pages: &mut [Page]) {
        match self {
            PageSort::Id => pages.sort_by_key(|p| p.id),
            PageSort::Title => pages.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id))),
        }
    }
}
