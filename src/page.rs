//! The page record stored in the notebook.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title shown for pages whose title is empty.
pub const UNTITLED_PLACEHOLDER: &str = "Untitled";

/// Title given to pages created without an explicit one.
pub const DEFAULT_PAGE_TITLE: &str = "New Page";

/// Represents a single note page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Unique identifier, never reused
    pub id: Uuid,
    /// Page title
    pub title: String,
    /// Plain text or Markdown body
    pub content: String,
    /// When the page was created
    pub created_at: DateTime<Utc>,
    /// Last modification of title, content or pin state
    pub updated_at: DateTime<Utc>,
    /// Pinned pages sort before unpinned ones
    #[serde(default)]
    pub pinned: bool,
}

impl Page {
    /// Creates a new, unpinned page with empty content
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();

        Page {
            id: Uuid::new_v4(),
            title: title.into(),
            content: String::new(),
            created_at: now,
            updated_at: now,
            pinned: false,
        }
    }

    /// Copies content and pin state into a fresh page titled "<title> (Copy)"
    pub fn duplicate(&self) -> Self {
        let mut copy = Page::new(format!("{} (Copy)", self.title));
        copy.content = self.content.clone();
        copy.pinned = self.pinned;
        copy
    }

    /// Title to display, falling back to a placeholder when empty
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            UNTITLED_PLACEHOLDER
        } else {
            &self.title
        }
    }

    /// Refresh `updated_at`
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
