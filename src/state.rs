//! Pure state transitions for the notebook.
//!
//! Nothing in here persists or renders; the controller in `notebook.rs` calls these
//! transitions and then decides what to write and what to redraw.
use std::cmp::Reverse;

use log::trace;
use uuid::Uuid;

use crate::{NotebookError, Page, Result};

/// Pages in insertion order plus the page open in the editor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotebookState {
    pages: Vec<Page>,
    current_page_id: Option<Uuid>,
}

/// Sorts pinned pages first, then by most recent update. Ties keep their order.
pub fn sort_for_display(pages: &mut [&Page]) {
    pages.sort_by_key(|page| (Reverse(page.pinned), Reverse(page.updated_at)));
}

impl NotebookState {
    pub fn new(pages: Vec<Page>) -> Self {
        Self {
            pages,
            current_page_id: None,
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn page(&self, id: Uuid) -> Option<&Page> {
        self.pages.iter().find(|page| page.id == id)
    }

    fn page_mut(&mut self, id: Uuid) -> Option<&mut Page> {
        self.pages.iter_mut().find(|page| page.id == id)
    }

    pub fn current_page_id(&self) -> Option<Uuid> {
        self.current_page_id
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.current_page_id.and_then(|id| self.page(id))
    }

    /// Pages in sidebar order
    pub fn display_order(&self) -> Vec<&Page> {
        let mut ordered: Vec<&Page> = self.pages.iter().collect();
        sort_for_display(&mut ordered);
        ordered
    }

    pub fn first_in_display_order(&self) -> Option<Uuid> {
        self.display_order().first().map(|page| page.id)
    }

    /// Appends a page and returns its id
    pub fn add_page(&mut self, page: Page) -> Uuid {
        let id = page.id;
        self.pages.push(page);
        trace!("Added page {}", id);
        id
    }

    /// Removes a page, refusing to remove the last one.
    ///
    /// If the removed page was open, the first remaining page by display order is opened.
    pub fn remove_page(&mut self, id: Uuid) -> Result<Page> {
        let index = self
            .pages
            .iter()
            .position(|page| page.id == id)
            .ok_or(NotebookError::PageNotFound { id })?;

        if self.pages.len() == 1 {
            return Err(NotebookError::LastPage);
        }

        let removed = self.pages.remove(index);
        if self.current_page_id == Some(id) {
            self.current_page_id = self.first_in_display_order();
        }
        Ok(removed)
    }

    /// Sets a trimmed, non-blank title. Returns false when nothing changed.
    pub fn rename_page(&mut self, id: Uuid, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        match self.page_mut(id) {
            Some(page) => {
                page.title = title.to_string();
                page.touch();
                true
            }
            None => false,
        }
    }

    /// Flips the pinned flag, returning the new value
    pub fn toggle_pin(&mut self, id: Uuid) -> Option<bool> {
        let page = self.page_mut(id)?;
        page.pinned = !page.pinned;
        page.touch();
        Some(page.pinned)
    }

    pub fn open_page(&mut self, id: Uuid) -> bool {
        if self.page(id).is_none() {
            return false;
        }
        self.current_page_id = Some(id);
        true
    }

    /// Replaces the content of the open page, returning its id
    pub fn set_current_content(&mut self, text: &str) -> Option<Uuid> {
        let id = self.current_page_id?;
        let page = self.page_mut(id)?;
        page.content = text.to_string();
        page.touch();
        Some(id)
    }

    /// Renames the open page
    pub fn set_current_title(&mut self, text: &str) -> bool {
        match self.current_page_id {
            Some(id) => self.rename_page(id, text),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn page_at(title: &str, pinned: bool, updated_secs: i64) -> Page {
        let mut page = Page::new(title);
        page.pinned = pinned;
        page.updated_at = Utc.timestamp_opt(updated_secs, 0).unwrap();
        page
    }

    fn titles(state: &NotebookState) -> Vec<&str> {
        state.display_order().iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn pinned_first_then_most_recent() {
        let state = NotebookState::new(vec![
            page_at("A", true, 1),
            page_at("B", false, 3),
            page_at("C", true, 2),
        ]);
        assert_eq!(titles(&state), vec!["C", "A", "B"]);
    }

    #[test]
    fn equal_timestamps_keep_insertion_order() {
        let state = NotebookState::new(vec![
            page_at("one", false, 5),
            page_at("two", false, 5),
            page_at("three", false, 5),
        ]);
        assert_eq!(titles(&state), vec!["one", "two", "three"]);
    }

    #[test]
    fn last_page_cannot_be_removed() {
        let only = Page::new("Only");
        let id = only.id;
        let mut state = NotebookState::new(vec![only]);

        assert!(matches!(state.remove_page(id), Err(NotebookError::LastPage)));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn removing_unknown_page_is_not_found() {
        let mut state = NotebookState::new(vec![Page::new("a"), Page::new("b")]);
        let stray = Uuid::new_v4();
        assert!(matches!(
            state.remove_page(stray),
            Err(NotebookError::PageNotFound { id }) if id == stray
        ));
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn removing_open_page_reopens_first_by_display_order() {
        let p1 = page_at("P1", false, 1);
        let p2 = page_at("P2", false, 2);
        let (id1, id2) = (p1.id, p2.id);
        let mut state = NotebookState::new(vec![p1, p2]);
        assert!(state.open_page(id2));

        state.remove_page(id2).unwrap();
        assert_eq!(state.current_page_id(), Some(id1));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn removing_other_page_keeps_current() {
        let p1 = Page::new("P1");
        let p2 = Page::new("P2");
        let (id1, id2) = (p1.id, p2.id);
        let mut state = NotebookState::new(vec![p1, p2]);
        state.open_page(id1);

        state.remove_page(id2).unwrap();
        assert_eq!(state.current_page_id(), Some(id1));
    }

    #[test]
    fn rename_trims_and_ignores_blank() {
        let page = page_at("Draft", false, 1);
        let id = page.id;
        let before = page.updated_at;
        let mut state = NotebookState::new(vec![page]);

        assert!(!state.rename_page(id, "   "));
        assert_eq!(state.page(id).unwrap().title, "Draft");

        assert!(state.rename_page(id, "  Final  "));
        let renamed = state.page(id).unwrap();
        assert_eq!(renamed.title, "Final");
        assert!(renamed.updated_at > before);

        assert!(!state.rename_page(Uuid::new_v4(), "Elsewhere"));
    }

    #[test]
    fn pin_twice_restores_original() {
        let page = Page::new("Pin me");
        let id = page.id;
        let mut state = NotebookState::new(vec![page]);

        assert_eq!(state.toggle_pin(id), Some(true));
        assert_eq!(state.toggle_pin(id), Some(false));
        assert_eq!(state.toggle_pin(Uuid::new_v4()), None);
    }

    #[test]
    fn content_edits_need_an_open_page() {
        let page = Page::new("Body");
        let id = page.id;
        let mut state = NotebookState::new(vec![page]);

        assert_eq!(state.set_current_content("ignored"), None);
        assert!(state.page(id).unwrap().content.is_empty());

        state.open_page(id);
        assert_eq!(state.set_current_content("kept"), Some(id));
        assert_eq!(state.page(id).unwrap().content, "kept");
    }

    #[test]
    fn open_unknown_page_keeps_current() {
        let page = Page::new("Open");
        let id = page.id;
        let mut state = NotebookState::new(vec![page]);
        state.open_page(id);

        assert!(!state.open_page(Uuid::new_v4()));
        assert_eq!(state.current_page_id(), Some(id));
    }

    #[test]
    fn mixed_operations_never_empty_the_notebook() {
        let mut state = NotebookState::new(vec![Page::new("seed")]);

        for step in 0..200usize {
            let ids: Vec<Uuid> = state.pages().iter().map(|p| p.id).collect();
            let target = ids[step % ids.len()];
            match step % 5 {
                0 => {
                    state.add_page(Page::new(format!("page {}", step)));
                }
                1 | 2 | 3 => {
                    let _ = state.remove_page(target);
                }
                _ => {
                    state.toggle_pin(target);
                }
            }
            assert!(!state.is_empty());
            if let Some(current) = state.current_page_id() {
                assert!(state.page(current).is_some());
            }
            state.open_page(target);
        }
    }
}
