//! Rendering layer: notebook state in, view description out.
//!
//! The view keeps user text raw; escaping happens when the view is turned into markup.
use std::fmt::Write;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{escape_html, NotebookState, SaveStatus};

/// One row of the sidebar
#[derive(Debug, Clone, PartialEq)]
pub struct SidebarEntry {
    pub id: Uuid,
    /// Display title, placeholder applied
    pub title: String,
    pub pinned: bool,
    pub active: bool,
    pub updated_at: DateTime<Utc>,
}

/// Values shown in the editor pane
#[derive(Debug, Clone, PartialEq)]
pub struct EditorView {
    pub page_id: Uuid,
    pub title: String,
    pub content: String,
}

/// Everything the front end needs to draw the notebook
#[derive(Debug, Clone, PartialEq)]
pub struct NotebookView {
    pub sidebar: Vec<SidebarEntry>,
    pub editor: Option<EditorView>,
    pub save_status: SaveStatus,
    pub panel_open: bool,
}

/// Builds the view for the current state
pub fn render_notebook(state: &NotebookState, save_status: SaveStatus, panel_open: bool) -> NotebookView {
    let current = state.current_page_id();

    let sidebar = state
        .display_order()
        .into_iter()
        .map(|page| SidebarEntry {
            id: page.id,
            title: page.display_title().to_string(),
            pinned: page.pinned,
            active: Some(page.id) == current,
            updated_at: page.updated_at,
        })
        .collect();

    let editor = state.current_page().map(|page| EditorView {
        page_id: page.id,
        title: page.title.clone(),
        content: page.content.clone(),
    });

    NotebookView {
        sidebar,
        editor,
        save_status,
        panel_open,
    }
}

impl NotebookView {
    pub fn active_entry(&self) -> Option<&SidebarEntry> {
        self.sidebar.iter().find(|entry| entry.active)
    }

    /// Sidebar markup. Titles are escaped; ids are UUIDs and need no escaping.
    pub fn sidebar_html(&self) -> String {
        let mut html = String::from("<ul class=\"notebook-pages\">\n");

        for entry in &self.sidebar {
            let mut classes = String::from("notebook-page");
            if entry.active {
                classes.push_str(" active");
            }
            if entry.pinned {
                classes.push_str(" pinned");
            }

            // Writing into a String cannot fail
            let _ = writeln!(
                html,
                "  <li class=\"{}\" data-page-id=\"{}\">\
                 <span class=\"page-title\">{}</span>\
                 <time datetime=\"{}\">{}</time>\
                 <button data-action=\"pin\">{}</button>\
                 <button data-action=\"duplicate\">Duplicate</button>\
                 <button data-action=\"export\">Export</button>\
                 <button data-action=\"delete\">Delete</button></li>",
                classes,
                entry.id,
                escape_html(&entry.title),
                entry.updated_at.to_rfc3339(),
                entry.updated_at.format("%b %-d, %H:%M"),
                if entry.pinned { "Unpin" } else { "Pin" },
            );
        }

        html.push_str("</ul>");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Page;

    #[test]
    fn marks_only_the_open_page_active() {
        let first = Page::new("First");
        let second = Page::new("Second");
        let open = second.id;
        let mut state = NotebookState::new(vec![first, second]);
        state.open_page(open);

        let view = render_notebook(&state, SaveStatus::Saved, true);
        assert_eq!(view.sidebar.iter().filter(|e| e.active).count(), 1);
        assert_eq!(view.active_entry().unwrap().id, open);
        assert_eq!(view.editor.as_ref().unwrap().title, "Second");
        assert!(view.panel_open);
    }

    #[test]
    fn no_editor_without_an_open_page() {
        let state = NotebookState::new(vec![Page::new("Closed")]);
        let view = render_notebook(&state, SaveStatus::Pending, false);
        assert!(view.editor.is_none());
        assert!(view.active_entry().is_none());
    }

    #[test]
    fn sidebar_html_escapes_titles() {
        let page = Page::new("<script>alert('x')</script> & co");
        let state = NotebookState::new(vec![page]);

        let html = render_notebook(&state, SaveStatus::Saved, true).sidebar_html();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; co"));
    }

    #[test]
    fn blank_titles_render_placeholder() {
        let state = NotebookState::new(vec![Page::new("")]);
        let view = render_notebook(&state, SaveStatus::Saved, true);
        assert_eq!(view.sidebar[0].title, "Untitled");
    }
}
