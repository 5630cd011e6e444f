//! The notebook controller.
//!
//! `Notebook` owns the page state, mirrors it to a [`PageRepository`] and drives an
//! injected [`Surface`]. Content edits are persisted through a [`DebounceScheduler`];
//! every other mutation is written synchronously before the next render.
use std::path::Path;

use log::{debug, error, info, trace, warn};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use crate::{
    archive_pages, export_page, read_import_source, render_notebook, search_pages, Config,
    DebounceScheduler, DeleteOutcome, ExportFormat, ExportedFile, Field, NotebookError,
    NotebookState, NotebookView, Page, PageRepository, Result, SaveStatus, SearchHit,
};

/// Shown when a write fails and edits may be lost on reload.
pub const SAVE_FAILED_WARNING: &str =
    "Your notes could not be saved. Changes may be lost when the notebook is reopened.";

/// The UI the notebook draws to and asks questions of.
pub trait Surface {
    /// Redraw from a fresh view
    fn render(&mut self, view: &NotebookView);

    /// Move input focus to an editor field
    fn focus(&mut self, _field: Field) {}

    /// Update only the save-status indicator
    fn show_save_status(&mut self, _status: SaveStatus) {}

    /// Show a user-facing warning
    fn warn(&mut self, message: &str);

    /// Ask the user to confirm an irreversible action
    fn confirm(&mut self, prompt: &str) -> bool;

    /// Hand an exported file to the user
    fn download(&mut self, file: &ExportedFile);
}

/// Result of one autosave, tagged with the edit that scheduled it
type AutosaveReport = (u64, Result<()>);

pub struct Notebook {
    state: NotebookState,
    repository: PageRepository,
    autosave: DebounceScheduler,
    autosave_tx: UnboundedSender<AutosaveReport>,
    autosave_rx: UnboundedReceiver<AutosaveReport>,
    /// Edit whose autosave has not been reported yet
    outstanding_edit: Option<u64>,
    edit_seq: u64,
    save_status: SaveStatus,
    panel_open: bool,
    default_title: String,
    surface: Box<dyn Surface>,
}

impl Notebook {
    /// Loads the notebook and shows its first page.
    ///
    /// Unreadable stored data starts an empty notebook, which then gets a default page.
    /// Fails only when no tokio runtime is available for autosave.
    pub fn open(repository: PageRepository, surface: Box<dyn Surface>, config: &Config) -> Result<Self> {
        let autosave = DebounceScheduler::new(config.autosave_delay())?;
        let pages = repository.load_pages();
        let panel_open = repository.load_panel_open();
        let (autosave_tx, autosave_rx) = unbounded_channel();

        let mut notebook = Self {
            state: NotebookState::new(pages),
            repository,
            autosave,
            autosave_tx,
            autosave_rx,
            outstanding_edit: None,
            edit_seq: 0,
            save_status: SaveStatus::Saved,
            panel_open,
            default_title: config.default_page_title.clone(),
            surface,
        };

        if notebook.state.is_empty() {
            info!("Notebook is empty, creating a default page");
            notebook.create_page(None);
        } else {
            notebook.render();
            if let Some(first) = notebook.state.first_in_display_order() {
                notebook.open_page(first);
            }
        }

        info!("Notebook opened with {} pages", notebook.state.len());
        Ok(notebook)
    }

    pub fn pages(&self) -> &[Page] {
        self.state.pages()
    }

    pub fn page(&self, id: Uuid) -> Option<&Page> {
        self.state.page(id)
    }

    pub fn current_page_id(&self) -> Option<Uuid> {
        self.state.current_page_id()
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.state.current_page()
    }

    pub fn state(&self) -> &NotebookState {
        &self.state
    }

    /// Status as of the last reported write. Call [`poll_autosave`](Self::poll_autosave)
    /// to pick up finished autosaves.
    pub fn save_status(&self) -> SaveStatus {
        self.save_status
    }

    pub fn panel_open(&self) -> bool {
        self.panel_open
    }

    /// Creates a page, opens it and returns its id
    pub fn create_page(&mut self, title: Option<&str>) -> Uuid {
        let title = title.unwrap_or(self.default_title.as_str()).to_string();
        let id = self.state.add_page(Page::new(title));
        info!("Created page {}", id);
        self.persist_and_open(id);
        id
    }

    /// Deletes a page after confirmation. The last remaining page is never deleted.
    pub fn delete_page(&mut self, id: Uuid) -> DeleteOutcome {
        let Some(page) = self.state.page(id) else {
            debug!("Ignoring delete of unknown page {}", id);
            return DeleteOutcome::NotFound;
        };

        if self.state.len() == 1 {
            warn!("Refusing to delete the only page {}", id);
            self.surface.warn(&NotebookError::LastPage.to_string());
            return DeleteOutcome::Refused;
        }

        let prompt = format!(
            "Delete \"{}\"? This cannot be undone.",
            page.display_title()
        );
        if !self.surface.confirm(&prompt) {
            debug!("Delete of page {} cancelled", id);
            return DeleteOutcome::Cancelled;
        }

        let was_open = self.state.current_page_id() == Some(id);
        match self.state.remove_page(id) {
            Ok(removed) => info!("Deleted page {} ({})", removed.id, removed.title),
            Err(NotebookError::LastPage) => return DeleteOutcome::Refused,
            Err(_) => return DeleteOutcome::NotFound,
        }

        self.persist();
        match self.state.current_page_id() {
            Some(next) if was_open => {
                self.open_page(next);
            }
            _ => self.render(),
        }
        DeleteOutcome::Deleted
    }

    /// Copies a page as "<title> (Copy)" and opens the copy
    pub fn duplicate_page(&mut self, id: Uuid) -> Option<Uuid> {
        let copy = match self.state.page(id) {
            Some(source) => source.duplicate(),
            None => {
                debug!("Ignoring duplicate of unknown page {}", id);
                return None;
            }
        };

        let copy_id = self.state.add_page(copy);
        info!("Duplicated page {} as {}", id, copy_id);
        self.persist_and_open(copy_id);
        Some(copy_id)
    }

    /// Renames a page. Blank titles and unknown ids are ignored.
    pub fn rename_page(&mut self, id: Uuid, title: &str) -> bool {
        if !self.state.rename_page(id, title) {
            debug!("Rename of page {} ignored", id);
            return false;
        }
        self.persist();
        self.render();
        true
    }

    /// Toggles the pinned flag, returning the new value
    pub fn pin_page(&mut self, id: Uuid) -> Option<bool> {
        let pinned = self.state.toggle_pin(id)?;
        debug!("Page {} pinned={}", id, pinned);
        self.persist();
        self.render();
        Some(pinned)
    }

    /// Shows a page in the editor. Viewing does not count as an edit.
    pub fn open_page(&mut self, id: Uuid) -> bool {
        if !self.state.open_page(id) {
            debug!("Ignoring open of unknown page {}", id);
            return false;
        }
        self.render();
        self.surface.focus(Field::Content);
        true
    }

    /// Replaces the open page's content and schedules a debounced save
    pub fn update_page_content(&mut self, text: &str) {
        if self.state.set_current_content(text).is_none() {
            debug!("No open page for content update");
            return;
        }

        self.edit_seq += 1;
        let edit = self.edit_seq;
        self.outstanding_edit = Some(edit);
        self.set_save_status(SaveStatus::Pending);

        let repository = self.repository.clone();
        let reports = self.autosave_tx.clone();
        let snapshot = self.state.pages().to_vec();
        self.autosave.schedule(move || {
            let result = repository.save_pages(&snapshot);
            // The receiver lives as long as the notebook
            let _ = reports.send((edit, result));
        });
    }

    /// Reports finished autosaves to the surface and returns the resulting status.
    ///
    /// Only the autosave of the latest edit counts; reports from replaced or
    /// superseded edits are dropped.
    pub fn poll_autosave(&mut self) -> SaveStatus {
        while let Ok(report) = self.autosave_rx.try_recv() {
            self.apply_autosave_report(report);
        }
        self.save_status
    }

    /// Waits for the autosave of the latest edit, if one is outstanding, and reports it
    pub async fn autosaved(&mut self) -> SaveStatus {
        self.poll_autosave();
        while self.outstanding_edit.is_some() {
            match self.autosave_rx.recv().await {
                Some(report) => self.apply_autosave_report(report),
                None => break,
            }
        }
        self.save_status
    }

    /// Renames the open page from the editor title field
    pub fn update_page_title(&mut self, text: &str) -> bool {
        if !self.state.set_current_title(text) {
            return false;
        }
        self.persist();
        self.render();
        true
    }

    /// Exports a page and hands the file to the surface
    pub fn export_page(&mut self, id: Uuid, format: ExportFormat) -> Option<ExportedFile> {
        let file = export_page(self.state.page(id)?, format);
        debug!("Exporting page {} as {}", id, file.filename);
        self.surface.download(&file);
        Some(file)
    }

    /// Creates a page from a `.md` or `.txt` file and opens it
    pub fn import_page(&mut self, path: &Path) -> Result<Uuid> {
        let (title, content) = read_import_source(path)?;

        let mut page = Page::new(title);
        page.content = content;
        let id = self.state.add_page(page);
        info!("Imported {} as page {}", path.display(), id);

        self.persist_and_open(id);
        Ok(id)
    }

    /// Writes every page into a zip archive
    pub fn archive(&self, path: &Path) -> Result<usize> {
        archive_pages(self.state.pages(), path)
    }

    pub fn search(&self, query: &str) -> Vec<SearchHit<'_>> {
        search_pages(self.state.pages(), query)
    }

    /// Shows or hides the notebook panel, remembering the choice
    pub fn toggle_panel(&mut self) -> bool {
        self.panel_open = !self.panel_open;
        if let Err(e) = self.repository.save_panel_open(self.panel_open) {
            error!("Failed to persist panel state: {}", e);
            self.report_save_failure();
        }
        self.render();
        self.panel_open
    }

    /// The current view, without drawing it
    pub fn view(&self) -> NotebookView {
        render_notebook(&self.state, self.save_status, self.panel_open)
    }

    pub fn render(&mut self) {
        self.poll_autosave();
        let view = self.view();
        self.surface.render(&view);
    }

    /// Writes a pending autosave now
    pub fn flush(&mut self) {
        self.poll_autosave();
        if self.autosave.is_pending() {
            debug!("Flushing pending autosave");
            self.persist();
        }
    }

    /// Final persistence at the end of a session
    pub fn close(mut self) -> SaveStatus {
        self.flush();
        self.poll_autosave();
        info!("Notebook closed");
        self.save_status
    }

    fn persist_and_open(&mut self, id: Uuid) {
        self.persist();
        self.render();
        self.open_page(id);
    }

    // Replaces any pending autosave with a write of the current state
    fn persist(&mut self) {
        let repository = &self.repository;
        let pages = self.state.pages();
        let result = self.autosave.supersede(|| repository.save_pages(pages));
        // This write covers every earlier edit
        self.outstanding_edit = None;

        match result {
            Ok(()) => self.set_save_status(SaveStatus::Saved),
            Err(e) => {
                error!("Failed to persist notebook: {}", e);
                self.report_save_failure();
            }
        }
    }

    fn apply_autosave_report(&mut self, (edit, result): AutosaveReport) {
        if self.outstanding_edit != Some(edit) {
            trace!("Dropping stale autosave report for edit {}", edit);
            return;
        }
        self.outstanding_edit = None;

        match result {
            Ok(()) => {
                debug!("Autosaved edit {}", edit);
                self.set_save_status(SaveStatus::Saved);
            }
            Err(e) => {
                error!("Autosave failed: {}", e);
                self.report_save_failure();
            }
        }
    }

    fn report_save_failure(&mut self) {
        self.set_save_status(SaveStatus::Error);
        self.surface.warn(SAVE_FAILED_WARNING);
    }

    fn set_save_status(&mut self, status: SaveStatus) {
        self.save_status = status;
        self.surface.show_save_status(status);
    }
}
