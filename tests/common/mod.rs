use std::{cell::RefCell, rc::Rc, sync::Arc, time::Duration};

use notebook::{
    Config, ExportedFile, Field, MemoryStore, Notebook, NotebookView, PageRepository, SaveStatus,
    Surface,
};

/// Everything the notebook told its surface
#[derive(Debug, Default)]
pub struct SurfaceLog {
    pub views: Vec<NotebookView>,
    pub focused: Vec<Field>,
    pub statuses: Vec<SaveStatus>,
    pub warnings: Vec<String>,
    pub prompts: Vec<String>,
    pub downloads: Vec<ExportedFile>,
}

impl SurfaceLog {
    pub fn last_view(&self) -> &NotebookView {
        self.views.last().expect("nothing rendered")
    }
}

/// Surface that records calls and answers confirmations with a fixed reply
pub struct RecordingSurface {
    log: Rc<RefCell<SurfaceLog>>,
    confirm_reply: Rc<RefCell<bool>>,
}

impl Surface for RecordingSurface {
    fn render(&mut self, view: &NotebookView) {
        self.log.borrow_mut().views.push(view.clone());
    }

    fn focus(&mut self, field: Field) {
        self.log.borrow_mut().focused.push(field);
    }

    fn show_save_status(&mut self, status: SaveStatus) {
        self.log.borrow_mut().statuses.push(status);
    }

    fn warn(&mut self, message: &str) {
        self.log.borrow_mut().warnings.push(message.to_string());
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        self.log.borrow_mut().prompts.push(prompt.to_string());
        *self.confirm_reply.borrow()
    }

    fn download(&mut self, file: &ExportedFile) {
        self.log.borrow_mut().downloads.push(file.clone());
    }
}

/// A notebook over an in-memory store, with handles to inspect it
pub struct Harness {
    pub notebook: Notebook,
    pub store: Arc<MemoryStore>,
    pub log: Rc<RefCell<SurfaceLog>>,
    pub confirm_reply: Rc<RefCell<bool>>,
}

pub const AUTOSAVE_DELAY: Duration = Duration::from_millis(1000);

pub fn config() -> Config {
    Config {
        autosave_delay_ms: AUTOSAVE_DELAY.as_millis() as u64,
        ..Config::default()
    }
}

pub fn open_with_store(store: Arc<MemoryStore>) -> Harness {
    let log = Rc::new(RefCell::new(SurfaceLog::default()));
    let confirm_reply = Rc::new(RefCell::new(true));
    let surface = RecordingSurface {
        log: Rc::clone(&log),
        confirm_reply: Rc::clone(&confirm_reply),
    };

    let repository = PageRepository::new(store.clone());
    let notebook = Notebook::open(repository, Box::new(surface), &config()).unwrap();

    Harness {
        notebook,
        store,
        log,
        confirm_reply,
    }
}

pub fn open_empty() -> Harness {
    open_with_store(Arc::new(MemoryStore::new()))
}
