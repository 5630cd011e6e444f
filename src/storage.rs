use std::{
    collections::{HashMap, HashSet},
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use log::{debug, error, info, trace, warn};
use tempfile::NamedTempFile;

use crate::{NotebookError, Page, Result};

/// Key holding the JSON array of pages.
pub const PAGES_KEY: &str = "notebook_pages";

/// Key holding the JSON boolean for panel visibility.
pub const PANEL_OPEN_KEY: &str = "notebook_panel_open";

/// A string key-value store that survives restarts.
///
/// Writes replace the whole value; there is no partial update or merge.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Stores each key as `<dir>/<key>.json`, replacing files atomically.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    max_bytes: Option<u64>,
}

impl FileStore {
    /// Opens (and creates if needed) a store rooted at `dir`.
    ///
    /// `max_bytes` bounds the size of any single value; writes over the limit fail with
    /// [`NotebookError::StorageQuotaExceeded`].
    pub fn open(dir: impl Into<PathBuf>, max_bytes: Option<u64>) -> Result<Self> {
        let dir = dir.into();
        if !dir.exists() {
            debug!("Store directory does not exist, creating: {}", dir.display());
            fs::create_dir_all(&dir).map_err(|e| {
                error!("Failed to create store directory: {}", e);
                NotebookError::DirectoryError { path: dir.clone() }
            })?;
        }

        info!("Opened file store at {}", dir.display());
        Ok(Self { dir, max_bytes })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(NotebookError::InvalidFormat {
                message: format!("Invalid store key: {:?}", key),
            });
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            trace!("No value stored for key {}", key);
            return Ok(None);
        }

        let value = fs::read_to_string(&path).map_err(|e| {
            error!("Failed to read {}: {}", path.display(), e);
            NotebookError::Io(e)
        })?;
        Ok(Some(value))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;

        if let Some(limit) = self.max_bytes {
            let required = value.len() as u64;
            if required > limit {
                warn!("Refusing to write {} bytes for key {} (limit {})", required, key, limit);
                return Err(NotebookError::StorageQuotaExceeded { required, limit });
            }
        }

        // Write to a temp file in the same directory, then move it into place
        let mut temp_file = NamedTempFile::new_in(&self.dir).map_err(|e| {
            error!("Failed to create temporary file: {}", e);
            NotebookError::Io(e)
        })?;

        temp_file.write_all(value.as_bytes()).map_err(|e| {
            error!("Failed to write to temporary file: {}", e);
            NotebookError::Io(e)
        })?;
        temp_file.flush()?;

        temp_file.persist(&path).map_err(|e| {
            error!("Failed to persist file {}: {}", path.display(), e.error);
            NotebookError::Io(e.error)
        })?;

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if path.exists() {
            fs::remove_file(&path)?;
            debug!("Removed {}", path.display());
        }
        Ok(())
    }
}

/// In-memory store. Counts writes per key and can be told to fail writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    writes: Mutex<HashMap<String, usize>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one raw value
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        store
    }

    /// Makes every following `set` fail until switched back off
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes to `key`
    pub fn write_count(&self, key: &str) -> usize {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(NotebookError::StorageQuotaExceeded {
                required: value.len() as u64,
                limit: 0,
            });
        }

        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        *self
            .writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.to_string())
            .or_insert(0) += 1;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// Reads and writes the notebook's keys on top of a [`KeyValueStore`].
#[derive(Clone)]
pub struct PageRepository {
    store: Arc<dyn KeyValueStore>,
}

impl PageRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Loads the stored pages. Absent, unreadable or malformed data yields an empty list.
    pub fn load_pages(&self) -> Vec<Page> {
        let raw = match self.store.get(PAGES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No stored pages found");
                return Vec::new();
            }
            Err(e) => {
                warn!("Failed to read stored pages, starting empty: {}", e);
                return Vec::new();
            }
        };

        let pages: Vec<Page> = match serde_json::from_str(&raw) {
            Ok(pages) => pages,
            Err(e) => {
                warn!("Stored pages are malformed, starting empty: {}", e);
                return Vec::new();
            }
        };

        // Keep the first occurrence if the stored data ever repeats an id
        let mut seen = HashSet::with_capacity(pages.len());
        let total = pages.len();
        let pages: Vec<Page> = pages.into_iter().filter(|p| seen.insert(p.id)).collect();
        if pages.len() != total {
            warn!("Dropped {} stored pages with duplicate ids", total - pages.len());
        }

        info!("Loaded {} pages", pages.len());
        pages
    }

    /// Replaces the stored page array.
    pub fn save_pages(&self, pages: &[Page]) -> Result<()> {
        let json = serde_json::to_string(pages).map_err(|e| {
            error!("Failed to serialize pages: {}", e);
            NotebookError::Serialization(e)
        })?;

        self.store.set(PAGES_KEY, &json).map_err(|e| {
            error!("Failed to save {} pages: {}", pages.len(), e);
            e
        })?;

        debug!("Saved {} pages", pages.len());
        Ok(())
    }

    /// Panel visibility; anything other than a stored `true` means closed.
    pub fn load_panel_open(&self) -> bool {
        match self.store.get(PANEL_OPEN_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Stored panel state is malformed: {}", e);
                false
            }),
            Ok(None) => false,
            Err(e) => {
                warn!("Failed to read panel state: {}", e);
                false
            }
        }
    }

    pub fn save_panel_open(&self, open: bool) -> Result<()> {
        self.store.set(PANEL_OPEN_KEY, &serde_json::to_string(&open)?)
    }
}
