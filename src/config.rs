use std::{fs, path::{Path, PathBuf}, time::Duration};

use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use which::which;

use crate::{NotebookError, Result, DEFAULT_PAGE_TITLE};

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory holding the key-value store files
    pub data_dir: PathBuf,

    /// Quiet period before a content edit is written, in milliseconds
    pub autosave_delay_ms: u64,

    /// Upper bound on the size of a single stored value, if any
    pub max_store_bytes: Option<u64>,

    /// Title given to pages created without one
    pub default_page_title: String,

    /// Editor command used by `edit`
    pub editor_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = ProjectDirs::from("", "", "notebook")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".notebook"));

        Self {
            data_dir,
            autosave_delay_ms: 1000,
            max_store_bytes: None,
            default_page_title: DEFAULT_PAGE_TITLE.to_string(),
            editor_command: None,
        }
    }
}

impl Config {
    /// Reads a JSON config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw).map_err(|e| NotebookError::ConfigError {
            message: format!("{}: {}", path.display(), e),
        })?;
        config.validate()?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.default_page_title.trim().is_empty() {
            return Err(NotebookError::ConfigError {
                message: "default_page_title must not be blank".to_string(),
            });
        }
        if self.max_store_bytes == Some(0) {
            return Err(NotebookError::ConfigError {
                message: "max_store_bytes must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    // This method provides smart fallbacks when no editor is configured
    pub fn get_editor_command(&self) -> String {
        // First try the configured editor
        if let Some(editor) = &self.editor_command {
            return editor.clone();
        }

        // Then try environment variable
        if let Ok(editor) = std::env::var("EDITOR") {
            return editor;
        }

        // Fall back to platform defaults
        if cfg!(windows) {
            "notepad".to_string()
        } else if cfg!(target_os = "macos") {
            "open -W -t".to_string()
        } else {
            for editor in &["nano", "vim", "vi", "emacs"] {
                if which(editor).is_ok() {
                    return editor.to_string();
                }
            }
            "nano".to_string()
        }
    }
}
