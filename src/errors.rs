//! Error types for the notebook.
//!
//! Most notebook operations recover from failures locally (see `Notebook`), so these
//! errors surface mainly from storage, export and configuration code paths.

use std::{io, path::PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// The main error type for the notebook crate.
#[derive(Error, Debug)]
pub enum NotebookError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Errors related to zip operations.
    #[error("Zip error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Page was not found when performing an operation.
    #[error("Page not found: {id}")]
    PageNotFound { id: Uuid },

    /// Refused to remove the only remaining page.
    #[error("You must have at least one page.")]
    LastPage,

    /// A write would push the store past its configured size limit.
    #[error("Storage quota exceeded: {required} bytes needed, limit is {limit}")]
    StorageQuotaExceeded { required: u64, limit: u64 },

    /// Invalid page or import format.
    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// The debounced saver needs a running tokio runtime.
    #[error("No async runtime available for autosave: {message}")]
    SchedulerUnavailable { message: String },

    /// file not found
    #[error("File not found: {file_path}")]
    FileNotFound { file_path: String },

    #[error("{message}")]
    EditorError { message: String },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },
}
