//! Shared types for the notebook crate.
//!
//! This module contains the small enums passed between the controller, the rendering
//! layer and the front end, plus the CLI subcommands.
use std::{fmt, path::PathBuf, str::FromStr};

use clap::Subcommand;
use serde::{Deserialize, Serialize};

use crate::NotebookError;

/// A specialized Result type for notebook operations.
pub type Result<T> = std::result::Result<T, NotebookError>;

/// State of the save-status indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveStatus {
    /// Persisted state matches memory
    Saved,
    /// A debounced write is scheduled
    Pending,
    /// The last write failed; edits may not survive a reload
    Error,
}

impl SaveStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SaveStatus::Saved => "Saved",
            SaveStatus::Pending => "Saving...",
            SaveStatus::Error => "Not saved",
        }
    }
}

/// Editor fields that can receive input focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Content,
}

/// Formats a single page can be exported to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Txt,
    Md,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Md => "md",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = NotebookError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(ExportFormat::Txt),
            "md" | "markdown" => Ok(ExportFormat::Md),
            other => Err(NotebookError::InvalidFormat {
                message: format!("Unsupported export format: {}", other),
            }),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Result of a delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// No page with that id
    NotFound,
    /// It was the last page
    Refused,
    /// The user declined the confirmation
    Cancelled,
}

/// Available subcommands for the notebook application
#[derive(Subcommand)]
pub enum Commands {
    /// List pages in sidebar order
    List {
        /// Render the sidebar as HTML instead of text
        #[clap(long)]
        html: bool,
    },

    /// Create a new page
    New {
        /// Title of the page
        title: Option<String>,

        /// Initial content of the page
        #[clap(short, long)]
        content: Option<String>,
    },

    /// Show a page
    Show {
        /// ID (or unique prefix) of the page
        id: String,
    },

    /// Rename a page
    Rename {
        /// ID (or unique prefix) of the page
        id: String,

        /// New title
        title: String,
    },

    /// Toggle the pinned state of a page
    Pin {
        /// ID (or unique prefix) of the page
        id: String,
    },

    /// Duplicate a page
    Duplicate {
        /// ID (or unique prefix) of the page
        id: String,
    },

    /// Delete a page
    Delete {
        /// ID (or unique prefix) of the page
        id: String,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Replace the content of a page
    Write {
        /// ID (or unique prefix) of the page
        id: String,

        /// New content
        #[clap(short, long)]
        content: Option<String>,

        /// Path to a file containing the new content
        #[clap(short, long)]
        file: Option<PathBuf>,
    },

    /// Edit the content of a page in the external editor
    Edit {
        /// ID (or unique prefix) of the page
        id: String,
    },

    /// Change the title of a page through the editor title field
    Title {
        /// ID (or unique prefix) of the page
        id: String,

        /// New title
        title: String,
    },

    /// Export a page as a text or Markdown file
    Export {
        /// ID (or unique prefix) of the page
        id: String,

        /// Format to export to
        #[clap(short, long, value_parser = ["txt", "md"], default_value = "md")]
        format: String,

        /// Directory where the exported file is written
        #[clap(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Write every page into a zip archive
    Archive {
        /// Path of the archive to create
        #[clap(short, long)]
        output: PathBuf,
    },

    /// Import a text or Markdown file as a new page
    Import {
        /// Path to the file to import
        source: PathBuf,
    },

    /// Search pages by title or content
    Search {
        /// Search query text
        query: String,

        /// Limit the number of search results
        #[clap(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },

    /// Show or toggle the notebook panel visibility
    Panel {
        /// Toggle the panel instead of just showing its state
        #[clap(short, long)]
        toggle: bool,
    },
}
