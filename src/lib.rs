//! Local notebook library
//!
//! This library keeps a small set of note pages in a persistent key-value store, with
//! pinning, duplication, export, debounced autosave and a pure rendering layer for
//! whatever front end drives it.

mod cli;
mod config;
mod errors;
mod exporter;
mod helper;
mod notebook;
mod page;
mod render;
mod scheduler;
mod search;
mod state;
mod storage;
mod types;

// Re-export key components
pub use cli::*;
pub use config::*;
pub use errors::*;
pub use exporter::*;
pub use helper::*;
pub use notebook::*;
pub use page::*;
pub use render::*;
pub use scheduler::*;
pub use search::*;
pub use state::*;
pub use storage::*;
pub use types::*;
