//! CLI module for the notebook application
//!
//! This module drives a `Notebook` from one command per invocation, with the terminal
//! acting as the notebook's surface.
use std::{
    fs::{read_to_string, OpenOptions},
    io::{stdin, stdout, Write},
    path::{Path, PathBuf},
    process::Command,
    sync::Arc,
};

use console::style;
use log::{debug, info};
use shell_words::split;
use tempfile::Builder;
use uuid::Uuid;

use crate::{
    editor_template, process_editor_content, Commands, Config, DeleteOutcome, ExportFormat,
    ExportedFile, FileStore, Notebook, NotebookError, NotebookView, PageRepository, Result,
    SaveStatus, Surface, SAVE_FAILED_WARNING, UNTITLED_PLACEHOLDER,
};

/// The terminal as a notebook surface
pub struct TerminalSurface {
    /// Skip confirmation prompts
    assume_yes: bool,

    /// Where downloads are written
    export_dir: PathBuf,
}

impl TerminalSurface {
    pub fn new(assume_yes: bool, export_dir: PathBuf) -> Self {
        Self {
            assume_yes,
            export_dir,
        }
    }
}

impl Surface for TerminalSurface {
    fn render(&mut self, view: &NotebookView) {
        debug!(
            "Render: {} pages, active {:?}",
            view.sidebar.len(),
            view.active_entry().map(|entry| entry.id)
        );
    }

    fn show_save_status(&mut self, status: SaveStatus) {
        debug!("Save status: {}", status.label());
    }

    fn warn(&mut self, message: &str) {
        eprintln!("{} {}", style("warning:").yellow().bold(), message);
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        print!("{} [y/N]: ", prompt);
        if stdout().flush().is_err() {
            return false;
        }

        let mut input = String::new();
        if stdin().read_line(&mut input).is_err() {
            return false;
        }
        let input = input.trim().to_lowercase();
        input == "y" || input == "yes"
    }

    fn download(&mut self, file: &ExportedFile) {
        match file.write_to(&self.export_dir) {
            Ok(path) => println!("Exported to {}", style(path.display()).green()),
            Err(e) => self.warn(&format!("Export failed: {}", e)),
        }
    }
}

/// CLI Application handler - opens the notebook and runs one command against it
pub struct App {
    /// Application configuration
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn open_notebook(&self, surface: TerminalSurface) -> Result<Notebook> {
        let store = FileStore::open(&self.config.data_dir, self.config.max_store_bytes)?;
        let repository = PageRepository::new(Arc::new(store));
        Notebook::open(repository, Box::new(surface), &self.config)
    }

    /// Run the CLI application with the given command
    pub fn run(&self, command: Commands) -> Result<()> {
        let surface = match &command {
            Commands::Delete { force, .. } => TerminalSurface::new(*force, PathBuf::from(".")),
            Commands::Export { output, .. } => TerminalSurface::new(false, output.clone()),
            _ => TerminalSurface::new(false, PathBuf::from(".")),
        };
        let mut notebook = self.open_notebook(surface)?;

        match command {
            Commands::List { html } => {
                let view = notebook.view();
                if html {
                    println!("{}", view.sidebar_html());
                } else {
                    print_sidebar(&view);
                }
            }

            Commands::New { title, content } => {
                let id = notebook.create_page(title.as_deref());
                if let Some(content) = content {
                    notebook.update_page_content(&content);
                }
                println!("Page created with ID: {}", id);
            }

            Commands::Show { id } => {
                let id = resolve_id(&notebook, &id)?;
                notebook.open_page(id);
                print_editor(&notebook.view());
            }

            Commands::Rename { id, title } => {
                let id = resolve_id(&notebook, &id)?;
                if !notebook.rename_page(id, &title) {
                    return Err(NotebookError::ApplicationError {
                        message: "Title must not be blank".to_string(),
                    });
                }
                println!("Renamed page {}", id);
            }

            Commands::Pin { id } => {
                let id = resolve_id(&notebook, &id)?;
                match notebook.pin_page(id) {
                    Some(true) => println!("Pinned page {}", id),
                    Some(false) => println!("Unpinned page {}", id),
                    None => {}
                }
            }

            Commands::Duplicate { id } => {
                let id = resolve_id(&notebook, &id)?;
                if let Some(copy) = notebook.duplicate_page(id) {
                    println!("Page duplicated with ID: {}", copy);
                }
            }

            Commands::Delete { id, .. } => {
                let id = resolve_id(&notebook, &id)?;
                match notebook.delete_page(id) {
                    DeleteOutcome::Deleted => println!("Page {} has been permanently deleted.", id),
                    DeleteOutcome::Cancelled => println!("Deletion cancelled."),
                    DeleteOutcome::Refused | DeleteOutcome::NotFound => {}
                }
            }

            Commands::Write { id, content, file } => {
                let id = resolve_id(&notebook, &id)?;
                let text = match (content, file) {
                    (Some(content), _) => content,
                    (None, Some(path)) => read_content_from_file(&path)?,
                    (None, None) => {
                        return Err(NotebookError::ApplicationError {
                            message: "Provide --content or --file".to_string(),
                        })
                    }
                };
                notebook.open_page(id);
                notebook.update_page_content(&text);
                println!("Updated page {}", id);
            }

            Commands::Edit { id } => {
                let id = resolve_id(&notebook, &id)?;
                notebook.open_page(id);
                let (title, existing) = match notebook.current_page() {
                    Some(page) => (page.display_title().to_string(), page.content.clone()),
                    None => return Err(NotebookError::PageNotFound { id }),
                };

                let edited = self.open_editor_with_content(&title, &existing)?;
                if edited != existing {
                    notebook.update_page_content(&edited);
                    println!("Updated page {}", id);
                } else {
                    println!("No changes.");
                }
            }

            Commands::Title { id, title } => {
                let id = resolve_id(&notebook, &id)?;
                notebook.open_page(id);
                if !notebook.update_page_title(&title) {
                    return Err(NotebookError::ApplicationError {
                        message: "Title must not be blank".to_string(),
                    });
                }
            }

            Commands::Export { id, format, .. } => {
                let id = resolve_id(&notebook, &id)?;
                let format: ExportFormat = format.parse()?;
                notebook.export_page(id, format);
            }

            Commands::Archive { output } => {
                let count = notebook.archive(&output)?;
                println!("Archived {} pages to {}", count, output.display());
            }

            Commands::Import { source } => {
                let id = notebook.import_page(&source)?;
                println!("Imported {} as page {}", source.display(), id);
            }

            Commands::Search { query, limit } => {
                let hits = notebook.search(&query);
                if hits.is_empty() {
                    println!("No pages match '{}'", query);
                }
                for hit in hits.into_iter().take(limit) {
                    println!(
                        "{}  {}  {}",
                        style(short_id(hit.page.id)).dim(),
                        style(hit.page.display_title()).bold(),
                        style(format!("score {}", hit.score)).dim()
                    );
                }
            }

            Commands::Panel { toggle } => {
                let open = if toggle {
                    notebook.toggle_panel()
                } else {
                    notebook.panel_open()
                };
                println!("Notebook panel is {}", if open { "open" } else { "closed" });
            }
        }

        if notebook.close() == SaveStatus::Error {
            return Err(NotebookError::ApplicationError {
                message: SAVE_FAILED_WARNING.to_string(),
            });
        }
        Ok(())
    }

    fn open_editor_with_content(&self, title: &str, existing_content: &str) -> Result<String> {
        let temp_file = Builder::new().suffix(".md").tempfile()?;
        let temp_path = temp_file.path().to_path_buf();

        {
            let mut file = OpenOptions::new().write(true).truncate(true).open(&temp_path)?;
            file.write_all(editor_template(title, existing_content).as_bytes())?;
        }

        let editor_cmd = self.config.get_editor_command();
        info!("Opening editor to edit page content. Save and exit when done...");
        launch_editor(&editor_cmd, &temp_path)?;

        let content = read_to_string(&temp_path)?;
        Ok(process_editor_content(&content))
    }
}

fn launch_editor(editor_cmd: &str, file_path: &Path) -> Result<()> {
    let args = split(editor_cmd).map_err(|e| NotebookError::EditorError {
        message: format!("Failed to parse editor command: {}", e),
    })?;

    let Some((program, rest)) = args.split_first() else {
        return Err(NotebookError::EditorError {
            message: "Empty editor command".to_string(),
        });
    };

    let status = Command::new(program).args(rest).arg(file_path).status()?;
    if !status.success() {
        return Err(NotebookError::EditorError {
            message: "Editor exited with non-zero status".to_string(),
        });
    }
    Ok(())
}

fn read_content_from_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(NotebookError::FileNotFound {
            file_path: path.display().to_string(),
        });
    }
    Ok(read_to_string(path)?)
}

/// Finds a page by full id or unique id prefix
fn resolve_id(notebook: &Notebook, raw: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(raw) {
        return match notebook.page(id) {
            Some(_) => Ok(id),
            None => Err(NotebookError::PageNotFound { id }),
        };
    }

    let prefix = raw.trim().to_lowercase();
    if prefix.is_empty() {
        return Err(NotebookError::ApplicationError {
            message: "Page id must not be empty".to_string(),
        });
    }

    let matches: Vec<Uuid> = notebook
        .pages()
        .iter()
        .map(|page| page.id)
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(NotebookError::ApplicationError {
            message: format!("No page id starts with '{}'", raw),
        }),
        _ => Err(NotebookError::ApplicationError {
            message: format!("'{}' matches {} pages, use a longer prefix", raw, matches.len()),
        }),
    }
}

fn short_id(id: Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

fn print_sidebar(view: &NotebookView) {
    for entry in &view.sidebar {
        let marker = if entry.active { ">" } else { " " };
        let pin = if entry.pinned { "*" } else { " " };
        let title = if entry.active {
            style(entry.title.as_str()).bold()
        } else {
            style(entry.title.as_str())
        };

        println!(
            "{}{} {}  {}  {}",
            marker,
            style(pin).yellow(),
            style(short_id(entry.id)).dim(),
            title,
            style(entry.updated_at.format("%Y-%m-%d %H:%M")).dim()
        );
    }
}

fn print_editor(view: &NotebookView) {
    if let Some(editor) = &view.editor {
        let title = if editor.title.trim().is_empty() {
            UNTITLED_PLACEHOLDER
        } else {
            editor.title.as_str()
        };
        println!("{}", style(title).bold());
        println!("{}", style(editor.page_id).dim());
        println!();
        println!("{}", editor.content);
    }
}
