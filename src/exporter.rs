//! Export of single pages and whole-notebook archives, plus file import.
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Utc;
use log::{debug, error, info};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::{
    file_stem_for_title, split_markdown_title, ExportFormat, NotebookError, Page, Result,
};

/// A file produced by exporting a page, ready to hand to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub filename: String,
    pub body: String,
    pub format: ExportFormat,
}

impl ExportedFile {
    /// Writes the file into `dir`, returning its path
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| {
                error!("Failed to create export directory {}: {}", dir.display(), e);
                NotebookError::DirectoryError {
                    path: dir.to_path_buf(),
                }
            })?;
        }

        let path = dir.join(&self.filename);
        fs::write(&path, &self.body)?;
        info!("Exported {} to {}", self.filename, path.display());
        Ok(path)
    }
}

/// Renders a page in the requested format
pub fn export_page(page: &Page, format: ExportFormat) -> ExportedFile {
    let filename = format!("{}.{}", file_stem_for_title(&page.title), format.extension());

    let body = match format {
        ExportFormat::Txt => page.content.clone(),
        ExportFormat::Md => format!("# {}\n\n{}", page.title, page.content),
    };

    ExportedFile {
        filename,
        body,
        format,
    }
}

/// Writes every page as Markdown into a zip archive, plus a `pages.json` copy.
///
/// Entries are named `<slug>-<first 8 id chars>.md` so equal titles do not collide.
/// Returns the number of pages written.
pub fn archive_pages(pages: &[Page], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(path).map_err(|e| {
        error!("Failed to create archive {}: {}", path.display(), e);
        NotebookError::Io(e)
    })?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for page in pages {
        let exported = export_page(page, ExportFormat::Md);
        let short_id: String = page.id.simple().to_string().chars().take(8).collect();
        let entry_name = format!("{}-{}.md", file_stem_for_title(&page.title), short_id);

        zip.start_file(entry_name.as_str(), options)?;
        zip.write_all(exported.body.as_bytes())?;
        debug!("Archived page {} as {}", page.id, entry_name);
    }

    zip.start_file("pages.json", options)?;
    zip.write_all(serde_json::to_string_pretty(pages)?.as_bytes())?;
    zip.finish()?;

    info!(
        "Archived {} pages to {} at {}",
        pages.len(),
        path.display(),
        Utc::now().format("%Y-%m-%d %H:%M:%S")
    );
    Ok(pages.len())
}

/// Reads a `.md` or `.txt` file and derives a page title and content from it.
///
/// Markdown files use their first `# ` heading as the title; otherwise the file stem is used.
pub fn read_import_source(path: &Path) -> Result<(String, String)> {
    if !path.is_file() {
        return Err(NotebookError::FileNotFound {
            file_path: path.display().to_string(),
        });
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if !matches!(extension.as_str(), "md" | "markdown" | "txt" | "text") {
        return Err(NotebookError::InvalidFormat {
            message: format!("Cannot import {}: expected a .md or .txt file", path.display()),
        });
    }

    let text = fs::read_to_string(path)?;
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();

    if matches!(extension.as_str(), "md" | "markdown") {
        if let Some((title, body)) = split_markdown_title(&text) {
            return Ok((title, body));
        }
    }
    Ok((stem, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;
    use zip::ZipArchive;

    fn page(title: &str, content: &str) -> Page {
        let mut page = Page::new(title);
        page.content = content.to_string();
        page
    }

    #[test]
    fn markdown_export_prefixes_title_heading() {
        let exported = export_page(&page("My Notes!", "Hello"), ExportFormat::Md);
        assert_eq!(exported.filename, "my_notes_.md");
        assert_eq!(exported.body, "# My Notes!\n\nHello");
    }

    #[test]
    fn text_export_is_verbatim() {
        let exported = export_page(&page("Todo List", "- milk\n- eggs"), ExportFormat::Txt);
        assert_eq!(exported.filename, "todo_list.txt");
        assert_eq!(exported.body, "- milk\n- eggs");
    }

    #[test]
    fn write_to_creates_the_directory() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("exports");
        let exported = export_page(&page("Plan", "steps"), ExportFormat::Txt);

        let path = exported.write_to(&target).unwrap();
        assert_eq!(path, target.join("plan.txt"));
        assert_eq!(fs::read_to_string(path).unwrap(), "steps");
    }

    #[test]
    fn archive_holds_every_page_and_the_json_copy() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notebook.zip");
        let pages = vec![page("Same", "one"), page("Same", "two")];

        assert_eq!(archive_pages(&pages, &path).unwrap(), 2);

        let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(archive.len(), 3);

        let mut json = String::new();
        archive.by_name("pages.json").unwrap().read_to_string(&mut json).unwrap();
        let restored: Vec<Page> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, pages);
    }

    #[test]
    fn import_uses_heading_for_markdown_and_stem_for_text() {
        let dir = tempdir().unwrap();
        let md = dir.path().join("meeting.md");
        fs::write(&md, "# Standup\n\n- blockers\n").unwrap();
        let txt = dir.path().join("groceries.txt");
        fs::write(&txt, "# not a heading here\nmilk").unwrap();

        assert_eq!(
            read_import_source(&md).unwrap(),
            ("Standup".to_string(), "- blockers".to_string())
        );
        assert_eq!(
            read_import_source(&txt).unwrap(),
            ("groceries".to_string(), "# not a heading here\nmilk".to_string())
        );
    }

    #[test]
    fn import_rejects_missing_and_unsupported_files() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            read_import_source(&dir.path().join("absent.md")),
            Err(NotebookError::FileNotFound { .. })
        ));

        let pdf = dir.path().join("scan.pdf");
        fs::write(&pdf, "binary").unwrap();
        assert!(matches!(
            read_import_source(&pdf),
            Err(NotebookError::InvalidFormat { .. })
        ));
    }
}
