use log::info;

/// Sets up env_logger. `RUST_LOG` still overrides the default filter.
pub fn initialize_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .format_module_path(true)
        .try_init();

    info!("Logger initialized");
}

/// Escapes text so it is never interpreted as markup
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Lower-cased title with every non-alphanumeric character replaced by `_`
pub fn file_stem_for_title(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

const EDITOR_HEADER_PREFIX: &str = "<!-- Editing \"";
const EDITOR_HEADER_SUFFIX: &str = "\". The first line is removed on save. -->";

/// Template written to the temp file before launching the external editor
pub fn editor_template(title: &str, content: &str) -> String {
    let title = title.replace(['\r', '\n'], " ");
    format!("{EDITOR_HEADER_PREFIX}{title}{EDITOR_HEADER_SUFFIX}\n{content}")
}

/// Removes the header line written by [`editor_template`]. The body is kept byte for byte.
pub fn process_editor_content(content: &str) -> String {
    let (first, rest) = content.split_once('\n').unwrap_or((content, ""));
    let header = first.strip_suffix('\r').unwrap_or(first);

    if header.starts_with(EDITOR_HEADER_PREFIX) && header.ends_with(EDITOR_HEADER_SUFFIX) {
        rest.to_string()
    } else {
        content.to_string()
    }
}

/// Splits a leading `# heading` off a Markdown document
pub fn split_markdown_title(text: &str) -> Option<(String, String)> {
    let mut lines = text.lines();
    let first = lines.by_ref().find(|line| !line.trim().is_empty())?;
    let title = first.trim().strip_prefix("# ")?.trim().to_string();
    if title.is_empty() {
        return None;
    }

    let body = lines.collect::<Vec<&str>>().join("\n");
    Some((title, body.trim_start_matches('\n').to_string()))
}
