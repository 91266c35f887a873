//! Page-level helpers: output paths, page options and template filling.

use crate::{DocumentError, DocumentResult};
use std::path::{Path, PathBuf};

pub const DEFAULT_DOCUMENT_TITLE: &str = "Made with hoverplot";

/// Page metadata. Both values are inserted into the document as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOptions {
    /// `href` of the page icon; `None` emits no icon link.
    pub favicon_path: Option<String>,
    pub document_title: String,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            favicon_path: None,
            document_title: DEFAULT_DOCUMENT_TITLE.to_string(),
        }
    }
}

impl PageOptions {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.document_title = title.into();
        self
    }

    pub fn favicon(mut self, href: impl Into<String>) -> Self {
        self.favicon_path = Some(href.into());
        self
    }

    pub(crate) fn favicon_link(&self) -> String {
        match &self.favicon_path {
            Some(href) => format!(r#"<link rel="icon" href="{href}">"#),
            None => String::new(),
        }
    }
}

/// Appends `.html` unless the path already ends in `.html` or `.htm` (case-insensitive).
pub fn html_output_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let has_html_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"));
    if has_html_ext {
        return path.to_path_buf();
    }
    let mut raw = path.as_os_str().to_os_string();
    raw.push(".html");
    PathBuf::from(raw)
}

/// Prepares JSON text for a `<script type="application/json">` block. `</` is written as `<\/`
/// so label text can never close the script element.
pub fn script_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

/// Replaces every `{{ name }}` placeholder in one pass. Substituted values are not rescanned,
/// so plot content that happens to contain braces is left alone.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> DocumentResult<String> {
    let extra: usize = values.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        let Some(close) = rest[open + 2..].find("}}") else {
            break;
        };
        let name = rest[open + 2..open + 2 + close].trim();
        let value = values
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| *v)
            .ok_or_else(|| DocumentError::Template {
                name: name.to_string(),
            })?;
        out.push_str(&rest[..open]);
        out.push_str(value);
        rest = &rest[open + 2 + close + 2..];
    }
    out.push_str(rest);
    Ok(out)
}
