use crate::{DocumentResult, read_text};
use std::path::Path;

const TEMPLATE: &str = include_str!("../assets/template.html");
const DEFAULT_CSS: &str = include_str!("../assets/default.css");
const RUNTIME_JS: &str = include_str!("../assets/runtime.js");

/// Everything a rendered page is assembled from, besides the plot itself.
///
/// Constructed explicitly and passed to [`crate::InteractivePlot::as_html`]; there is no
/// process-wide template state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    /// HTML page with `{{ name }}` placeholders.
    pub template: String,
    pub default_css: String,
    /// Browser runtime; must define `hoverplotMount(uuid)`.
    pub runtime_js: String,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::bundled()
    }
}

impl RenderContext {
    /// The template, stylesheet and runtime shipped with this crate.
    pub fn bundled() -> Self {
        Self {
            template: TEMPLATE.to_string(),
            default_css: DEFAULT_CSS.to_string(),
            runtime_js: RUNTIME_JS.to_string(),
        }
    }

    /// Loads `template.html`, `default.css` and `runtime.js` from `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> DocumentResult<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            template: read_text(&dir.join("template.html"))?,
            default_css: read_text(&dir.join("default.css"))?,
            runtime_js: read_text(&dir.join("runtime.js"))?,
        })
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }
}
