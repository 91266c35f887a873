#![forbid(unsafe_code)]

//! `hoverplot` turns a static plot SVG into a standalone interactive HTML document.
//!
//! The headless pieces (tooltip contract, classifier, tooltip machine) live in
//! `hoverplot-core` and are re-exported here. This crate adds document assembly:
//! - [`InteractivePlot`]: consuming builder around one SVG
//! - [`RenderContext`]: HTML template, default stylesheet and browser runtime
//! - [`css`]: small helpers producing stylesheet text
//!
//! ```no_run
//! use hoverplot::{InteractivePlot, PageOptions, RenderContext, TooltipArgs};
//!
//! # fn main() -> hoverplot::DocumentResult<()> {
//! let svg = std::fs::read_to_string("scatter.svg").unwrap();
//! InteractivePlot::from_svg(svg)?
//!     .add_tooltip(TooltipArgs::new().labels(vec!["a", "b", "c"]).shift(10, 10))?
//!     .with_css(".tooltip { color: red; }")
//!     .save(&RenderContext::bundled(), "chart", &PageOptions::default())?;
//! # Ok(())
//! # }
//! ```

pub use hoverplot_core::*;

mod context;
pub mod css;
pub mod html;
mod plot;

pub use context::RenderContext;
pub use html::{PageOptions, html_output_path};
pub use plot::InteractivePlot;

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error(transparent)]
    Core(#[from] hoverplot_core::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid stylesheet: {message}")]
    Css { message: String },

    #[error("Template placeholder `{name}` has no value")]
    Template { name: String },
}

pub type DocumentResult<T> = std::result::Result<T, DocumentError>;

pub(crate) fn read_text(path: &std::path::Path) -> DocumentResult<String> {
    std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })
}
