//! Writes classification results back into SVG markup as `data-hp-*` attributes.
//!
//! Annotated elements carry their tooltip index and group explicitly, so the browser runtime
//! binds events by attribute instead of re-deriving positions from document order.

use crate::classify::{Classification, parse_svg};
use crate::{Error, Result};
use std::fmt::Write as _;
use std::ops::Range;

const ATTR_PREFIX: &str = "data-hp-";
pub const ATTR_KIND: &str = "data-hp-kind";
pub const ATTR_KEY: &str = "data-hp-key";
pub const ATTR_AXIS: &str = "data-hp-axis";
pub const ATTR_INDEX: &str = "data-hp-index";
pub const ATTR_GROUP: &str = "data-hp-group";
pub const ATTR_LEGEND: &str = "data-hp-legend";

/// Returns the SVG root element with classification attributes inserted. The XML declaration,
/// DOCTYPE and comments before the root are dropped so the result can be inlined into HTML.
///
/// Any `data-hp-*` attributes already present are removed first, so re-annotating a document
/// under a different contract leaves no stale keys or groups behind.
pub fn annotate_svg(svg: &str, classification: &Classification) -> Result<String> {
    let doc = parse_svg(svg)?;
    let root = doc.root_element().range();

    let mut edits: Vec<Edit> = stale_attributes(svg, &doc)
        .into_iter()
        .map(Edit::Remove)
        .collect();
    for el in &classification.elements {
        let mut attrs = String::new();
        let _ = write!(
            &mut attrs,
            r#" {ATTR_KIND}="{}" {ATTR_KEY}="{}" {ATTR_AXIS}="{}" {ATTR_INDEX}="{}" {ATTR_GROUP}="{}""#,
            el.layer,
            el.key,
            el.axis_index,
            el.tooltip_index,
            escape_attr(el.group.as_str())
        );
        if el.legend {
            let _ = write!(&mut attrs, r#" {ATTR_LEGEND}="true""#);
        }
        edits.push(Edit::Insert(el.node.attr_offset, attrs));
    }
    for prim in &classification.unclassified {
        edits.push(Edit::Insert(
            prim.node.attr_offset,
            format!(r#" {ATTR_KIND}="{}""#, prim.layer),
        ));
    }
    // Inserts at an offset go before a removal starting there.
    edits.sort_by_key(|edit| match edit {
        Edit::Insert(offset, _) => (*offset, 0),
        Edit::Remove(range) => (range.start, 1),
    });

    let mut out = String::with_capacity(svg.len() + edits.len() * 96);
    let mut cursor = root.start;
    for edit in edits {
        let (start, end) = match &edit {
            Edit::Insert(offset, _) => (*offset, *offset),
            Edit::Remove(range) => (range.start, range.end),
        };
        if start < cursor
            || end > root.end
            || !svg.is_char_boundary(start)
            || !svg.is_char_boundary(end)
        {
            return Err(Error::SvgParse {
                message: format!("annotation offset {start} is outside the root element"),
            });
        }
        out.push_str(&svg[cursor..start]);
        if let Edit::Insert(_, attrs) = &edit {
            out.push_str(attrs);
        }
        cursor = end;
    }
    out.push_str(&svg[cursor..root.end]);
    Ok(out)
}

enum Edit {
    Insert(usize, String),
    Remove(Range<usize>),
}

/// Byte ranges of every `data-hp-*` attribute under the root, each widened over the whitespace
/// that separates it from the previous token.
fn stale_attributes(svg: &str, doc: &roxmltree::Document<'_>) -> Vec<Range<usize>> {
    let bytes = svg.as_bytes();
    let mut ranges = Vec::new();
    for node in doc.root_element().descendants().filter(|n| n.is_element()) {
        for attr in node.attributes() {
            if attr.namespace().is_some() || !attr.name().starts_with(ATTR_PREFIX) {
                continue;
            }
            let range = attr.range();
            let mut start = range.start;
            while start > 0 && bytes[start - 1].is_ascii_whitespace() {
                start -= 1;
            }
            ranges.push(start..range.end);
        }
    }
    ranges
}

/// Minimal HTML fallback shown in place of interactivity when a document failed to mount.
pub fn error_marker(err: &Error) -> String {
    format!(
        r#"<div class="hoverplot-error" role="alert">Interactive plot unavailable: {}</div>"#,
        escape_xml(&err.to_string())
    )
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(text: &str) -> String {
    escape_xml(text)
}
