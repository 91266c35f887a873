//! Stylesheet helpers for [`crate::InteractivePlot::with_css`].

use crate::{DocumentError, DocumentResult, read_text};
use hoverplot_core::input::json_type_name;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt::Write as _;
use std::path::Path;

/// Renders `selector -> property -> value` rules, keeping insertion order.
///
/// ```
/// use indexmap::IndexMap;
///
/// let mut tooltip = IndexMap::new();
/// tooltip.insert("color".to_string(), "red".to_string());
/// let mut rules = IndexMap::new();
/// rules.insert(".tooltip".to_string(), tooltip);
///
/// assert_eq!(hoverplot::css::from_dict(&rules), ".tooltip {\n  color: red;\n}\n");
/// ```
pub fn from_dict(rules: &IndexMap<String, IndexMap<String, String>>) -> String {
    let mut out = String::new();
    for (selector, props) in rules {
        let _ = writeln!(&mut out, "{selector} {{");
        for (name, value) in props {
            let _ = writeln!(&mut out, "  {name}: {value};");
        }
        out.push_str("}\n");
    }
    out
}

/// Like [`from_dict`] for a JSON object of objects. Property values may be strings or numbers.
pub fn from_value(value: &Value) -> DocumentResult<String> {
    let Value::Object(selectors) = value else {
        return Err(DocumentError::Css {
            message: format!("expected an object of selectors, found {}", json_type_name(value)),
        });
    };

    let mut rules = IndexMap::with_capacity(selectors.len());
    for (selector, props) in selectors {
        let Value::Object(props) = props else {
            return Err(DocumentError::Css {
                message: format!(
                    "properties of `{selector}` must be an object, found {}",
                    json_type_name(props)
                ),
            });
        };
        let mut out = IndexMap::with_capacity(props.len());
        for (name, v) in props {
            let text = match v {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                other => {
                    return Err(DocumentError::Css {
                        message: format!(
                            "`{selector}` property `{name}` must be a string or number, found {}",
                            json_type_name(other)
                        ),
                    });
                }
            };
            out.insert(name.clone(), text);
        }
        rules.insert(selector.clone(), out);
    }
    Ok(from_dict(&rules))
}

/// Reads a stylesheet file verbatim.
pub fn from_file(path: impl AsRef<Path>) -> DocumentResult<String> {
    read_text(path.as_ref())
}
