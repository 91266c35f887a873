//! Normalization of label/group inputs into ordered JSON sequences.
//!
//! Callers hand over either something indexable (vectors, slices, arrays) or a series-like JSON
//! value as produced by dataframe libraries. Everything funnels through [`vector_to_list`], which
//! is the only place deciding what counts as an ordered sequence.

use crate::{Error, Result};
use serde_json::{Map, Value};

/// A labels or groups argument before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum TooltipInput {
    /// Fixed-length indexable data; already ordered.
    Indexable(Vec<Value>),
    /// A JSON value that may or may not describe an ordered sequence.
    Series(Value),
}

impl<T: Into<Value>> From<Vec<T>> for TooltipInput {
    fn from(value: Vec<T>) -> Self {
        Self::Indexable(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Value>> From<&[T]> for TooltipInput {
    fn from(value: &[T]) -> Self {
        Self::Indexable(value.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for TooltipInput {
    fn from(value: [T; N]) -> Self {
        Self::Indexable(value.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for TooltipInput {
    fn from(value: Value) -> Self {
        Self::Series(value)
    }
}

/// Converts a labels/groups argument into an ordered list.
///
/// Accepted series-like shapes:
/// - a JSON array;
/// - an object carrying a `values` or `data` array (e.g. pandas `orient="split"`);
/// - an object whose keys are all non-negative integers (pandas `orient="index"`), ordered by key.
///
/// Anything else fails with [`Error::InputType`] naming the argument.
pub fn vector_to_list(input: TooltipInput, name: &str) -> Result<Vec<Value>> {
    match input {
        TooltipInput::Indexable(values) => Ok(values),
        TooltipInput::Series(Value::Array(values)) => Ok(values),
        TooltipInput::Series(Value::Object(map)) => series_object_to_list(map, name),
        TooltipInput::Series(other) => Err(input_type_error(name, &other)),
    }
}

fn series_object_to_list(mut map: Map<String, Value>, name: &str) -> Result<Vec<Value>> {
    for key in ["values", "data"] {
        if matches!(map.get(key), Some(Value::Array(_))) {
            if let Some(Value::Array(values)) = map.remove(key) {
                return Ok(values);
            }
        }
    }

    if map.is_empty() {
        return Err(input_type_error(name, &Value::Object(map)));
    }

    let mut indexed = Vec::with_capacity(map.len());
    for (key, value) in map {
        let Ok(position) = key.trim().parse::<u64>() else {
            return Err(Error::InputType {
                name: name.to_string(),
                found: "object",
            });
        };
        indexed.push((position, value));
    }
    indexed.sort_by_key(|(position, _)| *position);
    Ok(indexed.into_iter().map(|(_, value)| value).collect())
}

fn input_type_error(name: &str, value: &Value) -> Error {
    Error::InputType {
        name: name.to_string(),
        found: json_type_name(value),
    }
}

/// Name of a JSON value's type as used in error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
