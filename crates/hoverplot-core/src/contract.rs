//! The plot data contract: per-axis tooltip labels and groups plus global tooltip shifts.
//!
//! The contract is produced once per rendered plot and embedded verbatim in the output document.
//! Its JSON shape is:
//!
//! ```json
//! {
//!   "tooltip_x_shift": 5,
//!   "tooltip_y_shift": 5,
//!   "axes": { "axes_1": { "tooltip_labels": ["A", "B"], "tooltip_groups": [0, 1] } }
//! }
//! ```

use crate::input::{TooltipInput, vector_to_list};
use crate::{Error, Result};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

fn axis_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^axes_([1-9][0-9]*)$").expect("valid regex"))
}

/// Returns the contract key for a 0-based axis position (`axes_1` for the first axis).
pub fn axis_key(index: usize) -> String {
    format!("axes_{}", index + 1)
}

/// Parses `axes_<n>` into its 1-based number.
pub fn parse_axis_key(key: &str) -> Option<usize> {
    let caps = axis_key_regex().captures(key)?;
    caps.get(1)?.as_str().parse::<usize>().ok()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisTooltipSpec {
    pub tooltip_labels: Vec<Value>,
    pub tooltip_groups: Vec<Value>,
}

impl AxisTooltipSpec {
    /// Number of entries classification pairs primitives with.
    ///
    /// Labels may be empty for highlight-only axes, so the longer of the two wins.
    pub fn entry_count(&self) -> usize {
        self.tooltip_labels.len().max(self.tooltip_groups.len())
    }

    /// Tooltip text for `index`, or `None` when the axis carries no label there.
    pub fn label_text(&self, index: usize) -> Option<String> {
        self.tooltip_labels.get(index).map(label_text)
    }

    /// Group identity for `index`, or `None` past the end of the group sequence.
    pub fn group_key(&self, index: usize) -> Option<GroupKey> {
        self.tooltip_groups.get(index).map(GroupKey::from_value)
    }

    /// Every entry needs a group; labels, when present, pair one-to-one with groups.
    pub fn validate(&self, axis: &str) -> Result<()> {
        let (labels, groups) = (self.tooltip_labels.len(), self.tooltip_groups.len());
        if labels != 0 && labels != groups {
            return Err(Error::ContractParse {
                message: format!(
                    "{axis}: tooltip_labels and tooltip_groups differ in length ({labels} vs {groups})"
                ),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotDataContract {
    #[serde(default)]
    pub tooltip_x_shift: i64,
    #[serde(default)]
    pub tooltip_y_shift: i64,
    pub axes: IndexMap<String, AxisTooltipSpec>,
}

impl PlotDataContract {
    /// Parses and validates an embedded contract.
    pub fn from_json(text: &str) -> Result<Self> {
        let contract: Self =
            serde_json::from_str(text).map_err(|err| Error::ContractParse {
                message: err.to_string(),
            })?;
        contract.validate()?;
        Ok(contract)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let contract: Self =
            serde_json::from_value(value).map_err(|err| Error::ContractParse {
                message: err.to_string(),
            })?;
        contract.validate()?;
        Ok(contract)
    }

    pub fn to_json(&self) -> String {
        // A map of strings to plain JSON values always serializes.
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn axis(&self, key: &str) -> Option<&AxisTooltipSpec> {
        self.axes.get(key)
    }

    /// Checks axis keys and per-axis sequence lengths. Parsing always validates; contracts
    /// assembled by hand are validated again before classification.
    pub fn validate(&self) -> Result<()> {
        for (key, spec) in &self.axes {
            if parse_axis_key(key).is_none() {
                return Err(Error::ContractParse {
                    message: format!("axis key `{key}` does not match `axes_<n>`"),
                });
            }
            spec.validate(key)?;
        }
        Ok(())
    }
}

/// Canonical group identity: the compact JSON text of the group value.
///
/// `1` and `"1"` are distinct groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(String);

impl GroupKey {
    pub fn from_value(value: &Value) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Renders a label value as tooltip text. Strings are used as-is (they may carry HTML), other
/// scalars use their JSON spelling, `null` renders empty.
pub fn label_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Arguments of a single [`ContractBuilder::add_tooltip`] call.
#[derive(Debug, Clone, Default)]
pub struct TooltipArgs {
    pub labels: Option<TooltipInput>,
    pub groups: Option<TooltipInput>,
    pub tooltip_x_shift: i64,
    pub tooltip_y_shift: i64,
    /// 0-based axis position; `None` targets the first axis.
    pub axis: Option<usize>,
}

impl TooltipArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(mut self, labels: impl Into<TooltipInput>) -> Self {
        self.labels = Some(labels.into());
        self
    }

    pub fn groups(mut self, groups: impl Into<TooltipInput>) -> Self {
        self.groups = Some(groups.into());
        self
    }

    pub fn shift(mut self, x: i64, y: i64) -> Self {
        self.tooltip_x_shift = x;
        self.tooltip_y_shift = y;
        self
    }

    pub fn axis(mut self, index: usize) -> Self {
        self.axis = Some(index);
        self
    }
}

/// Assembles a [`PlotDataContract`] one axis at a time.
#[derive(Debug, Clone, Default)]
pub struct ContractBuilder {
    contract: PlotDataContract,
}

impl ContractBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the tooltip spec for one axis and stores it, replacing any previous entry for
    /// that axis. The global shifts are overwritten by every call.
    ///
    /// `legend_labels` are the axis legend's handle labels; they are appended after the labels
    /// (when labels are given) and after the groups (when groups are given) so legend glyphs
    /// take part in the same tooltip and highlight machinery as data primitives.
    pub fn add_tooltip(&mut self, args: TooltipArgs, legend_labels: &[String]) -> Result<&mut Self> {
        let axis = args.axis.unwrap_or(0);
        let spec = build_axis_spec(args.labels, args.groups, legend_labels)?;

        self.contract.tooltip_x_shift = args.tooltip_x_shift;
        self.contract.tooltip_y_shift = args.tooltip_y_shift;
        self.contract.axes.insert(axis_key(axis), spec);
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.contract.axes.is_empty()
    }

    pub fn build(&self) -> PlotDataContract {
        self.contract.clone()
    }
}

impl From<PlotDataContract> for ContractBuilder {
    fn from(contract: PlotDataContract) -> Self {
        Self { contract }
    }
}

/// Builds one validated axis spec from raw inputs.
pub fn build_axis_spec(
    labels: Option<TooltipInput>,
    groups: Option<TooltipInput>,
    legend_labels: &[String],
) -> Result<AxisTooltipSpec> {
    let labels = labels
        .map(|input| vector_to_list(input, "labels"))
        .transpose()?;
    let groups = groups
        .map(|input| vector_to_list(input, "groups"))
        .transpose()?;

    if let (Some(labels), Some(groups)) = (&labels, &groups) {
        if labels.len() != groups.len() {
            return Err(Error::LengthMismatch {
                labels: labels.len(),
                groups: groups.len(),
            });
        }
    }

    let legend = legend_labels.iter().cloned().map(Value::String);

    let tooltip_labels = match labels {
        None => Vec::new(),
        Some(mut labels) => {
            labels.extend(legend.clone());
            labels
        }
    };
    let tooltip_groups = match groups {
        None => (0..tooltip_labels.len()).map(Value::from).collect(),
        Some(mut groups) => {
            groups.extend(legend);
            groups
        }
    };

    Ok(AxisTooltipSpec {
        tooltip_labels,
        tooltip_groups,
    })
}
