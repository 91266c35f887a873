//! SVG element classification.
//!
//! Walks a plotting-library SVG, finds the interactive units of every data layer inside each
//! axis container and pairs them positionally with the axis' tooltip entries. The defaults
//! follow matplotlib's SVG backend: axes are `<g id="axes_N">`, scatter points live under
//! `PathCollection_*`, bars under `PolyCollection_*`, filled areas under
//! `FillBetweenPolyCollection_*` and lines under `line2d_*`. Legends are drawn inside the axis
//! container after the data, so legend glyphs pair with the trailing legend-derived entries.

use crate::contract::{AxisTooltipSpec, GroupKey, PlotDataContract, parse_axis_key};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Elements that never form an interactive unit on their own.
const NON_INTERACTIVE_TAGS: &[&str] = &[
    "defs",
    "clipPath",
    "mask",
    "pattern",
    "linearGradient",
    "radialGradient",
    "style",
    "title",
    "desc",
    "metadata",
];

const LEGEND_ID_PREFIX: &str = "legend_";
const LEGEND_TEXT_ID_PREFIX: &str = "text_";

/// Parses SVG text. matplotlib emits a DOCTYPE, so DTDs are allowed.
pub fn parse_svg(svg: &str) -> Result<roxmltree::Document<'_>> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    Ok(roxmltree::Document::parse_with_options(svg, options)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Point,
    Bar,
    Line,
    Area,
}

impl LayerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Area => "area",
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a matched layer container is split into interactive units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitRule {
    /// Every element child except definitions is one unit (one per data point).
    Children,
    /// The container's first `<path>` child (the stroke), or the container itself.
    FirstPath,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerRule {
    pub kind: LayerKind,
    /// Prefix of the `id` of `<g>` containers belonging to this layer.
    pub id_prefix: String,
    pub unit: UnitRule,
    /// Containers nested under a `<g>` whose id starts with one of these prefixes are ignored.
    #[serde(default)]
    pub exclude_within: Vec<String>,
}

impl LayerRule {
    fn new(kind: LayerKind, id_prefix: &str, unit: UnitRule) -> Self {
        Self {
            kind,
            id_prefix: id_prefix.to_string(),
            unit,
            exclude_within: Vec::new(),
        }
    }
}

/// matplotlib layer rules, in the order layers are bound.
pub fn default_layer_rules() -> Vec<LayerRule> {
    let mut lines = LayerRule::new(LayerKind::Line, "line2d", UnitRule::FirstPath);
    // Tick marks and grid lines are `line2d_*` groups too.
    lines.exclude_within.push("matplotlib.axis".to_string());

    vec![
        LayerRule::new(LayerKind::Bar, "PolyCollection_", UnitRule::Children),
        LayerRule::new(LayerKind::Point, "PathCollection", UnitRule::Children),
        lines,
        LayerRule::new(
            LayerKind::Area,
            "FillBetweenPolyCollection",
            UnitRule::Children,
        ),
    ]
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    /// Pair as many units as there are entries; the remainder stays unclassified.
    #[default]
    Skip,
    /// Fail with [`Error::ClassificationMismatch`].
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifyOptions {
    #[serde(default)]
    pub mismatch: MismatchPolicy,
    #[serde(default = "default_layer_rules")]
    pub layers: Vec<LayerRule>,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            mismatch: MismatchPolicy::default(),
            layers: default_layer_rules(),
        }
    }
}

impl ClassifyOptions {
    /// Count mismatches are errors.
    pub fn strict() -> Self {
        Self {
            mismatch: MismatchPolicy::Reject,
            ..Self::default()
        }
    }

    /// Count mismatches skip the excess primitives or entries.
    pub fn lenient() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|err| Error::ContractParse {
            message: format!("classifier options: {err}"),
        })
    }
}

/// Document-unique handle of a classified element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementKey(pub u32);

impl std::fmt::Display for ElementKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Back-reference to an element of the SVG source it was classified from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    pub tag: String,
    pub id: Option<String>,
    /// Byte range of the element in the source text.
    pub range: Range<usize>,
    /// Byte offset right after the tag name of the start tag, where attributes can be inserted.
    pub attr_offset: usize,
}

impl NodeRef {
    fn from_node(source: &str, node: roxmltree::Node<'_, '_>) -> Self {
        let range = node.range();
        Self {
            tag: node.tag_name().name().to_string(),
            id: node.attribute("id").map(str::to_string),
            attr_offset: start_tag_name_end(source, range.start),
            range,
        }
    }
}

fn start_tag_name_end(source: &str, start: usize) -> usize {
    let bytes = source.as_bytes();
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b' ' | b'\t' | b'\r' | b'\n' | b'/' | b'>' => break,
            _ => i += 1,
        }
    }
    i
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedElement {
    pub key: ElementKey,
    /// 1-based axis number (`axes_1` is 1).
    pub axis_index: usize,
    pub layer: LayerKind,
    pub tooltip_index: usize,
    pub group: GroupKey,
    /// True for legend glyphs.
    pub legend: bool,
    pub node: NodeRef,
}

/// A unit that was found but left without tooltip entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnclassifiedPrimitive {
    pub axis_index: usize,
    pub layer: LayerKind,
    pub ordinal: usize,
    pub legend: bool,
    pub node: NodeRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSummary {
    pub axis: String,
    pub layer: LayerKind,
    pub primitives: usize,
    pub entries: usize,
    pub classified: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub elements: Vec<ClassifiedElement>,
    pub unclassified: Vec<UnclassifiedPrimitive>,
    pub layers: Vec<LayerSummary>,
}

impl Classification {
    pub fn for_axis(&self, axis_index: usize) -> impl Iterator<Item = &ClassifiedElement> {
        self.elements
            .iter()
            .filter(move |el| el.axis_index == axis_index)
    }
}

/// An axis container found in the SVG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisInfo {
    /// 1-based axis number.
    pub index: usize,
    pub id: String,
    pub legend_labels: Vec<String>,
}

/// Lists the axis containers of an SVG in document order, with their legend labels.
pub fn discover_axes(svg: &str) -> Result<Vec<AxisInfo>> {
    let doc = parse_svg(svg)?;
    let mut out = Vec::new();
    for node in doc.descendants().filter(|n| n.has_tag_name("g")) {
        let Some(id) = node.attribute("id") else {
            continue;
        };
        let Some(index) = parse_axis_key(id) else {
            continue;
        };
        out.push(AxisInfo {
            index,
            id: id.to_string(),
            legend_labels: legend_labels_in(node),
        });
    }
    Ok(out)
}

/// Legend handle labels of the axis with 1-based number `axis_index`, in legend order.
///
/// matplotlib writes every legend text as `<g id="text_*">` whose first comment holds the raw
/// label. An axis without legend yields an empty list.
pub fn legend_labels(svg: &str, axis_index: usize) -> Result<Vec<String>> {
    let doc = parse_svg(svg)?;
    let axis = crate::contract::axis_key(axis_index.saturating_sub(1));
    let Some(container) = find_axis_container(&doc, &axis) else {
        return Err(Error::MissingAxisContainer { axis });
    };
    Ok(legend_labels_in(container))
}

fn legend_labels_in(axis: roxmltree::Node<'_, '_>) -> Vec<String> {
    let Some(legend) = axis
        .descendants()
        .find(|n| n.has_tag_name("g") && id_starts_with(*n, LEGEND_ID_PREFIX))
    else {
        return Vec::new();
    };

    legend
        .descendants()
        .filter(|n| n.has_tag_name("g") && id_starts_with(*n, LEGEND_TEXT_ID_PREFIX))
        .filter_map(|text| {
            text.children()
                .find(|c| c.is_comment())
                .and_then(|c| c.text())
                .map(|t| t.trim().to_string())
        })
        .filter(|label| !label.is_empty())
        .collect()
}

fn id_starts_with(node: roxmltree::Node<'_, '_>, prefix: &str) -> bool {
    node.attribute("id").is_some_and(|id| id.starts_with(prefix))
}

fn find_axis_container<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
    axis: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    doc.descendants()
        .find(|n| n.has_tag_name("g") && n.attribute("id") == Some(axis))
}

/// True if some `<g>` strictly between `node` and `stop` has an id starting with a prefix.
fn within_prefixed_group(
    node: roxmltree::Node<'_, '_>,
    stop: roxmltree::Node<'_, '_>,
    prefixes: &[String],
) -> bool {
    node.ancestors()
        .skip(1)
        .take_while(|a| *a != stop)
        .any(|a| {
            a.has_tag_name("g")
                && a
                    .attribute("id")
                    .is_some_and(|id| prefixes.iter().any(|p| id.starts_with(p.as_str())))
        })
}

fn is_interactive_child(node: &roxmltree::Node<'_, '_>) -> bool {
    node.is_element()
        && !NON_INTERACTIVE_TAGS
            .iter()
            .any(|tag| node.has_tag_name(*tag))
}

/// Finds the interactive units of one layer inside an axis container, in document order.
fn layer_units<'a, 'input>(
    axis: roxmltree::Node<'a, 'input>,
    rule: &LayerRule,
) -> Vec<roxmltree::Node<'a, 'input>> {
    let own_prefix = [rule.id_prefix.clone()];
    let mut units = Vec::new();

    for container in axis.descendants().skip(1) {
        if !container.has_tag_name("g") || !id_starts_with(container, &rule.id_prefix) {
            continue;
        }
        // Nested containers of the same layer are reached through their parent.
        if within_prefixed_group(container, axis, &own_prefix) {
            continue;
        }
        if within_prefixed_group(container, axis, &rule.exclude_within) {
            continue;
        }

        match rule.unit {
            UnitRule::Children => {
                units.extend(container.children().filter(is_interactive_child));
            }
            UnitRule::FirstPath => {
                let unit = container
                    .children()
                    .find(|c| c.has_tag_name("path"))
                    .unwrap_or(container);
                units.push(unit);
            }
        }
    }

    units
}

fn is_legend_unit(node: roxmltree::Node<'_, '_>, axis: roxmltree::Node<'_, '_>) -> bool {
    within_prefixed_group(node, axis, &[LEGEND_ID_PREFIX.to_string()])
}

/// Classifies every axis named by the contract.
///
/// Element keys are assigned in classification order (contract axis order, then layer rule
/// order, then document order) and are unique within the result.
pub fn classify(
    svg: &str,
    contract: &PlotDataContract,
    options: &ClassifyOptions,
) -> Result<Classification> {
    contract.validate()?;
    let doc = parse_svg(svg)?;
    let mut out = Classification::default();
    let mut next_key: u32 = 0;

    for (axis_id, spec) in &contract.axes {
        let axis_index = parse_axis_key(axis_id).ok_or_else(|| Error::ContractParse {
            message: format!("axis key `{axis_id}` does not match `axes_<n>`"),
        })?;
        let container =
            find_axis_container(&doc, axis_id).ok_or_else(|| Error::MissingAxisContainer {
                axis: axis_id.clone(),
            })?;

        classify_axis(
            svg,
            container,
            axis_id,
            axis_index,
            spec,
            options,
            &mut next_key,
            &mut out,
        )?;
    }

    tracing::debug!(
        classified = out.elements.len(),
        unclassified = out.unclassified.len(),
        "svg classification finished"
    );
    Ok(out)
}

#[allow(clippy::too_many_arguments)]
fn classify_axis(
    svg: &str,
    container: roxmltree::Node<'_, '_>,
    axis_id: &str,
    axis_index: usize,
    spec: &AxisTooltipSpec,
    options: &ClassifyOptions,
    next_key: &mut u32,
    out: &mut Classification,
) -> Result<()> {
    let entries = spec.entry_count();

    for rule in &options.layers {
        let units = layer_units(container, rule);
        if units.is_empty() {
            continue;
        }

        let paired = if entries == 0 {
            0
        } else if units.len() == entries {
            entries
        } else {
            match options.mismatch {
                MismatchPolicy::Reject => {
                    return Err(Error::ClassificationMismatch {
                        axis: axis_id.to_string(),
                        layer: rule.kind.as_str(),
                        primitives: units.len(),
                        entries,
                    });
                }
                MismatchPolicy::Skip => {
                    tracing::warn!(
                        axis = axis_id,
                        layer = rule.kind.as_str(),
                        primitives = units.len(),
                        entries,
                        "primitive count does not match tooltip entries; skipping the remainder"
                    );
                    units.len().min(entries)
                }
            }
        };

        for (ordinal, unit) in units.iter().enumerate() {
            let legend = is_legend_unit(*unit, container);
            let node = NodeRef::from_node(svg, *unit);
            let group = if ordinal < paired {
                spec.group_key(ordinal)
            } else {
                None
            };
            if let Some(group) = group {
                out.elements.push(ClassifiedElement {
                    key: ElementKey(*next_key),
                    axis_index,
                    layer: rule.kind,
                    tooltip_index: ordinal,
                    group,
                    legend,
                    node,
                });
                *next_key += 1;
            } else {
                out.unclassified.push(UnclassifiedPrimitive {
                    axis_index,
                    layer: rule.kind,
                    ordinal,
                    legend,
                    node,
                });
            }
        }

        out.layers.push(LayerSummary {
            axis: axis_id.to_string(),
            layer: rule.kind,
            primitives: units.len(),
            entries,
            classified: paired,
        });
    }

    Ok(())
}
