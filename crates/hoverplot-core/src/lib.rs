#![forbid(unsafe_code)]

//! Headless core of hoverplot: the tooltip data contract, the SVG element classifier and the
//! tooltip state machine that turn a static plot SVG into an interactive chart.
//!
//! Design goals:
//! - deterministic, testable outputs (no DOM, no browser required)
//! - single pass, synchronous: every operation is bounded by the SVG size
//! - explicit index metadata: classified elements are written back as `data-hp-*` attributes

pub mod annotate;
pub mod classify;
pub mod contract;
pub mod error;
pub mod input;
pub mod runtime;
pub mod tooltip;

pub use annotate::{annotate_svg, error_marker};
pub use classify::{
    AxisInfo, Classification, ClassifiedElement, ClassifyOptions, ElementKey, LayerKind,
    LayerRule, MismatchPolicy, UnitRule, classify, discover_axes, legend_labels,
};
pub use contract::{
    AxisTooltipSpec, ContractBuilder, GroupKey, PlotDataContract, TooltipArgs, axis_key,
};
pub use error::{Error, Result};
pub use input::{TooltipInput, vector_to_list};
pub use runtime::{Runtime, RuntimeOptions};
pub use tooltip::{
    ElementVisual, Point, PointerEvent, TooltipMachine, TooltipMetrics, TooltipState, Transition,
    Viewport,
};
