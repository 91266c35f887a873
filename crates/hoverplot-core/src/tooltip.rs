//! Tooltip state machine.
//!
//! The machine reacts to pointer events on classified elements. It owns the tooltip state
//! (`Hidden` or `Visible`) and the set of highlighted elements; element data is looked up
//! through [`HoverTable`] so the machine never holds references into a document.

use crate::classify::ElementKey;
use crate::contract::GroupKey;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Visible page region, in the same coordinates as pointer events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }
}

/// Deterministic tooltip box estimate used for viewport clamping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TooltipMetrics {
    pub char_width: f64,
    pub line_height: f64,
    pub padding: f64,
}

impl Default for TooltipMetrics {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            line_height: 18.0,
            padding: 8.0,
        }
    }
}

impl TooltipMetrics {
    /// Estimates the rendered size of `content`. Markup tags are not counted; `<br>` and
    /// newlines start a new line.
    pub fn estimate(&self, content: &str) -> Size {
        let mut lines = vec![0usize];
        let mut chars = content.chars();
        while let Some(ch) = chars.next() {
            match ch {
                '\n' => lines.push(0),
                '<' => {
                    let mut tag = String::new();
                    for c in chars.by_ref() {
                        if c == '>' {
                            break;
                        }
                        tag.push(c);
                    }
                    let tag = tag.trim().trim_end_matches('/').trim().to_ascii_lowercase();
                    if tag == "br" {
                        lines.push(0);
                    }
                }
                _ => {
                    if let Some(last) = lines.last_mut() {
                        *last += 1;
                    }
                }
            }
        }

        let widest = lines.iter().copied().max().unwrap_or(0) as f64;
        Size {
            width: widest * self.char_width + 2.0 * self.padding,
            height: lines.len() as f64 * self.line_height + 2.0 * self.padding,
        }
    }
}

/// Places the tooltip at `pointer + shift`, flipping to the other side of the pointer when the
/// box would overflow the viewport's right/bottom edge, then clamping into the viewport.
pub fn place_tooltip(
    pointer: Point,
    shift: (f64, f64),
    size: Size,
    viewport: Option<&Viewport>,
) -> Point {
    let x = pointer.x + shift.0;
    let y = pointer.y + shift.1;
    let Some(vp) = viewport else {
        return Point::new(x, y);
    };
    Point::new(
        place_axis(x, pointer.x - shift.0 - size.width, size.width, vp.left, vp.width),
        place_axis(y, pointer.y - shift.1 - size.height, size.height, vp.top, vp.height),
    )
}

fn place_axis(preferred: f64, flipped: f64, extent: f64, start: f64, length: f64) -> f64 {
    let end = start + length;
    let pos = if preferred + extent > end {
        flipped
    } else {
        preferred
    };
    pos.min(end - extent).max(start)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibleTooltip {
    pub target: ElementKey,
    /// `None` when the element's axis carries no label (highlight only).
    pub content: Option<String>,
    pub group: GroupKey,
    pub position: Point,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum TooltipState {
    #[default]
    Hidden,
    Visible(VisibleTooltip),
}

impl TooltipState {
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Visible(_))
    }

    pub fn visible(&self) -> Option<&VisibleTooltip> {
        match self {
            Self::Visible(v) => Some(v),
            Self::Hidden => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Enter { target: ElementKey, at: Point },
    Move { target: ElementKey, at: Point },
    Leave { target: ElementKey },
}

impl PointerEvent {
    pub fn target(&self) -> ElementKey {
        match *self {
            Self::Enter { target, .. } | Self::Move { target, .. } | Self::Leave { target } => {
                target
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    Shown,
    Moved,
    Hidden,
    Ignored,
}

/// Visual state of one classified element (CSS `hovered` / `not-hovered`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementVisual {
    Idle,
    Hovered,
    Dimmed,
}

impl ElementVisual {
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            Self::Idle => None,
            Self::Hovered => Some("hovered"),
            Self::Dimmed => Some("not-hovered"),
        }
    }
}

/// What the machine needs to know about a classified element.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverTarget<'a> {
    pub content: Option<String>,
    pub group: &'a GroupKey,
}

pub trait HoverTable {
    fn hover_target(&self, key: ElementKey) -> Option<HoverTarget<'_>>;
    /// Every element sharing `group`, across all axes.
    fn group_members(&self, group: &GroupKey) -> &[ElementKey];
}

#[derive(Debug, Clone, Default)]
pub struct TooltipMachine {
    state: TooltipState,
    highlighted: FxHashSet<ElementKey>,
    shift: (f64, f64),
    metrics: TooltipMetrics,
    viewport: Option<Viewport>,
}

impl TooltipMachine {
    pub fn new(shift: (i64, i64), metrics: TooltipMetrics, viewport: Option<Viewport>) -> Self {
        Self {
            state: TooltipState::Hidden,
            highlighted: FxHashSet::default(),
            shift: (shift.0 as f64, shift.1 as f64),
            metrics,
            viewport,
        }
    }

    pub fn state(&self) -> &TooltipState {
        &self.state
    }

    pub fn set_viewport(&mut self, viewport: Option<Viewport>) {
        self.viewport = viewport;
    }

    pub fn is_highlighted(&self, key: ElementKey) -> bool {
        self.highlighted.contains(&key)
    }

    pub fn highlighted_count(&self) -> usize {
        self.highlighted.len()
    }

    /// Visual state of a classified element.
    pub fn visual(&self, key: ElementKey) -> ElementVisual {
        if !self.state.is_visible() {
            ElementVisual::Idle
        } else if self.highlighted.contains(&key) {
            ElementVisual::Hovered
        } else {
            ElementVisual::Dimmed
        }
    }

    /// Back to `Hidden` with nothing highlighted.
    pub fn reset(&mut self) {
        self.state = TooltipState::Hidden;
        self.highlighted.clear();
    }

    pub fn handle(&mut self, table: &impl HoverTable, event: PointerEvent) -> Transition {
        match event {
            PointerEvent::Enter { target, at } => self.enter(table, target, at),
            PointerEvent::Move { target, at } => self.move_to(target, at),
            PointerEvent::Leave { target } => self.leave(table, target),
        }
    }

    fn enter(&mut self, table: &impl HoverTable, target: ElementKey, at: Point) -> Transition {
        let Some(hover) = table.hover_target(target) else {
            return Transition::Ignored;
        };

        self.highlighted.clear();
        self.highlighted
            .extend(table.group_members(hover.group).iter().copied());
        self.highlighted.insert(target);

        let position = self.position_for(hover.content.as_deref(), at);
        self.state = TooltipState::Visible(VisibleTooltip {
            target,
            content: hover.content,
            group: hover.group.clone(),
            position,
        });
        Transition::Shown
    }

    fn move_to(&mut self, target: ElementKey, at: Point) -> Transition {
        let position = match &self.state {
            TooltipState::Visible(v) if v.target == target => {
                self.position_for(v.content.as_deref(), at)
            }
            _ => return Transition::Ignored,
        };
        if let TooltipState::Visible(v) = &mut self.state {
            v.position = position;
        }
        Transition::Moved
    }

    fn leave(&mut self, table: &impl HoverTable, target: ElementKey) -> Transition {
        if table.hover_target(target).is_none() || !self.state.is_visible() {
            return Transition::Ignored;
        }
        self.reset();
        Transition::Hidden
    }

    fn position_for(&self, content: Option<&str>, at: Point) -> Point {
        let size = content
            .map(|c| self.metrics.estimate(c))
            .unwrap_or_default();
        place_tooltip(at, self.shift, size, self.viewport.as_ref())
    }
}
