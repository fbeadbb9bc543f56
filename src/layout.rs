// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Turns reconciled flows into positioned shapes.
//!
//! A diagram is drawn into four panes, left to right:
//!
//! - `left`: generation sources at the top, the grid at the left edge, the
//!   batteries at the bottom, and all flows between them, converging on the
//!   right edge where they leave for the consumers.
//! - `mid`: gradients blending each source's color into the common consumer
//!   color.
//! - `right`: the consumer fan-out.
//! - `far_right`: consumer extras and arrowheads.
//!
//! All panes share the same vertical coordinate space.  The left pane is
//! meant to be displayed [`SVG_LHS_VISIBLE_WIDTH`] pixels wide, which fixes
//! the horizontal scale that label hints are given in.

mod draw;
mod labels;
mod landmarks;

pub(crate) use draw::Painter;
pub(crate) use labels::LabelMaker;
pub use labels::{LabelHint, LabelKind};
pub use landmarks::{BlendColors, Landmarks};

use crate::{
    flows::{FlowWidths, Scale},
    geometry::Shape,
    ReconciledFlows, Route,
};

/// Height of the generation terminators at the top of the left pane.
pub const TERMINATOR_BLOCK_LENGTH: f64 = 50.0;
/// Horizontal gap between generation sources, in pixels.
pub const GENERATION_FAN_OUT_HORIZONTAL_GAP: f64 = 50.0;
/// Vertical gap between consumer branches, in pixels.
pub const CONSUMERS_FAN_OUT_VERTICAL_GAP: f64 = 50.0;
/// Vertical gap between battery branches, in pixels.
pub const BATTERIES_FAN_OUT_VERTICAL_GAP: f64 = 70.0;
/// Height reserved for each consumer label, in pixels.
pub const CONSUMER_LABEL_HEIGHT: f64 = 50.0;
/// Padding is the widest flow times this.
pub const PAD_MULTIPLIER: f64 = 1.8;
/// Minimum flow width that padding is derived from.
pub const MIN_PAD_WIDTH: f64 = 30.0;
pub const CONSUMER_BLEND_LENGTH: f64 = 80.0;
pub const CONSUMER_BLEND_LENGTH_PRE_FAN_OUT: f64 = 20.0;
pub const GRID_BLEND_LENGTH: f64 = 30.0;
pub const BATTERY_BLEND_LENGTH: f64 = 30.0;
pub const ARROW_HEAD_LENGTH: f64 = 10.0;
pub const TEXT_PADDING: f64 = 8.0;
pub const FONT_SIZE_PX: f64 = 16.0;
pub const ICON_SIZE_PX: f64 = 24.0;
/// Pixel width the left pane is displayed at.
pub const SVG_LHS_VISIBLE_WIDTH: f64 = 110.0;
/// Overlap between adjacent shapes, hiding antialiasing seams.
pub const PAD_ANTIALIAS: f64 = 0.5;
/// Width of the `mid` and `right` panes.
pub const FAN_PANE_WIDTH: f64 = 100.0;
/// Space left below the battery labels.
pub const BOTTOM_MARGIN: f64 = 30.0;

/// The shapes of one pane, in drawing order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pane {
    pub width: f64,
    pub height: f64,
    pub shapes: Vec<Shape>,
}

impl Pane {
    pub(crate) fn new(width: f64, height: f64, shapes: Vec<Shape>) -> Self {
        Self {
            width,
            height,
            shapes,
        }
    }
}

/// A fully laid out diagram.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagram {
    pub flows: ReconciledFlows,
    pub scale: Scale,
    pub widths: FlowWidths,
    pub landmarks: Landmarks,
    pub colors: BlendColors,
    /// The consumer branches in fan-out order, the untracked consumer last.
    pub consumers: Vec<Route>,
    pub left: Pane,
    pub mid: Pane,
    pub right: Pane,
    pub far_right: Pane,
    pub labels: Vec<LabelHint>,
    /// The height shared by all panes.
    pub height: f64,
}

impl Diagram {
    /// The panes, left to right.
    pub fn panes(&self) -> [&Pane; 4] {
        [&self.left, &self.mid, &self.right, &self.far_right]
    }
}
