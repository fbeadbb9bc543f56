// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Geometry primitives that the layout engine emits.
//!
//! All coordinates are plain numbers in the coordinate space of the pane the
//! shape is drawn into.  Nothing here knows about SVG; see
//! [`Diagram::to_svg`][crate::Diagram::to_svg] for that.

mod ribbon;
mod shapes;

pub use ribbon::{flow_by_corners, line_intersect, Intersection, Ribbon};
pub use shapes::{blend_rect, BlendRect, FlowClass, GradientDirection, Rect, Shape};

/// A point in a pane's coordinate space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}
