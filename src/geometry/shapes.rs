// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The shapes a diagram is drawn with.

use super::{Point, Ribbon};

/// Which flow a shape belongs to.  Hosts use it to pick a style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowClass {
    Generation,
    Grid,
    Battery,
    BatteryIn,
    Consumer,
    Tint,
    GridOutArrow,
    Extra,
}

impl std::fmt::Display for FlowClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FlowClass::Generation => "generation",
            FlowClass::Grid => "grid",
            FlowClass::Battery => "battery",
            FlowClass::BatteryIn => "battery-in",
            FlowClass::Consumer => "consumer",
            FlowClass::Tint => "tint",
            FlowClass::GridOutArrow => "grid-out-arrow",
            FlowClass::Extra => "extra",
        };
        write!(f, "{s}")
    }
}

/// An axis-aligned rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// The direction a [`BlendRect`] gradient runs in, from its start color to
/// its end color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GradientDirection {
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

/// A rectangle filled with a linear gradient between two colors.
///
/// The id is unique within a diagram, so hosts can use it to name the
/// gradient definition.
#[derive(Clone, Debug, PartialEq)]
pub struct BlendRect {
    pub id: String,
    pub rect: Rect,
    pub direction: GradientDirection,
    pub start_color: String,
    pub end_color: String,
}

/// A single drawable element.
///
/// `color` is `None` for shapes that take their color from their
/// [`FlowClass`] style alone.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Ribbon {
        ribbon: Ribbon,
        class: FlowClass,
        color: Option<String>,
    },
    Rect {
        rect: Rect,
        class: FlowClass,
        color: Option<String>,
    },
    Polygon {
        points: Vec<Point>,
        class: FlowClass,
        color: Option<String>,
    },
    BlendRect(BlendRect),
}

impl Shape {
    /// The flow class of the shape, if it has one.
    pub fn class(&self) -> Option<FlowClass> {
        match self {
            Shape::Ribbon { class, .. } | Shape::Rect { class, .. } | Shape::Polygon { class, .. } => {
                Some(*class)
            }
            Shape::BlendRect(_) => None,
        }
    }
}

/// Builds a gradient rectangle between two parallel cross-sections.
///
/// Only axis-aligned blends are supported: both cross-sections must be
/// vertical, giving a horizontal gradient, or both horizontal, giving a
/// vertical gradient.  Anything else is logged and yields `None`.
pub fn blend_rect(
    id: impl Into<String>,
    start_left: Point,
    start_right: Point,
    end_left: Point,
    end_right: Point,
    start_color: impl Into<String>,
    end_color: impl Into<String>,
) -> Option<BlendRect> {
    let vertical_sections = start_left.x == start_right.x && end_left.x == end_right.x;
    let horizontal_sections = start_left.y == start_right.y && end_left.y == end_right.y;

    let (width, height, direction) = if vertical_sections {
        let direction = if start_left.x < end_left.x {
            GradientDirection::LeftToRight
        } else {
            GradientDirection::RightToLeft
        };
        (
            (start_left.x - end_left.x).abs(),
            (start_left.y - start_right.y).abs(),
            direction,
        )
    } else if horizontal_sections {
        let direction = if start_left.y < end_left.y {
            GradientDirection::TopToBottom
        } else {
            GradientDirection::BottomToTop
        };
        (
            (start_left.x - start_right.x).abs(),
            (start_left.y - end_left.y).abs(),
            direction,
        )
    } else {
        tracing::warn!(
            "Unsupported blend dimensions {start_left:?}/{start_right:?} to \
             {end_left:?}/{end_right:?}, only horizontal or vertical blends are supported."
        );
        return None;
    };

    let corners = [start_left, start_right, end_left, end_right];
    let x = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let y = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);

    Some(BlendRect {
        id: id.into(),
        rect: Rect::new(x, y, width, height),
        direction,
        start_color: start_color.into(),
        end_color: end_color.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_blend() {
        // Vertical cross-sections at x=10 and x=40, flowing right.
        let blend = blend_rect(
            "b0",
            Point::new(10.0, 0.0),
            Point::new(10.0, 20.0),
            Point::new(40.0, 0.0),
            Point::new(40.0, 20.0),
            "#000000",
            "#ffffff",
        )
        .unwrap();
        assert_eq!(blend.rect, Rect::new(10.0, 0.0, 30.0, 20.0));
        assert_eq!(blend.direction, GradientDirection::LeftToRight);

        let blend = blend_rect(
            "b1",
            Point::new(40.0, 20.0),
            Point::new(40.0, 0.0),
            Point::new(10.0, 20.0),
            Point::new(10.0, 0.0),
            "#000000",
            "#ffffff",
        )
        .unwrap();
        assert_eq!(blend.rect, Rect::new(10.0, 0.0, 30.0, 20.0));
        assert_eq!(blend.direction, GradientDirection::RightToLeft);
    }

    #[test]
    fn test_vertical_blend() {
        let blend = blend_rect(
            "b0",
            Point::new(15.0, 100.0),
            Point::new(5.0, 100.0),
            Point::new(15.0, 130.0),
            Point::new(5.0, 130.0),
            "#000000",
            "#ffffff",
        )
        .unwrap();
        assert_eq!(blend.rect, Rect::new(5.0, 100.0, 10.0, 30.0));
        assert_eq!(blend.direction, GradientDirection::TopToBottom);
        assert_eq!(blend.start_color, "#000000");
    }

    #[test]
    fn test_diagonal_blend_is_rejected() {
        assert!(blend_rect(
            "b0",
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(30.0, 0.0),
            Point::new(40.0, 10.0),
            "#000000",
            "#ffffff",
        )
        .is_none());
    }

    #[test]
    fn test_flow_class_display() {
        assert_eq!(FlowClass::BatteryIn.to_string(), "battery-in");
        assert_eq!(FlowClass::GridOutArrow.to_string(), "grid-out-arrow");
    }
}
