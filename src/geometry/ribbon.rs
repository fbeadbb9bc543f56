// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Corner-to-corner flow ribbons.
//!
//! Rather than drawing a constant-width curve between two points, a ribbon
//! joins the two corners of a start cross-section to the two corners of an
//! end cross-section with a 4-corner bezier patch.  Each control point is
//! where the perpendicular to its cross-section meets the "mirror" line
//! halfway between start and end.  Sharp changes of direction, like a flow
//! fanning out from vertical to horizontal, then never overlap their
//! neighbours.

use super::Point;

/// Cross-sections shorter than this are too narrow to draw a curve for.
const MIN_CROSS_SECTION_LENGTH: f64 = 0.5;

/// Line pairs whose intersection denominator is below this are parallel.
const PARALLEL_EPSILON: f64 = 1e-12;

/// Where two (infinite) lines meet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    pub point: Point,
    /// True if the point lies within the first segment.
    pub on_first: bool,
    /// True if the point lies within the second segment.
    pub on_second: bool,
}

/// Intersects the line through `a1` and `a2` with the line through `b1` and
/// `b2`, extrapolating beyond the segments where needed.
///
/// Returns `None` for parallel lines.
pub fn line_intersect(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Intersection> {
    let denom = (b2.y - b1.y) * (a2.x - a1.x) - (b2.x - b1.x) * (a2.y - a1.y);
    if denom.abs() < PARALLEL_EPSILON {
        tracing::warn!("Lines do not intersect: {a1:?}->{a2:?}, {b1:?}->{b2:?}.");
        return None;
    }
    let ua = ((b2.x - b1.x) * (a1.y - b1.y) - (b2.y - b1.y) * (a1.x - b1.x)) / denom;
    let ub = ((a2.x - a1.x) * (a1.y - b1.y) - (a2.y - a1.y) * (a1.x - b1.x)) / denom;
    Some(Intersection {
        point: Point::new(a1.x + ua * (a2.x - a1.x), a1.y + ua * (a2.y - a1.y)),
        on_first: (0.0..=1.0).contains(&ua),
        on_second: (0.0..=1.0).contains(&ub),
    })
}

/// A closed bezier patch between two cross-sections.
#[derive(Clone, Debug, PartialEq)]
pub struct Ribbon {
    pub start_left: Point,
    pub start_right: Point,
    pub end_left: Point,
    pub end_right: Point,
    pub start_left_ctrl: Point,
    pub start_right_ctrl: Point,
    pub end_left_ctrl: Point,
    pub end_right_ctrl: Point,
}

impl Ribbon {
    /// The outline as path data: the left edge as a cubic curve from start
    /// to end, a straight end cap, and the right edge back as a cubic curve.
    pub fn path_data(&self) -> String {
        let p = |p: &Point| format!("{},{}", p.x, p.y);
        format!(
            "M {} C {} {} {} L {} C {} {} {} Z",
            p(&self.start_left),
            p(&self.start_left_ctrl),
            p(&self.end_left_ctrl),
            p(&self.end_left),
            p(&self.end_right),
            p(&self.end_right_ctrl),
            p(&self.start_right_ctrl),
            p(&self.start_right),
        )
    }
}

/// Builds the ribbon joining the start cross-section (`start_left`,
/// `start_right`) to the end cross-section (`end_left`, `end_right`).
///
/// Returns `None` when either cross-section is too narrow to draw, or when a
/// control point can't be found because a perpendicular runs parallel to the
/// mirror line.  The latter is logged.
pub fn flow_by_corners(
    start_left: Point,
    start_right: Point,
    end_left: Point,
    end_right: Point,
) -> Option<Ribbon> {
    if start_left.distance(&start_right) < MIN_CROSS_SECTION_LENGTH
        || end_left.distance(&end_right) < MIN_CROSS_SECTION_LENGTH
    {
        return None;
    }

    let mirror_a = start_left.midpoint(&end_left);
    let mirror_b = start_right.midpoint(&end_right);

    let start_perp = Point::new(
        -(start_right.y - start_left.y),
        start_right.x - start_left.x,
    );
    let end_perp = Point::new(end_right.y - end_left.y, -(end_right.x - end_left.x));
    let along = |from: Point, dir: Point| Point::new(from.x + dir.x, from.y + dir.y);

    let ctrl = |corner: Point, dir: Point| {
        line_intersect(corner, along(corner, dir), mirror_a, mirror_b).map(|i| i.point)
    };

    match (
        ctrl(start_left, start_perp),
        ctrl(end_left, end_perp),
        ctrl(end_right, end_perp),
        ctrl(start_right, start_perp),
    ) {
        (Some(start_left_ctrl), Some(end_left_ctrl), Some(end_right_ctrl), Some(start_right_ctrl)) => {
            Some(Ribbon {
                start_left,
                start_right,
                end_left,
                end_right,
                start_left_ctrl,
                start_right_ctrl,
                end_left_ctrl,
                end_right_ctrl,
            })
        }
        _ => {
            tracing::warn!(
                "Can't construct flow from {start_left:?}/{start_right:?} to {end_left:?}/{end_right:?}."
            );
            None
        }
    }
}
