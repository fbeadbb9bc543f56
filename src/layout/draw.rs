// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Emits the shapes and label hints of a diagram.

use super::{
    labels::LabelMaker, BlendColors, LabelHint, LabelKind, Landmarks, ARROW_HEAD_LENGTH,
    BATTERIES_FAN_OUT_VERTICAL_GAP, BOTTOM_MARGIN, CONSUMERS_FAN_OUT_VERTICAL_GAP,
    CONSUMER_BLEND_LENGTH, CONSUMER_BLEND_LENGTH_PRE_FAN_OUT, CONSUMER_LABEL_HEIGHT,
    FAN_PANE_WIDTH, FONT_SIZE_PX, GENERATION_FAN_OUT_HORIZONTAL_GAP, ICON_SIZE_PX,
    PAD_ANTIALIAS, TERMINATOR_BLOCK_LENGTH, TEXT_PADDING,
};
use crate::{
    config::ParsedPalette,
    flows::{FlowWidths, Scale, OTHER_ID, UNTRACKED_ID},
    geometry::{blend_rect, flow_by_corners, FlowClass, Point, Rect, Shape},
    render_traits::ExtrasRenderer,
    FlowSnapshot, Icon, ReconciledFlows, Route, RouteMap,
};

/// Height reserved for a grid or battery label, in pixels.
const SOURCE_LABEL_HEIGHT: f64 = ICON_SIZE_PX + TEXT_PADDING + FONT_SIZE_PX * 2.0;

fn ribbon(
    start_left: (f64, f64),
    start_right: (f64, f64),
    end_left: (f64, f64),
    end_right: (f64, f64),
    class: FlowClass,
    color: Option<String>,
) -> Option<Shape> {
    flow_by_corners(
        start_left.into(),
        start_right.into(),
        end_left.into(),
        end_right.into(),
    )
    .map(|ribbon| Shape::Ribbon {
        ribbon,
        class,
        color,
    })
}

fn rect(x: f64, y: f64, width: f64, height: f64, class: FlowClass, color: Option<String>) -> Shape {
    Shape::Rect {
        rect: Rect::new(x, y, width, height),
        class,
        color,
    }
}

fn polygon(points: [(f64, f64); 3], class: FlowClass, color: Option<String>) -> Shape {
    Shape::Polygon {
        points: points.into_iter().map(Point::from).collect(),
        class,
        color,
    }
}

fn blend(
    id: &str,
    start_left: (f64, f64),
    start_right: (f64, f64),
    end_left: (f64, f64),
    end_right: (f64, f64),
    start_color: String,
    end_color: String,
) -> Option<Shape> {
    blend_rect(
        id,
        start_left.into(),
        start_right.into(),
        end_left.into(),
        end_right.into(),
        start_color,
        end_color,
    )
    .map(Shape::BlendRect)
}

/// The shapes and labels of one frame.
pub(crate) struct Painted {
    pub(crate) left: Vec<Shape>,
    pub(crate) mid: Vec<Shape>,
    pub(crate) right: Vec<Shape>,
    pub(crate) far_right: Vec<Shape>,
    pub(crate) labels: Vec<LabelHint>,
    pub(crate) height: f64,
}

/// Draws one frame.  Holds everything the individual draw steps share.
pub(crate) struct Painter<'a> {
    pub(crate) snapshot: &'a FlowSnapshot,
    pub(crate) flows: &'a ReconciledFlows,
    pub(crate) scale: Scale,
    pub(crate) widths: &'a FlowWidths,
    pub(crate) landmarks: &'a Landmarks,
    pub(crate) colors: &'a BlendColors,
    pub(crate) palette: &'a ParsedPalette,
    pub(crate) extras: &'a dyn ExtrasRenderer,
    pub(crate) labels: LabelMaker<'a>,
}

impl Painter<'_> {
    pub(crate) fn paint(&self, grouped_consumers: &RouteMap<Route>) -> Painted {
        let mut labels = Vec::new();

        let mut left = Vec::new();
        self.generation_fan(&mut left, &mut labels);
        self.generation_to_consumers(&mut left);
        self.generation_to_grid(&mut left);
        self.grid_out(&mut left);
        self.generation_to_batteries(&mut left);
        self.grid_to_batteries(&mut left);
        self.batteries_to_grid_blend(&mut left);
        self.grid_in(&mut left, &mut labels);
        self.grid_to_consumers(&mut left);
        self.batteries_to_consumers(&mut left);
        self.batteries_to_grid(&mut left);
        let batteries_bottom = self.battery_fan(&mut left, &mut labels);

        let mid = self.consumer_blends();

        let mut right = Vec::new();
        let mut far_right = Vec::new();
        let consumers_bottom =
            self.consumer_fan(grouped_consumers, &mut right, &mut far_right, &mut labels);

        let height = [consumers_bottom, batteries_bottom + BOTTOM_MARGIN]
            .into_iter()
            .fold(self.landmarks.y4, f64::max);

        Painted {
            left,
            mid,
            right,
            far_right,
            labels,
            height,
        }
    }

    fn generation_color(&self) -> String {
        self.palette.generation.to_string()
    }

    fn grid_color(&self) -> String {
        self.palette.grid_in.to_string()
    }

    fn battery_color(&self) -> String {
        self.palette.battery_in.to_string()
    }

    /// Scaled length of the arrowheads at the edges of the left pane.
    fn arrow_head_length(&self) -> f64 {
        ARROW_HEAD_LENGTH / self.landmarks.svg_scale_x
    }

    /// One terminator per generation source at the top, merging into the
    /// generation trunk at `x0`.
    fn generation_fan(&self, shapes: &mut Vec<Shape>, labels: &mut Vec<LabelHint>) {
        let l = self.landmarks;
        let gap = GENERATION_FAN_OUT_HORIZONTAL_GAP / l.svg_scale_x;
        let has_phantom = self.flows.phantom_generation.is_some();

        let mut routes: Vec<&Route> = self.snapshot.generation_in_routes.values().collect();
        routes.extend(self.flows.phantom_generation.as_ref());

        let total_width = self.widths.generation_in;
        let fan_out_width = total_width + routes.len().saturating_sub(1) as f64 * gap;
        let mut x_a = l.x0 + total_width / 2.0 - fan_out_width / 2.0;
        let mut x_b = l.x0;

        for route in routes {
            let rate = route.rate_or_zero();
            let mut width = 0.0;
            // Zero-rate sources still get a sliver next to a phantom source,
            // so that the fan doesn't jump when the phantom appears.
            if rate != 0.0 || has_phantom {
                width = self.scale.rate_to_width(rate);
                shapes.extend(ribbon(
                    (x_a + width, 0.0),
                    (x_a, 0.0),
                    (x_b + width, TERMINATOR_BLOCK_LENGTH),
                    (x_b, TERMINATOR_BLOCK_LENGTH),
                    FlowClass::Generation,
                    None,
                ));
                shapes.push(polygon(
                    [
                        (x_a + width, 0.0),
                        (x_a, 0.0),
                        (x_a + width / 2.0, ARROW_HEAD_LENGTH),
                    ],
                    FlowClass::Tint,
                    None,
                ));
            }
            if route.icon.is_some() {
                labels.push(
                    self.labels
                        .hint(LabelKind::Generation, rate)
                        .with_id(route.id.clone())
                        .with_icon(route.icon.clone())
                        .with_text(route.text.clone())
                        .at((x_a + width / 2.0) * l.svg_scale_x, 0.0),
                );
            }
            x_a += width + gap;
            x_b += width;
        }
    }

    fn generation_to_consumers(&self, shapes: &mut Vec<Shape>) {
        let l = self.landmarks;
        if self.widths.generation_to_consumers > 0.0 {
            shapes.extend(ribbon(
                (l.x16, l.y0 - PAD_ANTIALIAS),
                (l.x15, l.y0 - PAD_ANTIALIAS),
                (l.x1, l.y1),
                (l.x1, l.y2),
                FlowClass::Generation,
                None,
            ));
        }
    }

    /// The generation→grid ribbon, its arrow shaft along the grid export
    /// band, and the blend into the grid-out color.
    fn generation_to_grid(&self, shapes: &mut Vec<Shape>) {
        let l = self.landmarks;
        let width = self.widths.generation_to_grid;
        if width == 0.0 {
            return;
        }
        let arrow_head_length = self.arrow_head_length();
        shapes.extend(ribbon(
            (l.x0 + width, l.y0),
            (l.x0, l.y0),
            (l.x11, l.y10 + width),
            (l.x11, l.y10),
            FlowClass::Generation,
            None,
        ));
        shapes.push(rect(
            arrow_head_length,
            l.y10,
            l.x11 - arrow_head_length,
            width,
            FlowClass::Generation,
            None,
        ));
        shapes.extend(blend(
            "gen-grid-out-blend-rect",
            (l.x11, l.y11),
            (l.x11, l.y10),
            (l.x10, l.y11),
            (l.x10, l.y10),
            self.generation_color(),
            self.colors.grid_out.to_string(),
        ));
    }

    fn grid_out(&self, shapes: &mut Vec<Shape>) {
        let l = self.landmarks;
        if self.widths.grid_out == 0.0 {
            return;
        }
        shapes.push(polygon(
            [
                (l.x10, l.y10),
                (l.x10, l.y2),
                (l.x10 - self.arrow_head_length(), (l.y10 + l.y2) / 2.0),
            ],
            FlowClass::GridOutArrow,
            Some(self.colors.grid_out.to_string()),
        ));
    }

    fn generation_to_batteries(&self, shapes: &mut Vec<Shape>) {
        let l = self.landmarks;
        if self.widths.generation_to_batteries == 0.0 {
            return;
        }
        shapes.push(rect(
            l.x14,
            l.y0,
            l.x15 - l.x14,
            l.y17 - l.y0,
            FlowClass::Generation,
            None,
        ));
    }

    fn grid_to_batteries(&self, shapes: &mut Vec<Shape>) {
        let l = self.landmarks;
        if self.widths.grid_to_batteries == 0.0 {
            return;
        }
        shapes.extend(ribbon(
            (l.x10, l.y5),
            (l.x10, l.y13),
            (l.x14, l.y17),
            (l.x17, l.y17),
            FlowClass::Grid,
            None,
        ));
    }

    fn batteries_to_grid_blend(&self, shapes: &mut Vec<Shape>) {
        let l = self.landmarks;
        if self.widths.batteries_to_grid == 0.0 {
            return;
        }
        shapes.extend(blend(
            "batt-grid-out-blend-rect",
            (l.x11, l.y2),
            (l.x11, l.y11),
            (l.x10, l.y2),
            (l.x10, l.y11),
            self.battery_color(),
            self.colors.grid_out.to_string(),
        ));
    }

    /// The grid import arrow at the left edge, and the grid label.
    fn grid_in(&self, shapes: &mut Vec<Shape>, labels: &mut Vec<LabelHint>) {
        let l = self.landmarks;
        let Some(grid_route) = self
            .snapshot
            .grid_in_route
            .as_ref()
            .or(self.snapshot.grid_out_route.as_ref())
        else {
            return;
        };
        let arrow_head_length = self.arrow_head_length();
        let in_width = l.y13 - l.y2;
        if in_width > 0.0 {
            shapes.push(rect(
                0.0,
                l.y2,
                arrow_head_length,
                in_width,
                FlowClass::Grid,
                None,
            ));
            shapes.push(polygon(
                [
                    (0.0, l.y2),
                    (0.0, l.y2 + in_width),
                    (arrow_head_length, l.y2 + in_width / 2.0),
                ],
                FlowClass::Tint,
                None,
            ));
        }

        let mid_y = (l.y10 + l.y13) / 2.0;
        let hint = self
            .labels
            .hint(LabelKind::Grid, self.flows.grid_import)
            .with_id(grid_route.id.clone())
            .with_icon(Some(Icon::TransmissionTower))
            .at(0.0, mid_y * l.svg_scale_x);
        labels.push(self.labels.with_secondary(hint, self.flows.grid_export));
    }

    fn grid_to_consumers(&self, shapes: &mut Vec<Shape>) {
        let l = self.landmarks;
        if self.widths.grid_to_consumers == 0.0 {
            return;
        }
        shapes.push(rect(
            l.x10,
            l.y2,
            l.x1 - l.x10,
            l.y5 - l.y2,
            FlowClass::Grid,
            None,
        ));
    }

    fn batteries_to_consumers(&self, shapes: &mut Vec<Shape>) {
        let l = self.landmarks;
        if self.widths.batteries_to_consumers == 0.0 {
            return;
        }
        shapes.extend(ribbon(
            (l.x20, l.y17),
            (l.x21, l.y17),
            (l.x1, l.y5),
            (l.x1, l.y4),
            FlowClass::Battery,
            None,
        ));
    }

    fn batteries_to_grid(&self, shapes: &mut Vec<Shape>) {
        let l = self.landmarks;
        if self.widths.batteries_to_grid == 0.0 {
            return;
        }
        shapes.extend(ribbon(
            (l.x15, l.y17),
            (l.x20, l.y17),
            (l.x11, l.y2),
            (l.x11, l.y11),
            FlowClass::Battery,
            None,
        ));
    }

    /// The battery trunk below `y17` and one in/out branch per battery,
    /// fanning out to the right edge.
    ///
    /// Returns the bottom of the battery labels, 0 without batteries.
    fn battery_fan(&self, shapes: &mut Vec<Shape>, labels: &mut Vec<LabelHint>) -> f64 {
        let l = self.landmarks;
        if self.snapshot.battery_routes.is_empty() {
            return 0.0;
        }
        let gap = BATTERIES_FAN_OUT_VERTICAL_GAP / l.svg_scale_x;
        let arrow_head_length = self.arrow_head_length();
        let fan_color = self.colors.to_batteries.to_string();

        let mut top = Vec::new();

        if self.widths.grid_to_batteries != 0.0 {
            shapes.extend(blend(
                "grid-to-batt-blend",
                (l.x14, l.y17),
                (l.x17, l.y17),
                (l.x14, l.y18),
                (l.x17, l.y18),
                self.grid_color(),
                fan_color.clone(),
            ));
        }
        if self.widths.generation_to_batteries != 0.0 {
            shapes.extend(blend(
                "gen-to-batt-blend",
                (l.x15, l.y17),
                (l.x14, l.y17),
                (l.x15, l.y18),
                (l.x14, l.y18),
                self.generation_color(),
                fan_color.clone(),
            ));
        }
        if self.flows.battery_discharge > 0.0 {
            shapes.push(rect(
                l.x15,
                l.y17,
                l.x21 - l.x15,
                l.y18 - l.y17,
                FlowClass::Battery,
                None,
            ));
        }

        let curve_pad = l.x1 - l.x21;
        let mut x_a = l.x21;
        let mut x_b = l.x15;
        let mut y_a = l.y18;

        for pair in self.snapshot.battery_routes.values() {
            let charge = pair.charge_rate();
            let discharge = pair.discharge_rate();
            let width_out = if charge > 0.0 {
                self.scale.rate_to_width(charge)
            } else {
                0.0
            };
            let width_in = if discharge > 0.0 {
                self.scale.rate_to_width(discharge)
            } else {
                0.0
            };
            let branch_top = y_a + curve_pad;
            let branch_height = gap + width_out + width_in;

            if width_in > 0.0 {
                shapes.extend(ribbon(
                    (x_a, y_a),
                    (x_a - width_in, y_a),
                    (l.x1, branch_top),
                    (l.x1, branch_top + width_in),
                    FlowClass::Battery,
                    None,
                ));
                shapes.push(polygon(
                    [
                        (l.x1, branch_top),
                        (l.x1 - arrow_head_length, branch_top + width_in / 2.0),
                        (l.x1, branch_top + width_in),
                    ],
                    FlowClass::Tint,
                    None,
                ));
                x_a -= width_in;
            }
            if x_a - l.x15 > 1.0 {
                shapes.push(rect(
                    l.x15,
                    y_a,
                    x_a - l.x15,
                    branch_height,
                    FlowClass::Battery,
                    None,
                ));
            }
            if width_out > 0.0 {
                let out_top = branch_top + width_in;
                top.extend(ribbon(
                    (x_b, y_a),
                    (x_b - width_out, y_a),
                    (l.x1 - arrow_head_length, out_top),
                    (l.x1 - arrow_head_length, out_top + width_out),
                    FlowClass::BatteryIn,
                    Some(fan_color.clone()),
                ));
                shapes.push(polygon(
                    [
                        (l.x1 - arrow_head_length, out_top),
                        (l.x1, out_top + width_out / 2.0),
                        (l.x1 - arrow_head_length, out_top + width_out),
                    ],
                    FlowClass::BatteryIn,
                    Some(fan_color.clone()),
                ));
                x_b -= width_out;
            }
            if x_b - l.x17 > 1.0 {
                shapes.push(rect(
                    l.x17,
                    y_a,
                    x_b - l.x17,
                    branch_height,
                    FlowClass::BatteryIn,
                    Some(fan_color.clone()),
                ));
            }

            let icon = if charge > 0.0 {
                Icon::BatteryCharging
            } else {
                Icon::Battery
            };
            let hint = self
                .labels
                .hint(LabelKind::Battery, charge)
                .with_id(pair.in_route.id.clone())
                .with_icon(Some(icon))
                .at(0.0, (branch_top + (width_out + width_in) / 2.0) * l.svg_scale_x);
            labels.push(self.labels.with_secondary(hint, discharge));

            y_a += branch_height;
        }

        shapes.extend(top);
        y_a - gap + curve_pad + SOURCE_LABEL_HEIGHT / 2.0
    }

    /// Gradients from each source color into the consumer color, then the
    /// solid stretch before the consumer fan-out.
    fn consumer_blends(&self) -> Vec<Shape> {
        let l = self.landmarks;
        let end_x = CONSUMER_BLEND_LENGTH + 1.0;
        let to_consumers = self.colors.to_consumers.to_string();
        let mut shapes = Vec::new();

        if self.widths.generation_to_consumers != 0.0 {
            shapes.extend(blend(
                "gen-in-blend-rect",
                (0.0, l.y1),
                (0.0, l.y2),
                (end_x, l.y1),
                (end_x, l.y2),
                self.generation_color(),
                to_consumers.clone(),
            ));
        }
        if l.y5 > l.y2 {
            shapes.extend(blend(
                "grid-in-blend-rect",
                (0.0, l.y2),
                (0.0, l.y5),
                (end_x, l.y2),
                (end_x, l.y5),
                self.grid_color(),
                to_consumers.clone(),
            ));
        }
        if self.widths.batteries_to_consumers != 0.0 {
            shapes.extend(blend(
                "batt-in-blend-rect",
                (0.0, l.y5),
                (0.0, l.y4),
                (end_x, l.y5),
                (end_x, l.y4),
                self.battery_color(),
                to_consumers.clone(),
            ));
        }
        shapes.push(rect(
            CONSUMER_BLEND_LENGTH,
            l.y1,
            CONSUMER_BLEND_LENGTH_PRE_FAN_OUT + 1.0,
            l.y4 - l.y1,
            FlowClass::Consumer,
            Some(to_consumers),
        ));
        shapes
    }

    /// One branch per grouped consumer plus the untracked consumer, spread
    /// out vertically around the consumer trunk.
    ///
    /// Returns the bottom of the consumer labels.
    fn consumer_fan(
        &self,
        grouped: &RouteMap<Route>,
        shapes: &mut Vec<Shape>,
        far_right: &mut Vec<Shape>,
        labels: &mut Vec<LabelHint>,
    ) -> f64 {
        let l = self.landmarks;
        let color = self.colors.to_consumers.to_string();
        let extras_length = self.extras.extras_length();
        let gap = CONSUMERS_FAN_OUT_VERTICAL_GAP / l.svg_scale_x;
        let total_height = l.y4 - l.y1 + grouped.len() as f64 * gap;

        let mut y_left = l.y1;
        let mut y_right = ((l.y1 + l.y4) / 2.0 - total_height / 2.0).max(TEXT_PADDING);

        let mut extras = Vec::new();
        let mut arrows = Vec::new();

        let branches = grouped
            .values()
            .map(|route| (route, gap))
            .chain(std::iter::once((&self.flows.untracked_consumer, 0.0)));
        for (route, gap_after) in branches {
            let rate = route.rate_or_zero();
            let width = self.scale.rate_to_width(rate);
            let y_end = y_right + width / 2.0;

            shapes.extend(ribbon(
                (0.0, y_left),
                (0.0, y_left + width),
                (FAN_PANE_WIDTH + PAD_ANTIALIAS, y_right),
                (FAN_PANE_WIDTH + PAD_ANTIALIAS, y_right + width),
                FlowClass::Consumer,
                Some(color.clone()),
            ));
            extras.extend(
                self.extras
                    .render_extras(FAN_PANE_WIDTH, y_right, width, &color, route),
            );
            arrows.push(polygon(
                [
                    (extras_length, y_end - width / 2.0),
                    (extras_length, y_end + width / 2.0),
                    (extras_length + ARROW_HEAD_LENGTH, y_end),
                ],
                FlowClass::Consumer,
                Some(color.clone()),
            ));

            let id = route
                .id
                .clone()
                .filter(|id| id.as_str() != UNTRACKED_ID && id.as_str() != OTHER_ID);
            labels.push(
                self.labels
                    .hint(LabelKind::Consumer, rate)
                    .with_id(id)
                    .with_text(route.text.clone())
                    .at(0.0, y_end * l.svg_scale_x),
            );

            if rate != 0.0 {
                y_left += width;
            }
            y_right += width + gap_after;
        }

        far_right.extend(extras);
        far_right.extend(arrows);
        y_right + CONSUMER_LABEL_HEIGHT / 2.0
    }
}
