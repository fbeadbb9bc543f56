// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Serializes diagrams into SVG markup.
//!
//! Flows carry CSS classes (`flow generation`, `flow grid`, `flow battery`,
//! `flow consumer`, `tint`, `grid-out-arrow`, `battery-in`, `extra`) so that
//! a stylesheet can color them.  Explicit colors are written as inline
//! styles.

use crate::{
    geometry::{BlendRect, FlowClass, GradientDirection, Point, Shape},
    layout::{Diagram, Pane, FAN_PANE_WIDTH, SVG_LHS_VISIBLE_WIDTH},
};

fn class_attr(class: FlowClass) -> String {
    match class {
        FlowClass::Generation | FlowClass::Grid | FlowClass::Battery | FlowClass::Consumer => {
            format!("flow {class}")
        }
        _ => class.to_string(),
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn style_attr(color: &Option<String>) -> String {
    match color {
        Some(color) => format!(r#" style="fill:{};fill-opacity:1""#, escape(color)),
        None => String::new(),
    }
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn gradient(blend: &BlendRect) -> String {
    let (x1, y1, x2, y2) = match blend.direction {
        GradientDirection::LeftToRight => ("0%", "0%", "100%", "0%"),
        GradientDirection::RightToLeft => ("100%", "0%", "0%", "0%"),
        GradientDirection::TopToBottom => ("0%", "0%", "0%", "100%"),
        GradientDirection::BottomToTop => ("0%", "100%", "0%", "0%"),
    };
    format!(
        r#"<linearGradient id="{id}_grad" x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}"><stop offset="0%" style="stop-color:{start};stop-opacity:1"/><stop offset="100%" style="stop-color:{end};stop-opacity:1"/></linearGradient>"#,
        id = escape(&blend.id),
        start = escape(&blend.start_color),
        end = escape(&blend.end_color),
    )
}

fn element(shape: &Shape) -> String {
    match shape {
        Shape::Ribbon {
            ribbon,
            class,
            color,
        } => format!(
            r#"<path class="{}" d="{}"{}/>"#,
            class_attr(*class),
            ribbon.path_data(),
            style_attr(color)
        ),
        Shape::Rect { rect, class, color } => format!(
            r#"<rect class="{}" x="{}" y="{}" width="{}" height="{}"{}/>"#,
            class_attr(*class),
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            style_attr(color)
        ),
        Shape::Polygon {
            points,
            class,
            color,
        } => format!(
            r#"<polygon class="{}" points="{}"{}/>"#,
            class_attr(*class),
            points_attr(points),
            style_attr(color)
        ),
        Shape::BlendRect(blend) => format!(
            r#"<rect id="{id}" x="{}" y="{}" width="{}" height="{}" fill="url(#{id}_grad)" style="fill-opacity:1"/>"#,
            blend.rect.x,
            blend.rect.y,
            blend.rect.width,
            blend.rect.height,
            id = escape(&blend.id),
        ),
    }
}

impl Pane {
    fn svg_content(&self) -> String {
        let defs: String = self
            .shapes
            .iter()
            .filter_map(|shape| match shape {
                Shape::BlendRect(blend) => Some(gradient(blend)),
                _ => None,
            })
            .collect();
        let body: String = self.shapes.iter().map(element).collect();
        if defs.is_empty() {
            body
        } else {
            format!("<defs>{defs}</defs>{body}")
        }
    }

    /// The pane as a standalone `svg` element in its own coordinate space.
    pub fn to_svg(&self) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" preserveAspectRatio="none">{}</svg>"#,
            self.width,
            self.height,
            self.svg_content()
        )
    }

    fn to_nested_svg(&self, x: f64, width: f64, height: f64) -> String {
        format!(
            r#"<svg x="{x}" y="0" width="{width}" height="{height}" viewBox="0 0 {} {}" preserveAspectRatio="none">{}</svg>"#,
            self.width,
            self.height,
            self.svg_content()
        )
    }
}

impl Diagram {
    /// All four panes side by side, in pixels.  The left pane is
    /// [`SVG_LHS_VISIBLE_WIDTH`] pixels wide; the `mid` and `right` panes
    /// are shown at their natural width.
    pub fn to_svg(&self) -> String {
        let scale_x = self.landmarks.svg_scale_x;
        let height = self.height * scale_x;
        let widths = [
            SVG_LHS_VISIBLE_WIDTH,
            FAN_PANE_WIDTH,
            FAN_PANE_WIDTH,
            self.far_right.width,
        ];
        let mut x = 0.0;
        let mut content = String::new();
        for (pane, width) in self.panes().into_iter().zip(widths) {
            content.push_str(&pane.to_nested_svg(x, width, height));
            x += width;
        }
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{x}" height="{height}" viewBox="0 0 {x} {height}">{content}</svg>"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geometry::{blend_rect, Rect},
        test_utils::SnapshotBuilder,
        Sankey, SankeyConfig,
    };

    #[test]
    fn test_pane_to_svg() {
        let blend = blend_rect(
            "b",
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(20.0, 0.0),
            Point::new(20.0, 10.0),
            "#000000",
            "#ffffff",
        )
        .unwrap();
        let pane = Pane::new(
            100.0,
            50.0,
            vec![
                Shape::Rect {
                    rect: Rect::new(1.0, 2.0, 3.0, 4.0),
                    class: FlowClass::Grid,
                    color: None,
                },
                Shape::Polygon {
                    points: vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.5, 1.0)],
                    class: FlowClass::Tint,
                    color: Some("#123456".to_string()),
                },
                Shape::BlendRect(blend),
            ],
        );
        assert_eq!(
            pane.to_svg(),
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 50" preserveAspectRatio="none">"#,
                r#"<defs><linearGradient id="b_grad" x1="0%" y1="0%" x2="100%" y2="0%">"#,
                r#"<stop offset="0%" style="stop-color:#000000;stop-opacity:1"/>"#,
                r#"<stop offset="100%" style="stop-color:#ffffff;stop-opacity:1"/>"#,
                r#"</linearGradient></defs>"#,
                r#"<rect class="flow grid" x="1" y="2" width="3" height="4"/>"#,
                r#"<polygon class="tint" points="0,0 1,0 0.5,1" style="fill:#123456;fill-opacity:1"/>"#,
                r#"<rect id="b" x="0" y="0" width="20" height="10" fill="url(#b_grad)" style="fill-opacity:1"/>"#,
                r#"</svg>"#
            )
        );
    }

    #[test]
    fn test_diagram_to_svg() {
        let sankey = Sankey::try_new(SankeyConfig::default()).unwrap();
        let diagram = sankey.render(
            &SnapshotBuilder::new()
                .generation(100.0)
                .grid_in(100.0)
                .consumer("x", 150.0)
                .build(),
        );
        let svg = diagram.to_svg();
        assert!(svg.starts_with("<svg "));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<svg ").count(), 5);
        assert!(svg.contains(r#"class="flow generation""#));
        assert!(svg.contains(r#"id="grid-in-blend-rect""#));
    }
}
