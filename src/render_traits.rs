// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module contains the traits a host can implement to customize how a
//! diagram is drawn, along with their default implementations.

use crate::{
    geometry::{FlowClass, Rect, Shape},
    Route,
};

/**
This trait formats the numbers shown in label hints.

The engine is unit-agnostic, so it only ever passes the unit string the
host configured.  Implementations decide on precision, separators and
localization.

<details>
<summary>Example implementation with a thousands separator:</summary>

```ignore
struct Grouped;

impl elec_sankey::LabelFormatter for Grouped {
    fn format_rate(&self, rate: f64, unit: &str) -> String {
        let whole = rate.round() as i64;
        let digits = whole.abs().to_string();
        let mut out = String::new();
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(c);
        }
        if whole < 0 {
            out.insert(0, '-');
        }
        format!("{out} {unit}")
    }
}
```

</details>
*/
pub trait LabelFormatter: Send + Sync {
    fn format_rate(&self, rate: f64, unit: &str) -> String;
}

/// Rounds to one decimal, dropping a trailing `.0`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultLabelFormatter;

impl LabelFormatter for DefaultLabelFormatter {
    fn format_rate(&self, rate: f64, unit: &str) -> String {
        format!("{} {unit}", round_to_tenth(rate))
    }
}

/// One fraction digit for `kWh`, none for any other unit.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnitPrecisionFormatter;

impl LabelFormatter for UnitPrecisionFormatter {
    fn format_rate(&self, rate: f64, unit: &str) -> String {
        if unit == "kWh" {
            format!("{rate:.1} {unit}")
        } else {
            format!("{rate:.0} {unit}")
        }
    }
}

/// Rounds `value` to one decimal.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/**
This trait draws extra elements at the end of each consumer branch, between
the consumer ribbon and its arrowhead.

Extras are drawn into the `far_right` pane, whose width grows by
[`extras_length`][ExtrasRenderer::extras_length] to make room for them.
Arrowheads are shifted right by the same amount.

<details>
<summary>Example implementation drawing a marker per consumer:</summary>

```ignore
struct Markers;

impl elec_sankey::ExtrasRenderer for Markers {
    fn extras_length(&self) -> f64 {
        12.0
    }

    fn render_extras(
        &self,
        _top_left_x: f64,
        top_left_y: f64,
        width: f64,
        color: &str,
        route: &elec_sankey::Route,
    ) -> Vec<elec_sankey::geometry::Shape> {
        if route.id.is_none() {
            return vec![];
        }
        vec![elec_sankey::geometry::Shape::Rect {
            rect: elec_sankey::geometry::Rect::new(4.0, top_left_y, 4.0, width),
            class: elec_sankey::geometry::FlowClass::Extra,
            color: Some(color.to_string()),
        }]
    }
}
```

</details>
*/
pub trait ExtrasRenderer: Send + Sync {
    /// The horizontal room the extras need.
    fn extras_length(&self) -> f64 {
        0.0
    }

    /// Returns the shapes to draw for one consumer branch.  `top_left_y`
    /// and `width` describe the branch where it leaves the `right` pane.
    fn render_extras(
        &self,
        top_left_x: f64,
        top_left_y: f64,
        width: f64,
        color: &str,
        route: &Route,
    ) -> Vec<Shape>;
}

/// Draws nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoExtras;

impl ExtrasRenderer for NoExtras {
    fn render_extras(&self, _: f64, _: f64, _: f64, _: &str, _: &Route) -> Vec<Shape> {
        Vec::new()
    }
}

/// Continues every consumer branch with a solid bar in its blend color.
#[derive(Clone, Copy, Debug)]
pub struct ColorBarExtras {
    pub length: f64,
}

impl Default for ColorBarExtras {
    fn default() -> Self {
        Self { length: 30.0 }
    }
}

impl ExtrasRenderer for ColorBarExtras {
    fn extras_length(&self) -> f64 {
        self.length
    }

    fn render_extras(
        &self,
        _top_left_x: f64,
        top_left_y: f64,
        width: f64,
        color: &str,
        _route: &Route,
    ) -> Vec<Shape> {
        vec![Shape::Rect {
            rect: Rect::new(0.0, top_left_y, self.length, width),
            class: FlowClass::Extra,
            color: Some(color.to_string()),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatters() {
        assert_eq!(DefaultLabelFormatter.format_rate(12.34, "kWh"), "12.3 kWh");
        assert_eq!(DefaultLabelFormatter.format_rate(500.0, "W"), "500 W");
        assert_eq!(UnitPrecisionFormatter.format_rate(12.34, "kWh"), "12.3 kWh");
        assert_eq!(UnitPrecisionFormatter.format_rate(499.6, "W"), "500 W");
    }

    #[test]
    fn test_extras() {
        let route = Route::new("x", 5.0);
        assert_eq!(NoExtras.extras_length(), 0.0);
        assert!(NoExtras.render_extras(0.0, 0.0, 5.0, "#000000", &route).is_empty());

        let bars = ColorBarExtras::default();
        assert_eq!(bars.extras_length(), 30.0);
        assert_eq!(
            bars.render_extras(100.0, 12.0, 5.0, "#123456", &route),
            vec![Shape::Rect {
                rect: Rect::new(0.0, 12.0, 30.0, 5.0),
                class: FlowClass::Extra,
                color: Some("#123456".to_string()),
            }]
        );
    }
}
