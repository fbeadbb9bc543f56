// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Mapping rates to drawn widths.

use super::ReconciledFlows;

/// The drawn width of the widest trunk.
pub const TARGET_SCALED_TRUNK_WIDTH: f64 = 90.0;

/// Every visible flow is drawn at least this wide.
const MIN_FLOW_WIDTH: f64 = 1.0;

/// Rates at or below this are drawn as absent rather than at
/// [`MIN_FLOW_WIDTH`].
const ZERO_RATE_EPSILON: f64 = 1e-9;

/// Converts rates to widths, such that the widest trunk of a diagram is
/// [`TARGET_SCALED_TRUNK_WIDTH`] wide.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale {
    multiplier: f64,
}

impl Scale {
    /// The scale for the given flows.  Trunks narrower than 1 rate unit are
    /// not scaled up.
    pub fn for_flows(flows: &ReconciledFlows) -> Self {
        let widest = [
            flows.generation_total(),
            flows.grid_in_total(),
            flows.consumer_total(),
            flows.batteries_total(),
        ]
        .into_iter()
        .fold(1.0, f64::max);
        Self {
            multiplier: TARGET_SCALED_TRUNK_WIDTH / widest,
        }
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// The width of a flow of the given rate, never less than 1.
    pub fn rate_to_width(&self, rate: f64) -> f64 {
        (rate * self.multiplier).max(MIN_FLOW_WIDTH)
    }

    /// Like [`Scale::rate_to_width`], but 0 for absent flows.
    pub fn flow_width(&self, rate: f64) -> f64 {
        if rate > ZERO_RATE_EPSILON {
            self.rate_to_width(rate)
        } else {
            0.0
        }
    }
}

/// The drawn widths of the trunks and directional flows of a diagram.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlowWidths {
    pub generation_in: f64,
    pub grid_out: f64,
    pub generation_to_consumers: f64,
    pub generation_to_grid: f64,
    pub generation_to_batteries: f64,
    pub grid_to_consumers: f64,
    pub grid_to_batteries: f64,
    pub batteries_to_grid: f64,
    pub batteries_to_consumers: f64,
}

impl FlowWidths {
    pub fn new(flows: &ReconciledFlows, scale: &Scale) -> Self {
        Self {
            generation_in: scale.flow_width(flows.generation_total()),
            grid_out: scale.flow_width(flows.grid_export),
            generation_to_consumers: scale.flow_width(flows.generation_to_consumers),
            generation_to_grid: scale.flow_width(flows.generation_to_grid),
            generation_to_batteries: scale.flow_width(flows.generation_to_batteries),
            grid_to_consumers: scale.flow_width(flows.grid_to_consumers),
            grid_to_batteries: scale.flow_width(flows.grid_to_batteries),
            batteries_to_grid: scale.flow_width(flows.batteries_to_grid),
            batteries_to_consumers: scale.flow_width(flows.batteries_to_consumers),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{reconcile, test_utils::SnapshotBuilder};

    #[test]
    fn test_multiplier() {
        let flows = reconcile(
            &SnapshotBuilder::new()
                .generation(300.0)
                .grid_in(150.0)
                .consumer("x", 450.0)
                .build(),
        );
        let scale = flows.scale();
        assert!((scale.multiplier() - 0.2).abs() < 1e-12);
        assert!((scale.rate_to_width(450.0) - 90.0).abs() < 1e-9);
        assert_eq!(scale.rate_to_width(0.5), 1.0);
        assert_eq!(scale.flow_width(0.0), 0.0);

        let widths = FlowWidths::new(&flows, &scale);
        assert!((widths.generation_to_consumers - 60.0).abs() < 1e-9);
        assert!((widths.grid_to_consumers - 30.0).abs() < 1e-9);
        assert_eq!(widths.generation_to_grid, 0.0);
    }

    #[test]
    fn test_widths_are_monotonic() {
        let flows = reconcile(&SnapshotBuilder::new().grid_in(1000.0).build());
        let scale = flows.scale();
        let mut previous = 0.0;
        for rate in [0.001, 0.1, 4.0, 11.2, 11.3, 500.0, 1000.0] {
            let width = scale.rate_to_width(rate);
            assert!(width >= 1.0);
            assert!(width >= previous);
            previous = width;
        }
    }

    #[test]
    fn test_raising_a_rate_never_narrows_its_flow() {
        let widths_for = |builder: SnapshotBuilder| {
            let flows = reconcile(&builder.build());
            FlowWidths::new(&flows, &flows.scale())
        };
        let rates = (0..=40).map(|step| step as f64 * 50.0);

        let mut previous = FlowWidths::default();
        for rate in rates.clone() {
            let widths = widths_for(
                SnapshotBuilder::new()
                    .generation(rate)
                    .grid_in(300.0)
                    .consumer("x", 500.0),
            );
            assert!(
                widths.generation_in >= previous.generation_in - 1e-9,
                "generation {rate}: {widths:?} after {previous:?}"
            );
            assert!(
                widths.generation_to_consumers >= previous.generation_to_consumers - 1e-9,
                "generation {rate}: {widths:?} after {previous:?}"
            );
            previous = widths;
        }

        let mut previous = FlowWidths::default();
        for rate in rates {
            let widths = widths_for(
                SnapshotBuilder::new()
                    .generation(300.0)
                    .grid_in(rate)
                    .consumer("x", 500.0),
            );
            assert!(
                widths.grid_to_consumers >= previous.grid_to_consumers - 1e-9,
                "grid {rate}: {widths:?} after {previous:?}"
            );
            previous = widths;
        }
    }

    #[test]
    fn test_tiny_flows_are_not_scaled_up() {
        let flows = reconcile(&SnapshotBuilder::new().grid_in(0.5).consumer("x", 0.5).build());
        let scale = flows.scale();
        assert_eq!(scale.multiplier(), 90.0);
        assert_eq!(scale.rate_to_width(0.5), 45.0);
    }
}
