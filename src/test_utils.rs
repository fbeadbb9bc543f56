// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module is only compiled when running unit tests and contains features
//! that are shared by all tests of the crate.
//!
//! - the `SnapshotBuilder`, which can declaratively build snapshots for use
//!   in tests.
//! - `assert_balanced`, which checks the invariants every set of reconciled
//!   flows must hold.

use crate::{FlowSnapshot, ReconciledFlows, Route, RoutePair};

/// Builds `FlowSnapshot`s from bare rates, generating ids as it goes.
#[derive(Default)]
pub(crate) struct SnapshotBuilder {
    snapshot: FlowSnapshot,
}

impl SnapshotBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn generation(mut self, rate: f64) -> Self {
        let id = format!("gen_{}", self.snapshot.generation_in_routes.len());
        self.snapshot = self.snapshot.with_generation(Route::new(id, rate));
        self
    }

    pub(crate) fn grid_in(mut self, rate: f64) -> Self {
        self.snapshot = self.snapshot.with_grid_in(Route::new("grid_in", rate));
        self
    }

    pub(crate) fn grid_out(mut self, rate: f64) -> Self {
        self.snapshot = self.snapshot.with_grid_out(Route::new("grid_out", rate));
        self
    }

    /// A single signed grid reading, positive when importing.
    pub(crate) fn grid_signed(self, rate: f64) -> Self {
        self.grid_in(rate)
    }

    /// A battery discharging at `discharge` and charging at `charge`.
    pub(crate) fn battery(mut self, discharge: f64, charge: f64) -> Self {
        let key = format!("battery_{}", self.snapshot.battery_routes.len());
        let pair = RoutePair::new(
            Route::new(key.clone(), discharge),
            Route::new(format!("{key}_out"), charge),
        );
        self.snapshot = self.snapshot.with_battery(key, pair);
        self
    }

    /// A single signed battery reading, positive when discharging.
    pub(crate) fn battery_signed(mut self, rate: f64) -> Self {
        let key = format!("battery_{}", self.snapshot.battery_routes.len());
        let pair = RoutePair::from_signed(key.clone(), None, rate, false);
        self.snapshot = self.snapshot.with_battery(key, pair);
        self
    }

    pub(crate) fn consumer(mut self, id: &str, rate: f64) -> Self {
        self.snapshot = self.snapshot.with_consumer(Route::new(id, rate));
        self
    }

    pub(crate) fn hide_below(mut self, threshold: f64) -> Self {
        self.snapshot = self.snapshot.with_hide_consumers_below(threshold);
        self
    }

    pub(crate) fn max_branches(mut self, max: usize) -> Self {
        self.snapshot = self.snapshot.with_max_consumer_branches(max);
        self
    }

    pub(crate) fn charge_only_from_generation(mut self) -> Self {
        self.snapshot = self.snapshot.with_battery_charge_only_from_generation(true);
        self
    }

    pub(crate) fn build(self) -> FlowSnapshot {
        self.snapshot
    }
}

/// Panics unless `flows` are non-negative and balance at every participant.
pub(crate) fn assert_balanced(flows: &ReconciledFlows) {
    for (from, to, rate) in flows.flow_graph().flows() {
        assert!(rate >= 0.0, "{from} -> {to} is negative: {rate} in {flows:?}");
    }
    assert!(flows.phantom_generation_rate >= 0.0, "{flows:?}");
    assert!(flows.phantom_grid_in_rate >= 0.0, "{flows:?}");
    assert!(flows.untracked_consumer.rate >= 0.0, "{flows:?}");
    if let Err(err) = flows.check_balance() {
        panic!("{err} in {flows:?}");
    }
}
