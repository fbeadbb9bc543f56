// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Reconciled flows between the four participants of a diagram.
//!
//! A [`FlowSnapshot`][crate::FlowSnapshot] holds what the meters said.  Meters
//! are often missing or disagree, so [`reconcile`] derives a set of
//! directional flows that balance at every participant, inventing phantom
//! sources and an untracked consumer where the readings leave a gap.

mod balance;
mod grouping;
mod reconcile;
mod scale;

pub use balance::{FlowGraph, Flows, BALANCE_TOLERANCE};
pub use grouping::group_consumers;
pub use reconcile::{reconcile, PHANTOM_EPSILON};
pub use scale::{FlowWidths, Scale, TARGET_SCALED_TRUNK_WIDTH};

use crate::{Participant, Route};

/// Id of the consumer route that absorbs supply no tracked consumer accounts
/// for.
pub const UNTRACKED_ID: &str = "untracked";

/// Id of the consumer route that small or surplus consumers are folded into.
pub const OTHER_ID: &str = "other";

/// The outcome of reconciling a snapshot.
///
/// The seven directional rates are always non-negative.  Tracked totals are
/// taken from the snapshot as they are; phantom rates and the untracked
/// consumer make up the difference.
#[derive(Clone, Debug, PartialEq)]
pub struct ReconciledFlows {
    pub generation_tracked: f64,
    pub consumer_tracked: f64,
    pub grid_import: f64,
    pub grid_export: f64,
    pub battery_discharge: f64,
    pub battery_charge: f64,

    pub generation_to_consumers: f64,
    pub generation_to_grid: f64,
    pub generation_to_batteries: f64,
    pub grid_to_consumers: f64,
    pub grid_to_batteries: f64,
    pub batteries_to_grid: f64,
    pub batteries_to_consumers: f64,

    /// Generation nothing metered, but that the other flows require.
    pub phantom_generation_rate: f64,
    /// Grid import inferred when no grid is configured at all.
    pub phantom_grid_in_rate: f64,
    /// The phantom generation route, present only above [`PHANTOM_EPSILON`].
    pub phantom_generation: Option<Route>,
    /// The phantom grid route, present only above [`PHANTOM_EPSILON`].
    pub phantom_grid_in: Option<Route>,
    /// Supply that no tracked consumer accounts for.  Always present.
    pub untracked_consumer: Route,

    pub has_grid: bool,
}

impl ReconciledFlows {
    /// Tracked generation plus phantom generation.
    pub fn generation_total(&self) -> f64 {
        self.generation_tracked + self.phantom_generation_rate
    }

    /// Grid import plus phantom grid import.
    pub fn grid_in_total(&self) -> f64 {
        self.grid_import + self.phantom_grid_in_rate
    }

    /// Tracked consumption plus the untracked consumer.
    pub fn consumer_total(&self) -> f64 {
        self.consumer_tracked + self.untracked_consumer.rate
    }

    /// Total battery discharge, split between grid and consumers.
    pub fn batteries_total(&self) -> f64 {
        self.batteries_to_grid + self.batteries_to_consumers
    }

    /// The rate from one participant to another, 0 for directions that can
    /// never carry a flow.
    pub fn rate(&self, from: Participant, to: Participant) -> f64 {
        use Participant::*;
        match (from, to) {
            (Generation, Consumers) => self.generation_to_consumers,
            (Generation, Grid) => self.generation_to_grid,
            (Generation, Batteries) => self.generation_to_batteries,
            (Grid, Consumers) => self.grid_to_consumers,
            (Grid, Batteries) => self.grid_to_batteries,
            (Batteries, Grid) => self.batteries_to_grid,
            (Batteries, Consumers) => self.batteries_to_consumers,
            _ => 0.0,
        }
    }

    /// The width scale for drawing these flows.
    pub fn scale(&self) -> Scale {
        Scale::for_flows(self)
    }
}
