// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Derives balanced directional flows from a snapshot.

use tracing::{debug, trace, warn};

use super::{ReconciledFlows, UNTRACKED_ID};
use crate::{FlowSnapshot, Icon, Route};

/// Phantom sources at or below this rate are not shown.
pub const PHANTOM_EPSILON: f64 = 0.01;

fn unknown_source(rate: f64) -> Option<Route> {
    (rate > PHANTOM_EPSILON)
        .then(|| Route::synthetic("Unknown source", rate).with_icon(Icon::UnknownSource))
}

/// Reconciles the readings in `snapshot` into flows that balance at every
/// participant.
///
/// The rules are applied in order:
///
/// 1. Battery discharge goes to the grid first, up to the grid export.
///    Export beyond generation and discharge is phantom generation.
/// 2. Battery charge comes from the grid first, up to the grid import,
///    unless the batteries may only charge from generation.  The rest comes
///    from generation.
/// 3. Whatever import is left goes to consumers.
/// 4. Export not covered by batteries comes from generation.
/// 5. Remaining generation goes to consumers.  Generation the other flows
///    require beyond what was metered is phantom generation.
/// 6. Without any grid, a consumer shortfall is phantom grid import.
/// 7. Supply beyond tracked consumption goes to the untracked consumer.  A
///    remaining shortfall is covered by (phantom) generation.
///
/// Never fails.  The result is checked with
/// [`ReconciledFlows::check_balance`] and imbalances are logged.
pub fn reconcile(snapshot: &FlowSnapshot) -> ReconciledFlows {
    let grid_import = snapshot.grid_import();
    let grid_export = snapshot.grid_export();
    let generation_tracked = snapshot.generation_tracked_total();
    let consumer_tracked = snapshot.consumer_tracked_total();
    let battery_discharge = snapshot.battery_discharge_total();
    let battery_charge = snapshot.battery_charge_total();
    let has_grid = snapshot.has_grid();

    trace!(
        "Reconciling generation={generation_tracked} grid_import={grid_import} \
         grid_export={grid_export} discharge={battery_discharge} \
         charge={battery_charge} consumers={consumer_tracked}"
    );

    let mut phantom_generation_rate = 0.0;
    let mut phantom_grid_in_rate = 0.0;

    let over_export = grid_export - generation_tracked - battery_discharge;
    if over_export > 0.0 {
        phantom_generation_rate = over_export;
    }
    let batteries_to_grid = grid_export.min(battery_discharge);
    let batteries_to_consumers = battery_discharge - batteries_to_grid;

    let (grid_to_batteries, generation_to_batteries) =
        if snapshot.battery_charge_only_from_generation {
            (0.0, battery_charge)
        } else if grid_import > battery_charge {
            (battery_charge, 0.0)
        } else {
            (grid_import, battery_charge - grid_import)
        };

    let shortfall = grid_export + generation_to_batteries
        - (generation_tracked + grid_to_batteries + battery_discharge);
    if shortfall > 0.0 {
        phantom_generation_rate = shortfall;
    }

    let mut grid_to_consumers = grid_import - grid_to_batteries;
    let generation_to_grid = (grid_export - battery_discharge).max(0.0);
    let mut generation_to_consumers =
        (generation_tracked - generation_to_grid - generation_to_batteries).max(0.0);

    let over_generation =
        generation_to_grid + generation_to_batteries + generation_to_consumers - generation_tracked;
    if over_generation > 0.0 {
        phantom_generation_rate = over_generation;
    }

    let supply = generation_to_consumers + grid_to_consumers + batteries_to_consumers;
    let consumer_shortfall = consumer_tracked - supply;
    if consumer_shortfall > 0.0 && !has_grid {
        debug!("No grid configured, inferring {consumer_shortfall} of grid import.");
        phantom_grid_in_rate = consumer_shortfall;
        grid_to_consumers += consumer_shortfall;
    }

    let supply = generation_to_consumers + grid_to_consumers + batteries_to_consumers;
    let excess = supply - consumer_tracked;
    let untracked = if excess > 0.0 {
        excess
    } else {
        generation_to_consumers -= excess;
        phantom_generation_rate = (generation_to_consumers + generation_to_batteries
            + generation_to_grid
            - generation_tracked)
            .max(0.0);
        0.0
    };

    let flows = ReconciledFlows {
        generation_tracked,
        consumer_tracked,
        grid_import,
        grid_export,
        battery_discharge,
        battery_charge,
        generation_to_consumers,
        generation_to_grid,
        generation_to_batteries,
        grid_to_consumers,
        grid_to_batteries,
        batteries_to_grid,
        batteries_to_consumers,
        phantom_generation_rate,
        phantom_grid_in_rate,
        phantom_generation: unknown_source(phantom_generation_rate),
        phantom_grid_in: unknown_source(phantom_grid_in_rate),
        untracked_consumer: Route::new(UNTRACKED_ID, untracked).with_text("Untracked"),
        has_grid,
    };

    if flows.phantom_generation_rate > 0.0 {
        debug!("Inferred {phantom_generation_rate} of untracked generation.");
    }
    if let Err(err) = flows.check_balance() {
        warn!("Reconciled flows don't balance: {err}");
    }

    flows
}
