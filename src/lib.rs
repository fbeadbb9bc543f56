// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

/*!
# Elec Sankey

This is a library for drawing Sankey diagrams of electrical power or energy
flowing between the grid, local generation (e.g. solar), batteries and
consumers.

Real-world meters rarely cover every path, so the numbers a host has
usually don't balance.  This library infers the most plausible missing flows
and lays out a diagram that is always consistent, and stable from one frame
to the next.

## Snapshots

The input to every frame is a [`FlowSnapshot`]: the generation, grid,
battery and consumer [`Route`]s, plus a few policy switches.  The engine
never looks at units; rates can be powers (W) or accumulated energies (kWh)
as long as all routes of a snapshot agree.

[`FlowSnapshot::validate`] checks a snapshot at the host boundary.  The
engine itself accepts anything and never fails.

## Reconciliation

[`reconcile`] turns a snapshot into [`ReconciledFlows`]: seven
non-negative directional rates between the four [`Participant`]s, plus
synthetic routes that absorb every gap:

- phantom generation, when the other flows need more generation than was
  metered,
- phantom grid import, when consumers need more than is supplied and no grid
  is configured,
- an untracked consumer, for supply no tracked consumer accounts for.

[`ReconciledFlows::check_balance`] verifies that the flows balance at every
participant, using a graph view of the flows ([`FlowGraph`]).

## Layout

A [`Sankey`] engine runs the whole pipeline: reconcile, scale rates to
widths ([`Scale`]), group small consumers ([`group_consumers`]), compute
[`Landmarks`] and emit a [`Diagram`].  A diagram holds four [`Pane`]s of
[`geometry::Shape`]s with explicit coordinates and colors, plus
[`LabelHint`]s for a text-layout collaborator.

Hosts can customize drawing by injecting a [`LabelFormatter`] and an
[`ExtrasRenderer`].  [`CachedSankey`] renders again only when the snapshot
changes, and [`Diagram::to_svg`] serializes a diagram into SVG markup.
*/

mod color;
pub use color::{mix3_hexes, mix_hexes, Rgb};

mod config;
pub use config::{
    Palette, SankeyConfig, HIDE_CONSUMERS_BELOW_THRESHOLD_KWH, HIDE_CONSUMERS_BELOW_THRESHOLD_W,
};

mod error;
pub use error::Error;

mod flows;
pub use flows::{
    group_consumers, reconcile, FlowGraph, FlowWidths, Flows, ReconciledFlows, Scale,
    BALANCE_TOLERANCE, OTHER_ID, PHANTOM_EPSILON, TARGET_SCALED_TRUNK_WIDTH, UNTRACKED_ID,
};

pub mod geometry;

pub mod layout;
pub use layout::{BlendColors, Diagram, LabelHint, LabelKind, Landmarks, Pane};

mod participant;
pub use participant::Participant;

mod pipeline;
pub use pipeline::{CachedSankey, Sankey};

mod render_traits;
pub use render_traits::{
    ColorBarExtras, DefaultLabelFormatter, ExtrasRenderer, LabelFormatter, NoExtras,
    UnitPrecisionFormatter,
};

mod route;
pub use route::{Icon, Route, RouteMap, RoutePair};

mod snapshot;
pub use snapshot::FlowSnapshot;

mod svg;

#[cfg(test)]
mod test_utils;
