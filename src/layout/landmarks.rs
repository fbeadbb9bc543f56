// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The named coordinates a diagram is anchored on.

use super::{
    ARROW_HEAD_LENGTH, BATTERY_BLEND_LENGTH, GRID_BLEND_LENGTH, MIN_PAD_WIDTH, PAD_MULTIPLIER,
    SVG_LHS_VISIBLE_WIDTH, TERMINATOR_BLOCK_LENGTH,
};
use crate::{
    color::{ratio_of, Rgb},
    config::ParsedPalette,
    flows::FlowWidths,
};

/// Landmarks in the left pane's coordinate space.
///
/// Going down the right edge (`x1`) are the generation→consumers flow
/// (`y1`..`y2`), grid→consumers (`y2`..`y5`) and batteries→consumers
/// (`y5`..`y4`).  Along the left edge are the grid export (`y10`..`y2`) and
/// import (`y2`..`y13`).  The generation trunk comes down from `x0` at `y0`
/// and splits into its flows to the grid (`x0`..`x14`), batteries
/// (`x14`..`x15`) and consumers (`x15`..`x16`).  The battery trunk spans
/// `x17`..`x21` at `y17`, and the battery fan starts at `y18`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmarks {
    pub x0: f64,
    pub x1: f64,
    pub x10: f64,
    pub x11: f64,
    pub x14: f64,
    pub x15: f64,
    pub x16: f64,
    pub x17: f64,
    pub x20: f64,
    pub x21: f64,
    pub y0: f64,
    pub y1: f64,
    pub y2: f64,
    pub y4: f64,
    pub y5: f64,
    pub y10: f64,
    pub y11: f64,
    pub y13: f64,
    pub y17: f64,
    pub y18: f64,
    /// Pixels per unit of the left pane, horizontally.
    pub svg_scale_x: f64,
}

impl Landmarks {
    pub fn new(widths: &FlowWidths) -> Self {
        let gen_to_cons = widths.generation_to_consumers;
        let gen_to_grid = widths.generation_to_grid;
        let gen_to_batt = widths.generation_to_batteries;
        let grid_to_cons = widths.grid_to_consumers;
        let grid_to_batt = widths.grid_to_batteries;
        let batt_to_grid = widths.batteries_to_grid;
        let batt_to_cons = widths.batteries_to_consumers;

        let most_left = (-gen_to_grid).min(-grid_to_batt);
        let most_right = gen_to_batt + gen_to_cons.max(batt_to_grid + batt_to_cons);
        let width = most_right - most_left;
        let pad_x = [gen_to_grid, gen_to_cons, grid_to_batt, batt_to_cons]
            .into_iter()
            .fold(MIN_PAD_WIDTH, f64::max)
            * PAD_MULTIPLIER;
        let mid_x = ARROW_HEAD_LENGTH + GRID_BLEND_LENGTH + width / 2.0 + pad_x;

        let x0 = if ARROW_HEAD_LENGTH + GRID_BLEND_LENGTH + gen_to_grid > grid_to_batt {
            mid_x - width / 2.0
        } else {
            mid_x - width / 2.0 + grid_to_batt - gen_to_grid
        };
        let y0 = TERMINATOR_BLOCK_LENGTH;
        let y1 = TERMINATOR_BLOCK_LENGTH
            + [
                gen_to_cons,
                pad_x + gen_to_grid + batt_to_grid - gen_to_cons,
                gen_to_grid * 2.0 + batt_to_grid - gen_to_cons,
            ]
            .into_iter()
            .fold(pad_x, f64::max);
        let x1 = mid_x + width / 2.0 + pad_x;
        let y2 = y1 + gen_to_cons;
        let y5 = y2 + grid_to_cons;
        let y10 = y2 - gen_to_grid - batt_to_grid;

        let svg_scale_x = SVG_LHS_VISIBLE_WIDTH / x1;
        let x10 = ARROW_HEAD_LENGTH / svg_scale_x;
        let x11 = x10 + GRID_BLEND_LENGTH;

        let y11 = y2 - batt_to_grid;
        let y13 = y5 + grid_to_batt;
        let y17 = y13 + (y10 - y0);

        let x14 = x0 + gen_to_grid;
        let x15 = x14 + gen_to_batt;
        let x16 = x15 + gen_to_cons;
        let x17 = x14 - grid_to_batt;
        let x20 = x15 + batt_to_grid;
        let x21 = x20 + batt_to_cons;

        let y4 = y5 + batt_to_cons;
        let y18 = y17 + BATTERY_BLEND_LENGTH;

        Self {
            x0,
            x1,
            x10,
            x11,
            x14,
            x15,
            x16,
            x17,
            x20,
            x21,
            y0,
            y1,
            y2,
            y4,
            y5,
            y10,
            y11,
            y13,
            y17,
            y18,
            svg_scale_x,
        }
    }
}

/// The colors flows blend into where several sources merge.
///
/// Each is a mix of its contributors' colors, weighted by their drawn
/// widths.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BlendColors {
    /// Generation and battery discharge leaving for the grid.
    pub grid_out: Rgb,
    /// Generation, grid and batteries merging into the consumer trunk.
    pub to_consumers: Rgb,
    /// Grid and generation merging into the battery charge flows.
    pub to_batteries: Rgb,
}

impl BlendColors {
    pub(crate) fn new(widths: &FlowWidths, palette: &ParsedPalette) -> Self {
        let gen_to_grid = widths.generation_to_grid;
        let batt_to_grid = widths.batteries_to_grid;
        let grid_out = palette
            .generation
            .mix(&palette.battery_in, ratio_of(gen_to_grid, gen_to_grid + batt_to_grid));

        let to_cons = [
            widths.generation_to_consumers,
            widths.grid_to_consumers,
            widths.batteries_to_consumers,
        ];
        let total: f64 = to_cons.iter().sum();
        let to_consumers = Rgb::mix3(
            [&palette.generation, &palette.grid_in, &palette.battery_in],
            to_cons.map(|w| ratio_of(w, total)),
        );

        let grid_to_batt = widths.grid_to_batteries;
        let gen_to_batt = widths.generation_to_batteries;
        let to_batteries = palette
            .grid_in
            .mix(&palette.generation, ratio_of(grid_to_batt, grid_to_batt + gen_to_batt));

        Self {
            grid_out,
            to_consumers,
            to_batteries,
        }
    }
}
