// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module contains the configuration options for the `Sankey` engine.

use crate::color::Rgb;
use crate::Error;

/// Threshold below which consumers are grouped when small consumers are
/// hidden and rates are powers in W.
pub const HIDE_CONSUMERS_BELOW_THRESHOLD_W: f64 = 100.0;

/// Threshold below which consumers are grouped when small consumers are
/// hidden and rates are energies in kWh.
pub const HIDE_CONSUMERS_BELOW_THRESHOLD_KWH: f64 = 0.1;

/// The three source colors that every other color in a diagram is blended
/// from.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Palette {
    pub generation: String,
    pub grid_in: String,
    pub battery_in: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            generation: "#0d6a04".to_string(),
            grid_in: "#920e83".to_string(),
            battery_in: "#01f4fc".to_string(),
        }
    }
}

/// A [`Palette`] whose colors have been parsed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ParsedPalette {
    pub(crate) generation: Rgb,
    pub(crate) grid_in: Rgb,
    pub(crate) battery_in: Rgb,
}

impl Palette {
    pub(crate) fn parse(&self) -> Result<ParsedPalette, Error> {
        let parse = |name: &str, value: &str| {
            value.parse::<Rgb>().map_err(|e| {
                Error::invalid_config(format!("Palette color {name} is invalid. {e}"))
            })
        };
        Ok(ParsedPalette {
            generation: parse("generation", &self.generation)?,
            grid_in: parse("grid_in", &self.grid_in)?,
            battery_in: parse("battery_in", &self.battery_in)?,
        })
    }
}

/// Configuration options for the `Sankey` engine.
///
/// Per-cycle policy (grouping thresholds, charge attribution, grid sensor
/// mode) travels with each [`FlowSnapshot`][crate::FlowSnapshot] instead.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SankeyConfig {
    /// The unit appended to label values.  The engine never converts
    /// between units.
    pub unit: String,

    /// The source colors.
    pub palette: Palette,
}

impl Default for SankeyConfig {
    fn default() -> Self {
        Self {
            unit: "kWh".to_string(),
            palette: Palette::default(),
        }
    }
}

impl SankeyConfig {
    /// Checks that the configuration can be used to render diagrams.
    pub fn validate(&self) -> Result<(), Error> {
        self.palette.parse().map(|_| ())
    }

    /// The usual "hide small consumers" threshold for the configured unit,
    /// or 0 if the unit isn't known.
    pub fn hide_consumers_threshold(&self) -> f64 {
        match self.unit.as_str() {
            "W" => HIDE_CONSUMERS_BELOW_THRESHOLD_W,
            "kWh" => HIDE_CONSUMERS_BELOW_THRESHOLD_KWH,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        let mut config = SankeyConfig::default();
        assert!(config.validate().is_ok());

        config.palette.grid_in = "purple".to_string();
        assert_eq!(
            config.validate(),
            Err(Error::invalid_config(
                "Palette color grid_in is invalid. InvalidColor: Can't parse color: purple"
            ))
        );
    }

    #[test]
    fn test_hide_consumers_threshold() {
        let mut config = SankeyConfig::default();
        assert_eq!(config.hide_consumers_threshold(), 0.1);
        config.unit = "W".to_string();
        assert_eq!(config.hide_consumers_threshold(), 100.0);
        config.unit = "MWh".to_string();
        assert_eq!(config.hide_consumers_threshold(), 0.0);
    }
}
