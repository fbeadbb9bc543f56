// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Hex color parsing and ratio-weighted blending.
//!
//! Blend zones in the diagram are colored by the mix of sources feeding them,
//! so every ratio here comes from rendered flow widths.  Ratios are never
//! rejected: anything outside `[0, 1]` is clipped and a `0 / 0` ratio counts
//! as no contribution.

use std::fmt::Display;
use std::str::FromStr;

use crate::Error;

/// An RGB color, parsed from and displayed as a CSS hex string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn from_channels(r: f64, g: f64, b: f64) -> Self {
        let channel = |c: f64| c.round().clamp(0.0, 255.0) as u8;
        Self {
            r: channel(r),
            g: channel(g),
            b: channel(b),
        }
    }

    fn channels(&self) -> [f64; 3] {
        [self.r as f64, self.g as f64, self.b as f64]
    }

    /// Blends `self` with `other`, `ratio` being the weight of `self`.
    pub fn mix(&self, other: &Rgb, ratio: f64) -> Rgb {
        let ratio = clip_ratio(ratio);
        let [r1, g1, b1] = self.channels();
        let [r2, g2, b2] = other.channels();
        Rgb::from_channels(
            r1 * ratio + r2 * (1.0 - ratio),
            g1 * ratio + g2 * (1.0 - ratio),
            b1 * ratio + b2 * (1.0 - ratio),
        )
    }

    /// Blends three colors by the given weights.
    ///
    /// Weights are clipped to `[0, 1]` and then normalized so that they sum
    /// to 1.  If they are all zero, the result is black.
    pub fn mix3(colors: [&Rgb; 3], ratios: [f64; 3]) -> Rgb {
        let ratios = ratios.map(clip_ratio);
        let total: f64 = ratios.iter().sum();
        let ratios = if total > 0.0 {
            ratios.map(|r| r / total)
        } else {
            ratios
        };
        let mut mixed = [0.0; 3];
        for (color, ratio) in colors.iter().zip(ratios) {
            for (acc, c) in mixed.iter_mut().zip(color.channels()) {
                *acc += c * ratio;
            }
        }
        Rgb::from_channels(mixed[0], mixed[1], mixed[2])
    }
}

impl FromStr for Rgb {
    type Err = Error;

    /// Parses `#rrggbb`, `rrggbb`, `#rgb` or `rgb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return Err(Error::invalid_color(format!("Can't parse color: {s}"))),
        };
        let channel = |i: usize| {
            expanded
                .get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| Error::invalid_color(format!("Can't parse color: {s}")))
        };
        Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Clips a ratio to `[0, 1]`, mapping NaN to 0.
pub fn clip_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

/// Returns `part / total` as a clipped ratio, or 0 when `total` is not
/// positive.
pub fn ratio_of(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        clip_ratio(part / total)
    } else {
        0.0
    }
}

/// Mixes two hex colors, `ratio` being the weight of `hex1`.
pub fn mix_hexes(hex1: &str, hex2: &str, ratio: f64) -> Result<String, Error> {
    let c1: Rgb = hex1.parse()?;
    let c2: Rgb = hex2.parse()?;
    Ok(c1.mix(&c2, ratio).to_string())
}

/// Mixes three hex colors by the given weights.
pub fn mix3_hexes(
    hex1: &str,
    hex2: &str,
    hex3: &str,
    ratio1: f64,
    ratio2: f64,
    ratio3: f64,
) -> Result<String, Error> {
    let c1: Rgb = hex1.parse()?;
    let c2: Rgb = hex2.parse()?;
    let c3: Rgb = hex3.parse()?;
    Ok(Rgb::mix3([&c1, &c2, &c3], [ratio1, ratio2, ratio3]).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() -> Result<(), Error> {
        assert_eq!("#0d6a04".parse::<Rgb>()?, Rgb::new(0x0d, 0x6a, 0x04));
        assert_eq!("920E83".parse::<Rgb>()?, Rgb::new(0x92, 0x0e, 0x83));
        assert_eq!("#fff".parse::<Rgb>()?, Rgb::new(255, 255, 255));
        assert_eq!(Rgb::new(1, 244, 252).to_string(), "#01f4fc");

        assert_eq!(
            "#12".parse::<Rgb>(),
            Err(Error::invalid_color("Can't parse color: #12"))
        );
        assert_eq!(
            "#zz0000".parse::<Rgb>(),
            Err(Error::invalid_color("Can't parse color: #zz0000"))
        );
        Ok(())
    }

    #[test]
    fn test_mix_hexes() -> Result<(), Error> {
        assert_eq!(mix_hexes("#000000", "#ffffff", 0.5)?, "#808080");
        assert_eq!(mix_hexes("#0d6a04", "#01f4fc", 1.0)?, "#0d6a04");
        assert_eq!(mix_hexes("#0d6a04", "#01f4fc", 0.0)?, "#01f4fc");

        // Out of range and undefined ratios are clipped, not rejected.
        assert_eq!(mix_hexes("#000000", "#ffffff", 1.7)?, "#000000");
        assert_eq!(mix_hexes("#000000", "#ffffff", -3.0)?, "#ffffff");
        assert_eq!(mix_hexes("#000000", "#ffffff", f64::NAN)?, "#ffffff");

        assert!(mix_hexes("#000000", "nope", 0.5).is_err());
        Ok(())
    }

    #[test]
    fn test_mix3_hexes() -> Result<(), Error> {
        assert_eq!(
            mix3_hexes("#0d6a04", "#920e83", "#01f4fc", 1.0, 0.0, 0.0)?,
            "#0d6a04"
        );
        assert_eq!(
            mix3_hexes("#0d6a04", "#920e83", "#01f4fc", 0.0, 0.0, 1.0)?,
            "#01f4fc"
        );
        assert_eq!(
            mix3_hexes("#ff0000", "#00ff00", "#0000ff", 0.5, 0.5, 0.0)?,
            "#808000"
        );

        // Ratios that don't quite add up to one are normalized first.
        assert_eq!(
            mix3_hexes("#ff0000", "#00ff00", "#0000ff", 0.5, 0.55, 0.0)?,
            mix3_hexes("#ff0000", "#00ff00", "#0000ff", 0.5 / 1.05, 0.55 / 1.05, 0.0)?
        );
        assert_eq!(
            mix3_hexes("#ff0000", "#ff0000", "#ff0000", 0.4, 0.4, 0.4)?,
            "#ff0000"
        );

        // No contribution at all.
        assert_eq!(
            mix3_hexes("#ff0000", "#00ff00", "#0000ff", 0.0, 0.0, 0.0)?,
            "#000000"
        );
        Ok(())
    }

    #[test]
    fn test_ratio_of() {
        assert_eq!(ratio_of(1.0, 4.0), 0.25);
        assert_eq!(ratio_of(0.0, 0.0), 0.0);
        assert_eq!(ratio_of(5.0, 0.0), 0.0);
        assert_eq!(ratio_of(5.0, 2.0), 1.0);
        assert_eq!(ratio_of(-1.0, 2.0), 0.0);
    }
}
