// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Colour conversion maths: RGB/CMYK, total area coverage, colour-space
// detection from operand arity, black classification and spot approximation.
//
// These are the standard device approximations, not ICC-managed conversions.

use serde::{Deserialize, Serialize};

use crate::error::{PreflightError, Result};

/// Highest possible total area coverage (four channels at 100%).
pub const MAX_POSSIBLE_TAC: f64 = 400.0;

/// Default TAC limit for coated stock.
pub const DEFAULT_MAX_TAC: f64 = 300.0;

/// K at or above this is treated as solid black.
const BLACK_K_THRESHOLD: f64 = 0.95;
/// Combined CMY above this under solid K makes a rich black.
const RICH_BLACK_CMY_THRESHOLD: f64 = 0.30;
/// Combined CMY at or below this under solid K still counts as pure black.
const PURE_BLACK_CMY_TOLERANCE: f64 = 0.01;

/// Colour space implied by a colour operator's operand count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorSpaceKind {
    Grayscale,
    #[serde(rename = "RGB")]
    Rgb,
    #[serde(rename = "CMYK")]
    Cmyk,
    DeviceN,
    Unknown,
}

impl std::fmt::Display for ColorSpaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Grayscale => "Grayscale",
            Self::Rgb => "RGB",
            Self::Cmyk => "CMYK",
            Self::DeviceN => "DeviceN",
            Self::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// An 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// A CMYK colour with every channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Cmyk {
    pub c: f64,
    pub m: f64,
    pub y: f64,
    pub k: f64,
}

impl Cmyk {
    pub const fn new(c: f64, m: f64, y: f64, k: f64) -> Self {
        Self { c, m, y, k }
    }

    pub fn channels(&self) -> [f64; 4] {
        [self.c, self.m, self.y, self.k]
    }

    fn sum(&self) -> f64 {
        self.c + self.m + self.y + self.k
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in ["c", "m", "y", "k"].iter().zip(self.channels()) {
            if !(0.0..=1.0).contains(&value) || value.is_nan() {
                return Err(PreflightError::InvalidColorValue(format!(
                    "{name}={value} is outside [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Convert 8-bit RGB to CMYK.
///
/// Pure black returns `{0, 0, 0, 1}` rather than dividing by zero.
pub fn rgb_to_cmyk(r: u8, g: u8, b: u8) -> Cmyk {
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let k = 1.0 - r.max(g).max(b);
    if (k - 1.0).abs() < f64::EPSILON {
        return Cmyk::new(0.0, 0.0, 0.0, 1.0);
    }

    Cmyk {
        c: (1.0 - r - k) / (1.0 - k),
        m: (1.0 - g - k) / (1.0 - k),
        y: (1.0 - b - k) / (1.0 - k),
        k,
    }
}

/// Convert CMYK back to 8-bit RGB, rounding to the nearest integer.
pub fn cmyk_to_rgb(cmyk: Cmyk) -> Result<Rgb> {
    cmyk.validate()?;
    let channel = |v: f64| (255.0 * (1.0 - v) * (1.0 - cmyk.k)).round().clamp(0.0, 255.0) as u8;
    Ok(Rgb {
        r: channel(cmyk.c),
        g: channel(cmyk.m),
        b: channel(cmyk.y),
    })
}

/// Total area coverage in percent: `(c + m + y + k) * 100`, within `[0, 400]`.
pub fn calculate_tac(c: f64, m: f64, y: f64, k: f64) -> Result<f64> {
    let cmyk = Cmyk::new(c, m, y, k);
    cmyk.validate()?;
    Ok((cmyk.sum() * 100.0).clamp(0.0, MAX_POSSIBLE_TAC))
}

/// Bring a colour under `max_tac` by scaling every channel by the same factor.
///
/// Channel ratios are preserved exactly. This is a proportional reduction,
/// not gray component replacement: no CMY is swapped for K.
pub fn reduce_tac(cmyk: Cmyk, max_tac: f64) -> Cmyk {
    let sum = cmyk.sum();
    if sum * 100.0 <= max_tac || sum <= 0.0 {
        return cmyk;
    }
    let factor = (max_tac / 100.0) / sum;
    Cmyk {
        c: cmyk.c * factor,
        m: cmyk.m * factor,
        y: cmyk.y * factor,
        k: cmyk.k * factor,
    }
}

/// Infer the colour space from the number of colour components.
pub fn detect_color_space(components: &[f64]) -> ColorSpaceKind {
    match components.len() {
        1 => ColorSpaceKind::Grayscale,
        3 => ColorSpaceKind::Rgb,
        4 => ColorSpaceKind::Cmyk,
        n if n > 4 => ColorSpaceKind::DeviceN,
        _ => ColorSpaceKind::Unknown,
    }
}

/// Solid K with a noticeable CMY underlay.
pub fn is_rich_black(cmyk: Cmyk) -> bool {
    cmyk.k >= BLACK_K_THRESHOLD && cmyk.c + cmyk.m + cmyk.y > RICH_BLACK_CMY_THRESHOLD
}

/// Solid K with (practically) no CMY.
pub fn is_pure_black(cmyk: Cmyk) -> bool {
    cmyk.k >= BLACK_K_THRESHOLD && cmyk.c + cmyk.m + cmyk.y <= PURE_BLACK_CMY_TOLERANCE
}

/// Approximate a spot colour in process CMYK.
///
/// When the separation's alternate space gives a full-tint CMYK value it is
/// scaled by `tint`; otherwise a handful of well-known ink names are looked up.
pub fn approximate_spot_color(name: &str, tint: f64, alternate: Option<Cmyk>) -> Option<Cmyk> {
    let tint = tint.clamp(0.0, 1.0);
    let base = alternate.or_else(|| well_known_spot(name))?;
    Some(Cmyk {
        c: base.c * tint,
        m: base.m * tint,
        y: base.y * tint,
        k: base.k * tint,
    })
}

fn well_known_spot(name: &str) -> Option<Cmyk> {
    let lower = name.to_ascii_lowercase();
    let table: &[(&str, Cmyk)] = &[
        ("cyan", Cmyk::new(1.0, 0.0, 0.0, 0.0)),
        ("magenta", Cmyk::new(0.0, 1.0, 0.0, 0.0)),
        ("yellow", Cmyk::new(0.0, 0.0, 1.0, 0.0)),
        ("black", Cmyk::new(0.0, 0.0, 0.0, 1.0)),
        ("pantone reflex blue", Cmyk::new(1.0, 0.73, 0.0, 0.02)),
        ("pantone warm red", Cmyk::new(0.0, 0.75, 0.90, 0.0)),
        ("pantone 485", Cmyk::new(0.0, 0.95, 1.0, 0.0)),
        ("pantone 286", Cmyk::new(1.0, 0.66, 0.0, 0.02)),
        ("pantone 354", Cmyk::new(0.80, 0.0, 0.90, 0.0)),
        ("pantone 021", Cmyk::new(0.0, 0.53, 1.0, 0.0)),
    ];
    table
        .iter()
        .find(|(key, _)| lower == *key || lower.starts_with(&format!("{key} ")))
        .map(|(_, cmyk)| *cmyk)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tac(c: Cmyk) -> f64 {
        calculate_tac(c.c, c.m, c.y, c.k).unwrap()
    }

    #[test]
    fn rgb_round_trip_within_one() {
        for r in (0..=255u16).step_by(17) {
            for g in (0..=255u16).step_by(51) {
                for b in (0..=255u16).step_by(85) {
                    let (r, g, b) = (r as u8, g as u8, b as u8);
                    let back = cmyk_to_rgb(rgb_to_cmyk(r, g, b)).unwrap();
                    assert!((i16::from(back.r) - i16::from(r)).abs() <= 1, "{r},{g},{b}");
                    assert!((i16::from(back.g) - i16::from(g)).abs() <= 1, "{r},{g},{b}");
                    assert!((i16::from(back.b) - i16::from(b)).abs() <= 1, "{r},{g},{b}");
                }
            }
        }
    }

    #[test]
    fn pure_black_has_no_cmy() {
        assert_eq!(rgb_to_cmyk(0, 0, 0), Cmyk::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(rgb_to_cmyk(255, 255, 255), Cmyk::new(0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn tac_endpoints() {
        assert_eq!(calculate_tac(0.0, 0.0, 0.0, 1.0).unwrap(), 100.0);
        assert_eq!(calculate_tac(1.0, 1.0, 1.0, 1.0).unwrap(), 400.0);
        assert!(calculate_tac(1.2, 0.0, 0.0, 0.0).is_err());
        assert!(cmyk_to_rgb(Cmyk::new(-0.1, 0.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn reduce_tac_caps_and_keeps_ratios() {
        let input = Cmyk::new(1.0, 0.9, 0.8, 0.9);
        let reduced = reduce_tac(input, 300.0);
        assert!(tac(reduced) <= 300.0 + 1e-9);
        let ratio = |a: f64, b: f64| a / b;
        assert!((ratio(reduced.c, reduced.k) - ratio(input.c, input.k)).abs() < 1e-12);
        assert!((ratio(reduced.m, reduced.y) - ratio(input.m, input.y)).abs() < 1e-12);
    }

    #[test]
    fn reduce_tac_leaves_compliant_colour_alone() {
        let input = Cmyk::new(0.5, 0.5, 0.5, 0.5);
        assert_eq!(reduce_tac(input, 300.0), input);
    }

    #[test]
    fn detects_space_by_arity() {
        assert_eq!(detect_color_space(&[0.1, 0.2, 0.3]), ColorSpaceKind::Rgb);
        assert_eq!(detect_color_space(&[0.1, 0.2, 0.3, 0.4]), ColorSpaceKind::Cmyk);
        assert_eq!(detect_color_space(&[0.5]), ColorSpaceKind::Grayscale);
        assert_eq!(detect_color_space(&[0.0; 5]), ColorSpaceKind::DeviceN);
        assert_eq!(detect_color_space(&[]), ColorSpaceKind::Unknown);
        assert_eq!(detect_color_space(&[0.0, 0.0]), ColorSpaceKind::Unknown);
    }

    #[test]
    fn black_classification() {
        assert!(is_pure_black(Cmyk::new(0.0, 0.0, 0.0, 1.0)));
        assert!(!is_rich_black(Cmyk::new(0.0, 0.0, 0.0, 1.0)));
        assert!(is_rich_black(Cmyk::new(0.6, 0.4, 0.4, 1.0)));
        assert!(!is_pure_black(Cmyk::new(0.6, 0.4, 0.4, 1.0)));
        assert!(!is_rich_black(Cmyk::new(0.6, 0.4, 0.4, 0.5)));
    }

    #[test]
    fn spot_approximation() {
        let blue = approximate_spot_color("PANTONE Reflex Blue C", 1.0, None).unwrap();
        assert_eq!(blue.c, 1.0);
        let half = approximate_spot_color("Custom", 0.5, Some(Cmyk::new(0.2, 0.4, 0.0, 0.0)))
            .unwrap();
        assert!((half.m - 0.2).abs() < 1e-12);
        assert!(approximate_spot_color("Unknown Ink", 1.0, None).is_none());
    }

    #[test]
    fn colour_space_names_serialise() {
        assert_eq!(serde_json::to_string(&ColorSpaceKind::Rgb).unwrap(), "\"RGB\"");
        assert_eq!(ColorSpaceKind::Grayscale.to_string(), "Grayscale");
    }
}
