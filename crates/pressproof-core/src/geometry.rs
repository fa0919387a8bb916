// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page-box rectangles and the arithmetic preflight needs on them.

use serde::{Deserialize, Serialize};

/// Points per inch (PDF user space unit).
pub const POINTS_PER_INCH: f64 = 72.0;

/// Default tolerance when comparing box coordinates.
pub const BOX_EPSILON: f64 = 0.01;

/// An axis-aligned rectangle in PDF points, stored normalised so that
/// `llx <= urx` and `lly <= ury`.
///
/// Serialises as the PDF array form `[llx, lly, urx, ury]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Rect {
    pub llx: f64,
    pub lly: f64,
    pub urx: f64,
    pub ury: f64,
}

impl Rect {
    /// Build a rectangle from two opposite corners in any order.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            llx: x0.min(x1),
            lly: y0.min(y1),
            urx: x0.max(x1),
            ury: y0.max(y1),
        }
    }

    pub fn width(&self) -> f64 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f64 {
        self.ury - self.lly
    }

    /// Whether `inner` lies entirely inside `self`, allowing `tolerance`
    /// points of slack on each edge.
    pub fn contains(&self, inner: &Rect, tolerance: f64) -> bool {
        inner.llx >= self.llx - tolerance
            && inner.lly >= self.lly - tolerance
            && inner.urx <= self.urx + tolerance
            && inner.ury <= self.ury + tolerance
    }

    /// Grow the rectangle by `amount` points on every edge.
    pub fn expand(&self, amount: f64) -> Rect {
        Rect {
            llx: self.llx - amount,
            lly: self.lly - amount,
            urx: self.urx + amount,
            ury: self.ury + amount,
        }
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            llx: self.llx.min(other.llx),
            lly: self.lly.min(other.lly),
            urx: self.urx.max(other.urx),
            ury: self.ury.max(other.ury),
        }
    }

    /// Overlap of both rectangles, or `None` when they are disjoint.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let llx = self.llx.max(other.llx);
        let lly = self.lly.max(other.lly);
        let urx = self.urx.min(other.urx);
        let ury = self.ury.min(other.ury);
        (llx < urx && lly < ury).then_some(Rect { llx, lly, urx, ury })
    }

    pub fn approx_eq(&self, other: &Rect, tolerance: f64) -> bool {
        (self.llx - other.llx).abs() <= tolerance
            && (self.lly - other.lly).abs() <= tolerance
            && (self.urx - other.urx).abs() <= tolerance
            && (self.ury - other.ury).abs() <= tolerance
    }

    /// Distance from each edge of `inner` out to the matching edge of `self`.
    /// Negative values mean `inner` pokes out on that side.
    pub fn margins_around(&self, inner: &Rect) -> Edges {
        Edges {
            left: inner.llx - self.llx,
            bottom: inner.lly - self.lly,
            right: self.urx - inner.urx,
            top: self.ury - inner.ury,
        }
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.llx, self.lly, self.urx, self.ury]
    }
}

impl From<[f64; 4]> for Rect {
    fn from(values: [f64; 4]) -> Self {
        Rect::new(values[0], values[1], values[2], values[3])
    }
}

impl From<Rect> for [f64; 4] {
    fn from(rect: Rect) -> Self {
        rect.to_array()
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} {} {} {}]",
            trim_float(self.llx),
            trim_float(self.lly),
            trim_float(self.urx),
            trim_float(self.ury)
        )
    }
}

/// Per-edge distances, in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Edges {
    pub fn min(&self) -> f64 {
        self.left.min(self.right).min(self.top).min(self.bottom)
    }

    pub fn all_at_least(&self, threshold: f64) -> bool {
        self.min() + BOX_EPSILON >= threshold
    }
}

/// Convert inches to points.
pub fn inches_to_points(inches: f64) -> f64 {
    inches * POINTS_PER_INCH
}

/// Convert millimetres to points.
pub fn mm_to_points(mm: f64) -> f64 {
    mm * POINTS_PER_INCH / 25.4
}

fn trim_float(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalises_corners() {
        let r = Rect::new(612.0, 792.0, 0.0, 0.0);
        assert_eq!(r.to_array(), [0.0, 0.0, 612.0, 792.0]);
        assert_eq!(r.width(), 612.0);
        assert_eq!(r.height(), 792.0);
    }

    #[test]
    fn expand_by_eighth_inch() {
        let trim = Rect::new(0.0, 0.0, 612.0, 792.0);
        let bleed = trim.expand(inches_to_points(0.125));
        assert_eq!(bleed.to_array(), [-9.0, -9.0, 621.0, 801.0]);
        assert!(bleed.contains(&trim, 0.0));
        assert!(!trim.contains(&bleed, 0.0));
    }

    #[test]
    fn margins_around_inner_box() {
        let bleed = Rect::new(-9.0, -9.0, 621.0, 801.0);
        let trim = Rect::new(0.0, 0.0, 612.0, 792.0);
        let edges = bleed.margins_around(&trim);
        assert_eq!(edges.left, 9.0);
        assert_eq!(edges.top, 9.0);
        assert!(edges.all_at_least(9.0));
        assert!(!edges.all_at_least(9.5));
    }

    #[test]
    fn intersection_of_disjoint_is_none() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 20.0, 30.0, 30.0);
        assert!(a.intersection(&b).is_none());
        assert_eq!(a.union(&b).to_array(), [0.0, 0.0, 30.0, 30.0]);
    }

    #[test]
    fn serialises_as_pdf_array() {
        let json = serde_json::to_string(&Rect::new(0.0, 0.0, 612.0, 792.0)).unwrap();
        assert_eq!(json, "[0.0,0.0,612.0,792.0]");
        let back: Rect = serde_json::from_str("[10,20,0,0]").unwrap();
        assert_eq!(back.to_array(), [0.0, 0.0, 10.0, 20.0]);
    }

    #[test]
    fn display_trims_decimals() {
        assert_eq!(Rect::new(-9.0, -9.0, 621.5, 801.0).to_string(), "[-9 -9 621.5 801]");
    }

    #[test]
    fn mm_conversion() {
        assert!((mm_to_points(25.4) - 72.0).abs() < 1e-9);
    }
}
