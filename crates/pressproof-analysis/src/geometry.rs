// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry analyzer: page boxes, bleed per edge and trim-size classification.

use pressproof_core::geometry::BOX_EPSILON;
use pressproof_core::types::{BleedAnalysis, PageBleed, PageGeometry, PageGeometryAnalysis};
use pressproof_document::Page;

/// Trim sizes recognised by name, portrait, in points.
const STANDARD_SIZES: &[(&str, f64, f64)] = &[
    ("Letter", 612.0, 792.0),
    ("Legal", 612.0, 1008.0),
    ("Tabloid", 792.0, 1224.0),
    ("Executive", 522.0, 756.0),
    ("Half Letter", 396.0, 612.0),
    ("A3", 841.89, 1190.55),
    ("A4", 595.28, 841.89),
    ("A5", 419.53, 595.28),
    ("A6", 297.64, 419.53),
    ("B4", 708.66, 1000.63),
    ("B5", 498.90, 708.66),
    ("DL", 311.81, 623.62),
    ("Business Card (US)", 144.0, 252.0),
    ("Business Card (EU)", 155.91, 240.94),
    ("Postcard", 288.0, 432.0),
];

/// Name of the standard size matching `width` x `height` within `tolerance`
/// (either orientation), or `"custom"`.
pub fn classify_size(width: f64, height: f64, tolerance: f64) -> String {
    let close = |a: f64, b: f64| (a - b).abs() <= tolerance;
    for (name, w, h) in STANDARD_SIZES {
        if close(width, *w) && close(height, *h) {
            return (*name).to_string();
        }
        if close(width, *h) && close(height, *w) {
            return format!("{name} (landscape)");
        }
    }
    "custom".to_string()
}

/// Bleed on each edge: BleedBox edge minus TrimBox edge, zero without a BleedBox.
pub fn page_bleed(page: &Page, required: f64) -> PageBleed {
    let trim = page.effective_trim_box();
    let margins = page
        .bleed_box
        .map(|bleed| bleed.margins_around(&trim))
        .unwrap_or_default();
    let left = margins.left.max(0.0);
    let right = margins.right.max(0.0);
    let top = margins.top.max(0.0);
    let bottom = margins.bottom.max(0.0);
    let has_bleed = [left, right, top, bottom].iter().all(|edge| *edge > BOX_EPSILON);

    PageBleed {
        page_number: page.number,
        left,
        right,
        top,
        bottom,
        has_bleed,
        meets_requirement: margins.all_at_least(required),
    }
}

/// Box dimensions, size name and nesting violations for one page.
pub fn page_geometry(page: &Page, tolerance: f64) -> PageGeometry {
    let trim = page.effective_trim_box();
    let mut violations = Vec::new();

    match page.bleed_box {
        Some(bleed) => {
            if !bleed.contains(&trim, BOX_EPSILON) {
                violations.push(format!("BleedBox {bleed} does not contain TrimBox {trim}"));
            }
            if !page.media_box.contains(&bleed, BOX_EPSILON) {
                violations.push(format!(
                    "MediaBox {} does not contain BleedBox {bleed}",
                    page.media_box
                ));
            }
        }
        None => {
            if !page.media_box.contains(&trim, BOX_EPSILON) {
                violations.push(format!(
                    "MediaBox {} does not contain TrimBox {trim}",
                    page.media_box
                ));
            }
        }
    }

    PageGeometry {
        page_number: page.number,
        media_box: page.media_box,
        crop_box: page.crop_box,
        trim_box: page.trim_box,
        bleed_box: page.bleed_box,
        width_pt: trim.width(),
        height_pt: trim.height(),
        size_name: classify_size(trim.width(), trim.height(), tolerance),
        box_violations: violations,
    }
}

/// Per-page geometry gathered during the parallel pass.
#[derive(Debug, Default)]
pub struct GeometryPart {
    pub bleeds: Vec<PageBleed>,
    pub geometries: Vec<PageGeometry>,
}

impl GeometryPart {
    pub fn scan(page: &Page, required_bleed: f64, tolerance: f64) -> Self {
        Self {
            bleeds: vec![page_bleed(page, required_bleed)],
            geometries: vec![page_geometry(page, tolerance)],
        }
    }

    pub fn merge(mut self, other: Self) -> Self {
        self.bleeds.extend(other.bleeds);
        self.geometries.extend(other.geometries);
        self
    }

    pub fn finish(
        mut self,
        required_bleed: f64,
        tolerance: f64,
    ) -> (BleedAnalysis, PageGeometryAnalysis) {
        self.bleeds.sort_by_key(|b| b.page_number);
        self.geometries.sort_by_key(|g| g.page_number);

        let bleed = BleedAnalysis {
            required_bleed,
            has_bleed: self.bleeds.iter().any(|b| b.has_bleed),
            meets_requirement: !self.bleeds.is_empty()
                && self.bleeds.iter().all(|b| b.meets_requirement),
            pages: self.bleeds,
        };

        let consistent_size = match self.geometries.first() {
            Some(first) => self.geometries.iter().all(|g| {
                (g.width_pt - first.width_pt).abs() <= tolerance
                    && (g.height_pt - first.height_pt).abs() <= tolerance
            }),
            None => true,
        };
        let missing_trim_box_pages = self
            .geometries
            .iter()
            .filter(|g| g.trim_box.is_none())
            .map(|g| g.page_number)
            .collect();
        let box_violation_pages = self
            .geometries
            .iter()
            .filter(|g| !g.box_violations.is_empty())
            .map(|g| g.page_number)
            .collect();

        let geometry = PageGeometryAnalysis {
            pages: self.geometries,
            consistent_size,
            missing_trim_box_pages,
            box_violation_pages,
        };
        (bleed, geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_sizes_match_within_tolerance() {
        assert_eq!(classify_size(612.0, 792.0, 2.0), "Letter");
        assert_eq!(classify_size(595.0, 842.0, 2.0), "A4");
        assert_eq!(classify_size(842.0, 595.0, 2.0), "A4 (landscape)");
        assert_eq!(classify_size(600.0, 800.0, 2.0), "custom");
    }
}
