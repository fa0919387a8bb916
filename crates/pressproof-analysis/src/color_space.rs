// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Colour-space analyzer: classifies every colour operator reachable from a
// page and accumulates total area coverage over the CMYK ones.

use std::collections::BTreeSet;

use pressproof_core::color::{ColorSpaceKind, calculate_tac};
use pressproof_core::types::{ColorSpaceAnalysis, InkCoverageAnalysis, InkHotspot};
use pressproof_document::{ColorState, SampleKind};

use crate::walk::Visit;

/// Slack for colour values that went through single-precision PDF reals.
const TAC_TOLERANCE: f64 = 0.01;

/// Colour findings for one or more pages.
#[derive(Debug, Default)]
pub struct ColorPart {
    rgb_operators: u32,
    cmyk_operators: u32,
    gray_operators: u32,
    spot_operators: u32,
    spot_colors: BTreeSet<String>,
    rgb_pages: BTreeSet<u32>,
    tac_sum: f64,
    tac_max: f64,
    tac_samples: u32,
    hotspots: Vec<InkHotspot>,
    rgb_images: u32,
}

impl ColorPart {
    pub fn scan(page_number: u32, visits: &[Visit<'_>], max_tac: f64) -> Self {
        let mut part = Self::default();
        for visit in visits {
            let mut state = ColorState::default();
            for (index, op) in visit.operations.iter().enumerate() {
                let Some(sample) = state.observe(index, op, visit.resource_set()) else {
                    continue;
                };
                match sample.kind {
                    SampleKind::Process(ColorSpaceKind::Rgb) => {
                        part.rgb_operators += 1;
                        part.rgb_pages.insert(page_number);
                    }
                    SampleKind::Process(ColorSpaceKind::Grayscale) => part.gray_operators += 1,
                    SampleKind::Process(ColorSpaceKind::Cmyk) => {
                        part.cmyk_operators += 1;
                        part.record_tac(page_number, index, &sample.components, max_tac);
                    }
                    SampleKind::Process(_) => {}
                    SampleKind::Spot(names) => {
                        part.spot_operators += 1;
                        part.spot_colors.extend(names);
                    }
                    SampleKind::SpotSelection(names) => part.spot_colors.extend(names),
                }
            }
        }
        part
    }

    /// Count an RGB image on `page_number`.
    pub fn add_rgb_image(&mut self, page_number: u32) {
        self.rgb_images += 1;
        self.rgb_pages.insert(page_number);
    }

    fn record_tac(&mut self, page_number: u32, index: usize, components: &[f64], max_tac: f64) {
        let [c, m, y, k] = match components {
            [c, m, y, k] => [*c, *m, *y, *k].map(|v| v.clamp(0.0, 1.0)),
            _ => return,
        };
        let Ok(tac) = calculate_tac(c, m, y, k) else {
            return;
        };
        self.tac_sum += tac;
        self.tac_samples += 1;
        self.tac_max = self.tac_max.max(tac);
        if tac > max_tac + TAC_TOLERANCE {
            self.hotspots.push(InkHotspot {
                page_number,
                operator_index: index,
                tac,
            });
        }
    }

    pub fn merge(mut self, other: Self) -> Self {
        self.rgb_operators += other.rgb_operators;
        self.cmyk_operators += other.cmyk_operators;
        self.gray_operators += other.gray_operators;
        self.spot_operators += other.spot_operators;
        self.spot_colors.extend(other.spot_colors);
        self.rgb_pages.extend(other.rgb_pages);
        self.tac_sum += other.tac_sum;
        self.tac_max = self.tac_max.max(other.tac_max);
        self.tac_samples += other.tac_samples;
        self.hotspots.extend(other.hotspots);
        self.rgb_images += other.rgb_images;
        self
    }

    pub fn finish(mut self, max_tac: f64) -> (ColorSpaceAnalysis, InkCoverageAnalysis) {
        self.hotspots
            .sort_by_key(|spot| (spot.page_number, spot.operator_index));

        let colors = ColorSpaceAnalysis {
            rgb_operators: self.rgb_operators,
            cmyk_operators: self.cmyk_operators,
            gray_operators: self.gray_operators,
            spot_operators: self.spot_operators,
            rgb_images: self.rgb_images,
            has_rgb: self.rgb_operators > 0 || self.rgb_images > 0,
            has_cmyk: self.cmyk_operators > 0,
            has_spot_colors: !self.spot_colors.is_empty(),
            has_grayscale: self.gray_operators > 0,
            spot_colors: self.spot_colors,
            rgb_pages: self.rgb_pages.into_iter().collect(),
        };

        let average_tac = if self.tac_samples > 0 {
            self.tac_sum / f64::from(self.tac_samples)
        } else {
            0.0
        };
        let ink = InkCoverageAnalysis {
            maximum_tac: self.tac_max,
            average_tac,
            limit: max_tac,
            exceeds_limit: self.tac_max > max_tac + TAC_TOLERANCE,
            samples: self.tac_samples,
            hotspots: self.hotspots,
        };
        (colors, ink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressproof_document::{ContentOp, ContentTarget, Operand};

    fn op(operator: &str, numbers: &[f64]) -> ContentOp {
        ContentOp::new(operator, numbers.iter().map(|n| Operand::Real(*n)).collect())
    }

    fn visit(ops: &[ContentOp]) -> Visit<'_> {
        Visit {
            target: ContentTarget::Page(0),
            operations: ops,
            resources: None,
            transparency_group: false,
        }
    }

    #[test]
    fn counts_and_tac() {
        let ops = vec![
            op("rg", &[1.0, 0.0, 0.0]),
            op("k", &[1.0, 1.0, 1.0, 1.0]),
            op("K", &[0.0, 0.0, 0.0, 1.0]),
            op("g", &[0.5]),
        ];
        let (colors, ink) = ColorPart::scan(1, &[visit(&ops)], 300.0).finish(300.0);
        assert_eq!(colors.rgb_operators, 1);
        assert_eq!(colors.cmyk_operators, 2);
        assert_eq!(colors.gray_operators, 1);
        assert!(colors.has_rgb && colors.has_cmyk && colors.has_grayscale);
        assert_eq!(colors.rgb_pages, vec![1]);
        assert_eq!(ink.maximum_tac, 400.0);
        assert_eq!(ink.average_tac, 250.0);
        assert!(ink.exceeds_limit);
        assert_eq!(ink.hotspots.len(), 1);
        assert_eq!(ink.hotspots[0].operator_index, 1);
    }

    #[test]
    fn merge_is_order_independent() {
        let a_ops = vec![op("k", &[0.5, 0.5, 0.5, 0.5])];
        let b_ops = vec![op("rg", &[0.0, 1.0, 0.0])];
        let a = || ColorPart::scan(2, &[visit(&a_ops)], 300.0);
        let b = || ColorPart::scan(1, &[visit(&b_ops)], 300.0);
        let (left, left_ink) = a().merge(b()).finish(300.0);
        let (right, right_ink) = b().merge(a()).finish(300.0);
        assert_eq!(left, right);
        assert_eq!(left_ink, right_ink);
    }
}
