// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use pressproof_core::color::ColorSpaceKind;
use pressproof_core::geometry::POINTS_PER_INCH;
use pressproof_core::types::{ImageAnalysis, ImageInfo};
use pressproof_document::{ImageXObject, Page, ResourceTree};

use crate::walk::{Visit, painted_images};

/// Effective resolution of an image stretched over the whole page: pixels
/// per inch on each axis, taking the lower of the two.
pub fn effective_dpi(image: &ImageXObject, page_width_pt: f64, page_height_pt: f64) -> f64 {
    let per_axis = |pixels: u32, points: f64| {
        if points > 0.0 {
            f64::from(pixels) / (points / POINTS_PER_INCH)
        } else {
            0.0
        }
    };
    per_axis(image.width, page_width_pt).min(per_axis(image.height, page_height_pt))
}

#[derive(Debug, Default)]
pub struct ImagePart {
    images: Vec<ImageInfo>,
    rgb_images: u32,
}

impl ImagePart {
    pub fn scan(
        page: &Page,
        tree: &ResourceTree,
        visits: &[Visit<'_>],
        min_dpi: f64,
        max_dpi: f64,
    ) -> Self {
        let area = page.visible_box();
        let mut part = Self::default();
        for (name, _, image) in painted_images(tree, visits) {
            let dpi = effective_dpi(image, area.width(), area.height());
            if image.color_space.process_kind() == Some(ColorSpaceKind::Rgb) {
                part.rgb_images += 1;
            }
            part.images.push(ImageInfo {
                name: name.to_string(),
                page_number: page.number,
                width: image.width,
                height: image.height,
                bits_per_component: image.bits_per_component,
                color_space: image.color_space.label(),
                filter: image.filter.clone(),
                effective_dpi: dpi,
                compliant: dpi >= min_dpi,
                oversampled: dpi > max_dpi,
            });
        }
        part
    }

    /// RGB images found on this part's pages.
    pub fn rgb_images(&self) -> u32 {
        self.rgb_images
    }

    pub fn merge(mut self, other: Self) -> Self {
        self.images.extend(other.images);
        self.rgb_images += other.rgb_images;
        self
    }

    pub fn finish(mut self, min_dpi: f64) -> ImageAnalysis {
        self.images
            .sort_by(|a, b| (a.page_number, &a.name).cmp(&(b.page_number, &b.name)));
        ImageAnalysis {
            low_resolution_count: self.images.iter().filter(|i| !i.compliant).count() as u32,
            oversampled_count: self.images.iter().filter(|i| i.oversampled).count() as u32,
            minimum_dpi: self
                .images
                .iter()
                .map(|i| i.effective_dpi)
                .min_by(f64::total_cmp),
            required_dpi: min_dpi,
            images: self.images,
        }
    }
}
