// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preflight orchestrator: loads a document, runs every analyzer over the
// pages in parallel and assembles the report.

use chrono::Utc;
use pressproof_core::config::PreflightConfig;
use pressproof_core::types::{OverallStatus, PreflightReport};
use pressproof_document::{
    ContentTarget, Document, Page, ResourceTree, fingerprint, load_document,
};
use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::aggregate::collect_issues;
use crate::color_space::ColorPart;
use crate::compliance::{self, ComplianceInputs};
use crate::geometry::GeometryPart;
use crate::resources::{FontPart, ImagePart, OverprintPart, TransparencyPart};
use crate::structure::{analyze_compression, analyze_layers};
use crate::walk::page_visits;

/// Runs the analyzers with one set of thresholds.
#[derive(Debug, Clone, Default)]
pub struct Preflight {
    config: PreflightConfig,
}

impl Preflight {
    pub fn new(config: PreflightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreflightConfig {
        &self.config
    }

    /// Analyse raw PDF bytes. Never fails: unreadable input produces a
    /// report with a single critical issue.
    #[instrument(skip_all, fields(file_name = %file_name, bytes_len = bytes.len()))]
    pub fn analyze(&self, bytes: &[u8], file_name: &str) -> PreflightReport {
        let hash = fingerprint(bytes);
        match load_document(bytes) {
            Ok(document) => self.analyze_document(&document, bytes.len() as u64, hash, file_name),
            Err(err) => {
                warn!(%err, "document could not be loaded");
                PreflightReport::unreadable(file_name, bytes.len() as u64, hash, &err.to_string())
            }
        }
    }

    /// Analyse an already-loaded document.
    pub fn analyze_document(
        &self,
        document: &Document,
        file_size: u64,
        document_hash: String,
        file_name: &str,
    ) -> PreflightReport {
        let config = &self.config;
        let tree = document.resources();

        let pages = document
            .pages()
            .par_iter()
            .enumerate()
            .map(|(index, page)| PageFindings::scan(tree, index, page, config))
            .reduce(PageFindings::default, PageFindings::merge);

        let (color_space, ink_coverage) = pages.color.finish(config.max_tac);
        let (bleed, page_geometry) = pages
            .geometry
            .finish(config.required_bleed_pt, config.page_size_tolerance_pt);
        let fonts = pages.fonts.finish();
        let images = pages.images.finish(config.min_image_dpi);
        let transparency = pages.transparency.finish();
        let overprint = pages.overprint.finish();

        let info_record = document.info();
        let compliance = compliance::check(
            &ComplianceInputs {
                info: info_record,
                color_space: &color_space,
                transparency: &transparency,
                fonts: &fonts,
                geometry: &page_geometry,
            },
            config.target_standard,
        );

        let mut content_errors = pages.content_errors;
        content_errors.sort();

        let mut report = PreflightReport {
            file_name: file_name.to_string(),
            file_size,
            document_hash,
            generated_at: Utc::now(),
            page_count: document.page_count() as u32,
            pdf_version: info_record.version.clone(),
            color_space,
            ink_coverage,
            bleed,
            page_geometry,
            fonts,
            images,
            transparency,
            overprint,
            layers: analyze_layers(info_record),
            compression: analyze_compression(info_record, config.compression_threshold_bytes),
            compliance,
            issues: Vec::new(),
            overall_status: OverallStatus::Pass,
        };
        report.issues = collect_issues(&report, config, &content_errors);
        report.overall_status = OverallStatus::from_issues(&report.issues);

        info!(
            pages = report.page_count,
            issues = report.issues.len(),
            status = ?report.overall_status,
            "preflight complete"
        );
        report
    }
}

/// Findings for a run of pages. Every field merges commutatively.
#[derive(Debug, Default)]
struct PageFindings {
    color: ColorPart,
    geometry: GeometryPart,
    fonts: FontPart,
    images: ImagePart,
    transparency: TransparencyPart,
    overprint: OverprintPart,
    content_errors: Vec<(u32, String)>,
}

impl PageFindings {
    fn scan(tree: &ResourceTree, index: usize, page: &Page, config: &PreflightConfig) -> Self {
        let visits = page_visits(tree, index, page);
        let images = ImagePart::scan(
            page,
            tree,
            &visits,
            config.min_image_dpi,
            config.max_image_dpi,
        );
        let mut color = ColorPart::scan(page.number, &visits, config.max_tac);
        for _ in 0..images.rgb_images() {
            color.add_rgb_image(page.number);
        }

        let content_errors = std::iter::once(page.content_error.as_ref())
            .chain(visits.iter().filter_map(|visit| match visit.target {
                ContentTarget::Form(id) => {
                    tree.form(id).map(|form| form.content_error.as_ref())
                }
                ContentTarget::Page(_) => None,
            }))
            .flatten()
            .map(|err| (page.number, err.clone()))
            .collect();

        Self {
            color,
            geometry: GeometryPart::scan(
                page,
                config.required_bleed_pt,
                config.page_size_tolerance_pt,
            ),
            fonts: FontPart::scan(page.number, &visits),
            transparency: TransparencyPart::scan(page, tree, &visits),
            overprint: OverprintPart::scan(page.number, &visits),
            images,
            content_errors,
        }
    }

    fn merge(self, other: Self) -> Self {
        let mut content_errors = self.content_errors;
        content_errors.extend(other.content_errors);
        Self {
            color: self.color.merge(other.color),
            geometry: self.geometry.merge(other.geometry),
            fonts: self.fonts.merge(other.fonts),
            images: self.images.merge(other.images),
            transparency: self.transparency.merge(other.transparency),
            overprint: self.overprint.merge(other.overprint),
            content_errors,
        }
    }
}
