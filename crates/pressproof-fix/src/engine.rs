// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Auto-fix engine.
//
// Runs the in-process fixes on the owned document first (boxes, bleed, ink,
// overprint, compression), serialises once, then feeds the bytes through the
// renderer stages in order. Every step is independent: a failure is recorded
// against its issues and the next step runs on the last good bytes.

use pressproof_core::config::FixConfig;
use pressproof_core::error::{PreflightError, Result};
use pressproof_core::human_errors::humanize_error;
use pressproof_core::types::{FixResult, IssueCategory, PreflightIssue, PreflightReport, Severity};
use pressproof_document::{Document, fingerprint_matches, load_document};
use pressproof_render::Renderer;
use tracing::{info, instrument, warn};

use crate::fixes::{self, Outcome};
use crate::report::{Ledger, render_markdown};

/// Fixes that are recognised but cannot be carried out in-process.
const NOT_EFFECTIVE: [(IssueCategory, &str); 3] = [
    (
        IssueCategory::Fonts,
        "embedding needs the original font files; re-export with fonts embedded",
    ),
    (
        IssueCategory::SpotColors,
        "spot-to-process conversion is not available; convert in the design application",
    ),
    (
        IssueCategory::HiddenLayers,
        "optional-content pruning is not available; delete the layers before export",
    ),
];

/// Applies the enabled fixes for the issues in a preflight report.
pub struct AutoFixer<'a> {
    renderer: &'a dyn Renderer,
    config: FixConfig,
}

impl<'a> AutoFixer<'a> {
    pub fn new(renderer: &'a dyn Renderer, config: FixConfig) -> Self {
        Self { renderer, config }
    }

    pub fn config(&self) -> &FixConfig {
        &self.config
    }

    /// Fix `bytes`, the document `report` was produced from.
    ///
    /// Never fails. Unfixable or failed issues are listed as remaining, and
    /// when nothing changed the original bytes come back untouched.
    #[instrument(skip_all, fields(file_name = %report.file_name, bytes_len = bytes.len()))]
    pub fn fix(&self, bytes: &[u8], report: &PreflightReport) -> FixResult {
        if !fingerprint_matches(bytes, &report.document_hash) {
            warn!("bytes do not match the analysed document; fixing anyway");
        }

        let mut ledger = Ledger::default();
        let mut current = bytes.to_vec();

        match load_document(bytes) {
            Ok(mut document) => {
                let modified = self.fix_in_process(&mut document, report, &mut ledger);
                if modified {
                    match document.to_bytes() {
                        Ok(out) => current = out,
                        Err(err) => {
                            warn!(%err, "fixed document could not be written");
                            ledger.undo_fixed(&reason(&err));
                        }
                    }
                }
                self.run_render_stages(&mut current, report, &mut ledger);
                self.account_unhandled(report, &mut ledger);
            }
            Err(err) => {
                warn!(%err, "document could not be loaded; nothing fixed");
                let why = reason(&err);
                for issue in &report.issues {
                    ledger.remaining(issue, &why);
                }
            }
        }

        let success = ledger.remaining_is_empty();
        info!(
            fixed = ledger.fixed_count(),
            remaining = ledger.remaining_count(),
            success,
            "auto-fix complete"
        );
        let markdown = render_markdown(&report.file_name, &ledger);
        let (fixed_issues, remaining_issues) = ledger.into_lists();
        FixResult {
            success,
            fixed_issues,
            remaining_issues,
            fixed_bytes: current,
            report: markdown,
        }
    }

    /// The document-level fixes. Returns whether the document changed.
    fn fix_in_process(
        &self,
        document: &mut Document,
        report: &PreflightReport,
        ledger: &mut Ledger,
    ) -> bool {
        let config = &self.config;
        let required = report.bleed.required_bleed;
        let bleed = config.bleed_pt.max(required);
        let max_tac = analysed_tac_limit(config.max_tac, report.ink_coverage.limit);

        let steps: [(IssueCategory, bool, &dyn Fn(&mut Document) -> Result<Outcome>); 5] = [
            (IssueCategory::PageGeometry, config.fix_trim_box, &fixes::repair_page_boxes),
            (IssueCategory::Bleed, config.add_bleed, &|doc: &mut Document| {
                fixes::add_mirrored_bleed(doc, bleed, required)
            }),
            (IssueCategory::InkCoverage, config.adjust_ink_coverage, &|doc: &mut Document| {
                fixes::reduce_ink_coverage(doc, max_tac)
            }),
            (IssueCategory::Overprint, config.fix_overprint, &|doc: &mut Document| {
                Ok(fixes::clear_overprint(doc))
            }),
            (IssueCategory::Compression, config.optimize_images, &|doc: &mut Document| {
                Ok(fixes::compress_streams(doc))
            }),
        ];

        let mut modified = false;
        for (category, enabled, apply) in steps {
            let issues: Vec<&PreflightIssue> = report.issues_in(category).collect();
            if issues.is_empty() {
                continue;
            }
            if !enabled {
                ledger.disabled(&issues);
                continue;
            }
            match apply(document) {
                Ok(outcome) if outcome.changed > 0 => {
                    modified = true;
                    ledger.fixed(&issues, &outcome.detail);
                }
                Ok(_) => {
                    for issue in &issues {
                        ledger.remaining(issue, "nothing to change was found");
                    }
                }
                Err(err) => {
                    warn!(%category, %err, "fix failed");
                    for issue in &issues {
                        ledger.remaining(issue, &reason(&err));
                    }
                }
            }
        }

        for (category, why) in NOT_EFFECTIVE {
            let enabled = match category {
                IssueCategory::Fonts => config.embed_fonts,
                IssueCategory::SpotColors => config.convert_spot_colors,
                _ => config.remove_hidden_layers,
            };
            let issues: Vec<&PreflightIssue> = report.issues_in(category).collect();
            if issues.is_empty() {
                continue;
            }
            if enabled {
                for issue in &issues {
                    ledger.remaining(issue, why);
                }
            } else {
                ledger.disabled(&issues);
            }
        }
        modified
    }

    /// CMYK conversion, flattening, resampling and PDF/X packaging, each
    /// reading the previous stage's output.
    fn run_render_stages(&self, current: &mut Vec<u8>, report: &PreflightReport, ledger: &mut Ledger) {
        let config = &self.config;
        let renderer = self.renderer;
        let target_dpi = config.target_dpi;

        let stages: [(IssueCategory, bool, &str, &dyn Fn(&[u8]) -> Result<Vec<u8>>); 4] = [
            (IssueCategory::ColorSpace, config.convert_rgb_to_cmyk, "converted to CMYK", &|pdf: &[u8]| {
                renderer.convert_to_cmyk(pdf)
            }),
            (IssueCategory::Transparency, config.flatten_transparency, "transparency flattened", &|pdf: &[u8]| {
                renderer.flatten_transparency(pdf)
            }),
            (IssueCategory::ImageOversampled, config.optimize_images, "images resampled", &|pdf: &[u8]| {
                renderer.resample_images(pdf, target_dpi)
            }),
            (IssueCategory::Compliance, config.package_pdfx, "packaged as PDF/X-1a", &|pdf: &[u8]| {
                renderer.make_pdfx1a(pdf)
            }),
        ];

        for (category, enabled, done, apply) in stages {
            let issues: Vec<&PreflightIssue> = report.issues_in(category).collect();
            if issues.is_empty() {
                continue;
            }
            if !enabled {
                ledger.disabled(&issues);
                continue;
            }
            match apply(current.as_slice()) {
                Ok(out) => {
                    *current = out;
                    ledger.fixed(&issues, &format!("{done} by {}", renderer.name()));
                }
                Err(err) => {
                    warn!(%category, %err, renderer = renderer.name(), "render stage failed");
                    for issue in &issues {
                        ledger.remaining(issue, &reason(&err));
                    }
                }
            }
        }
    }

    /// Issues no step looks at: warnings and criticals remain, info issues
    /// become notes.
    fn account_unhandled(&self, report: &PreflightReport, ledger: &mut Ledger) {
        for issue in &report.issues {
            if handled(issue.category) {
                continue;
            }
            match issue.severity {
                Severity::Info => ledger.note(issue, "no automatic fix"),
                Severity::Warning | Severity::Critical => {
                    ledger.remaining(issue, "no automatic fix")
                }
            }
        }
    }
}

fn handled(category: IssueCategory) -> bool {
    matches!(
        category,
        IssueCategory::PageGeometry
            | IssueCategory::Bleed
            | IssueCategory::InkCoverage
            | IssueCategory::Overprint
            | IssueCategory::Compression
            | IssueCategory::Fonts
            | IssueCategory::SpotColors
            | IssueCategory::HiddenLayers
            | IssueCategory::ColorSpace
            | IssueCategory::Transparency
            | IssueCategory::ImageOversampled
            | IssueCategory::Compliance
    )
}

fn reason(err: &PreflightError) -> String {
    humanize_error(err).message
}

/// The stricter of the fixer's own limit and the one the report was
/// analysed against. Reports without ink analysis carry a zero limit.
fn analysed_tac_limit(configured: f64, analysed: f64) -> f64 {
    if analysed > 0.0 {
        configured.min(analysed)
    } else {
        configured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tac_limit_follows_the_stricter_setting() {
        assert_eq!(analysed_tac_limit(300.0, 260.0), 260.0);
        assert_eq!(analysed_tac_limit(280.0, 320.0), 280.0);
        assert_eq!(analysed_tac_limit(300.0, 0.0), 300.0);
    }
}
