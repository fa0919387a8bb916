// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Analyse-then-fix runs over small PDFs built in memory.

use std::sync::Mutex;

use lopdf::dictionary;
use pressproof_analysis::Preflight;
use pressproof_core::config::{FixConfig, PreflightConfig};
use pressproof_core::error::{PreflightError, Result};
use pressproof_core::geometry::Rect;
use pressproof_core::types::{FixResult, IssueCategory, PreflightReport};
use pressproof_document::fixtures::{PageSpec, PdfBuilder};
use pressproof_document::load_document;
use pressproof_fix::AutoFixer;
use pressproof_render::{Renderer, UnavailableRenderer};

/// Appends a marker per stage so chaining is visible in the output bytes.
#[derive(Default)]
struct ScriptedRenderer {
    calls: Mutex<Vec<String>>,
    fail_flatten: bool,
}

impl ScriptedRenderer {
    fn stage(&self, name: String, pdf: &[u8]) -> Result<Vec<u8>> {
        self.calls.lock().unwrap().push(name.clone());
        let mut out = pdf.to_vec();
        out.extend_from_slice(format!("\n%{name}").as_bytes());
        Ok(out)
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Renderer for ScriptedRenderer {
    fn name(&self) -> &str {
        "scripted"
    }

    fn convert_to_cmyk(&self, pdf: &[u8]) -> Result<Vec<u8>> {
        self.stage("cmyk".into(), pdf)
    }

    fn flatten_transparency(&self, pdf: &[u8]) -> Result<Vec<u8>> {
        if self.fail_flatten {
            self.calls.lock().unwrap().push("flatten-failed".into());
            return Err(PreflightError::ExternalToolFailed {
                tool: "scripted".into(),
                code: Some(1),
                stderr: "flattening crashed".into(),
            });
        }
        self.stage("flatten".into(), pdf)
    }

    fn resample_images(&self, pdf: &[u8], target_dpi: u32) -> Result<Vec<u8>> {
        self.stage(format!("resample-{target_dpi}"), pdf)
    }

    fn make_pdfx1a(&self, pdf: &[u8]) -> Result<Vec<u8>> {
        self.stage("pdfx".into(), pdf)
    }
}

fn analyze(bytes: &[u8]) -> PreflightReport {
    Preflight::default().analyze(bytes, "job.pdf")
}

fn fix_with(renderer: &dyn Renderer, config: FixConfig, bytes: &[u8]) -> FixResult {
    let report = analyze(bytes);
    AutoFixer::new(renderer, config).fix(bytes, &report)
}

fn fix(bytes: &[u8]) -> FixResult {
    fix_with(&UnavailableRenderer::default(), FixConfig::default(), bytes)
}

fn mentions(entries: &[String], category: IssueCategory) -> bool {
    let prefix = format!("{category}:");
    entries.iter().any(|entry| entry.starts_with(&prefix))
}

#[test]
fn letter_page_gets_trim_and_mirrored_bleed() {
    let bytes = PdfBuilder::new()
        .page(PageSpec::letter().content("0 0 0 1 k 0 0 612 792 re f"))
        .build();
    let before = analyze(&bytes);
    assert!(!before.bleed.has_bleed);
    assert!(!before.bleed.meets_requirement);

    let result = fix(&bytes);
    assert!(result.success, "remaining: {:?}", result.remaining_issues);
    assert!(mentions(&result.fixed_issues, IssueCategory::Bleed));
    assert!(mentions(&result.fixed_issues, IssueCategory::PageGeometry));

    let fixed = load_document(&result.fixed_bytes).unwrap();
    let page = &fixed.pages()[0];
    assert_eq!(page.trim_box, Some(Rect::new(0.0, 0.0, 612.0, 792.0)));
    assert_eq!(page.bleed_box, Some(Rect::new(-9.0, -9.0, 621.0, 801.0)));
    assert_eq!(page.media_box, Rect::new(-9.0, -9.0, 621.0, 801.0));

    let after = analyze(&result.fixed_bytes);
    assert!(after.bleed.meets_requirement);
    assert!(after.issues.is_empty(), "{:?}", after.issues);
}

#[test]
fn print_ready_document_is_returned_untouched() {
    let bytes = PdfBuilder::new()
        .page(PageSpec::print_ready().content("0 0 0 1 k 0 0 630 810 re f"))
        .build();
    let result = fix(&bytes);

    assert!(result.success);
    assert!(result.fixed_issues.is_empty());
    assert!(result.remaining_issues.is_empty());
    assert_eq!(result.fixed_bytes, bytes);
    assert!(result.report.contains("print-ready"));
}

#[test]
fn second_run_changes_nothing() {
    let bytes = PdfBuilder::new().page(PageSpec::letter()).build();
    let first = fix(&bytes);
    let second = fix(&first.fixed_bytes);

    assert!(second.fixed_issues.is_empty());
    assert_eq!(second.fixed_bytes, first.fixed_bytes);

    let once = load_document(&first.fixed_bytes).unwrap();
    let twice = load_document(&second.fixed_bytes).unwrap();
    let (a, b) = (&once.pages()[0], &twice.pages()[0]);
    assert_eq!(a.media_box, b.media_box);
    assert_eq!(a.trim_box, b.trim_box);
    assert_eq!(a.bleed_box, b.bleed_box);
}

#[test]
fn missing_renderer_leaves_rgb_remaining() {
    let bytes = PdfBuilder::new()
        .page(PageSpec::print_ready().content("1 0 0 rg 0 0 10 10 re f"))
        .build();
    let result = fix(&bytes);

    assert!(!result.success);
    assert!(mentions(&result.remaining_issues, IssueCategory::ColorSpace));
    assert!(result.fixed_issues.is_empty());
    assert_eq!(result.fixed_bytes, bytes);
    assert!(result.report.contains("not print-ready"));
}

#[test]
fn render_stages_run_in_order_on_previous_output() {
    let bytes = PdfBuilder::new()
        .page(
            PageSpec::print_ready()
                .content("0 1 0 rg 0 0 10 10 re f")
                .ext_gstate("GS0", dictionary! { "ca" => 0.5 })
                .image("Huge", 8750, 11250, "DeviceCMYK"),
        )
        .build();
    let renderer = ScriptedRenderer::default();
    let result = fix_with(&renderer, FixConfig::default(), &bytes);

    assert_eq!(renderer.calls(), vec!["cmyk", "flatten", "resample-300"]);
    assert!(result.fixed_bytes.ends_with(b"\n%cmyk\n%flatten\n%resample-300"));
    assert!(result.success, "remaining: {:?}", result.remaining_issues);
    assert!(mentions(&result.fixed_issues, IssueCategory::Transparency));
}

#[test]
fn failed_stage_keeps_previous_bytes_and_continues() {
    let bytes = PdfBuilder::new()
        .page(
            PageSpec::print_ready()
                .content("0 1 0 rg 0 0 10 10 re f")
                .ext_gstate("GS0", dictionary! { "BM" => "Multiply" })
                .image("Huge", 8750, 11250, "DeviceCMYK"),
        )
        .build();
    let renderer = ScriptedRenderer {
        fail_flatten: true,
        ..ScriptedRenderer::default()
    };
    let config = FixConfig {
        target_dpi: 240,
        ..FixConfig::default()
    };
    let result = fix_with(&renderer, config, &bytes);

    assert_eq!(renderer.calls(), vec!["cmyk", "flatten-failed", "resample-240"]);
    assert!(result.fixed_bytes.ends_with(b"\n%cmyk\n%resample-240"));
    assert!(!result.success);
    assert!(mentions(&result.remaining_issues, IssueCategory::Transparency));
    assert!(mentions(&result.fixed_issues, IssueCategory::ColorSpace));
}

#[test]
fn pdfx_packaging_runs_only_when_enabled() {
    let bytes = PdfBuilder::new()
        .page(PageSpec::print_ready())
        .pdfx_version("PDF/X-1a:2001")
        .build();

    let renderer = ScriptedRenderer::default();
    let skipped = fix_with(&renderer, FixConfig::default(), &bytes);
    assert!(renderer.calls().is_empty());
    assert!(mentions(&skipped.remaining_issues, IssueCategory::Compliance));

    let config = FixConfig {
        package_pdfx: true,
        ..FixConfig::default()
    };
    let packaged = fix_with(&renderer, config, &bytes);
    assert_eq!(renderer.calls(), vec!["pdfx"]);
    assert!(packaged.success);
}

#[test]
fn disabled_bleed_fix_is_reported_as_remaining() {
    let bytes = PdfBuilder::new()
        .page(PageSpec::new([0.0, 0.0, 612.0, 792.0]).trim([0.0, 0.0, 612.0, 792.0]))
        .build();
    let config = FixConfig {
        add_bleed: false,
        ..FixConfig::default()
    };
    let result = fix_with(&UnavailableRenderer::default(), config, &bytes);

    assert!(!result.success);
    assert!(result.remaining_issues[0].contains("fix disabled"));
    assert_eq!(result.fixed_bytes, bytes);
}

#[test]
fn heavy_ink_is_brought_under_the_limit() {
    let bytes = PdfBuilder::new()
        .page(PageSpec::print_ready().content("1 1 1 1 k 0 0 630 810 re f"))
        .build();
    let result = fix(&bytes);
    assert!(result.success, "remaining: {:?}", result.remaining_issues);

    let after = analyze(&result.fixed_bytes);
    assert!(!after.ink_coverage.exceeds_limit);
    assert!(after.ink_coverage.maximum_tac <= 300.0 + 0.01);
}

#[test]
fn ink_is_reduced_to_the_analysed_limit() {
    let bytes = PdfBuilder::new()
        .page(PageSpec::print_ready().content("0.9 0.9 0.5 0.6 k 0 0 630 810 re f"))
        .build();
    let preflight = Preflight::new(PreflightConfig {
        max_tac: 260.0,
        ..PreflightConfig::default()
    });
    let report = preflight.analyze(&bytes, "job.pdf");
    assert!(report.ink_coverage.exceeds_limit);

    let result = AutoFixer::new(&UnavailableRenderer::default(), FixConfig::default())
        .fix(&bytes, &report);
    assert!(result.success, "remaining: {:?}", result.remaining_issues);
    assert!(mentions(&result.fixed_issues, IssueCategory::InkCoverage));

    let after = preflight.analyze(&result.fixed_bytes, "job.pdf");
    assert!(!after.ink_coverage.exceeds_limit);
    assert!(after.ink_coverage.maximum_tac <= 260.0 + 0.01);
}

#[test]
fn overprint_is_cleared() {
    let bytes = PdfBuilder::new()
        .page(PageSpec::print_ready().ext_gstate("GS0", dictionary! { "OP" => true, "op" => true }))
        .build();
    let result = fix(&bytes);
    assert!(mentions(&result.fixed_issues, IssueCategory::Overprint));
    assert!(!analyze(&result.fixed_bytes).overprint.has_overprint);
}

#[test]
fn unfixable_issues_are_not_claimed() {
    let bytes = PdfBuilder::new()
        .page(
            PageSpec::print_ready()
                .font("F1", "Times-Roman", false)
                .image("Low", 875, 1125, "DeviceCMYK"),
        )
        .layer("Dieline", true)
        .build();
    let result = fix(&bytes);

    assert!(!result.success);
    assert!(result.fixed_issues.is_empty());
    for category in [
        IssueCategory::Fonts,
        IssueCategory::ImageResolution,
        IssueCategory::HiddenLayers,
    ] {
        assert!(mentions(&result.remaining_issues, category), "{category} not remaining");
    }
    assert_eq!(result.fixed_bytes, bytes);
}

#[test]
fn unreadable_input_is_returned_as_is() {
    let bytes = b"definitely not a pdf".to_vec();
    let result = fix(&bytes);
    assert!(!result.success);
    assert_eq!(result.fixed_bytes, bytes);
    assert_eq!(result.remaining_issues.len(), 1);
}
