// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end analysis of small PDFs built in memory.

use lopdf::dictionary;
use pressproof_analysis::Preflight;
use pressproof_analysis::walk::page_visits;
use pressproof_core::config::PreflightConfig;
use pressproof_core::types::{IssueCategory, OverallStatus, PdfxStandard, Severity};
use pressproof_document::fixtures::{PageSpec, PdfBuilder};
use pressproof_document::load_document;

fn analyze(bytes: &[u8]) -> pressproof_core::types::PreflightReport {
    Preflight::default().analyze(bytes, "test.pdf")
}

#[test]
fn garbage_yields_single_critical_issue() {
    let report = analyze(b"%PDF-1.4 this is not really a pdf");
    assert_eq!(report.overall_status, OverallStatus::Fail);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].category, IssueCategory::Document);
    assert_eq!(report.issues[0].severity, Severity::Critical);
    assert_eq!(report.page_count, 0);
}

#[test]
fn letter_page_without_boxes_has_no_bleed() {
    let bytes = PdfBuilder::new().page(PageSpec::letter()).build();
    let report = analyze(&bytes);

    assert_eq!(report.page_count, 1);
    assert!(!report.bleed.has_bleed);
    assert!(!report.bleed.meets_requirement);
    assert_eq!(report.bleed.required_bleed, 9.0);
    assert_eq!(report.page_geometry.missing_trim_box_pages, vec![1]);
    assert_eq!(report.page_geometry.pages[0].size_name, "Letter");

    let bleed = report.issues_in(IssueCategory::Bleed).next().unwrap();
    assert_eq!(bleed.severity, Severity::Critical);
    assert!(bleed.auto_fixable);
    assert_eq!(report.overall_status, OverallStatus::Fail);
}

#[test]
fn print_ready_document_passes() {
    let bytes = PdfBuilder::new()
        .page(PageSpec::print_ready().content("0 0 0 1 k 0 0 630 810 re f"))
        .page(PageSpec::print_ready().content("0.2 0.1 0 0 k 0 0 630 810 re f"))
        .build();
    let report = analyze(&bytes);

    assert!(report.bleed.has_bleed);
    assert!(report.bleed.meets_requirement);
    assert!(report.page_geometry.consistent_size);
    assert!(!report.color_space.has_rgb);
    assert!(report.color_space.has_cmyk);
    assert!(!report.transparency.has_transparency);
    assert!(report.issues.is_empty(), "unexpected issues: {:?}", report.issues);
    assert_eq!(report.overall_status, OverallStatus::Pass);
    assert_eq!(report.compliance.standard, "none");
}

#[test]
fn insufficient_bleed_is_a_warning() {
    let page = PageSpec::new([0.0, 0.0, 622.0, 802.0])
        .trim([5.0, 5.0, 617.0, 797.0])
        .bleed([0.0, 0.0, 622.0, 802.0]);
    let report = analyze(&PdfBuilder::new().page(page).build());
    let edge = &report.bleed.pages[0];
    assert!((edge.left - 5.0).abs() < 1e-6);
    assert!(edge.has_bleed);
    assert!(!edge.meets_requirement);
    let issue = report.issues_in(IssueCategory::Bleed).next().unwrap();
    assert_eq!(issue.severity, Severity::Warning);
}

#[test]
fn one_bled_page_is_enough_for_has_bleed() {
    let bytes = PdfBuilder::new()
        .page(PageSpec::print_ready())
        .page(PageSpec::letter())
        .build();
    let report = analyze(&bytes);
    assert!(report.bleed.pages[0].has_bleed);
    assert!(!report.bleed.pages[1].has_bleed);
    assert!(report.bleed.has_bleed);
    assert!(!report.bleed.meets_requirement);
}

#[test]
fn trim_outside_bleed_is_a_box_violation() {
    let page = PageSpec::new([0.0, 0.0, 630.0, 810.0])
        .trim([0.0, 0.0, 630.0, 810.0])
        .bleed([9.0, 9.0, 621.0, 801.0]);
    let report = analyze(&PdfBuilder::new().page(page).build());
    assert_eq!(report.page_geometry.box_violation_pages, vec![1]);
    assert!(
        report
            .issues_in(IssueCategory::PageGeometry)
            .any(|issue| issue.severity == Severity::Critical)
    );
}

#[test]
fn rgb_spot_and_ink_are_reported() {
    let page = PageSpec::print_ready()
        .separation("CS0", "PANTONE 485 C")
        .content("1 0 0 rg 0 0 10 10 re f")
        .content("/CS0 cs 1 scn 10 10 10 10 re f")
        .content("1 1 1 1 k 20 20 10 10 re f");
    let report = analyze(&PdfBuilder::new().page(page).build());

    let colors = &report.color_space;
    assert_eq!(colors.rgb_operators, 1);
    assert_eq!(colors.spot_operators, 1);
    assert!(colors.spot_colors.contains("PANTONE 485 C"));
    assert!(colors.has_rgb && colors.has_spot_colors);
    assert_eq!(report.ink_coverage.maximum_tac, 400.0);
    assert!(report.ink_coverage.exceeds_limit);

    assert!(report.has_issue(IssueCategory::ColorSpace));
    assert!(report.has_issue(IssueCategory::InkCoverage));
    let spot = report.issues_in(IssueCategory::SpotColors).next().unwrap();
    assert_eq!(spot.severity, Severity::Info);
    assert!(!spot.auto_fixable);
}

#[test]
fn fonts_are_deduplicated_across_pages() {
    let bytes = PdfBuilder::new()
        .page(PageSpec::print_ready().font("F1", "ABCDEF+Helvetica", true))
        .page(
            PageSpec::print_ready()
                .font("F1", "ABCDEF+Helvetica", true)
                .font("F2", "Times-Roman", false),
        )
        .build();
    let report = analyze(&bytes);

    let helvetica = &report.fonts.fonts["ABCDEF+Helvetica"];
    assert!(helvetica.embedded && helvetica.subset);
    assert_eq!(helvetica.usage_count, 2);
    assert_eq!(helvetica.pages, vec![1, 2]);
    assert_eq!(report.fonts.unembedded, vec!["Times-Roman".to_string()]);

    let fonts = report.issues_in(IssueCategory::Fonts).next().unwrap();
    assert_eq!(fonts.severity, Severity::Critical);
    assert!(!fonts.auto_fixable);
    assert_eq!(fonts.pages, vec![2]);
}

#[test]
fn image_resolution_is_measured_against_the_page() {
    // 630 x 810 pt page: 8.75 x 11.25 in.
    let page = PageSpec::print_ready()
        .image("Low", 875, 1125, "DeviceCMYK")
        .image("Rgb", 2625, 3375, "DeviceRGB")
        .image("Huge", 8750, 11250, "DeviceCMYK");
    let report = analyze(&PdfBuilder::new().page(page).build());
    let images = &report.images;

    assert_eq!(images.images.len(), 3);
    let low = images.images.iter().find(|i| i.name == "Low").unwrap();
    assert!((low.effective_dpi - 100.0).abs() < 1e-6);
    assert!(!low.compliant);
    assert_eq!(images.low_resolution_count, 1);
    assert_eq!(images.oversampled_count, 1);
    assert_eq!(report.color_space.rgb_images, 1);
    assert!(report.color_space.has_rgb);

    // 100 DPI is under half the 300 DPI floor.
    let issue = report.issues_in(IssueCategory::ImageResolution).next().unwrap();
    assert_eq!(issue.severity, Severity::Critical);
    assert!(report.has_issue(IssueCategory::ImageOversampled));
}

#[test]
fn only_painted_images_are_reported() {
    let bytes = PdfBuilder::new()
        .page(
            PageSpec::print_ready()
                .image("Art", 2625, 3375, "DeviceCMYK")
                .listed_image("Unused", 875, 1125, "DeviceRGB"),
        )
        .page(PageSpec::print_ready().listed_image("Unused", 875, 1125, "DeviceRGB"))
        .build();
    let report = analyze(&bytes);

    let names: Vec<(&str, u32)> = report
        .images
        .images
        .iter()
        .map(|i| (i.name.as_str(), i.page_number))
        .collect();
    assert_eq!(names, vec![("Art", 1)]);
    assert_eq!(report.images.low_resolution_count, 0);
    assert_eq!(report.color_space.rgb_images, 0);
    assert!(!report.color_space.has_rgb);
}

#[test]
fn transparency_pages_are_sorted_and_unique() {
    let multiply = dictionary! { "BM" => "Multiply" };
    let faded = dictionary! { "ca" => 0.5, "SMask" => dictionary! { "S" => "Luminosity" } };
    let bytes = PdfBuilder::new()
        .page(PageSpec::print_ready().ext_gstate("GS0", faded))
        .page(PageSpec::print_ready())
        .page(
            PageSpec::print_ready()
                .ext_gstate("GS0", multiply)
                .masked_image("Im0", 3000, 3000)
                .transparency_group(),
        )
        .build();
    let report = analyze(&bytes);
    let t = &report.transparency;

    assert!(t.has_transparency);
    assert_eq!(t.affected_pages, vec![1, 3]);
    assert!(t.blend_modes.contains("Multiply"));
    assert_eq!(t.soft_masks, 2);
    assert_eq!(t.transparency_groups, 1);
    assert_eq!(t.transparent_objects, 4);
    let issue = report.issues_in(IssueCategory::Transparency).next().unwrap();
    assert_eq!(issue.pages, vec![1, 3]);
}

#[test]
fn overprint_layers_and_compression() {
    let big = "0 0 m 10 10 l S\n".repeat(5000);
    let bytes = PdfBuilder::new()
        .page(
            PageSpec::print_ready()
                .ext_gstate("GS0", dictionary! { "OP" => true, "op" => true })
                .content(&big),
        )
        .layer("Artwork", false)
        .layer("Dieline", true)
        .build();
    let report = analyze(&bytes);

    assert!(report.overprint.has_overprint);
    assert_eq!(report.overprint.overprint_states, 1);
    assert_eq!(report.overprint.affected_pages, vec![1]);
    assert!(report.layers.has_hidden_layers);
    assert_eq!(report.layers.hidden_layers, vec!["Dieline".to_string()]);
    assert!(report.compression.poor_compression);

    assert_eq!(
        report.issues_in(IssueCategory::Overprint).next().unwrap().severity,
        Severity::Info
    );
    assert!(!report.issues_in(IssueCategory::HiddenLayers).next().unwrap().auto_fixable);
    assert!(report.has_issue(IssueCategory::Compression));
}

#[test]
fn declared_x1a_with_rgb_fails_compliance() {
    let bytes = PdfBuilder::new()
        .page(PageSpec::print_ready().content("0 1 0 rg 0 0 10 10 re f"))
        .pdfx_version("PDF/X-1a:2001")
        .output_intent()
        .build();
    let report = analyze(&bytes);

    assert_eq!(report.compliance.declared_standard, Some(PdfxStandard::X1a));
    assert_eq!(report.compliance.standard, "PDF/X-1a");
    assert!(!report.compliance.compliant);
    assert_eq!(report.compliance.violations.len(), 1);
    assert!(report.has_issue(IssueCategory::Compliance));

    let x4 = Preflight::new(PreflightConfig {
        target_standard: Some(PdfxStandard::X4),
        ..PreflightConfig::default()
    })
    .analyze(&bytes, "test.pdf");
    assert!(x4.compliance.compliant);
}

#[test]
fn issues_are_ranked_worst_first() {
    let page = PageSpec::letter()
        .font("F1", "Helvetica", false)
        .ext_gstate("GS0", dictionary! { "OP" => true })
        .content("1 0 0 rg 0 0 10 10 re f");
    let report = analyze(&PdfBuilder::new().page(page).build());
    let severities: Vec<Severity> = report.issues.iter().map(|i| i.severity).collect();
    let mut sorted = severities.clone();
    sorted.sort();
    assert_eq!(severities, sorted);
    assert_eq!(severities.first(), Some(&Severity::Critical));
    assert_eq!(severities.last(), Some(&Severity::Info));
}

#[test]
fn analysis_descends_into_forms() {
    let bytes = PdfBuilder::new()
        .page(PageSpec::letter().content("1 0 0 rg 0 0 612 792 re f"))
        .build();
    let mut document = load_document(&bytes).unwrap();
    document.apply_mirrored_bleed(0, 9.0).unwrap();

    let visits = page_visits(document.resources(), 0, &document.pages()[0]);
    assert_eq!(visits.len(), 2);

    let report = Preflight::default().analyze(&document.to_bytes().unwrap(), "bled.pdf");
    assert!(report.bleed.meets_requirement);
    assert_eq!(report.color_space.rgb_operators, 1);
}

#[test]
fn report_serialises_with_camel_case_names() {
    let report = analyze(&PdfBuilder::new().page(PageSpec::letter()).build());
    let json = serde_json::to_value(&report).unwrap();
    assert!(json["colorSpace"]["hasRGB"].is_boolean());
    assert!(json["inkCoverage"]["maximumTAC"].is_number());
    assert_eq!(json["bleed"]["requiredBleed"], 9.0);
    assert_eq!(json["overallStatus"], "fail");
    assert_eq!(json["pageGeometry"]["pages"][0]["mediaBox"][2], 612.0);
}
