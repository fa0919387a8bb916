// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Issue aggregator: turns analysis records into ranked preflight issues.

use pressproof_core::config::PreflightConfig;
use pressproof_core::types::{IssueCategory, PreflightIssue, PreflightReport, Severity};

use crate::compliance::page_list;

/// Build the issue list for `report`, worst severity first, then by category.
///
/// `content_errors` are pages whose content stream could not be decoded.
pub fn collect_issues(
    report: &PreflightReport,
    config: &PreflightConfig,
    content_errors: &[(u32, String)],
) -> Vec<PreflightIssue> {
    let mut issues = Vec::new();

    if !content_errors.is_empty() {
        let issue = PreflightIssue::new(
            IssueCategory::Document,
            Severity::Warning,
            String::new(),
            "Re-export the PDF; the affected pages may print incorrectly.",
        )
        .on_pages(content_errors.iter().map(|(page, _)| *page));
        let message = format!(
            "Page content could not be read on {} page(s); those pages were not fully checked",
            issue.pages.len()
        );
        issues.push(PreflightIssue { message, ..issue });
    }

    geometry_issues(report, config, &mut issues);
    color_issues(report, &mut issues);
    resource_issues(report, config, &mut issues);
    structure_issues(report, &mut issues);

    for violation in &report.compliance.violations {
        issues.push(
            PreflightIssue::new(
                IssueCategory::Compliance,
                Severity::Critical,
                violation.clone(),
                format!(
                    "Export as {} from the design application, or run the PDF/X packaging fix.",
                    report.compliance.standard
                ),
            )
            .fixable(),
        );
    }

    issues.sort_by_key(|issue| (issue.severity, issue.category));
    issues
}

fn geometry_issues(report: &PreflightReport, config: &PreflightConfig, issues: &mut Vec<PreflightIssue>) {
    let geometry = &report.page_geometry;
    let bleed = &report.bleed;

    if !geometry.box_violation_pages.is_empty() {
        let detail = geometry
            .pages
            .iter()
            .flat_map(|page| page.box_violations.iter())
            .next()
            .cloned()
            .unwrap_or_default();
        issues.push(
            PreflightIssue::new(
                IssueCategory::PageGeometry,
                Severity::Critical,
                format!("Page boxes are not nested correctly ({detail})"),
                "MediaBox must contain BleedBox, and BleedBox must contain TrimBox.",
            )
            .fixable()
            .on_pages(geometry.box_violation_pages.iter().copied()),
        );
    }

    if !geometry.missing_trim_box_pages.is_empty() {
        issues.push(
            PreflightIssue::new(
                IssueCategory::PageGeometry,
                Severity::Warning,
                "No TrimBox is set, so the final cut size is ambiguous",
                "Set the trim size in the export settings; auto-fix uses the visible page area.",
            )
            .fixable()
            .on_pages(geometry.missing_trim_box_pages.iter().copied()),
        );
    }

    if !geometry.consistent_size {
        let sizes: Vec<String> = geometry
            .pages
            .iter()
            .map(|page| page.size_name.clone())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        issues.push(PreflightIssue::new(
            IssueCategory::PageSize,
            Severity::Warning,
            format!("Pages have different trim sizes ({})", sizes.join(", ")),
            "Check that mixed page sizes are intended for this job.",
        ));
    }

    let short: Vec<u32> = bleed
        .pages
        .iter()
        .filter(|page| !page.meets_requirement)
        .map(|page| page.page_number)
        .collect();
    if !short.is_empty() {
        let required = config.required_bleed_pt;
        let issue = if bleed.has_bleed {
            PreflightIssue::new(
                IssueCategory::Bleed,
                Severity::Warning,
                format!("Bleed is less than {required}pt on some edges"),
                format!("Extend background artwork at least {required}pt past the trim on every edge."),
            )
        } else {
            PreflightIssue::new(
                IssueCategory::Bleed,
                Severity::Critical,
                "No bleed: artwork stops at the trim edge",
                format!(
                    "Add {required}pt ({:.3}in) of bleed in the design application, or let auto-fix mirror the page edges.",
                    required / 72.0
                ),
            )
        };
        issues.push(issue.fixable().on_pages(short));
    }
}

fn color_issues(report: &PreflightReport, issues: &mut Vec<PreflightIssue>) {
    let colors = &report.color_space;
    if colors.has_rgb {
        issues.push(
            PreflightIssue::new(
                IssueCategory::ColorSpace,
                Severity::Warning,
                format!(
                    "RGB colour is used ({} colour operators, {} images)",
                    colors.rgb_operators, colors.rgb_images
                ),
                "Convert to CMYK before printing; colours may shift.",
            )
            .fixable()
            .on_pages(colors.rgb_pages.iter().copied()),
        );
    }

    if colors.has_spot_colors {
        let names: Vec<&str> = colors.spot_colors.iter().map(String::as_str).collect();
        issues.push(PreflightIssue::new(
            IssueCategory::SpotColors,
            Severity::Info,
            format!("Spot colours are used: {}", names.join(", ")),
            "Confirm the job is quoted for extra inks, or convert spot colours to process in the design application.",
        ));
    }

    let ink = &report.ink_coverage;
    if ink.exceeds_limit {
        issues.push(
            PreflightIssue::new(
                IssueCategory::InkCoverage,
                Severity::Warning,
                format!(
                    "Maximum ink coverage is {:.0}%, above the {:.0}% limit",
                    ink.maximum_tac, ink.limit
                ),
                "Reduce rich blacks and heavy four-colour builds to avoid set-off and drying problems.",
            )
            .fixable()
            .on_pages(ink.hotspots.iter().map(|spot| spot.page_number)),
        );
    }
}

fn resource_issues(report: &PreflightReport, config: &PreflightConfig, issues: &mut Vec<PreflightIssue>) {
    let fonts = &report.fonts;
    if !fonts.unembedded.is_empty() {
        let pages = fonts
            .unembedded
            .iter()
            .filter_map(|name| fonts.fonts.get(name))
            .flat_map(|usage| usage.pages.iter().copied());
        issues.push(
            PreflightIssue::new(
                IssueCategory::Fonts,
                Severity::Critical,
                format!("Fonts are not embedded: {}", fonts.unembedded.join(", ")),
                "Embed all fonts when exporting, or convert text to outlines.",
            )
            .on_pages(pages),
        );
    }

    let images = &report.images;
    if images.low_resolution_count > 0 {
        let lowest = images.minimum_dpi.unwrap_or(0.0);
        let severity = if lowest < config.min_image_dpi / 2.0 {
            Severity::Critical
        } else {
            Severity::Warning
        };
        issues.push(
            PreflightIssue::new(
                IssueCategory::ImageResolution,
                severity,
                format!(
                    "{} image(s) below {:.0} DPI (lowest {lowest:.0} DPI)",
                    images.low_resolution_count, config.min_image_dpi
                ),
                "Replace low-resolution images with higher-resolution originals.",
            )
            .on_pages(
                images
                    .images
                    .iter()
                    .filter(|image| !image.compliant)
                    .map(|image| image.page_number),
            ),
        );
    }
    if images.oversampled_count > 0 {
        issues.push(
            PreflightIssue::new(
                IssueCategory::ImageOversampled,
                Severity::Warning,
                format!(
                    "{} image(s) above {:.0} DPI make the file needlessly large",
                    images.oversampled_count, config.max_image_dpi
                ),
                "Downsample images to the output resolution.",
            )
            .fixable()
            .on_pages(
                images
                    .images
                    .iter()
                    .filter(|image| image.oversampled)
                    .map(|image| image.page_number),
            ),
        );
    }

    let transparency = &report.transparency;
    if transparency.has_transparency {
        let modes: Vec<&str> = transparency.blend_modes.iter().map(String::as_str).collect();
        let detail = if modes.is_empty() {
            String::new()
        } else {
            format!("; blend modes {}", modes.join(", "))
        };
        issues.push(
            PreflightIssue::new(
                IssueCategory::Transparency,
                Severity::Warning,
                format!(
                    "Live transparency on pages {}{detail}",
                    page_list(&transparency.affected_pages)
                ),
                "Flatten transparency for older RIPs, or confirm the printer accepts PDF/X-4.",
            )
            .fixable()
            .on_pages(transparency.affected_pages.iter().copied()),
        );
    }

    let overprint = &report.overprint;
    if overprint.has_overprint {
        issues.push(
            PreflightIssue::new(
                IssueCategory::Overprint,
                Severity::Info,
                format!("{} graphics state(s) enable overprint", overprint.overprint_states),
                "Check that overprinting is intentional; white or light objects set to overprint disappear.",
            )
            .fixable()
            .on_pages(overprint.affected_pages.iter().copied()),
        );
    }
}

fn structure_issues(report: &PreflightReport, issues: &mut Vec<PreflightIssue>) {
    if report.layers.has_hidden_layers {
        issues.push(PreflightIssue::new(
            IssueCategory::HiddenLayers,
            Severity::Warning,
            format!("Hidden layers: {}", report.layers.hidden_layers.join(", ")),
            "Delete hidden layers or make sure the printer's RIP will ignore them.",
        ));
    }

    let compression = &report.compression;
    if compression.poor_compression {
        issues.push(
            PreflightIssue::new(
                IssueCategory::Compression,
                Severity::Info,
                format!(
                    "{} stream(s) are stored uncompressed ({} bytes)",
                    compression.uncompressed_streams, compression.uncompressed_bytes
                ),
                "Compress streams to shrink the upload.",
            )
            .fixable(),
        );
    }
}
