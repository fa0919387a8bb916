// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Report data model: analysis records, issues, the preflight report and the
// fix result.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// How serious a finding is for commercial printing.
///
/// Ordered worst-first so that sorting ascending ranks critical issues on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

/// Verdict for the whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Pass,
    Warning,
    Fail,
}

impl OverallStatus {
    /// `fail` on any critical issue, else `warning` on any warning, else `pass`.
    pub fn from_issues(issues: &[PreflightIssue]) -> Self {
        match issues.iter().map(|issue| issue.severity).min() {
            Some(Severity::Critical) => Self::Fail,
            Some(Severity::Warning) => Self::Warning,
            _ => Self::Pass,
        }
    }
}

/// What a finding is about. Also decides which fix addresses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueCategory {
    Document,
    PageGeometry,
    Bleed,
    PageSize,
    ColorSpace,
    SpotColors,
    InkCoverage,
    Fonts,
    ImageResolution,
    ImageOversampled,
    Transparency,
    Overprint,
    HiddenLayers,
    Compression,
    Compliance,
}

impl std::fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Document => "Document",
            Self::PageGeometry => "Page geometry",
            Self::Bleed => "Bleed",
            Self::PageSize => "Page size",
            Self::ColorSpace => "Colour space",
            Self::SpotColors => "Spot colours",
            Self::InkCoverage => "Ink coverage",
            Self::Fonts => "Fonts",
            Self::ImageResolution => "Image resolution",
            Self::ImageOversampled => "Oversampled images",
            Self::Transparency => "Transparency",
            Self::Overprint => "Overprint",
            Self::HiddenLayers => "Hidden layers",
            Self::Compression => "Compression",
            Self::Compliance => "PDF/X compliance",
        };
        f.write_str(label)
    }
}

/// A PDF/X conformance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PdfxStandard {
    #[serde(rename = "PDF/X-1a")]
    X1a,
    #[serde(rename = "PDF/X-3")]
    X3,
    #[serde(rename = "PDF/X-4")]
    X4,
}

impl PdfxStandard {
    /// Parse a `GTS_PDFXVersion` value such as `PDF/X-1a:2001` or `PDF/X-4`.
    pub fn from_version_string(value: &str) -> Option<Self> {
        let upper = value.trim().to_ascii_uppercase();
        if upper.starts_with("PDF/X-1A") {
            Some(Self::X1a)
        } else if upper.starts_with("PDF/X-3") {
            Some(Self::X3)
        } else if upper.starts_with("PDF/X-4") {
            Some(Self::X4)
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::X1a => "PDF/X-1a",
            Self::X3 => "PDF/X-3",
            Self::X4 => "PDF/X-4",
        }
    }

    /// Whether device RGB content is permitted.
    pub fn allows_rgb(&self) -> bool {
        !matches!(self, Self::X1a)
    }

    /// Whether live transparency is permitted.
    pub fn allows_transparency(&self) -> bool {
        matches!(self, Self::X4)
    }
}

impl std::fmt::Display for PdfxStandard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Analysis records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorSpaceAnalysis {
    pub rgb_operators: u32,
    pub cmyk_operators: u32,
    pub gray_operators: u32,
    /// Colour operators issued while a Separation/DeviceN space was selected.
    pub spot_operators: u32,
    pub rgb_images: u32,
    pub spot_colors: BTreeSet<String>,
    #[serde(rename = "hasRGB")]
    pub has_rgb: bool,
    #[serde(rename = "hasCMYK")]
    pub has_cmyk: bool,
    pub has_spot_colors: bool,
    pub has_grayscale: bool,
    /// Pages containing RGB operators or RGB images.
    pub rgb_pages: Vec<u32>,
}

/// A colour operator whose TAC exceeds the limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InkHotspot {
    pub page_number: u32,
    /// Index of the operator in the page's (or form's) operator sequence.
    pub operator_index: usize,
    pub tac: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InkCoverageAnalysis {
    #[serde(rename = "maximumTAC")]
    pub maximum_tac: f64,
    #[serde(rename = "averageTAC")]
    pub average_tac: f64,
    pub limit: f64,
    pub exceeds_limit: bool,
    pub samples: u32,
    pub hotspots: Vec<InkHotspot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBleed {
    pub page_number: u32,
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub has_bleed: bool,
    pub meets_requirement: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BleedAnalysis {
    pub pages: Vec<PageBleed>,
    pub required_bleed: f64,
    /// Some page has bleed on all four edges.
    pub has_bleed: bool,
    pub meets_requirement: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    pub page_number: u32,
    pub media_box: Rect,
    pub crop_box: Option<Rect>,
    pub trim_box: Option<Rect>,
    pub bleed_box: Option<Rect>,
    pub width_pt: f64,
    pub height_pt: f64,
    /// Standard size name, or `custom`.
    pub size_name: String,
    pub box_violations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometryAnalysis {
    pub pages: Vec<PageGeometry>,
    pub consistent_size: bool,
    pub missing_trim_box_pages: Vec<u32>,
    pub box_violation_pages: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontUsage {
    pub embedded: bool,
    pub subset: bool,
    pub usage_count: u32,
    pub font_type: String,
    pub pages: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontAnalysis {
    pub fonts: BTreeMap<String, FontUsage>,
    pub unembedded: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub name: String,
    pub page_number: u32,
    pub width: u32,
    pub height: u32,
    pub bits_per_component: u32,
    pub color_space: String,
    pub filter: Option<String>,
    pub effective_dpi: f64,
    pub compliant: bool,
    pub oversampled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysis {
    pub images: Vec<ImageInfo>,
    pub low_resolution_count: u32,
    pub oversampled_count: u32,
    pub minimum_dpi: Option<f64>,
    pub required_dpi: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransparencyAnalysis {
    pub has_transparency: bool,
    pub transparent_objects: u32,
    pub blend_modes: BTreeSet<String>,
    /// Ascending, no duplicates.
    pub affected_pages: Vec<u32>,
    pub soft_masks: u32,
    pub transparency_groups: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverprintAnalysis {
    pub has_overprint: bool,
    pub overprint_states: u32,
    pub affected_pages: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerAnalysis {
    pub layers: Vec<String>,
    pub hidden_layers: Vec<String>,
    pub has_hidden_layers: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionAnalysis {
    pub total_streams: u32,
    pub uncompressed_streams: u32,
    pub uncompressed_bytes: u64,
    pub poor_compression: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceAnalysis {
    /// Name of the standard checked, or `none`.
    pub standard: String,
    pub declared_standard: Option<PdfxStandard>,
    pub target_standard: Option<PdfxStandard>,
    pub has_output_intent: bool,
    pub encrypted: bool,
    pub violations: Vec<String>,
    pub compliant: bool,
}

// ---------------------------------------------------------------------------
// Issues and the report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreflightIssue {
    pub category: IssueCategory,
    pub severity: Severity,
    pub auto_fixable: bool,
    pub message: String,
    pub recommendation: String,
    /// Affected pages, ascending. Empty for document-wide findings.
    pub pages: Vec<u32>,
}

impl PreflightIssue {
    pub fn new(
        category: IssueCategory,
        severity: Severity,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            category,
            severity,
            auto_fixable: false,
            message: message.into(),
            recommendation: recommendation.into(),
            pages: Vec::new(),
        }
    }

    pub fn fixable(mut self) -> Self {
        self.auto_fixable = true;
        self
    }

    pub fn on_pages(mut self, pages: impl IntoIterator<Item = u32>) -> Self {
        let mut pages: Vec<u32> = pages.into_iter().collect();
        pages.sort_unstable();
        pages.dedup();
        self.pages = pages;
        self
    }

    /// One-line description used in fix results.
    pub fn summary(&self) -> String {
        format!("{}: {}", self.category, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreflightReport {
    pub file_name: String,
    pub file_size: u64,
    /// SHA-256 of the analysed bytes, lowercase hex.
    pub document_hash: String,
    pub generated_at: DateTime<Utc>,
    pub page_count: u32,
    pub pdf_version: String,
    pub color_space: ColorSpaceAnalysis,
    pub ink_coverage: InkCoverageAnalysis,
    pub bleed: BleedAnalysis,
    pub page_geometry: PageGeometryAnalysis,
    pub fonts: FontAnalysis,
    pub images: ImageAnalysis,
    pub transparency: TransparencyAnalysis,
    pub overprint: OverprintAnalysis,
    pub layers: LayerAnalysis,
    pub compression: CompressionAnalysis,
    pub compliance: ComplianceAnalysis,
    pub issues: Vec<PreflightIssue>,
    pub overall_status: OverallStatus,
}

impl PreflightReport {
    /// Report for a document that could not be parsed at all: one critical
    /// issue, every analysis empty, status `fail`.
    pub fn unreadable(
        file_name: impl Into<String>,
        file_size: u64,
        document_hash: impl Into<String>,
        reason: &str,
    ) -> Self {
        let issues = vec![PreflightIssue::new(
            IssueCategory::Document,
            Severity::Critical,
            format!("The file could not be read as a PDF ({reason})"),
            "Re-export the document from the design application and upload it again.",
        )];
        Self {
            file_name: file_name.into(),
            file_size,
            document_hash: document_hash.into(),
            generated_at: Utc::now(),
            page_count: 0,
            pdf_version: String::new(),
            color_space: ColorSpaceAnalysis::default(),
            ink_coverage: InkCoverageAnalysis::default(),
            bleed: BleedAnalysis::default(),
            page_geometry: PageGeometryAnalysis::default(),
            fonts: FontAnalysis::default(),
            images: ImageAnalysis::default(),
            transparency: TransparencyAnalysis::default(),
            overprint: OverprintAnalysis::default(),
            layers: LayerAnalysis::default(),
            compression: CompressionAnalysis::default(),
            compliance: ComplianceAnalysis {
                standard: "none".into(),
                ..ComplianceAnalysis::default()
            },
            overall_status: OverallStatus::from_issues(&issues),
            issues,
        }
    }

    pub fn issues_in(&self, category: IssueCategory) -> impl Iterator<Item = &PreflightIssue> {
        self.issues.iter().filter(move |issue| issue.category == category)
    }

    pub fn has_issue(&self, category: IssueCategory) -> bool {
        self.issues_in(category).next().is_some()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|issue| issue.severity == severity).count()
    }
}

/// Outcome of an auto-fix run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixResult {
    /// True only when nothing remains to be fixed.
    pub success: bool,
    pub fixed_issues: Vec<String>,
    pub remaining_issues: Vec<String>,
    #[serde(skip)]
    pub fixed_bytes: Vec<u8>,
    /// Markdown summary of the run.
    pub report: String,
}
