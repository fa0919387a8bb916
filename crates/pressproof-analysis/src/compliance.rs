// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF/X compliance: maps the accumulated analyses onto the rules of the
// standard being checked.

use pressproof_core::types::{
    ColorSpaceAnalysis, ComplianceAnalysis, FontAnalysis, PageGeometryAnalysis, PdfxStandard,
    TransparencyAnalysis,
};
use pressproof_document::DocumentInfo;

/// Everything the compliance rules look at.
pub struct ComplianceInputs<'a> {
    pub info: &'a DocumentInfo,
    pub color_space: &'a ColorSpaceAnalysis,
    pub transparency: &'a TransparencyAnalysis,
    pub fonts: &'a FontAnalysis,
    pub geometry: &'a PageGeometryAnalysis,
}

/// Check against `target`, else the standard the file declares. With
/// neither, the record only reports what was declared.
pub fn check(inputs: &ComplianceInputs<'_>, target: Option<PdfxStandard>) -> ComplianceAnalysis {
    let declared = inputs
        .info
        .pdfx_version
        .as_deref()
        .and_then(PdfxStandard::from_version_string);

    let mut analysis = ComplianceAnalysis {
        standard: "none".to_string(),
        declared_standard: declared,
        target_standard: target,
        has_output_intent: inputs.info.has_output_intent,
        encrypted: inputs.info.encrypted,
        violations: Vec::new(),
        compliant: false,
    };

    let Some(standard) = target.or(declared) else {
        return analysis;
    };
    analysis.standard = standard.name().to_string();
    analysis.violations = violations(inputs, standard);
    analysis.compliant = analysis.violations.is_empty();
    analysis
}

fn violations(inputs: &ComplianceInputs<'_>, standard: PdfxStandard) -> Vec<String> {
    let mut found = Vec::new();

    if !standard.allows_rgb() && inputs.color_space.has_rgb {
        found.push(format!(
            "{standard} does not allow RGB colour ({} operators, {} images)",
            inputs.color_space.rgb_operators, inputs.color_space.rgb_images
        ));
    }
    if !standard.allows_transparency() && inputs.transparency.has_transparency {
        found.push(format!(
            "{standard} does not allow live transparency (pages {})",
            page_list(&inputs.transparency.affected_pages)
        ));
    }
    if !inputs.fonts.unembedded.is_empty() {
        found.push(format!(
            "All fonts must be embedded; missing: {}",
            inputs.fonts.unembedded.join(", ")
        ));
    }
    if !inputs.geometry.missing_trim_box_pages.is_empty() {
        found.push(format!(
            "Every page needs a TrimBox (missing on pages {})",
            page_list(&inputs.geometry.missing_trim_box_pages)
        ));
    }
    if !inputs.info.has_output_intent {
        found.push("No GTS_PDFX OutputIntent is present".to_string());
    }
    if inputs.info.encrypted {
        found.push("Encrypted documents are not allowed".to_string());
    }
    found
}

pub(crate) fn page_list(pages: &[u32]) -> String {
    pages
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs<'a>(
        info: &'a DocumentInfo,
        color: &'a ColorSpaceAnalysis,
        transparency: &'a TransparencyAnalysis,
        fonts: &'a FontAnalysis,
        geometry: &'a PageGeometryAnalysis,
    ) -> ComplianceInputs<'a> {
        ComplianceInputs {
            info,
            color_space: color,
            transparency,
            fonts,
            geometry,
        }
    }

    #[test]
    fn nothing_declared_nothing_checked() {
        let info = DocumentInfo::default();
        let color = ColorSpaceAnalysis {
            has_rgb: true,
            ..Default::default()
        };
        let (t, f, g) = Default::default();
        let result = check(&inputs(&info, &color, &t, &f, &g), None);
        assert_eq!(result.standard, "none");
        assert!(result.violations.is_empty());
    }

    #[test]
    fn rgb_violates_x1a_but_not_x3() {
        let info = DocumentInfo {
            has_output_intent: true,
            ..DocumentInfo::default()
        };
        let color = ColorSpaceAnalysis {
            has_rgb: true,
            rgb_operators: 2,
            ..Default::default()
        };
        let (t, f, g) = Default::default();
        let x1a = check(&inputs(&info, &color, &t, &f, &g), Some(PdfxStandard::X1a));
        assert_eq!(x1a.standard, "PDF/X-1a");
        assert_eq!(x1a.violations.len(), 1);
        assert!(!x1a.compliant);
        let x3 = check(&inputs(&info, &color, &t, &f, &g), Some(PdfxStandard::X3));
        assert!(x3.compliant);
    }

    #[test]
    fn declared_standard_is_used_without_target() {
        let info = DocumentInfo {
            pdfx_version: Some("PDF/X-4".into()),
            ..DocumentInfo::default()
        };
        let transparency = TransparencyAnalysis {
            has_transparency: true,
            affected_pages: vec![1],
            ..Default::default()
        };
        let (c, f, g) = Default::default();
        let result = check(&inputs(&info, &c, &transparency, &f, &g), None);
        assert_eq!(result.declared_standard, Some(PdfxStandard::X4));
        // Only the missing OutputIntent; X-4 allows transparency.
        assert_eq!(result.violations.len(), 1);
    }
}
