// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preflight, fix and renderer configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::PdfxStandard;

/// Thresholds used by the analyzers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreflightConfig {
    /// Minimum bleed on every edge, in points (9pt = 0.125in).
    pub required_bleed_pt: f64,
    /// Total area coverage limit in percent.
    pub max_tac: f64,
    /// Images below this effective resolution are flagged.
    pub min_image_dpi: f64,
    /// Images above this effective resolution are flagged as oversampled.
    pub max_image_dpi: f64,
    /// Slack when matching trim sizes against standard paper sizes.
    pub page_size_tolerance_pt: f64,
    /// Standard to check against; `None` checks only what the file declares.
    pub target_standard: Option<PdfxStandard>,
    /// Uncompressed stream bytes above which compression is reported as poor.
    pub compression_threshold_bytes: u64,
}

impl Default for PreflightConfig {
    fn default() -> Self {
        Self {
            required_bleed_pt: 9.0,
            max_tac: 300.0,
            min_image_dpi: 300.0,
            max_image_dpi: 600.0,
            page_size_tolerance_pt: 2.0,
            target_standard: None,
            compression_threshold_bytes: 64 * 1024,
        }
    }
}

/// Which automatic fixes may run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixConfig {
    #[serde(rename = "convertRGBtoCMYK")]
    pub convert_rgb_to_cmyk: bool,
    pub add_bleed: bool,
    pub embed_fonts: bool,
    pub flatten_transparency: bool,
    pub optimize_images: bool,
    pub fix_overprint: bool,
    pub adjust_ink_coverage: bool,
    pub fix_trim_box: bool,
    pub remove_hidden_layers: bool,
    pub convert_spot_colors: bool,
    /// Run the PDF/X-1a packaging stage at the end of the render pipeline.
    #[serde(rename = "packagePDFX")]
    pub package_pdfx: bool,
    /// Bleed added by the bleed fix, in points.
    pub bleed_pt: f64,
    /// Resolution images are resampled to.
    pub target_dpi: u32,
    /// TAC limit enforced by the ink-coverage fix.
    pub max_tac: f64,
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            convert_rgb_to_cmyk: true,
            add_bleed: true,
            embed_fonts: true,
            flatten_transparency: true,
            optimize_images: true,
            fix_overprint: true,
            adjust_ink_coverage: true,
            fix_trim_box: true,
            remove_hidden_layers: true,
            convert_spot_colors: true,
            package_pdfx: false,
            bleed_pt: 9.0,
            target_dpi: 300,
            max_tac: 300.0,
        }
    }
}

/// External rendering engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    /// Executable name or path (looked up on `PATH`).
    pub binary: String,
    /// Per-invocation limit; the process is killed after this many seconds.
    pub timeout_secs: u64,
    /// Where temporary files go (system temp dir when unset).
    pub temp_dir: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let binary = std::env::var("GHOSTSCRIPT").unwrap_or_else(|_| {
            if cfg!(windows) {
                "gswin64c".to_string()
            } else {
                "gs".to_string()
            }
        });
        Self {
            binary,
            timeout_secs: 120,
            temp_dir: None,
        }
    }
}

/// Everything the CLI needs, loadable from a single JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub preflight: PreflightConfig,
    pub fix: FixConfig,
    pub render: RenderConfig,
}

impl AppConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fix_toggles_default_on() {
        let config = FixConfig::default();
        assert!(config.convert_rgb_to_cmyk && config.add_bleed && config.embed_fonts);
        assert!(config.remove_hidden_layers && config.convert_spot_colors);
        assert!(!config.package_pdfx);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"fix": {"addBleed": false, "convertRGBtoCMYK": false}}"#)
                .unwrap();
        assert!(!config.fix.add_bleed);
        assert!(!config.fix.convert_rgb_to_cmyk);
        assert!(config.fix.embed_fonts);
        assert_eq!(config.preflight.required_bleed_pt, 9.0);
        assert_eq!(config.render.timeout_secs, 120);
    }

    #[test]
    fn target_standard_parses() {
        let config: PreflightConfig =
            serde_json::from_str(r#"{"targetStandard": "PDF/X-1a"}"#).unwrap();
        assert_eq!(config.target_standard, Some(PdfxStandard::X1a));
    }
}
