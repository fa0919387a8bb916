// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capability trait for the rendering engine. The fix engine only sees this
// trait, so a library- or service-backed renderer can replace Ghostscript.

use pressproof_core::error::Result;

/// Whole-document transforms that need a real rendering engine.
///
/// Every method takes the complete PDF and returns a complete new PDF.
/// Failures are recoverable: callers keep their previous bytes.
pub trait Renderer: Send + Sync {
    /// Human-readable engine name used in logs and reports.
    fn name(&self) -> &str;

    /// Convert all colour to DeviceCMYK.
    fn convert_to_cmyk(&self, pdf: &[u8]) -> Result<Vec<u8>>;

    /// Flatten live transparency.
    fn flatten_transparency(&self, pdf: &[u8]) -> Result<Vec<u8>>;

    /// Downsample colour, grey and mono images to `target_dpi`.
    fn resample_images(&self, pdf: &[u8], target_dpi: u32) -> Result<Vec<u8>>;

    /// Repackage as PDF/X-1a with a CMYK output intent.
    fn make_pdfx1a(&self, pdf: &[u8]) -> Result<Vec<u8>>;

    /// CMYK conversion, then flattening, then resampling, each stage reading
    /// the previous stage's output.
    fn optimize_for_print(&self, pdf: &[u8], target_dpi: u32) -> Result<Vec<u8>> {
        let cmyk = self.convert_to_cmyk(pdf)?;
        let flat = self.flatten_transparency(&cmyk)?;
        self.resample_images(&flat, target_dpi)
    }
}
