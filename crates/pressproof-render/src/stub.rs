// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub renderer for hosts without a rendering engine.
//
// Every operation returns `ExternalToolUnavailable`, so the fix engine reports
// the affected issues as remaining instead of claiming success.

use pressproof_core::error::{PreflightError, Result};

use crate::traits::Renderer;

/// Renderer used when no engine is installed or rendering is disabled.
#[derive(Debug, Clone, Default)]
pub struct UnavailableRenderer {
    reason: String,
}

impl UnavailableRenderer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn unavailable(&self, operation: &str) -> PreflightError {
        tracing::warn!(operation, "renderer operation called on unavailable renderer");
        let reason = if self.reason.is_empty() {
            "no rendering engine configured"
        } else {
            self.reason.as_str()
        };
        PreflightError::ExternalToolUnavailable(format!("{operation}: {reason}"))
    }
}

impl Renderer for UnavailableRenderer {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn convert_to_cmyk(&self, _pdf: &[u8]) -> Result<Vec<u8>> {
        Err(self.unavailable("convert_to_cmyk"))
    }

    fn flatten_transparency(&self, _pdf: &[u8]) -> Result<Vec<u8>> {
        Err(self.unavailable("flatten_transparency"))
    }

    fn resample_images(&self, _pdf: &[u8], _target_dpi: u32) -> Result<Vec<u8>> {
        Err(self.unavailable("resample_images"))
    }

    fn make_pdfx1a(&self, _pdf: &[u8]) -> Result<Vec<u8>> {
        Err(self.unavailable("make_pdfx1a"))
    }
}
