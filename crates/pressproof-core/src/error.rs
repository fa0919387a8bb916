// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Pressproof.

use thiserror::Error;

/// Top-level error type for all Pressproof operations.
#[derive(Debug, Error)]
pub enum PreflightError {
    // -- Document errors --
    /// The input bytes could not be parsed as a PDF. The only fatal condition
    /// in the analysis pipeline.
    #[error("corrupt document: {0}")]
    CorruptDocument(String),

    #[error("missing resource: {0}")]
    MissingResource(String),

    #[error("PDF operation failed: {0}")]
    Pdf(String),

    // -- External renderer --
    #[error("external tool unavailable: {0}")]
    ExternalToolUnavailable(String),

    #[error("{tool} exited with status {code:?}: {stderr}")]
    ExternalToolFailed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{tool} did not finish within {seconds}s")]
    ExternalToolTimeout { tool: String, seconds: u64 },

    // -- Fixes --
    #[error("fix could not be applied: {0}")]
    FixApplication(String),

    #[error("invalid colour value: {0}")]
    InvalidColorValue(String),

    // -- I/O --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PreflightError {
    /// Whether the pipeline can carry on after this error. Only an unparseable
    /// document stops analysis; everything else downgrades to a report entry.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::CorruptDocument(_))
    }

    /// Whether the error came from the external rendering engine.
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Self::ExternalToolUnavailable(_)
                | Self::ExternalToolFailed { .. }
                | Self::ExternalToolTimeout { .. }
        )
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PreflightError>;
