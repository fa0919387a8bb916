// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-language error messages for print customers and prepress staff.
//
// Every technical error is mapped to a short explanation and a concrete next
// step. The severity class drives how the CLI (and any caller UI) presents it.

use crate::error::PreflightError;

/// Who has to act on the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Retrying later may work (engine busy, slow machine).
    Transient,
    /// The operator must change something (install a tool, fix a path).
    ActionRequired,
    /// The file itself is the problem; it must be re-exported.
    Permanent,
}

/// A human-readable error with a plain message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    pub message: String,
    pub suggestion: String,
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `PreflightError` into a `HumanError`.
pub fn humanize_error(err: &PreflightError) -> HumanError {
    match err {
        PreflightError::CorruptDocument(_) => HumanError {
            message: "This file isn't a readable PDF.".into(),
            suggestion: "Export the artwork again as PDF from the design application, then re-run the check.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        PreflightError::MissingResource(detail) => HumanError {
            message: "Part of the document refers to something that isn't there.".into(),
            suggestion: format!("The check carried on without it. Re-exporting usually repairs this. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        PreflightError::Pdf(_) => HumanError {
            message: "The PDF could not be rewritten.".into(),
            suggestion: "The file may use features the fixer can't handle. Try fixing the issues in the design application instead.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        PreflightError::ExternalToolUnavailable(tool) => HumanError {
            message: "The rendering engine isn't installed.".into(),
            suggestion: format!("Install Ghostscript (or point the renderer at it) so colour conversion and flattening can run. (Looked for: {tool})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PreflightError::ExternalToolFailed { tool, stderr, .. } => {
            let lower = stderr.to_ascii_lowercase();
            if lower.contains("invalidaccess") || lower.contains("permission") {
                HumanError {
                    message: "The rendering engine refused to open the file.".into(),
                    suggestion: "The PDF may be password protected. Remove the protection and try again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "The rendering engine stopped with an error.".into(),
                    suggestion: format!("Fixes that need {tool} were skipped. Check the log for details and try again."),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        PreflightError::ExternalToolTimeout { seconds, .. } => HumanError {
            message: "The rendering engine took too long.".into(),
            suggestion: format!("Large files can need more than {seconds}s. Raise the renderer timeout and try again."),
            retriable: true,
            severity: Severity::Transient,
        },

        PreflightError::FixApplication(detail) => HumanError {
            message: "One of the automatic fixes didn't work.".into(),
            suggestion: format!("The other fixes still ran. This one needs to be done by hand. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PreflightError::InvalidColorValue(detail) => HumanError {
            message: "A colour value is out of range.".into(),
            suggestion: format!("Colour components must be between 0 and 1. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        PreflightError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The file couldn't be found.".into(),
                suggestion: "Check the path and try again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "Pressproof doesn't have permission to use that file.".into(),
                suggestion: "Check the file permissions, or copy the file somewhere you own.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        PreflightError::Serialization(_) => HumanError {
            message: "A settings or report file couldn't be read.".into(),
            suggestion: "Check that the JSON is valid.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}
