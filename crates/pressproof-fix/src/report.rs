// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bookkeeping for a fix run and its markdown summary.

use std::fmt::Write as _;

use pressproof_core::types::{PreflightIssue, Severity};

/// Fixed, remaining and informational entries, in the order they were
/// recorded.
#[derive(Debug, Default)]
pub struct Ledger {
    fixed: Vec<String>,
    remaining: Vec<String>,
    notes: Vec<String>,
}

impl Ledger {
    pub fn fixed(&mut self, issues: &[&PreflightIssue], detail: &str) {
        for issue in issues {
            self.fixed.push(format!("{} ({detail})", issue.summary()));
        }
    }

    pub fn remaining(&mut self, issue: &PreflightIssue, reason: &str) {
        self.remaining.push(format!("{} ({reason})", issue.summary()));
    }

    pub fn note(&mut self, issue: &PreflightIssue, reason: &str) {
        self.notes.push(format!("{} ({reason})", issue.summary()));
    }

    /// A switched-off fix: warnings and criticals remain, info becomes a note.
    pub fn disabled(&mut self, issues: &[&PreflightIssue]) {
        for issue in issues {
            match issue.severity {
                Severity::Info => self.note(issue, "fix disabled"),
                Severity::Warning | Severity::Critical => self.remaining(issue, "fix disabled"),
            }
        }
    }

    /// Move everything recorded as fixed back to remaining, e.g. when the
    /// fixed document could not be written out.
    pub fn undo_fixed(&mut self, reason: &str) {
        for entry in self.fixed.drain(..) {
            self.remaining.push(format!("{entry} [not saved: {reason}]"));
        }
    }

    pub fn fixed_count(&self) -> usize {
        self.fixed.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.remaining.len()
    }

    pub fn remaining_is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn into_lists(self) -> (Vec<String>, Vec<String>) {
        (self.fixed, self.remaining)
    }
}

/// Markdown summary of a fix run.
pub fn render_markdown(file_name: &str, ledger: &Ledger) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Auto-fix report: {file_name}\n");

    let verdict = match (ledger.fixed.is_empty(), ledger.remaining.is_empty()) {
        (true, true) => "No fixes were needed. The document is print-ready.".to_string(),
        (false, true) => format!(
            "{} issue(s) fixed. The document is print-ready.",
            ledger.fixed.len()
        ),
        (_, false) => format!(
            "{} issue(s) fixed, {} remaining. The document is not print-ready yet.",
            ledger.fixed.len(),
            ledger.remaining.len()
        ),
    };
    let _ = writeln!(out, "{verdict}");

    for (title, entries) in [
        ("Fixed", &ledger.fixed),
        ("Remaining", &ledger.remaining),
        ("Notes", &ledger.notes),
    ] {
        if entries.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n## {title}\n");
        for entry in entries {
            let _ = writeln!(out, "- {entry}");
        }
    }
    out
}
