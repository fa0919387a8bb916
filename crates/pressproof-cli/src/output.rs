// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-text rendering of a preflight report for the terminal.

use std::fmt::Write as _;

use pressproof_core::types::{OverallStatus, PreflightReport, Severity};

pub fn report_text(report: &PreflightReport) -> String {
    let mut out = String::new();
    let status = match report.overall_status {
        OverallStatus::Pass => "PASS",
        OverallStatus::Warning => "WARNING",
        OverallStatus::Fail => "FAIL",
    };
    let _ = writeln!(out, "{}: {status}", report.file_name);
    let _ = writeln!(
        out,
        "  {} page(s), PDF {}, {} bytes",
        report.page_count, report.pdf_version, report.file_size
    );
    if report.compliance.standard != "none" {
        let verdict = if report.compliance.compliant {
            "compliant"
        } else {
            "not compliant"
        };
        let _ = writeln!(out, "  {}: {verdict}", report.compliance.standard);
    }

    if report.issues.is_empty() {
        let _ = writeln!(out, "\nNo issues found.");
        return out;
    }

    let _ = writeln!(
        out,
        "\n{} critical, {} warning(s), {} note(s)",
        report.count(Severity::Critical),
        report.count(Severity::Warning),
        report.count(Severity::Info)
    );
    for issue in &report.issues {
        let tag = match issue.severity {
            Severity::Critical => "[critical]",
            Severity::Warning => "[warning] ",
            Severity::Info => "[info]    ",
        };
        let fixable = if issue.auto_fixable { " (auto-fixable)" } else { "" };
        let _ = writeln!(out, "{tag} {}{fixable}", issue.summary());
        if !issue.pages.is_empty() {
            let pages: Vec<String> = issue.pages.iter().map(u32::to_string).collect();
            let _ = writeln!(out, "           pages {}", pages.join(", "));
        }
        let _ = writeln!(out, "           {}", issue.recommendation);
    }
    out
}
