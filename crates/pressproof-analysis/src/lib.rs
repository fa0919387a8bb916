// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pressproof-analysis: Preflight analyzers for print-production PDFs.
//
// Each analyzer reads the loaded document and produces one typed record:
// page geometry and bleed, colour spaces and ink coverage, fonts, images,
// transparency, overprint, layers, compression and PDF/X compliance. The
// aggregator ranks the findings as issues; `Preflight` ties it together.

pub mod aggregate;
pub mod color_space;
pub mod compliance;
pub mod geometry;
pub mod preflight;
pub mod resources;
pub mod structure;
pub mod walk;

pub use preflight::Preflight;
pub use resources::is_font_subset;
