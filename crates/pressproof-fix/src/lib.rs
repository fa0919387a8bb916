// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pressproof-fix: applies the enabled fixes for the issues a preflight
// report found, in-process where possible and through a `Renderer` for the
// raster-affecting ones, and accounts for every issue it could not fix.

pub mod engine;
pub mod fixes;
pub mod report;

pub use engine::AutoFixer;
