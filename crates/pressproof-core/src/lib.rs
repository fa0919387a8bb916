// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pressproof: Core types, configuration, colour maths and error definitions
// shared across all crates.

pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod human_errors;
pub mod types;

pub use config::{AppConfig, FixConfig, PreflightConfig, RenderConfig};
pub use error::PreflightError;
pub use geometry::Rect;
pub use types::*;
