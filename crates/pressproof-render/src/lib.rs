// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pressproof-render: the raster-affecting fixes (CMYK conversion,
// transparency flattening, image resampling, PDF/X packaging) are delegated
// to an external engine behind the `Renderer` trait.

pub mod ghostscript;
pub mod stub;
pub mod traits;

pub use ghostscript::{GhostscriptRenderer, Operation};
pub use stub::UnavailableRenderer;
pub use traits::Renderer;
