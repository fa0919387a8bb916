// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: loading bytes into the document model and writing changes back.

pub mod loader;
pub mod writer;

pub use loader::load_document;
pub use writer::{BLEED_SOURCE_NAME, PageBox};
