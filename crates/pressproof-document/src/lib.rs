// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pressproof-document: The owned document model preflight works on.
//
// The loader turns PDF bytes into an explicit Document/Page/Resource tree
// (backed by `lopdf` for parsing and serialisation). Analyzers only read the
// tree; the writer exposes the few typed mutations the fix engine needs:
// page-box setters, content-stream replacement, mirrored bleed extension,
// overprint clearing and stream compression.

pub mod color_ops;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod integrity;
pub mod model;
pub mod pdf;

pub use color_ops::{ColorSample, ColorState, SampleKind};
pub use integrity::{fingerprint, fingerprint_matches};
pub use model::{
    ColorSpaceDef, ContentOp, ContentTarget, Document, DocumentInfo, FontResource, FormXObject,
    GraphicsState, ImageXObject, Operand, Page, ResourceSet, ResourceSetId, ResourceTree,
    XObject, XObjectId,
};
pub use pdf::{BLEED_SOURCE_NAME, PageBox, load_document};
