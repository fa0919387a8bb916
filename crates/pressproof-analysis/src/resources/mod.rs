// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Resource analyzer: fonts, images, transparency and overprint, read from
// the resource sets a page's content can reach.

pub mod fonts;
pub mod images;
pub mod overprint;
pub mod transparency;

pub use fonts::{FontPart, is_font_subset};
pub use images::ImagePart;
pub use overprint::OverprintPart;
pub use transparency::TransparencyPart;
