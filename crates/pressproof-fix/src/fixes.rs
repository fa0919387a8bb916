// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-process fixes. Each works on the owned document and reports how many
// things it changed.

use pressproof_analysis::geometry::page_bleed;
use pressproof_core::color::{ColorSpaceKind, Cmyk, reduce_tac};
use pressproof_core::error::Result;
use pressproof_core::geometry::BOX_EPSILON;
use pressproof_document::{
    ColorState, ContentOp, ContentTarget, Document, Operand, PageBox, ResourceSet, SampleKind,
    XObject,
};
use tracing::{debug, info};

/// What a fix did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub changed: u32,
    pub detail: String,
}

impl Outcome {
    fn new(changed: u32, detail: impl Into<String>) -> Self {
        Self {
            changed,
            detail: detail.into(),
        }
    }
}

/// Give every page a TrimBox (its visible area when missing) and make sure
/// MediaBox contains BleedBox and BleedBox contains TrimBox.
pub fn repair_page_boxes(document: &mut Document) -> Result<Outcome> {
    let mut plans = Vec::new();
    for (index, page) in document.pages().iter().enumerate() {
        let trim = page.trim_box.unwrap_or_else(|| page.visible_box());
        let bleed = page.bleed_box.map(|bleed| bleed.union(&trim));
        let media = page.media_box.union(&bleed.unwrap_or(trim));

        let mut writes = Vec::new();
        if page.trim_box.is_none() {
            writes.push((PageBox::Trim, trim));
        }
        if let (Some(old), Some(new)) = (page.bleed_box, bleed) {
            if !old.approx_eq(&new, BOX_EPSILON) {
                writes.push((PageBox::Bleed, new));
            }
        }
        if !page.media_box.approx_eq(&media, BOX_EPSILON) {
            writes.push((PageBox::Media, media));
        }
        if !writes.is_empty() {
            plans.push((index, writes));
        }
    }

    let pages = plans.len() as u32;
    for (index, writes) in plans {
        for (which, rect) in writes {
            document.set_page_box(index, which, rect)?;
        }
    }
    info!(pages, "page boxes repaired");
    Ok(Outcome::new(pages, format!("page boxes set on {pages} page(s)")))
}

/// Mirror the artwork of every page short of `required` bleed out to
/// `bleed` points past the trim.
pub fn add_mirrored_bleed(document: &mut Document, bleed: f64, required: f64) -> Result<Outcome> {
    let short: Vec<usize> = document
        .pages()
        .iter()
        .enumerate()
        .filter(|(_, page)| !page_bleed(page, required).meets_requirement)
        .map(|(index, _)| index)
        .collect();

    for index in &short {
        let media = document.apply_mirrored_bleed(*index, bleed)?;
        debug!(page = index + 1, %media, "bleed added");
    }
    let pages = short.len() as u32;
    info!(pages, bleed, "mirrored bleed added");
    Ok(Outcome::new(
        pages,
        format!("{bleed}pt mirrored bleed added to {pages} page(s); check edge artwork"),
    ))
}

/// Scale every CMYK colour operator above `max_tac` down to it, on pages
/// and in form XObjects.
pub fn reduce_ink_coverage(document: &mut Document, max_tac: f64) -> Result<Outcome> {
    let tree = document.resources();
    let mut rewrites = Vec::new();

    for (index, page) in document.pages().iter().enumerate() {
        if let Some(rewrite) = rewrite_ink(&page.operations, document.page_resources(page), max_tac) {
            rewrites.push((ContentTarget::Page(index), rewrite));
        }
    }
    for (id, xobject) in tree.xobjects() {
        let XObject::Form(form) = xobject else {
            continue;
        };
        let resources = form.resources.and_then(|set| tree.set(set));
        if let Some(rewrite) = rewrite_ink(&form.operations, resources, max_tac) {
            rewrites.push((ContentTarget::Form(id), rewrite));
        }
    }

    let mut changed = 0;
    for (target, (operations, count)) in rewrites {
        document.replace_operations(target, operations)?;
        changed += count;
    }
    info!(changed, max_tac, "ink coverage reduced");
    Ok(Outcome::new(
        changed,
        format!("{changed} colour operator(s) scaled to at most {max_tac:.0}% coverage"),
    ))
}

/// The rewritten sequence and how many operators changed, or `None` when
/// nothing exceeds the limit.
fn rewrite_ink(
    operations: &[ContentOp],
    resources: Option<&ResourceSet>,
    max_tac: f64,
) -> Option<(Vec<ContentOp>, u32)> {
    let mut state = ColorState::default();
    let mut rewritten: Option<Vec<ContentOp>> = None;
    let mut changed = 0;

    for (index, op) in operations.iter().enumerate() {
        let Some(sample) = state.observe(index, op, resources) else {
            continue;
        };
        if sample.kind != SampleKind::Process(ColorSpaceKind::Cmyk) {
            continue;
        }
        let [c, m, y, k] = match sample.components.as_slice() {
            [c, m, y, k] => [*c, *m, *y, *k].map(|v| v.clamp(0.0, 1.0)),
            _ => continue,
        };
        let original = Cmyk::new(c, m, y, k);
        let reduced = reduce_tac(original, max_tac);
        if reduced == original {
            continue;
        }
        // Truncate so single-precision output cannot round back over the limit.
        let channels = reduced.channels().map(|v| (v * 10_000.0).floor() / 10_000.0);
        rewritten.get_or_insert_with(|| operations.to_vec())[index] = with_numbers(op, channels);
        changed += 1;
    }
    rewritten.map(|ops| (ops, changed))
}

/// `op` with its numeric operands replaced, in order, by `values`.
fn with_numbers(op: &ContentOp, values: [f64; 4]) -> ContentOp {
    let mut values = values.into_iter();
    let operands = op
        .operands
        .iter()
        .map(|operand| match operand.as_number() {
            Some(_) => values.next().map_or_else(|| operand.clone(), Operand::Real),
            None => operand.clone(),
        })
        .collect();
    ContentOp::new(op.operator.clone(), operands)
}

/// Switch off overprint in every graphics state.
pub fn clear_overprint(document: &mut Document) -> Outcome {
    let changed = document.clear_overprint();
    Outcome::new(changed, format!("overprint switched off in {changed} graphics state(s)"))
}

/// Flate-compress all unfiltered streams.
pub fn compress_streams(document: &mut Document) -> Outcome {
    let before = document.info().uncompressed_streams;
    document.compress();
    let changed = before.saturating_sub(document.info().uncompressed_streams);
    Outcome::new(changed, format!("{changed} stream(s) compressed"))
}
