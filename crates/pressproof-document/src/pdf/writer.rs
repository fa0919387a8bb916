// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document mutations used by the fix engine.
//
// Each mutation updates both the underlying `lopdf` objects and the owned
// model, so a fixed document can be re-analysed without a reload.

use std::collections::BTreeMap;

use lopdf::content::Content;
use lopdf::{Dictionary, Object, ObjectId, Stream, dictionary};
use pressproof_core::error::PreflightError;
use pressproof_core::geometry::Rect;
use tracing::{debug, info, instrument};

use super::loader::{inherited, page_content, stream_stats};
use crate::model::{
    ContentOp, ContentTarget, Document, FormXObject, Operand, ResourceSet, XObject,
};

/// Resource name of the original artwork once wrapped for bleed extension.
pub const BLEED_SOURCE_NAME: &str = "PPBleedSrc";

/// Page boundary boxes that can be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageBox {
    Media,
    Crop,
    Trim,
    Bleed,
}

impl PageBox {
    fn key(self) -> &'static str {
        match self {
            Self::Media => "MediaBox",
            Self::Crop => "CropBox",
            Self::Trim => "TrimBox",
            Self::Bleed => "BleedBox",
        }
    }
}

impl Document {
    /// Set one of a page's boundary boxes. `page_index` is zero-based.
    pub fn set_page_box(
        &mut self,
        page_index: usize,
        which: PageBox,
        rect: Rect,
    ) -> Result<(), PreflightError> {
        let page_id = self.page_object_id(page_index)?;
        self.page_dict_mut(page_id)?.set(which.key(), rect_object(rect));

        let page = &mut self.pages[page_index];
        match which {
            PageBox::Media => page.media_box = rect,
            PageBox::Crop => page.crop_box = Some(rect),
            PageBox::Trim => page.trim_box = Some(rect),
            PageBox::Bleed => page.bleed_box = Some(rect),
        }
        debug!(page = page.number, key = which.key(), %rect, "page box set");
        Ok(())
    }

    /// Replace the operator sequence of a page or form with `operations`.
    ///
    /// Page content is written to a fresh uncompressed stream; form content
    /// replaces the form's stream data in place.
    pub fn replace_operations(
        &mut self,
        target: ContentTarget,
        operations: Vec<ContentOp>,
    ) -> Result<(), PreflightError> {
        let bytes = encode_operations(&operations)?;
        match target {
            ContentTarget::Page(index) => {
                let page_id = self.page_object_id(index)?;
                let content_id = self.raw.add_object(Stream::new(dictionary! {}, bytes));
                self.page_dict_mut(page_id)?.set("Contents", content_id);
                self.pages[index].operations = operations;
                self.pages[index].content_error = None;
            }
            ContentTarget::Form(id) => {
                let object_id = self
                    .resources
                    .form(id)
                    .map(|form| form.object_id)
                    .ok_or_else(|| {
                        PreflightError::FixApplication(format!("XObject {} is not a form", id.0))
                    })?;
                match self.raw.get_object_mut(object_id) {
                    Ok(Object::Stream(stream)) => stream.set_plain_content(bytes),
                    _ => {
                        return Err(PreflightError::FixApplication(format!(
                            "form stream {object_id:?} is missing"
                        )));
                    }
                }
                if let Some(XObject::Form(form)) = self.resources.xobjects.get_mut(id.0) {
                    form.operations = operations;
                    form.content_error = None;
                }
            }
        }
        Ok(())
    }

    /// Extend a page's artwork into a bleed margin by mirroring it.
    ///
    /// The original content becomes a form XObject clipped to the trim box,
    /// drawn once in place, once reflected across each trim edge, once
    /// reflected through each trim corner, then once more in place so the
    /// unmirrored artwork ends on top. BleedBox becomes the trim box expanded
    /// by `bleed` and MediaBox grows to cover it, keeping any slug area it
    /// already had. TrimBox keeps the original trim. Returns the new MediaBox.
    #[instrument(skip(self))]
    pub fn apply_mirrored_bleed(
        &mut self,
        page_index: usize,
        bleed: f64,
    ) -> Result<Rect, PreflightError> {
        let page_id = self.page_object_id(page_index)?;
        let page = &self.pages[page_index];
        let trim = page.effective_trim_box();
        let extended = trim.expand(bleed);
        let media = page.media_box.union(&extended);

        let page_dict = self
            .raw
            .get_dictionary(page_id)
            .map_err(|err| PreflightError::FixApplication(format!("page object: {err}")))?;
        let original = page_content(&self.raw, page_dict).map_err(PreflightError::FixApplication)?;
        let resources = inherited(&self.raw, page_id, b"Resources").cloned();
        let had_crop_box = inherited(&self.raw, page_id, b"CropBox").is_some();

        let mut form_dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => rect_object(trim),
        };
        if let Some(resources) = resources {
            form_dict.set("Resources", resources);
        }
        let form_id = self.raw.add_object(Stream::new(form_dict, original));

        let operations = mirrored_operations(&trim);
        let content_id = self
            .raw
            .add_object(Stream::new(dictionary! {}, encode_operations(&operations)?));

        let page_dict = self.page_dict_mut(page_id)?;
        page_dict.set("Contents", content_id);
        page_dict.set(
            "Resources",
            dictionary! {
                "XObject" => dictionary! { BLEED_SOURCE_NAME => form_id },
            },
        );
        page_dict.set("MediaBox", rect_object(media));
        page_dict.set("BleedBox", rect_object(extended));
        page_dict.set("TrimBox", rect_object(trim));
        if had_crop_box {
            page_dict.set("CropBox", rect_object(extended));
        }

        // Mirror the rewrite in the model.
        let page = &self.pages[page_index];
        let form = FormXObject {
            object_id: form_id,
            bbox: Some(trim),
            operations: page.operations.clone(),
            resources: page.resources,
            transparency_group: false,
            content_error: page.content_error.clone(),
        };
        let xobject_id = self.resources.push_xobject(XObject::Form(form));
        let set_id = self.resources.push_set(ResourceSet {
            xobjects: BTreeMap::from([(BLEED_SOURCE_NAME.to_string(), xobject_id)]),
            ..ResourceSet::default()
        });

        let page = &mut self.pages[page_index];
        page.resources = Some(set_id);
        page.operations = operations;
        page.content_error = None;
        page.media_box = media;
        page.bleed_box = Some(extended);
        page.trim_box = Some(trim);
        if had_crop_box {
            page.crop_box = Some(extended);
        }

        info!(page = page.number, %trim, %media, "mirrored bleed applied");
        Ok(media)
    }

    /// Switch off every `OP`/`op` overprint flag in the document. Returns
    /// how many dictionaries were changed.
    #[instrument(skip(self))]
    pub fn clear_overprint(&mut self) -> u32 {
        let mut changed = 0;
        for object in self.raw.objects.values_mut() {
            changed += clear_overprint_in(object);
        }
        for set in &mut self.resources.sets {
            for state in set.graphics_states.values_mut() {
                state.overprint_fill = false;
                state.overprint_stroke = false;
            }
        }
        info!(changed, "overprint flags cleared");
        changed
    }

    /// Flate-compress every stream that has no filter yet.
    #[instrument(skip(self))]
    pub fn compress(&mut self) {
        self.raw.compress();
        let (total, uncompressed, bytes) = stream_stats(&self.raw);
        self.info.total_streams = total;
        self.info.uncompressed_streams = uncompressed;
        self.info.uncompressed_bytes = bytes;
        debug!(uncompressed, "streams compressed");
    }

    /// Serialise the document.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, PreflightError> {
        let mut output = Vec::new();
        self.raw.save_to(&mut output).map_err(|err| {
            PreflightError::Pdf(format!("failed to serialise PDF: {err}"))
        })?;
        Ok(output)
    }

    fn page_object_id(&self, page_index: usize) -> Result<ObjectId, PreflightError> {
        self.pages
            .get(page_index)
            .map(|page| page.object_id)
            .ok_or_else(|| {
                PreflightError::FixApplication(format!(
                    "page index {page_index} out of range (document has {} pages)",
                    self.pages.len()
                ))
            })
    }

    fn page_dict_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary, PreflightError> {
        match self.raw.get_object_mut(page_id) {
            Ok(Object::Dictionary(dict)) => Ok(dict),
            _ => Err(PreflightError::FixApplication(format!(
                "page object {page_id:?} is not a dictionary"
            ))),
        }
    }
}

/// `q cm Do Q` for the in-place copy, the eight reflections, and the
/// in-place copy again on top.
fn mirrored_operations(trim: &Rect) -> Vec<ContentOp> {
    let (x0, y0, x1, y1) = (trim.llx, trim.lly, trim.urx, trim.ury);
    let matrices = [
        [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0, 1.0, 2.0 * x0, 0.0],
        [-1.0, 0.0, 0.0, 1.0, 2.0 * x1, 0.0],
        [1.0, 0.0, 0.0, -1.0, 0.0, 2.0 * y0],
        [1.0, 0.0, 0.0, -1.0, 0.0, 2.0 * y1],
        [-1.0, 0.0, 0.0, -1.0, 2.0 * x0, 2.0 * y0],
        [-1.0, 0.0, 0.0, -1.0, 2.0 * x1, 2.0 * y0],
        [-1.0, 0.0, 0.0, -1.0, 2.0 * x0, 2.0 * y1],
        [-1.0, 0.0, 0.0, -1.0, 2.0 * x1, 2.0 * y1],
        [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    ];

    let mut ops = Vec::with_capacity(matrices.len() * 4);
    for matrix in matrices {
        ops.push(ContentOp::new("q", Vec::new()));
        ops.push(ContentOp::new(
            "cm",
            matrix.iter().map(|v| Operand::Real(*v)).collect(),
        ));
        ops.push(ContentOp::new(
            "Do",
            vec![Operand::Name(BLEED_SOURCE_NAME.to_string())],
        ));
        ops.push(ContentOp::new("Q", Vec::new()));
    }
    ops
}

fn encode_operations(operations: &[ContentOp]) -> Result<Vec<u8>, PreflightError> {
    Content {
        operations: operations.iter().map(ContentOp::to_lopdf).collect::<Vec<_>>(),
    }
    .encode()
    .map_err(|err| PreflightError::Pdf(format!("failed to encode content stream: {err}")))
}

fn rect_object(rect: Rect) -> Object {
    Object::Array(
        rect.to_array()
            .iter()
            .map(|v| Object::Real(*v as f32))
            .collect(),
    )
}

/// Clear `OP`/`op` in `object` and anything nested inside it.
fn clear_overprint_in(object: &mut Object) -> u32 {
    match object {
        Object::Dictionary(dict) => clear_overprint_dict(dict),
        Object::Stream(stream) => clear_overprint_dict(&mut stream.dict),
        Object::Array(items) => items.iter_mut().map(clear_overprint_in).sum(),
        _ => 0,
    }
}

fn clear_overprint_dict(dict: &mut Dictionary) -> u32 {
    let mut touched = false;
    for key in ["OP", "op"] {
        if matches!(dict.get(key.as_bytes()), Ok(Object::Boolean(true))) {
            dict.set(key, false);
            touched = true;
        }
    }
    let nested: u32 = dict.iter_mut().map(|(_, value)| clear_overprint_in(value)).sum();
    u32::from(touched) + nested
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{PageSpec, PdfBuilder};
    use crate::load_document;

    #[test]
    fn mirrored_operations_draw_ten_copies() {
        let trim = Rect::new(0.0, 0.0, 612.0, 792.0);
        let ops = mirrored_operations(&trim);
        assert_eq!(ops.len(), 40);
        let draws = ops.iter().filter(|op| op.operator == "Do").count();
        assert_eq!(draws, 10);
        // Right-edge reflection maps x to 2*612 - x.
        assert_eq!(ops[9].numbers(), vec![-1.0, 0.0, 0.0, 1.0, 1224.0, 0.0]);
        // First and last copies are untransformed.
        assert_eq!(ops[1].numbers(), ops[37].numbers());
    }

    #[test]
    fn overprint_flags_cleared_recursively() {
        let mut object = Object::Dictionary(dictionary! {
            "ExtGState" => dictionary! {
                "GS0" => dictionary! { "OP" => true, "op" => true },
                "GS1" => dictionary! { "OP" => false },
            },
        });
        assert_eq!(clear_overprint_in(&mut object), 1);
        assert_eq!(clear_overprint_in(&mut object), 0);
    }

    #[test]
    fn rect_serialises_as_four_reals() {
        let Object::Array(values) = rect_object(Rect::new(-9.0, -9.0, 621.0, 801.0)) else {
            panic!("expected array");
        };
        assert_eq!(values.len(), 4);
        assert_eq!(values[2], Object::Real(621.0));
    }

    #[test]
    fn mirrored_bleed_round_trips_through_bytes() {
        let bytes = PdfBuilder::new()
            .page(PageSpec::letter().content("0 0 0 1 k 0 0 612 792 re f"))
            .build();
        let mut doc = load_document(&bytes).unwrap();
        let media = doc.apply_mirrored_bleed(0, 9.0).unwrap();
        assert_eq!(media, Rect::new(-9.0, -9.0, 621.0, 801.0));

        let reloaded = load_document(&doc.to_bytes().unwrap()).unwrap();
        let page = &reloaded.pages()[0];
        assert_eq!(page.trim_box, Some(Rect::new(0.0, 0.0, 612.0, 792.0)));
        assert_eq!(page.bleed_box, Some(Rect::new(-9.0, -9.0, 621.0, 801.0)));
        assert_eq!(page.media_box, Rect::new(-9.0, -9.0, 621.0, 801.0));

        let set = reloaded.page_resources(page).unwrap();
        let form = reloaded
            .resources()
            .form(set.xobjects[BLEED_SOURCE_NAME])
            .unwrap();
        assert_eq!(form.operations.len(), 3);
        assert_eq!(form.operations[0].operator, "k");
    }

    #[test]
    fn mirrored_bleed_keeps_a_larger_media_box() {
        let bytes = PdfBuilder::new()
            .page(PageSpec::new([-36.0, -36.0, 648.0, 828.0]).trim([0.0, 0.0, 612.0, 792.0]))
            .build();
        let mut doc = load_document(&bytes).unwrap();
        let media = doc.apply_mirrored_bleed(0, 9.0).unwrap();
        assert_eq!(media, Rect::new(-36.0, -36.0, 648.0, 828.0));

        let reloaded = load_document(&doc.to_bytes().unwrap()).unwrap();
        let page = &reloaded.pages()[0];
        assert_eq!(page.media_box, Rect::new(-36.0, -36.0, 648.0, 828.0));
        assert_eq!(page.bleed_box, Some(Rect::new(-9.0, -9.0, 621.0, 801.0)));
    }

    #[test]
    fn box_setters_update_model_and_bytes() {
        let bytes = PdfBuilder::new().page(PageSpec::letter()).build();
        let mut doc = load_document(&bytes).unwrap();
        let trim = Rect::new(9.0, 9.0, 603.0, 783.0);
        doc.set_page_box(0, PageBox::Trim, trim).unwrap();
        assert_eq!(doc.pages()[0].trim_box, Some(trim));
        assert!(doc.set_page_box(5, PageBox::Trim, trim).is_err());

        let reloaded = load_document(&doc.to_bytes().unwrap()).unwrap();
        assert_eq!(reloaded.pages()[0].trim_box, Some(trim));
    }

    #[test]
    fn replaced_operations_are_written() {
        let bytes = PdfBuilder::new()
            .page(PageSpec::letter().content("1 0 0 rg 0 0 10 10 re f"))
            .build();
        let mut doc = load_document(&bytes).unwrap();
        let ops = vec![
            ContentOp::new(
                "k",
                [0.0, 1.0, 1.0, 0.0].iter().map(|v| Operand::Real(*v)).collect(),
            ),
            ContentOp::new("f", Vec::new()),
        ];
        doc.replace_operations(ContentTarget::Page(0), ops.clone())
            .unwrap();
        let reloaded = load_document(&doc.to_bytes().unwrap()).unwrap();
        assert_eq!(reloaded.pages()[0].operations.len(), 2);
        assert_eq!(reloaded.pages()[0].operations[0].operator, "k");
    }

    #[test]
    fn compress_leaves_no_plain_streams() {
        let bytes = PdfBuilder::new()
            .page(PageSpec::letter().content(&"0 0 m 100 100 l S\n".repeat(200)))
            .build();
        let mut doc = load_document(&bytes).unwrap();
        assert!(doc.info().uncompressed_streams > 0);
        doc.compress();
        assert_eq!(doc.info().uncompressed_streams, 0);
        let reloaded = load_document(&doc.to_bytes().unwrap()).unwrap();
        assert_eq!(reloaded.info().uncompressed_streams, 0);
        assert_eq!(reloaded.pages()[0].operations.len(), 600);
    }
}
