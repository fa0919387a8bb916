// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF loader: parse bytes with `lopdf` and build the owned page/resource
// tree. Only unparseable input fails; anything missing further down
// (resources, fonts, content streams) loads as absent or empty.

use std::collections::HashMap;

use lopdf::content::Content;
use lopdf::{Dictionary, Object, ObjectId, Stream};
use pressproof_core::error::PreflightError;
use pressproof_core::geometry::Rect;
use tracing::{debug, info, instrument, warn};

use crate::model::{
    ColorSpaceDef, ContentOp, DEFAULT_MEDIA_BOX, Document, DocumentInfo, FontResource,
    FormXObject, GraphicsState, ImageXObject, Page, ResourceSet, ResourceSetId, ResourceTree,
    XObject, XObjectId,
};

/// Forms nested deeper than this are not descended into.
const MAX_FORM_DEPTH: usize = 8;
/// Bound on `Parent` chains and reference hops.
const MAX_CHAIN: usize = 32;
/// Descriptor keys that carry an embedded font program.
const FONT_FILE_KEYS: [&[u8]; 3] = [b"FontFile", b"FontFile2", b"FontFile3"];

/// Parse raw PDF bytes into a [`Document`].
///
/// Returns [`PreflightError::CorruptDocument`] when `lopdf` cannot parse the
/// bytes or the page tree is empty.
#[instrument(skip_all, fields(bytes_len = data.len()))]
pub fn load_document(data: &[u8]) -> Result<Document, PreflightError> {
    let raw = lopdf::Document::load_mem(data).map_err(|err| {
        PreflightError::CorruptDocument(format!("failed to parse PDF: {err}"))
    })?;

    let page_ids = raw.get_pages();
    if page_ids.is_empty() {
        return Err(PreflightError::CorruptDocument(
            "document has no pages".to_string(),
        ));
    }

    let mut builder = TreeBuilder::new(&raw);
    let mut pages = Vec::with_capacity(page_ids.len());
    for (number, page_id) in page_ids {
        pages.push(load_page(&raw, &mut builder, number, page_id));
    }
    let resources = builder.finish();
    let info = read_document_info(&raw);

    info!(
        pages = pages.len(),
        version = %info.version,
        xobjects = resources.xobjects.len(),
        "PDF loaded"
    );

    Ok(Document {
        raw,
        pages,
        resources,
        info,
    })
}

fn load_page(
    doc: &lopdf::Document,
    builder: &mut TreeBuilder<'_>,
    number: u32,
    page_id: ObjectId,
) -> Page {
    let dict = doc.get_dictionary(page_id).ok();

    let media_box = inherited(doc, page_id, b"MediaBox")
        .and_then(|obj| rect_from(doc, obj))
        .unwrap_or_else(|| {
            warn!(page = number, "page has no usable MediaBox, assuming US Letter");
            DEFAULT_MEDIA_BOX
        });
    let crop_box = inherited(doc, page_id, b"CropBox").and_then(|obj| rect_from(doc, obj));
    let own_box = |key: &[u8]| {
        dict.and_then(|d| d.get(key).ok())
            .and_then(|obj| rect_from(doc, obj))
    };

    let rotate = inherited(doc, page_id, b"Rotate")
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_i64().ok())
        .unwrap_or(0);

    let resources = inherited(doc, page_id, b"Resources").and_then(|obj| builder.resources_for(obj));
    if resources.is_none() {
        debug!(page = number, "page has no Resources");
    }

    let transparency_group = dict
        .and_then(|d| d.get(b"Group").ok())
        .and_then(|obj| as_dict(doc, obj))
        .is_some_and(is_transparency_group);

    let (operations, content_error) = match dict.map(|d| page_content(doc, d)) {
        Some(Ok(bytes)) => decode_operations(&bytes),
        Some(Err(err)) => (Vec::new(), Some(err)),
        None => (Vec::new(), Some("page object is not a dictionary".to_string())),
    };
    if let Some(err) = &content_error {
        warn!(page = number, %err, "page content could not be decoded");
    }

    Page {
        number,
        object_id: page_id,
        media_box,
        crop_box,
        trim_box: own_box(b"TrimBox"),
        bleed_box: own_box(b"BleedBox"),
        art_box: own_box(b"ArtBox"),
        rotate,
        resources,
        operations,
        transparency_group,
        content_error,
    }
}

fn read_document_info(doc: &lopdf::Document) -> DocumentInfo {
    let mut info = DocumentInfo {
        version: doc.version.clone(),
        encrypted: doc.trailer.has(b"Encrypt"),
        ..DocumentInfo::default()
    };

    info.pdfx_version = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|obj| as_dict(doc, obj))
        .and_then(|dict| dict.get(b"GTS_PDFXVersion").ok())
        .and_then(|obj| text_of(doc, obj));

    if let Ok(catalog) = doc.catalog() {
        info.has_output_intent = catalog
            .get(b"OutputIntents")
            .ok()
            .and_then(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_array().ok())
            .is_some_and(|intents| {
                intents.iter().any(|intent| {
                    as_dict(doc, intent)
                        .and_then(|d| d.get(b"S").ok())
                        .and_then(name_of)
                        .is_some_and(|s| s == "GTS_PDFX")
                })
            });

        if let Some(oc) = catalog
            .get(b"OCProperties")
            .ok()
            .and_then(|obj| as_dict(doc, obj))
        {
            let (layers, hidden) = read_layers(doc, oc);
            info.layers = layers;
            info.hidden_layers = hidden;
        }
    }

    let (total, uncompressed, bytes) = stream_stats(doc);
    info.total_streams = total;
    info.uncompressed_streams = uncompressed;
    info.uncompressed_bytes = bytes;

    info
}

/// Total streams, streams without a `/Filter`, and the bytes those hold.
pub(crate) fn stream_stats(doc: &lopdf::Document) -> (u32, u32, u64) {
    let mut stats = (0, 0, 0);
    for object in doc.objects.values() {
        if let Object::Stream(stream) = object {
            stats.0 += 1;
            if !stream.dict.has(b"Filter") {
                stats.1 += 1;
                stats.2 += stream.content.len() as u64;
            }
        }
    }
    stats
}

/// Names of all optional-content groups and of those off by default.
fn read_layers(doc: &lopdf::Document, oc_properties: &Dictionary) -> (Vec<String>, Vec<String>) {
    let group_name = |obj: &Object| {
        as_dict(doc, obj)
            .and_then(|d| d.get(b"Name").ok())
            .and_then(|n| text_of(doc, n))
            .unwrap_or_else(|| "Unnamed layer".to_string())
    };

    let layers = oc_properties
        .get(b"OCGs")
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_array().ok())
        .map(|groups| groups.iter().map(group_name).collect())
        .unwrap_or_default();

    let hidden = oc_properties
        .get(b"D")
        .ok()
        .and_then(|obj| as_dict(doc, obj))
        .and_then(|d| d.get(b"OFF").ok())
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_array().ok())
        .map(|off| off.iter().map(group_name).collect())
        .unwrap_or_default();

    (layers, hidden)
}

// -- Resource tree construction ---------------------------------------------------

/// Builds the shared resource tree, interning indirect resource dictionaries
/// and XObjects so shared objects are loaded once.
struct TreeBuilder<'a> {
    doc: &'a lopdf::Document,
    tree: ResourceTree,
    sets_by_object: HashMap<ObjectId, ResourceSetId>,
    xobjects_by_object: HashMap<ObjectId, XObjectId>,
    form_depth: usize,
}

impl<'a> TreeBuilder<'a> {
    fn new(doc: &'a lopdf::Document) -> Self {
        Self {
            doc,
            tree: ResourceTree::default(),
            sets_by_object: HashMap::new(),
            xobjects_by_object: HashMap::new(),
            form_depth: 0,
        }
    }

    fn finish(self) -> ResourceTree {
        self.tree
    }

    /// Intern a `/Resources` value (reference or inline dictionary).
    fn resources_for(&mut self, object: &Object) -> Option<ResourceSetId> {
        match object {
            Object::Reference(id) => {
                if let Some(existing) = self.sets_by_object.get(id) {
                    return Some(*existing);
                }
                let doc = self.doc;
                let dict = doc.get_dictionary(*id).ok()?;
                // Reserve the slot first so a form pointing back at this
                // dictionary resolves to it instead of recursing.
                let set_id = self.tree.push_set(ResourceSet::default());
                self.sets_by_object.insert(*id, set_id);
                let set = self.build_set(dict);
                self.tree.sets[set_id.0] = set;
                Some(set_id)
            }
            Object::Dictionary(dict) => {
                let set = self.build_set(dict);
                Some(self.tree.push_set(set))
            }
            _ => None,
        }
    }

    fn build_set(&mut self, dict: &Dictionary) -> ResourceSet {
        let doc = self.doc;
        let mut set = ResourceSet::default();

        if let Some(fonts) = sub_dict(doc, dict, b"Font") {
            for (name, obj) in fonts.iter() {
                if let Some(font) = font_resource(doc, obj) {
                    set.fonts.insert(key_name(name), font);
                }
            }
        }

        if let Some(states) = sub_dict(doc, dict, b"ExtGState") {
            for (name, obj) in states.iter() {
                if let Some(state) = as_dict(doc, obj).map(|d| graphics_state(doc, d)) {
                    set.graphics_states.insert(key_name(name), state);
                }
            }
        }

        if let Some(spaces) = sub_dict(doc, dict, b"ColorSpace") {
            for (name, obj) in spaces.iter() {
                set.color_spaces
                    .insert(key_name(name), color_space_def(doc, obj, 0));
            }
        }

        if let Some(xobjects) = sub_dict(doc, dict, b"XObject") {
            for (name, obj) in xobjects.iter() {
                let Object::Reference(id) = obj else {
                    continue;
                };
                if let Some(xobject_id) = self.xobject(*id) {
                    set.xobjects.insert(key_name(name), xobject_id);
                }
            }
        }

        set
    }

    fn xobject(&mut self, id: ObjectId) -> Option<XObjectId> {
        if let Some(existing) = self.xobjects_by_object.get(&id) {
            return Some(*existing);
        }
        let doc = self.doc;
        let stream = doc.get_object(id).ok()?.as_stream().ok()?;
        let slot = self.tree.push_xobject(XObject::Other("pending".into()));
        self.xobjects_by_object.insert(id, slot);

        let subtype = stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(name_of)
            .unwrap_or_default();
        let loaded = match subtype.as_str() {
            "Image" => XObject::Image(image_xobject(doc, stream)),
            "Form" if self.form_depth < MAX_FORM_DEPTH => {
                self.form_depth += 1;
                let form = self.form_xobject(id, stream);
                self.form_depth -= 1;
                XObject::Form(form)
            }
            "Form" => {
                warn!(?id, "form XObjects nested too deeply, not descending");
                XObject::Other("Form".into())
            }
            other => XObject::Other(other.to_string()),
        };
        self.tree.xobjects[slot.0] = loaded;
        Some(slot)
    }

    fn form_xobject(&mut self, id: ObjectId, stream: &Stream) -> FormXObject {
        let doc = self.doc;
        let (operations, content_error) = match stream_bytes(stream) {
            Ok(bytes) => decode_operations(&bytes),
            Err(err) => (Vec::new(), Some(err)),
        };
        let resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|obj| self.resources_for(obj));
        FormXObject {
            object_id: id,
            bbox: stream.dict.get(b"BBox").ok().and_then(|obj| rect_from(doc, obj)),
            operations,
            resources,
            transparency_group: stream
                .dict
                .get(b"Group")
                .ok()
                .and_then(|obj| as_dict(doc, obj))
                .is_some_and(is_transparency_group),
            content_error,
        }
    }
}

fn font_resource(doc: &lopdf::Document, object: &Object) -> Option<FontResource> {
    let dict = as_dict(doc, object)?;
    let base_font = dict
        .get(b"BaseFont")
        .ok()
        .and_then(name_of)
        .unwrap_or_else(|| "Unnamed".to_string());
    let subtype = dict
        .get(b"Subtype")
        .ok()
        .and_then(name_of)
        .unwrap_or_default();

    let embedded = match subtype.as_str() {
        // Type3 glyphs are content streams inside the font itself.
        "Type3" => true,
        "Type0" => dict
            .get(b"DescendantFonts")
            .ok()
            .and_then(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_array().ok())
            .and_then(|fonts| fonts.first())
            .and_then(|obj| as_dict(doc, obj))
            .is_some_and(|descendant| descriptor_has_font_file(doc, descendant)),
        _ => descriptor_has_font_file(doc, dict),
    };

    Some(FontResource {
        base_font,
        subtype,
        embedded,
    })
}

fn descriptor_has_font_file(doc: &lopdf::Document, font: &Dictionary) -> bool {
    font.get(b"FontDescriptor")
        .ok()
        .and_then(|obj| as_dict(doc, obj))
        .is_some_and(|descriptor| {
            FONT_FILE_KEYS.iter().any(|key| descriptor.has(key))
        })
}

fn graphics_state(doc: &lopdf::Document, dict: &Dictionary) -> GraphicsState {
    let blend_modes = match dict.get(b"BM").ok().and_then(|obj| resolve(doc, obj)) {
        Some(mode @ Object::Name(_)) => name_of(mode).into_iter().collect(),
        Some(Object::Array(modes)) => modes.iter().filter_map(name_of).collect(),
        _ => Vec::new(),
    };
    let soft_mask = dict
        .get(b"SMask")
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .is_some_and(|obj| name_of(obj).as_deref() != Some("None"));
    let flag = |key: &[u8]| {
        dict.get(key)
            .ok()
            .and_then(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_bool().ok())
    };
    let overprint_stroke = flag(b"OP").unwrap_or(false);
    // `op` defaults to the stroking value when absent.
    let overprint_fill = flag(b"op").unwrap_or(overprint_stroke);

    GraphicsState {
        blend_modes,
        soft_mask,
        fill_alpha: dict.get(b"ca").ok().and_then(|obj| number(doc, obj)),
        stroke_alpha: dict.get(b"CA").ok().and_then(|obj| number(doc, obj)),
        overprint_fill,
        overprint_stroke,
    }
}

fn image_xobject(doc: &lopdf::Document, stream: &Stream) -> ImageXObject {
    let dict = &stream.dict;
    let int = |key: &[u8]| {
        dict.get(key)
            .ok()
            .and_then(|obj| number(doc, obj))
            .map(|v| v.max(0.0) as u32)
    };
    let image_mask = dict
        .get(b"ImageMask")
        .ok()
        .and_then(|obj| obj.as_bool().ok())
        .unwrap_or(false);

    let filter = match dict.get(b"Filter").ok().and_then(|obj| resolve(doc, obj)) {
        Some(Object::Array(filters)) => {
            let names: Vec<String> = filters.iter().filter_map(name_of).collect();
            (!names.is_empty()).then(|| names.join("+"))
        }
        Some(obj) => name_of(obj),
        None => None,
    };

    let color_space = if image_mask {
        ColorSpaceDef::Gray
    } else {
        dict.get(b"ColorSpace")
            .ok()
            .map(|obj| color_space_def(doc, obj, 0))
            .unwrap_or_else(|| ColorSpaceDef::Unknown("embedded".into()))
    };

    ImageXObject {
        width: int(b"Width").unwrap_or(0),
        height: int(b"Height").unwrap_or(0),
        bits_per_component: if image_mask {
            1
        } else {
            int(b"BitsPerComponent").unwrap_or(8)
        },
        color_space,
        filter,
        soft_mask: dict.has(b"SMask"),
        stream_len: stream.content.len(),
    }
}

fn color_space_def(doc: &lopdf::Document, object: &Object, depth: usize) -> ColorSpaceDef {
    if depth > 4 {
        return ColorSpaceDef::Unknown("nested".into());
    }
    let Some(object) = resolve(doc, object) else {
        return ColorSpaceDef::Unknown("missing".into());
    };
    match object {
        Object::Name(_) => {
            let name = name_of(object).unwrap_or_default();
            ColorSpaceDef::from_family_name(&name).unwrap_or(ColorSpaceDef::Unknown(name))
        }
        Object::Array(parts) => {
            let family = parts.first().and_then(name_of).unwrap_or_default();
            match family.as_str() {
                "ICCBased" => {
                    let components = parts
                        .get(1)
                        .and_then(|obj| resolve(doc, obj))
                        .and_then(|obj| obj.as_stream().ok())
                        .and_then(|s| s.dict.get(b"N").ok())
                        .and_then(|obj| number(doc, obj));
                    match components.map(|n| n as u32) {
                        Some(1) => ColorSpaceDef::Gray,
                        Some(3) => ColorSpaceDef::Rgb,
                        Some(4) => ColorSpaceDef::Cmyk,
                        _ => ColorSpaceDef::Unknown("ICCBased".into()),
                    }
                }
                "Separation" => ColorSpaceDef::Separation(
                    parts.get(1).and_then(name_of).unwrap_or_default(),
                ),
                "DeviceN" => ColorSpaceDef::DeviceN(
                    parts
                        .get(1)
                        .and_then(|obj| resolve(doc, obj))
                        .and_then(|obj| obj.as_array().ok())
                        .map(|names| names.iter().filter_map(name_of).collect())
                        .unwrap_or_default(),
                ),
                "Indexed" | "I" => ColorSpaceDef::Indexed(Box::new(
                    parts
                        .get(1)
                        .map(|base| color_space_def(doc, base, depth + 1))
                        .unwrap_or(ColorSpaceDef::Unknown("Indexed".into())),
                )),
                other => ColorSpaceDef::from_family_name(other)
                    .unwrap_or_else(|| ColorSpaceDef::Unknown(other.to_string())),
            }
        }
        _ => ColorSpaceDef::Unknown("invalid".into()),
    }
}

// -- Content streams ----------------------------------------------------------------

/// Concatenated, decoded bytes of a page's `/Contents`.
pub(crate) fn page_content(doc: &lopdf::Document, page: &Dictionary) -> Result<Vec<u8>, String> {
    let Ok(contents) = page.get(b"Contents") else {
        return Ok(Vec::new());
    };
    let resolved = resolve(doc, contents).ok_or("Contents reference is dangling")?;
    match resolved {
        Object::Stream(stream) => stream_bytes(stream),
        Object::Array(parts) => {
            let mut out = Vec::new();
            for part in parts {
                let stream = resolve(doc, part)
                    .and_then(|obj| obj.as_stream().ok())
                    .ok_or("Contents array entry is not a stream")?;
                out.extend(stream_bytes(stream)?);
                out.push(b'\n');
            }
            Ok(out)
        }
        _ => Err("Contents is neither a stream nor an array".to_string()),
    }
}

pub(crate) fn stream_bytes(stream: &Stream) -> Result<Vec<u8>, String> {
    if stream.dict.has(b"Filter") {
        stream
            .decompressed_content()
            .map_err(|err| format!("cannot decode stream: {err}"))
    } else {
        Ok(stream.content.clone())
    }
}

pub(crate) fn decode_operations(bytes: &[u8]) -> (Vec<ContentOp>, Option<String>) {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return (Vec::new(), None);
    }
    match Content::decode(bytes) {
        Ok(content) => (
            content.operations.iter().map(ContentOp::from_lopdf).collect(),
            None,
        ),
        Err(err) => (Vec::new(), Some(format!("cannot parse content stream: {err}"))),
    }
}

// -- Object helpers -------------------------------------------------------------------

/// Follow references until a direct object is reached.
pub(crate) fn resolve<'a>(doc: &'a lopdf::Document, object: &'a Object) -> Option<&'a Object> {
    let mut current = object;
    for _ in 0..MAX_CHAIN {
        match current {
            Object::Reference(id) => current = doc.get_object(*id).ok()?,
            other => return Some(other),
        }
    }
    None
}

pub(crate) fn as_dict<'a>(doc: &'a lopdf::Document, object: &'a Object) -> Option<&'a Dictionary> {
    match resolve(doc, object)? {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

/// Look up a page attribute, walking up the `Parent` chain for inheritable keys.
pub(crate) fn inherited<'a>(
    doc: &'a lopdf::Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_CHAIN {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn sub_dict<'a>(doc: &'a lopdf::Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
    dict.get(key).ok().and_then(|obj| as_dict(doc, obj))
}

pub(crate) fn rect_from(doc: &lopdf::Document, object: &Object) -> Option<Rect> {
    let values = resolve(doc, object)?.as_array().ok()?;
    if values.len() != 4 {
        return None;
    }
    let mut coords = [0.0; 4];
    for (slot, value) in coords.iter_mut().zip(values) {
        *slot = number(doc, value)?;
    }
    let rect = Rect::from(coords);
    (rect.width() > 0.0 && rect.height() > 0.0).then_some(rect)
}

fn number(doc: &lopdf::Document, object: &Object) -> Option<f64> {
    match resolve(doc, object)? {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}

pub(crate) fn name_of(object: &Object) -> Option<String> {
    match object {
        Object::Name(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

fn text_of(doc: &lopdf::Document, object: &Object) -> Option<String> {
    match resolve(doc, object)? {
        Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
        Object::Name(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

fn key_name(key: &[u8]) -> String {
    String::from_utf8_lossy(key).into_owned()
}

fn is_transparency_group(group: &Dictionary) -> bool {
    group
        .get(b"S")
        .ok()
        .and_then(name_of)
        .is_some_and(|s| s == "Transparency")
}
