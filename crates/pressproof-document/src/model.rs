// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Owned document model: pages, shared resources and content operators.
//
// Pages refer to resource sets by id, so pages sharing a `/Resources`
// dictionary (and everything in it) share one `ResourceSet`. Lookups that
// find nothing return `None`; a missing resource is never an error here.

use std::collections::BTreeMap;

use lopdf::{Object, ObjectId};
use pressproof_core::color::ColorSpaceKind;
use pressproof_core::geometry::Rect;

/// US Letter, used when a page carries no usable MediaBox.
pub const DEFAULT_MEDIA_BOX: Rect = Rect {
    llx: 0.0,
    lly: 0.0,
    urx: 612.0,
    ury: 792.0,
};

/// Index of a resource set in the document's [`ResourceTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceSetId(pub usize);

/// Index of an XObject in the document's [`ResourceTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct XObjectId(pub usize);

/// Which operator sequence a rewrite applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentTarget {
    /// Zero-based page index.
    Page(usize),
    Form(XObjectId),
}

// -- Content operators --------------------------------------------------------

/// A content-stream operand. Anything preflight doesn't inspect is kept as
/// the raw object so re-encoding is lossless.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Integer(i64),
    Real(f64),
    Name(String),
    Array(Vec<Operand>),
    Other(Object),
}

impl Operand {
    pub fn from_object(object: &Object) -> Self {
        match object {
            Object::Integer(value) => Self::Integer(*value),
            Object::Real(value) => Self::Real(f64::from(*value)),
            Object::Name(bytes) => match std::str::from_utf8(bytes) {
                Ok(name) => Self::Name(name.to_string()),
                Err(_) => Self::Other(object.clone()),
            },
            Object::Array(items) => Self::Array(items.iter().map(Self::from_object).collect()),
            other => Self::Other(other.clone()),
        }
    }

    pub fn to_object(&self) -> Object {
        match self {
            Self::Integer(value) => Object::Integer(*value),
            Self::Real(value) => Object::Real(*value as f32),
            Self::Name(name) => Object::Name(name.as_bytes().to_vec()),
            Self::Array(items) => Object::Array(items.iter().map(Self::to_object).collect()),
            Self::Other(object) => object.clone(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Real(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            _ => None,
        }
    }
}

/// One content-stream operation: operands followed by an operator.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<Operand>,
}

impl ContentOp {
    pub fn new(operator: impl Into<String>, operands: Vec<Operand>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }

    /// Numeric operands in order, skipping names and other values.
    pub fn numbers(&self) -> Vec<f64> {
        self.operands.iter().filter_map(Operand::as_number).collect()
    }

    /// The first name operand, e.g. the resource named by `cs`, `gs` or `Do`.
    pub fn name_operand(&self) -> Option<&str> {
        self.operands.iter().find_map(Operand::as_name)
    }

    pub(crate) fn from_lopdf(op: &lopdf::content::Operation) -> Self {
        Self {
            operator: op.operator.clone(),
            operands: op.operands.iter().map(Operand::from_object).collect(),
        }
    }

    pub(crate) fn to_lopdf(&self) -> lopdf::content::Operation {
        lopdf::content::Operation::new(
            &self.operator,
            self.operands.iter().map(Operand::to_object).collect(),
        )
    }
}

// -- Resources ------------------------------------------------------------------

/// A resolved colour space definition.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpaceDef {
    Gray,
    Rgb,
    Cmyk,
    Separation(String),
    DeviceN(Vec<String>),
    Indexed(Box<ColorSpaceDef>),
    Pattern,
    Lab,
    Unknown(String),
}

impl ColorSpaceDef {
    /// Resolve one of the device family names usable without a resource entry.
    pub fn from_family_name(name: &str) -> Option<Self> {
        match name {
            "DeviceGray" | "G" | "CalGray" => Some(Self::Gray),
            "DeviceRGB" | "RGB" | "CalRGB" => Some(Self::Rgb),
            "DeviceCMYK" | "CMYK" => Some(Self::Cmyk),
            "Pattern" => Some(Self::Pattern),
            "Lab" => Some(Self::Lab),
            _ => None,
        }
    }

    /// The process colour model, if this is (or indexes into) one.
    pub fn process_kind(&self) -> Option<ColorSpaceKind> {
        match self {
            Self::Gray => Some(ColorSpaceKind::Grayscale),
            Self::Rgb => Some(ColorSpaceKind::Rgb),
            Self::Cmyk => Some(ColorSpaceKind::Cmyk),
            Self::Indexed(base) => base.process_kind(),
            _ => None,
        }
    }

    /// Spot ink names for Separation/DeviceN spaces (also through Indexed).
    pub fn spot_names(&self) -> Vec<String> {
        match self {
            Self::Separation(name) => vec![name.clone()],
            Self::DeviceN(names) => names.clone(),
            Self::Indexed(base) => base.spot_names(),
            _ => Vec::new(),
        }
    }

    pub fn is_spot(&self) -> bool {
        matches!(self, Self::Separation(_) | Self::DeviceN(_))
    }

    pub fn label(&self) -> String {
        match self {
            Self::Gray => "DeviceGray".into(),
            Self::Rgb => "DeviceRGB".into(),
            Self::Cmyk => "DeviceCMYK".into(),
            Self::Separation(name) => format!("Separation({name})"),
            Self::DeviceN(names) => format!("DeviceN({})", names.join(", ")),
            Self::Indexed(base) => format!("Indexed({})", base.label()),
            Self::Pattern => "Pattern".into(),
            Self::Lab => "Lab".into(),
            Self::Unknown(name) => name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FontResource {
    /// `BaseFont`, including any subset prefix.
    pub base_font: String,
    /// `Subtype`, e.g. `Type1`, `TrueType`, `Type0`.
    pub subtype: String,
    pub embedded: bool,
}

/// Transparency and overprint settings from an `ExtGState` dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphicsState {
    pub blend_modes: Vec<String>,
    pub soft_mask: bool,
    pub fill_alpha: Option<f64>,
    pub stroke_alpha: Option<f64>,
    pub overprint_fill: bool,
    pub overprint_stroke: bool,
}

impl GraphicsState {
    /// Non-`Normal` blend modes in use.
    pub fn effective_blend_modes(&self) -> impl Iterator<Item = &String> {
        self.blend_modes
            .iter()
            .filter(|mode| !matches!(mode.as_str(), "Normal" | "Compatible"))
    }

    pub fn has_partial_alpha(&self) -> bool {
        self.fill_alpha.is_some_and(|a| a < 1.0) || self.stroke_alpha.is_some_and(|a| a < 1.0)
    }

    pub fn has_overprint(&self) -> bool {
        self.overprint_fill || self.overprint_stroke
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageXObject {
    pub width: u32,
    pub height: u32,
    pub bits_per_component: u32,
    pub color_space: ColorSpaceDef,
    /// Filter names joined with `+`, if the stream is encoded.
    pub filter: Option<String>,
    pub soft_mask: bool,
    pub stream_len: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormXObject {
    pub(crate) object_id: ObjectId,
    pub bbox: Option<Rect>,
    pub operations: Vec<ContentOp>,
    /// Falls back to the invoking page's resources when absent.
    pub resources: Option<ResourceSetId>,
    pub transparency_group: bool,
    pub content_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum XObject {
    Image(ImageXObject),
    Form(FormXObject),
    Other(String),
}

/// The named resources visible to a content stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSet {
    pub fonts: BTreeMap<String, FontResource>,
    pub xobjects: BTreeMap<String, XObjectId>,
    pub graphics_states: BTreeMap<String, GraphicsState>,
    pub color_spaces: BTreeMap<String, ColorSpaceDef>,
}

impl ResourceSet {
    /// Resolve a colour-space operand: device names first, then `/ColorSpace`.
    pub fn color_space(&self, name: &str) -> Option<ColorSpaceDef> {
        ColorSpaceDef::from_family_name(name).or_else(|| self.color_spaces.get(name).cloned())
    }
}

/// Every resource set and XObject in the document, shared by reference.
#[derive(Debug, Clone, Default)]
pub struct ResourceTree {
    pub(crate) sets: Vec<ResourceSet>,
    pub(crate) xobjects: Vec<XObject>,
}

impl ResourceTree {
    pub fn set(&self, id: ResourceSetId) -> Option<&ResourceSet> {
        self.sets.get(id.0)
    }

    pub fn xobject(&self, id: XObjectId) -> Option<&XObject> {
        self.xobjects.get(id.0)
    }

    pub fn form(&self, id: XObjectId) -> Option<&FormXObject> {
        match self.xobject(id) {
            Some(XObject::Form(form)) => Some(form),
            _ => None,
        }
    }

    pub fn sets(&self) -> impl Iterator<Item = (ResourceSetId, &ResourceSet)> {
        self.sets.iter().enumerate().map(|(i, set)| (ResourceSetId(i), set))
    }

    pub fn xobjects(&self) -> impl Iterator<Item = (XObjectId, &XObject)> {
        self.xobjects.iter().enumerate().map(|(i, x)| (XObjectId(i), x))
    }

    pub(crate) fn push_set(&mut self, set: ResourceSet) -> ResourceSetId {
        self.sets.push(set);
        ResourceSetId(self.sets.len() - 1)
    }

    pub(crate) fn push_xobject(&mut self, xobject: XObject) -> XObjectId {
        self.xobjects.push(xobject);
        XObjectId(self.xobjects.len() - 1)
    }
}

// -- Pages and the document -----------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// One-based page number.
    pub number: u32,
    pub(crate) object_id: ObjectId,
    pub media_box: Rect,
    pub crop_box: Option<Rect>,
    pub trim_box: Option<Rect>,
    pub bleed_box: Option<Rect>,
    pub art_box: Option<Rect>,
    pub rotate: i64,
    pub resources: Option<ResourceSetId>,
    pub operations: Vec<ContentOp>,
    /// The page declares a `/Group` with `/S /Transparency`.
    pub transparency_group: bool,
    /// Why the content stream could not be decoded, if it couldn't.
    pub content_error: Option<String>,
}

impl Page {
    /// The area a viewer shows: CropBox clipped to MediaBox, else MediaBox.
    pub fn visible_box(&self) -> Rect {
        self.crop_box
            .and_then(|crop| crop.intersection(&self.media_box))
            .unwrap_or(self.media_box)
    }

    /// TrimBox, defaulting to the visible box as the PDF model does.
    pub fn effective_trim_box(&self) -> Rect {
        self.trim_box.unwrap_or_else(|| self.visible_box())
    }
}

/// Document-level facts gathered by the loader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    pub version: String,
    /// `GTS_PDFXVersion` from the Info dictionary.
    pub pdfx_version: Option<String>,
    pub has_output_intent: bool,
    pub encrypted: bool,
    /// Optional-content group names.
    pub layers: Vec<String>,
    /// Groups switched off in the default configuration.
    pub hidden_layers: Vec<String>,
    pub total_streams: u32,
    pub uncompressed_streams: u32,
    pub uncompressed_bytes: u64,
}

/// A loaded PDF. Built once by the loader, read by the analyzers, mutated
/// only through the methods in [`crate::pdf::writer`].
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) raw: lopdf::Document,
    pub(crate) pages: Vec<Page>,
    pub(crate) resources: ResourceTree,
    pub(crate) info: DocumentInfo,
}

impl Document {
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn resources(&self) -> &ResourceTree {
        &self.resources
    }

    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    /// The resource set of a page, or `None` when the page has no resources.
    pub fn page_resources(&self, page: &Page) -> Option<&ResourceSet> {
        page.resources.and_then(|id| self.resources.set(id))
    }

    /// Operators of a page or form.
    pub fn operations(&self, target: ContentTarget) -> Option<&[ContentOp]> {
        match target {
            ContentTarget::Page(index) => self.pages.get(index).map(|p| p.operations.as_slice()),
            ContentTarget::Form(id) => self.resources.form(id).map(|f| f.operations.as_slice()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operand_round_trip_keeps_unknowns() {
        let string = Object::string_literal("Hello");
        let op = Operand::from_object(&string);
        assert!(matches!(op, Operand::Other(_)));
        assert_eq!(op.to_object(), string);
        assert_eq!(Operand::from_object(&Object::Integer(3)).as_number(), Some(3.0));
        assert_eq!(
            Operand::from_object(&Object::Name(b"CS0".to_vec())).as_name(),
            Some("CS0")
        );
    }

    #[test]
    fn family_names_resolve_without_resources() {
        let set = ResourceSet::default();
        assert_eq!(set.color_space("DeviceCMYK"), Some(ColorSpaceDef::Cmyk));
        assert_eq!(set.color_space("CS9"), None);
    }

    #[test]
    fn indexed_reports_base_kind_and_spots() {
        let indexed = ColorSpaceDef::Indexed(Box::new(ColorSpaceDef::Separation("Gold".into())));
        assert_eq!(indexed.process_kind(), None);
        assert_eq!(indexed.spot_names(), vec!["Gold".to_string()]);
        let rgb = ColorSpaceDef::Indexed(Box::new(ColorSpaceDef::Rgb));
        assert_eq!(rgb.process_kind(), Some(ColorSpaceKind::Rgb));
    }

    #[test]
    fn graphics_state_flags() {
        let state = GraphicsState {
            blend_modes: vec!["Normal".into()],
            fill_alpha: Some(1.0),
            ..Default::default()
        };
        assert_eq!(state.effective_blend_modes().count(), 0);
        assert!(!state.has_partial_alpha());
        let multiply = GraphicsState {
            blend_modes: vec!["Multiply".into()],
            stroke_alpha: Some(0.5),
            ..Default::default()
        };
        assert_eq!(multiply.effective_blend_modes().count(), 1);
        assert!(multiply.has_partial_alpha());
    }
}
