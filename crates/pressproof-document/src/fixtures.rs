// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory PDF construction for tests and benchmarks (feature `fixtures`).

use lopdf::{Dictionary, Object, Stream, dictionary};

fn rect(values: [f64; 4]) -> Object {
    Object::Array(values.iter().map(|v| Object::Real(*v as f32)).collect())
}

struct FontSpec {
    name: String,
    base_font: String,
    embedded: bool,
}

struct ImageSpec {
    name: String,
    width: i64,
    height: i64,
    color_space: Object,
    soft_mask: bool,
}

/// One page of a fixture document.
pub struct PageSpec {
    media_box: [f64; 4],
    crop_box: Option<[f64; 4]>,
    trim_box: Option<[f64; 4]>,
    bleed_box: Option<[f64; 4]>,
    content: String,
    fonts: Vec<FontSpec>,
    images: Vec<ImageSpec>,
    graphics_states: Vec<(String, Dictionary)>,
    color_spaces: Vec<(String, Object)>,
    transparency_group: bool,
}

impl PageSpec {
    pub fn new(media_box: [f64; 4]) -> Self {
        Self {
            media_box,
            crop_box: None,
            trim_box: None,
            bleed_box: None,
            content: String::new(),
            fonts: Vec::new(),
            images: Vec::new(),
            graphics_states: Vec::new(),
            color_spaces: Vec::new(),
            transparency_group: false,
        }
    }

    /// US Letter, 612 x 792 pt.
    pub fn letter() -> Self {
        Self::new([0.0, 0.0, 612.0, 792.0])
    }

    /// A Letter trim with a 9 pt bleed on every side.
    pub fn print_ready() -> Self {
        Self::new([0.0, 0.0, 630.0, 810.0])
            .trim([9.0, 9.0, 621.0, 801.0])
            .bleed([0.0, 0.0, 630.0, 810.0])
    }

    pub fn crop(mut self, r: [f64; 4]) -> Self {
        self.crop_box = Some(r);
        self
    }

    pub fn trim(mut self, r: [f64; 4]) -> Self {
        self.trim_box = Some(r);
        self
    }

    pub fn bleed(mut self, r: [f64; 4]) -> Self {
        self.bleed_box = Some(r);
        self
    }

    /// Append raw content-stream text.
    pub fn content(mut self, ops: &str) -> Self {
        if !self.content.is_empty() {
            self.content.push('\n');
        }
        self.content.push_str(ops);
        self
    }

    pub fn font(mut self, name: &str, base_font: &str, embedded: bool) -> Self {
        self.fonts.push(FontSpec {
            name: name.into(),
            base_font: base_font.into(),
            embedded,
        });
        self
    }

    /// An image XObject in a device colour space (`DeviceRGB`, `DeviceCMYK`, ...),
    /// painted full-page with `Do`.
    pub fn image(self, name: &str, width: i64, height: i64, color_space: &str) -> Self {
        self.listed_image(name, width, height, color_space)
            .content(&format!("q /{name} Do Q"))
    }

    /// An image in the page resources that the content never paints.
    pub fn listed_image(mut self, name: &str, width: i64, height: i64, color_space: &str) -> Self {
        self.images.push(ImageSpec {
            name: name.into(),
            width,
            height,
            color_space: Object::Name(color_space.as_bytes().to_vec()),
            soft_mask: false,
        });
        self
    }

    /// A painted image carrying an `/SMask`.
    pub fn masked_image(mut self, name: &str, width: i64, height: i64) -> Self {
        self.images.push(ImageSpec {
            name: name.into(),
            width,
            height,
            color_space: Object::Name(b"DeviceCMYK".to_vec()),
            soft_mask: true,
        });
        self.content(&format!("q /{name} Do Q"))
    }

    pub fn ext_gstate(mut self, name: &str, state: Dictionary) -> Self {
        self.graphics_states.push((name.into(), state));
        self
    }

    /// A Separation colour space with a CMYK alternate.
    pub fn separation(mut self, name: &str, ink: &str) -> Self {
        let space = Object::Array(vec![
            "Separation".into(),
            Object::Name(ink.as_bytes().to_vec()),
            "DeviceCMYK".into(),
            Object::Null,
        ]);
        self.color_spaces.push((name.into(), space));
        self
    }

    pub fn transparency_group(mut self) -> Self {
        self.transparency_group = true;
        self
    }
}

/// Builds a complete PDF with `lopdf` and serialises it.
pub struct PdfBuilder {
    pages: Vec<PageSpec>,
    pdfx_version: Option<String>,
    output_intent: bool,
    layers: Vec<(String, bool)>,
    compress: bool,
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            pdfx_version: None,
            output_intent: false,
            layers: Vec::new(),
            compress: false,
        }
    }

    pub fn page(mut self, page: PageSpec) -> Self {
        self.pages.push(page);
        self
    }

    /// Declare `GTS_PDFXVersion` in the Info dictionary.
    pub fn pdfx_version(mut self, version: &str) -> Self {
        self.pdfx_version = Some(version.into());
        self
    }

    pub fn output_intent(mut self) -> Self {
        self.output_intent = true;
        self
    }

    /// Add an optional-content group, off by default when `hidden`.
    pub fn layer(mut self, name: &str, hidden: bool) -> Self {
        self.layers.push((name.into(), hidden));
        self
    }

    /// Flate-compress all streams before saving.
    pub fn compressed(mut self) -> Self {
        self.compress = true;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.6");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();

        for spec in self.pages {
            let resources = build_resources(&mut doc, &spec);
            let content_id = doc.add_object(Stream::new(dictionary! {}, spec.content.into_bytes()));
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => rect(spec.media_box),
                "Contents" => content_id,
                "Resources" => resources,
            };
            if let Some(r) = spec.crop_box {
                page.set("CropBox", rect(r));
            }
            if let Some(r) = spec.trim_box {
                page.set("TrimBox", rect(r));
            }
            if let Some(r) = spec.bleed_box {
                page.set("BleedBox", rect(r));
            }
            if spec.transparency_group {
                page.set("Group", dictionary! { "S" => "Transparency", "CS" => "DeviceCMYK" });
            }
            kids.push(Object::Reference(doc.add_object(page)));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };
        if self.output_intent {
            catalog.set(
                "OutputIntents",
                vec![Object::Dictionary(dictionary! {
                    "Type" => "OutputIntent",
                    "S" => "GTS_PDFX",
                    "OutputConditionIdentifier" => Object::string_literal("FOGRA39"),
                })],
            );
        }
        if !self.layers.is_empty() {
            let mut groups = Vec::new();
            let mut off = Vec::new();
            for (name, hidden) in &self.layers {
                let id = doc.add_object(dictionary! {
                    "Type" => "OCG",
                    "Name" => Object::string_literal(name.as_str()),
                });
                groups.push(Object::Reference(id));
                if *hidden {
                    off.push(Object::Reference(id));
                }
            }
            catalog.set(
                "OCProperties",
                dictionary! {
                    "OCGs" => groups,
                    "D" => dictionary! { "OFF" => off },
                },
            );
        }
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);

        if let Some(version) = self.pdfx_version {
            let info_id = doc.add_object(dictionary! {
                "GTS_PDFXVersion" => Object::string_literal(version),
                "Title" => Object::string_literal("fixture"),
            });
            doc.trailer.set("Info", info_id);
        }

        if self.compress {
            doc.compress();
        }

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("fixture PDF serialises");
        bytes
    }
}

fn build_resources(doc: &mut lopdf::Document, spec: &PageSpec) -> Dictionary {
    let mut resources = Dictionary::new();

    if !spec.fonts.is_empty() {
        let mut fonts = Dictionary::new();
        for font in &spec.fonts {
            let mut dict = dictionary! {
                "Type" => "Font",
                "Subtype" => "TrueType",
                "BaseFont" => Object::Name(font.base_font.as_bytes().to_vec()),
            };
            if font.embedded {
                let program = doc.add_object(Stream::new(dictionary! {}, vec![0u8; 16]));
                let descriptor = doc.add_object(dictionary! {
                    "Type" => "FontDescriptor",
                    "FontName" => Object::Name(font.base_font.as_bytes().to_vec()),
                    "FontFile2" => program,
                });
                dict.set("FontDescriptor", descriptor);
            }
            fonts.set(font.name.as_str(), doc.add_object(dict));
        }
        resources.set("Font", fonts);
    }

    if !spec.images.is_empty() {
        let mut xobjects = Dictionary::new();
        for image in &spec.images {
            let mut dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width,
                "Height" => image.height,
                "BitsPerComponent" => 8,
                "ColorSpace" => image.color_space.clone(),
            };
            if image.soft_mask {
                let mask = doc.add_object(Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => image.width,
                        "Height" => image.height,
                        "BitsPerComponent" => 8,
                        "ColorSpace" => "DeviceGray",
                    },
                    vec![255u8; 4],
                ));
                dict.set("SMask", mask);
            }
            let id = doc.add_object(Stream::new(dict, vec![0u8; 64]));
            xobjects.set(image.name.as_str(), id);
        }
        resources.set("XObject", xobjects);
    }

    if !spec.graphics_states.is_empty() {
        let mut states = Dictionary::new();
        for (name, state) in &spec.graphics_states {
            states.set(name.as_str(), state.clone());
        }
        resources.set("ExtGState", states);
    }

    if !spec.color_spaces.is_empty() {
        let mut spaces = Dictionary::new();
        for (name, space) in &spec.color_spaces {
            spaces.set(name.as_str(), space.clone());
        }
        resources.set("ColorSpace", spaces);
    }

    resources
}
