// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Colour-operator tracking over a content-stream operator sequence.
//
// Shared by the colour-space analyzer (which counts samples) and the
// ink-coverage fix (which rewrites the CMYK ones in place).

use pressproof_core::color::{ColorSpaceKind, detect_color_space};

use crate::model::{ColorSpaceDef, ContentOp, ResourceSet};

/// What a colour operator set.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleKind {
    /// A process colour, classified by operand count.
    Process(ColorSpaceKind),
    /// A tint in a Separation/DeviceN space.
    Spot(Vec<String>),
    /// `cs`/`CS` selecting a Separation/DeviceN space.
    SpotSelection(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorSample {
    pub operator_index: usize,
    pub stroke: bool,
    pub kind: SampleKind,
    pub components: Vec<f64>,
}

/// Current fill/stroke colour spaces, saved and restored with `q`/`Q`.
#[derive(Debug, Clone)]
pub struct ColorState {
    fill: ColorSpaceDef,
    stroke: ColorSpaceDef,
    stack: Vec<(ColorSpaceDef, ColorSpaceDef)>,
}

impl Default for ColorState {
    fn default() -> Self {
        Self {
            fill: ColorSpaceDef::Gray,
            stroke: ColorSpaceDef::Gray,
            stack: Vec::new(),
        }
    }
}

impl ColorState {
    pub fn fill_space(&self) -> &ColorSpaceDef {
        &self.fill
    }

    pub fn stroke_space(&self) -> &ColorSpaceDef {
        &self.stroke
    }

    /// Feed one operator; returns the colour it sets, if any.
    pub fn observe(
        &mut self,
        operator_index: usize,
        op: &ContentOp,
        resources: Option<&ResourceSet>,
    ) -> Option<ColorSample> {
        let stroke = op
            .operator
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_uppercase());

        match op.operator.as_str() {
            "q" => {
                self.stack.push((self.fill.clone(), self.stroke.clone()));
                None
            }
            "Q" => {
                if let Some((fill, stroke)) = self.stack.pop() {
                    self.fill = fill;
                    self.stroke = stroke;
                }
                None
            }
            "g" | "G" | "rg" | "RG" | "k" | "K" => {
                let components = op.numbers();
                let kind = detect_color_space(&components);
                let space = match kind {
                    ColorSpaceKind::Grayscale => ColorSpaceDef::Gray,
                    ColorSpaceKind::Rgb => ColorSpaceDef::Rgb,
                    ColorSpaceKind::Cmyk => ColorSpaceDef::Cmyk,
                    _ => ColorSpaceDef::Unknown(op.operator.clone()),
                };
                self.set_space(stroke, space);
                Some(ColorSample {
                    operator_index,
                    stroke,
                    kind: SampleKind::Process(kind),
                    components,
                })
            }
            "cs" | "CS" => {
                let name = op.name_operand()?;
                let space = resources
                    .and_then(|set| set.color_space(name))
                    .or_else(|| ColorSpaceDef::from_family_name(name))
                    .unwrap_or_else(|| ColorSpaceDef::Unknown(name.to_string()));
                let sample = space.is_spot().then(|| ColorSample {
                    operator_index,
                    stroke,
                    kind: SampleKind::SpotSelection(space.spot_names()),
                    components: Vec::new(),
                });
                self.set_space(stroke, space);
                sample
            }
            "sc" | "scn" | "SC" | "SCN" => {
                let space = if stroke { &self.stroke } else { &self.fill };
                let components = op.numbers();
                let kind = match space {
                    ColorSpaceDef::Pattern => return None,
                    s if s.is_spot() => SampleKind::Spot(s.spot_names()),
                    ColorSpaceDef::Indexed(base) if base.is_spot() => {
                        SampleKind::Spot(base.spot_names())
                    }
                    s => SampleKind::Process(
                        s.process_kind()
                            .unwrap_or_else(|| detect_color_space(&components)),
                    ),
                };
                Some(ColorSample {
                    operator_index,
                    stroke,
                    kind,
                    components,
                })
            }
            _ => None,
        }
    }

    fn set_space(&mut self, stroke: bool, space: ColorSpaceDef) {
        if stroke {
            self.stroke = space;
        } else {
            self.fill = space;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Operand;

    fn op(operator: &str, numbers: &[f64]) -> ContentOp {
        ContentOp::new(operator, numbers.iter().map(|n| Operand::Real(*n)).collect())
    }

    fn named(operator: &str, name: &str) -> ContentOp {
        ContentOp::new(operator, vec![Operand::Name(name.into())])
    }

    #[test]
    fn device_operators_classify_by_arity() {
        let mut state = ColorState::default();
        let rgb = state.observe(0, &op("rg", &[1.0, 0.0, 0.0]), None).unwrap();
        assert_eq!(rgb.kind, SampleKind::Process(ColorSpaceKind::Rgb));
        assert!(!rgb.stroke);
        let cmyk = state.observe(1, &op("K", &[0.0, 0.0, 0.0, 1.0]), None).unwrap();
        assert_eq!(cmyk.kind, SampleKind::Process(ColorSpaceKind::Cmyk));
        assert!(cmyk.stroke);
        assert!(state.observe(2, &op("re", &[0.0, 0.0, 10.0, 10.0]), None).is_none());
    }

    #[test]
    fn separation_selection_and_tint() {
        let mut set = ResourceSet::default();
        set.color_spaces
            .insert("CS0".into(), ColorSpaceDef::Separation("PANTONE 485 C".into()));
        let mut state = ColorState::default();
        let selection = state.observe(0, &named("cs", "CS0"), Some(&set)).unwrap();
        assert_eq!(
            selection.kind,
            SampleKind::SpotSelection(vec!["PANTONE 485 C".into()])
        );
        let tint = state.observe(1, &op("scn", &[0.5]), Some(&set)).unwrap();
        assert!(matches!(tint.kind, SampleKind::Spot(_)));
    }

    #[test]
    fn save_restore_brings_back_space() {
        let mut state = ColorState::default();
        state.observe(0, &named("cs", "DeviceCMYK"), None);
        state.observe(1, &op("q", &[]), None);
        state.observe(2, &named("cs", "DeviceRGB"), None);
        assert_eq!(state.fill_space(), &ColorSpaceDef::Rgb);
        state.observe(3, &op("Q", &[]), None);
        assert_eq!(state.fill_space(), &ColorSpaceDef::Cmyk);
        let sample = state.observe(4, &op("sc", &[0.1, 0.2, 0.3, 0.4]), None).unwrap();
        assert_eq!(sample.kind, SampleKind::Process(ColorSpaceKind::Cmyk));
    }

    #[test]
    fn pattern_fill_is_not_a_colour_sample() {
        let mut state = ColorState::default();
        state.observe(0, &named("cs", "Pattern"), None);
        let scn = ContentOp::new("scn", vec![Operand::Name("P0".into())]);
        assert!(state.observe(1, &scn, None).is_none());
    }
}
