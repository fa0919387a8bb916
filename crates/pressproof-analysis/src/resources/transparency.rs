// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::collections::BTreeSet;

use pressproof_core::types::TransparencyAnalysis;
use pressproof_document::{Page, ResourceTree};

use crate::walk::{Visit, distinct_sets, painted_images};

#[derive(Debug, Default)]
pub struct TransparencyPart {
    transparent_objects: u32,
    blend_modes: BTreeSet<String>,
    soft_masks: u32,
    transparency_groups: u32,
    affected_pages: BTreeSet<u32>,
}

impl TransparencyPart {
    pub fn scan(page: &Page, tree: &ResourceTree, visits: &[Visit<'_>]) -> Self {
        let mut part = Self::default();

        for (_, set) in distinct_sets(visits) {
            for state in set.graphics_states.values() {
                let modes: Vec<&String> = state.effective_blend_modes().collect();
                if !modes.is_empty() {
                    part.transparent_objects += 1;
                    part.blend_modes.extend(modes.into_iter().cloned());
                }
                if state.soft_mask {
                    part.transparent_objects += 1;
                    part.soft_masks += 1;
                }
                if state.has_partial_alpha() {
                    part.transparent_objects += 1;
                }
            }
        }
        for (_, _, image) in painted_images(tree, visits) {
            if image.soft_mask {
                part.transparent_objects += 1;
                part.soft_masks += 1;
            }
        }

        if page.transparency_group {
            part.transparency_groups += 1;
        }
        part.transparency_groups += visits.iter().filter(|v| v.transparency_group).count() as u32;

        if part.transparent_objects > 0 || part.transparency_groups > 0 {
            part.affected_pages.insert(page.number);
        }
        part
    }

    pub fn merge(mut self, other: Self) -> Self {
        self.transparent_objects += other.transparent_objects;
        self.blend_modes.extend(other.blend_modes);
        self.soft_masks += other.soft_masks;
        self.transparency_groups += other.transparency_groups;
        self.affected_pages.extend(other.affected_pages);
        self
    }

    pub fn finish(self) -> TransparencyAnalysis {
        TransparencyAnalysis {
            has_transparency: !self.affected_pages.is_empty(),
            transparent_objects: self.transparent_objects,
            blend_modes: self.blend_modes,
            // BTreeSet iteration is ascending and duplicate-free.
            affected_pages: self.affected_pages.into_iter().collect(),
            soft_masks: self.soft_masks,
            transparency_groups: self.transparency_groups,
        }
    }
}
