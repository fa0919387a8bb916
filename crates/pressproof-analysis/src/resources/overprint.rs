// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::collections::BTreeSet;

use pressproof_core::types::OverprintAnalysis;
use pressproof_document::ResourceSetId;

use crate::walk::{Visit, distinct_sets};

/// Graphics states that switch on `OP`/`op`, counted once per resource set.
#[derive(Debug, Default)]
pub struct OverprintPart {
    states: BTreeSet<(ResourceSetId, String)>,
    affected_pages: BTreeSet<u32>,
}

impl OverprintPart {
    pub fn scan(page_number: u32, visits: &[Visit<'_>]) -> Self {
        let mut part = Self::default();
        for (id, set) in distinct_sets(visits) {
            for (name, state) in &set.graphics_states {
                if state.has_overprint() {
                    part.states.insert((id, name.clone()));
                    part.affected_pages.insert(page_number);
                }
            }
        }
        part
    }

    pub fn merge(mut self, other: Self) -> Self {
        self.states.extend(other.states);
        self.affected_pages.extend(other.affected_pages);
        self
    }

    pub fn finish(self) -> OverprintAnalysis {
        OverprintAnalysis {
            has_overprint: !self.states.is_empty(),
            overprint_states: self.states.len() as u32,
            affected_pages: self.affected_pages.into_iter().collect(),
        }
    }
}
