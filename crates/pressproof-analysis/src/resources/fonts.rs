// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::collections::BTreeMap;

use pressproof_core::types::{FontAnalysis, FontUsage};

use crate::walk::{Visit, distinct_sets};

/// Subset fonts carry a six-uppercase-letter tag and `+`, e.g. `ABCDEF+Helvetica`.
pub fn is_font_subset(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() > 7 && bytes[..6].iter().all(u8::is_ascii_uppercase) && bytes[6] == b'+'
}

/// Fonts keyed by `BaseFont`.
#[derive(Debug, Default)]
pub struct FontPart {
    fonts: BTreeMap<String, FontUsage>,
}

impl FontPart {
    pub fn scan(page_number: u32, visits: &[Visit<'_>]) -> Self {
        let mut part = Self::default();
        for (_, set) in distinct_sets(visits) {
            for font in set.fonts.values() {
                part.add(
                    font.base_font.clone(),
                    FontUsage {
                        embedded: font.embedded,
                        subset: is_font_subset(&font.base_font),
                        usage_count: 1,
                        font_type: font.subtype.clone(),
                        pages: vec![page_number],
                    },
                );
            }
        }
        part
    }

    fn add(&mut self, name: String, usage: FontUsage) {
        match self.fonts.get_mut(&name) {
            Some(existing) => {
                // One unembedded copy is enough to fail the font.
                existing.embedded &= usage.embedded;
                existing.usage_count += usage.usage_count;
                existing.pages.extend(usage.pages);
            }
            None => {
                self.fonts.insert(name, usage);
            }
        }
    }

    pub fn merge(mut self, other: Self) -> Self {
        for (name, usage) in other.fonts {
            self.add(name, usage);
        }
        self
    }

    pub fn finish(mut self) -> FontAnalysis {
        for usage in self.fonts.values_mut() {
            usage.pages.sort_unstable();
            usage.pages.dedup();
        }
        let unembedded = self
            .fonts
            .iter()
            .filter(|(_, usage)| !usage.embedded)
            .map(|(name, _)| name.clone())
            .collect();
        FontAnalysis {
            fonts: self.fonts,
            unembedded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subset_prefix() {
        assert!(is_font_subset("ABCDEF+Helvetica"));
        assert!(!is_font_subset("Helvetica"));
        assert!(!is_font_subset("ABCDEF+"));
        assert!(!is_font_subset("AbCDEF+Helvetica"));
        assert!(!is_font_subset("ABCDE+Helvetica"));
    }
}
