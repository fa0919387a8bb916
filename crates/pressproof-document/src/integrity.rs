// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document fingerprints tie a report to the bytes it was produced from.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of the raw file bytes.
pub fn fingerprint(pdf: &[u8]) -> String {
    hex::encode(Sha256::digest(pdf))
}

/// True when `pdf` is the document `expected` was taken from. An empty
/// fingerprint (unknown origin) matches anything.
pub fn fingerprint_matches(pdf: &[u8], expected: &str) -> bool {
    expected.is_empty() || fingerprint(pdf).eq_ignore_ascii_case(expected)
}
