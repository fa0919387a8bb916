// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document-structure analyzers: optional-content layers and stream compression.

use pressproof_core::types::{CompressionAnalysis, LayerAnalysis};
use pressproof_document::DocumentInfo;

pub fn analyze_layers(info: &DocumentInfo) -> LayerAnalysis {
    LayerAnalysis {
        layers: info.layers.clone(),
        hidden_layers: info.hidden_layers.clone(),
        has_hidden_layers: !info.hidden_layers.is_empty(),
    }
}

/// Compression is poor when unfiltered streams hold more than `threshold_bytes`.
pub fn analyze_compression(info: &DocumentInfo, threshold_bytes: u64) -> CompressionAnalysis {
    CompressionAnalysis {
        total_streams: info.total_streams,
        uncompressed_streams: info.uncompressed_streams,
        uncompressed_bytes: info.uncompressed_bytes,
        poor_compression: info.uncompressed_bytes > threshold_bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compression_threshold() {
        let info = DocumentInfo {
            total_streams: 4,
            uncompressed_streams: 2,
            uncompressed_bytes: 70_000,
            ..DocumentInfo::default()
        };
        assert!(analyze_compression(&info, 65_536).poor_compression);
        assert!(!analyze_compression(&info, 100_000).poor_compression);
    }

    #[test]
    fn hidden_layers_flagged() {
        let info = DocumentInfo {
            layers: vec!["Art".into(), "Die".into()],
            hidden_layers: vec!["Die".into()],
            ..DocumentInfo::default()
        };
        let layers = analyze_layers(&info);
        assert!(layers.has_hidden_layers);
        assert_eq!(layers.layers.len(), 2);
    }
}
