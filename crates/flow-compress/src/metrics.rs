//! Compression metrics

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy applied by a compression call, in order of aggressiveness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionStrategy {
    /// Budget unset; input returned unchanged
    None,
    /// Collapse consecutive duplicate kinds to their latest occurrence
    SelectivePreservation,
    /// Summarize long free-text fields in older messages
    SemanticCompression,
    /// Strip narrative fields from older messages entirely
    DataExtraction,
    /// Keep only the `k` most recent messages per kind
    TemporalCompression,
    /// Merge each kind into one synthetic message
    HierarchicalCompression,
}

impl CompressionStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            CompressionStrategy::None => "none",
            CompressionStrategy::SelectivePreservation => "selective_preservation",
            CompressionStrategy::SemanticCompression => "semantic_compression",
            CompressionStrategy::DataExtraction => "data_extraction",
            CompressionStrategy::TemporalCompression => "temporal_compression",
            CompressionStrategy::HierarchicalCompression => "hierarchical_compression",
        }
    }
}

impl fmt::Display for CompressionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one compression call
///
/// `budget_unreachable` is the degraded-success flag: the best-effort
/// result still exceeds the requested budget. It is never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionMetrics {
    pub strategy_used: CompressionStrategy,
    pub original_count: usize,
    pub compressed_count: usize,
    pub estimated_tokens_before: usize,
    pub estimated_tokens_after: usize,
    pub budget_unreachable: bool,
}
