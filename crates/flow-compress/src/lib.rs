//! Context compression for stage trajectories
//!
//! Keeps the serialized trajectory within a token budget while preserving
//! the content most likely to affect downstream decisions. Compression is
//! a pure function of its input list and budget: there is no process-wide
//! trajectory object and no strategy ever touches the most recent message
//! of a retained data kind.

pub mod compressor;
pub mod config;
pub mod metrics;

pub use compressor::{ContextCompressor, strategy_for_ratio};
pub use config::CompressorConfig;
pub use metrics::{CompressionMetrics, CompressionStrategy};
