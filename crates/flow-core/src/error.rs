//! Error types for the data-exchange layer

use thiserror::Error;

use crate::data_type::DataType;

/// Result type alias for exchange-layer operations
pub type Result<T> = std::result::Result<T, FlowError>;

/// Error type for exchange-layer operations
///
/// None of these abort a pipeline run: schema mismatches degrade to a
/// `text_summary` envelope, missing conversion rules degrade to an
/// `error_info` message, and compression shortfalls surface as a metrics
/// flag. The enum exists so callers can inspect what was recovered from.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Content is missing the minimal required fields for its declared type
    #[error("schema mismatch for {data_type}: content requires one of {required:?}")]
    SchemaMismatch {
        data_type: DataType,
        required: &'static [&'static str],
    },

    /// A wire tag outside the closed DataType enumeration
    #[error("unknown data type tag: {0}")]
    UnknownDataType(String),

    /// Inbound payload could not be parsed as a message envelope
    #[error("message parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Invalid configuration value
    #[error("configuration error: {0}")]
    Config(String),
}
