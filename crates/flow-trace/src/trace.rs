//! The record produced for every conversion attempt

use serde::{Deserialize, Serialize};
use std::time::Duration;

use flow_core::{DataType, Message};

/// One observed conversion attempt
///
/// Snapshots are full envelope copies taken before and after the engine
/// ran, so a failed conversion can be replayed from the trace alone.
/// Traces are append-only: never mutated after creation, never deleted
/// within a process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionTrace {
    /// Stable id derived from sender, receiver, and time bucket
    pub trace_id: String,
    /// The message as handed to the engine
    pub original_snapshot: Message,
    /// The message the engine produced
    pub converted_snapshot: Message,
    /// `[source_type, target_type]`
    pub conversion_path: [DataType; 2],
    /// Wall-clock time the conversion took
    pub duration: Duration,
    /// Whether the engine produced the requested kind
    pub success: bool,
    /// Failure reasons, empty on success
    pub errors: Vec<String>,
}

impl ConversionTrace {
    /// Source kind of the traced conversion
    pub fn source_type(&self) -> DataType {
        self.conversion_path[0]
    }

    /// Requested target kind of the traced conversion
    pub fn target_type(&self) -> DataType {
        self.conversion_path[1]
    }

    /// `"source -> target"` label used in reports
    pub fn path_label(&self) -> String {
        format!("{} -> {}", self.source_type(), self.target_type())
    }
}
