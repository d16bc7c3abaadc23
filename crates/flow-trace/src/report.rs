//! Aggregate diagnostics over recorded traces

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::trace::ConversionTrace;

/// Read-only diagnostic snapshot of the trace store
///
/// Built on demand; holds counts and timings only, never the snapshots
/// themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowReport {
    /// Total conversions observed
    pub total_traces: usize,
    /// Conversions that produced the requested kind
    pub success_count: usize,
    /// `success_count / total_traces`, 0 when nothing was traced
    pub success_rate: f64,
    /// Count per `"source -> target"` path
    pub conversions: HashMap<String, usize>,
    /// Count per target agent
    pub targets: HashMap<String, usize>,
    /// Mean conversion duration
    pub mean_duration: Duration,
    /// Slowest conversion duration
    pub max_duration: Duration,
}

impl FlowReport {
    /// Aggregate a set of traces
    pub fn from_traces(traces: &[&ConversionTrace]) -> Self {
        let total_traces = traces.len();
        let success_count = traces.iter().filter(|t| t.success).count();

        let mut conversions: HashMap<String, usize> = HashMap::new();
        let mut targets: HashMap<String, usize> = HashMap::new();
        let mut total_duration = Duration::ZERO;
        let mut max_duration = Duration::ZERO;

        for trace in traces {
            *conversions.entry(trace.path_label()).or_default() += 1;
            if let Some(receiver) = &trace.converted_snapshot.receiver {
                *targets.entry(receiver.clone()).or_default() += 1;
            }
            total_duration += trace.duration;
            max_duration = max_duration.max(trace.duration);
        }

        let success_rate = if total_traces == 0 {
            0.0
        } else {
            success_count as f64 / total_traces as f64
        };
        let mean_duration = if total_traces == 0 {
            Duration::ZERO
        } else {
            total_duration / total_traces as u32
        };

        Self {
            total_traces,
            success_count,
            success_rate,
            conversions,
            targets,
            mean_duration,
            max_duration,
        }
    }
}
