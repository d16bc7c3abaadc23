//! The tracer wrapping the conversion engine

use serde_json::Value;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::RwLock;
use std::time::Instant;
use tracing::debug;

use flow_convert::ConversionEngine;
use flow_core::{DataType, Message};

use crate::report::FlowReport;
use crate::trace::ConversionTrace;

#[derive(Default)]
struct TraceStore {
    order: Vec<String>,
    by_id: HashMap<String, ConversionTrace>,
}

/// Observes every conversion without side effects on its result
///
/// The store is the one genuinely shared mutable structure in the layer;
/// a single `RwLock` guards it so multiple analysis requests can trace
/// concurrently. Appends only: a recorded trace is never mutated or
/// deleted for the lifetime of the process.
pub struct FlowTracer {
    engine: ConversionEngine,
    store: RwLock<TraceStore>,
}

impl Default for FlowTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowTracer {
    /// Create a tracer around the standard conversion engine
    pub fn new() -> Self {
        Self::with_engine(ConversionEngine::new())
    }

    /// Create a tracer around an explicit engine
    pub fn with_engine(engine: ConversionEngine) -> Self {
        Self {
            engine,
            store: RwLock::new(TraceStore::default()),
        }
    }

    /// The wrapped engine
    pub fn engine(&self) -> &ConversionEngine {
        &self.engine
    }

    /// Convert through the engine, timing and recording the attempt
    ///
    /// The returned message is exactly what the engine produced; the
    /// trace is a read-only observation of it.
    pub fn trace(
        &self,
        message: &Message,
        target_type: DataType,
        target_agent: Option<&str>,
    ) -> (Message, ConversionTrace) {
        let started = Instant::now();
        let result = self.engine.convert(message, target_type, target_agent);
        let duration = started.elapsed();

        let success = result.data_type != DataType::ErrorInfo;
        let errors = if success {
            Vec::new()
        } else {
            result
                .content
                .get("reason")
                .and_then(Value::as_str)
                .map(|reason| vec![reason.to_string()])
                .unwrap_or_default()
        };

        let mut trace = ConversionTrace {
            trace_id: derive_trace_id(message, target_agent),
            original_snapshot: message.clone(),
            converted_snapshot: result.clone(),
            conversion_path: [message.data_type, target_type],
            duration,
            success,
            errors,
        };

        // Id resolution and append happen under one write lock so
        // concurrent same-bucket traces cannot claim the same id.
        {
            let mut store = self.store.write().unwrap();
            trace.trace_id = disambiguate(&store, trace.trace_id);
            store.order.push(trace.trace_id.clone());
            store.by_id.insert(trace.trace_id.clone(), trace.clone());
        }

        debug!(trace_id = %trace.trace_id, success, source = %message.data_type, target = %target_type, "recorded conversion trace");

        (result, trace)
    }

    /// Look up a trace by id
    pub fn get(&self, trace_id: &str) -> Option<ConversionTrace> {
        let store = self.store.read().unwrap();
        store.by_id.get(trace_id).cloned()
    }

    /// All traces addressed to `target_agent`, oldest first
    pub fn traces_for(&self, target_agent: &str) -> Vec<ConversionTrace> {
        let store = self.store.read().unwrap();
        store
            .order
            .iter()
            .filter_map(|id| store.by_id.get(id))
            .filter(|trace| trace.converted_snapshot.receiver.as_deref() == Some(target_agent))
            .cloned()
            .collect()
    }

    /// Success rate over the most recent `window` traces
    ///
    /// `None` when no traces fall in the window.
    pub fn success_rate(&self, window: usize) -> Option<f64> {
        let store = self.store.read().unwrap();
        let start = store.order.len().saturating_sub(window);
        let recent = &store.order[start..];
        if recent.is_empty() {
            return None;
        }
        let successes = recent
            .iter()
            .filter_map(|id| store.by_id.get(id))
            .filter(|trace| trace.success)
            .count();
        Some(successes as f64 / recent.len() as f64)
    }

    /// Number of recorded traces
    pub fn len(&self) -> usize {
        let store = self.store.read().unwrap();
        store.order.len()
    }

    /// Whether nothing has been traced yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Aggregate diagnostic snapshot of everything traced so far
    pub fn report(&self) -> FlowReport {
        let store = self.store.read().unwrap();
        let traces: Vec<&ConversionTrace> =
            store.order.iter().filter_map(|id| store.by_id.get(id)).collect();
        FlowReport::from_traces(&traces)
    }
}

// Keep the derived id stable, disambiguating same-bucket repeats with a
// numeric suffix so earlier records stay untouched.
fn disambiguate(store: &TraceStore, base: String) -> String {
    if !store.by_id.contains_key(&base) {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{base}-{n}");
        if !store.by_id.contains_key(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

// Stable id: sender, receiver, and the message timestamp bucketed to the
// millisecond.
fn derive_trace_id(message: &Message, target_agent: Option<&str>) -> String {
    let mut hasher = DefaultHasher::new();
    message.sender.hash(&mut hasher);
    target_agent.unwrap_or("").hash(&mut hasher);
    message.timestamp.timestamp_millis().hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
