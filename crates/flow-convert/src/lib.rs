//! Rule-based transformation between recognized data kinds
//!
//! Conversions are selected purely by an explicit `(source, target)` key
//! into an immutable table populated at engine construction. They are
//! intentionally lossy, one-directional projections: no inverse rule is
//! guaranteed or required.

pub mod chart;
pub mod engine;
pub mod labels;
pub mod rules;

pub use chart::{ChartRecord, ChartType, Series};
pub use engine::ConversionEngine;
pub use labels::metric_label;
