//! Conversion tracing for the data-exchange layer
//!
//! Records every conversion attempt for later diagnosis without altering
//! the conversion result. The store is append-only for the lifetime of
//! the process and safe for concurrent use across analysis requests.

pub mod report;
pub mod trace;
pub mod tracer;

pub use report::FlowReport;
pub use trace::ConversionTrace;
pub use tracer::FlowTracer;
