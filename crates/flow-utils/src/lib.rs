//! Shared utilities for the data-exchange layer

pub mod config;
pub mod logging;

pub use config::ExchangeConfig;
pub use logging::init_tracing;
