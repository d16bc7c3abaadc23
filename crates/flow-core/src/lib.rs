//! Core types for the inter-stage data-exchange layer
//!
//! This crate defines the canonical vocabulary shared by every pipeline
//! stage: the closed [`DataType`] enumeration, the validated [`Message`]
//! envelope, the ingestion-boundary classifier, and the trajectory
//! serialization handed to the language-model stage.

pub mod data_type;
pub mod error;
pub mod message;
pub mod schema;
pub mod serialize;

pub use data_type::DataType;
pub use error::{FlowError, Result};
pub use message::Message;
pub use schema::{infer, required_keys, validate};
pub use serialize::{compact_text, render_trajectory};
