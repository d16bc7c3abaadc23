//! The canonical message envelope passed between pipeline stages
//!
//! A `Message` is never mutated in place: every conversion or compression
//! produces a new envelope, preserving the previous one for tracing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::data_type::DataType;
use crate::error::Result;
use crate::schema;

fn default_version() -> String {
    "1.0".to_string()
}

fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Validated container for any value flowing between stages
///
/// `timestamp` is expected to be monotonically non-decreasing per sender;
/// that is a producer contract, not something the layer enforces or
/// reorders by.
///
/// # Example
///
/// ```
/// use flow_core::{DataType, Message};
/// use serde_json::json;
///
/// let content = json!({"profitability": {"roe": 0.15}})
///     .as_object()
///     .cloned()
///     .unwrap();
/// let msg = Message::create("DataAnalysisAgent", DataType::FinancialRatios, content, None)
///     .unwrap();
/// assert_eq!(msg.data_type, DataType::FinancialRatios);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Name of the stage that produced this message
    pub sender: String,
    /// Name of the stage this message is addressed to, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    /// Declared kind of `content`
    pub data_type: DataType,
    /// Payload; ordered JSON-like mapping
    #[serde(default)]
    pub content: Map<String, Value>,
    /// Annotations added by the exchange layer or the producing stage
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Production time, ISO-8601 on the wire
    #[serde(default = "now")]
    pub timestamp: DateTime<Utc>,
    /// Envelope schema version
    #[serde(default = "default_version")]
    pub version: String,
}

impl Message {
    /// Create a validated envelope
    ///
    /// Fails with [`crate::FlowError::SchemaMismatch`] when `content`
    /// lacks the minimal fields required by `data_type`.
    pub fn create(
        sender: impl Into<String>,
        data_type: DataType,
        content: Map<String, Value>,
        metadata: Option<Map<String, Value>>,
    ) -> Result<Self> {
        schema::validate(data_type, &content)?;
        Ok(Self {
            sender: sender.into(),
            receiver: None,
            data_type,
            content,
            metadata: metadata.unwrap_or_default(),
            timestamp: Utc::now(),
            version: default_version(),
        })
    }

    /// Create an envelope, downgrading to `text_summary` on schema mismatch
    ///
    /// `text_summary` has no required fields, so the fallback always
    /// succeeds; the original declared kind is kept under
    /// `metadata.schema_fallback_from` and the downgrade is logged.
    pub fn create_or_fallback(
        sender: impl Into<String>,
        data_type: DataType,
        content: Map<String, Value>,
        metadata: Option<Map<String, Value>>,
    ) -> Self {
        let sender = sender.into();
        match Self::create(sender.clone(), data_type, content.clone(), metadata.clone()) {
            Ok(message) => message,
            Err(err) => {
                warn!(sender = %sender, %data_type, %err, "schema mismatch, falling back to text_summary");
                let mut metadata = metadata.unwrap_or_default();
                metadata.insert(
                    "schema_fallback_from".to_string(),
                    Value::String(data_type.to_string()),
                );
                Self {
                    sender,
                    receiver: None,
                    data_type: DataType::TextSummary,
                    content,
                    metadata,
                    timestamp: Utc::now(),
                    version: default_version(),
                }
            }
        }
    }

    /// Set the receiver
    pub fn with_receiver(mut self, receiver: impl Into<String>) -> Self {
        self.receiver = Some(receiver.into());
        self
    }

    /// Set an explicit timestamp (inbound adapters carry the stage's own)
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Parse an inbound wire payload, falling back to `text_summary`
    ///
    /// Untagged or unparseable payloads never fail: they are wrapped as a
    /// `text_summary` envelope with the raw text under
    /// `content.raw_output` and `content.parse_error = true`.
    pub fn from_json_str(payload: &str) -> Self {
        match serde_json::from_str::<Self>(payload) {
            Ok(message) => message,
            Err(err) => {
                warn!(%err, "inbound payload is not a message envelope, wrapping as text_summary");
                let mut content = Map::new();
                content.insert("raw_output".to_string(), Value::String(payload.to_string()));
                content.insert("parse_error".to_string(), Value::Bool(true));
                Self {
                    sender: "unknown".to_string(),
                    receiver: None,
                    data_type: DataType::TextSummary,
                    content,
                    metadata: Map::new(),
                    timestamp: Utc::now(),
                    version: default_version(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_create_validates_schema() {
        let content = map(json!({"profitability": {"roe": 0.15}}));
        let msg = Message::create("DataAnalysisAgent", DataType::FinancialRatios, content, None)
            .unwrap();
        assert_eq!(msg.sender, "DataAnalysisAgent");
        assert_eq!(msg.version, "1.0");
        assert!(msg.receiver.is_none());

        let bad = map(json!({"unrelated": true}));
        assert!(Message::create("x", DataType::FinancialRatios, bad, None).is_err());
    }

    #[test]
    fn test_fallback_downgrades_to_text_summary() {
        let content = map(json!({"free_text": "no ratio categories here"}));
        let msg =
            Message::create_or_fallback("ReportAgent", DataType::FinancialRatios, content, None);
        assert_eq!(msg.data_type, DataType::TextSummary);
        assert_eq!(
            msg.metadata.get("schema_fallback_from"),
            Some(&Value::String("financial_ratios".to_string()))
        );
        // Original content survives the downgrade.
        assert!(msg.content.contains_key("free_text"));
    }

    #[test]
    fn test_fallback_passes_valid_content_through() {
        let content = map(json!({"solvency": {"current_ratio": 1.8}}));
        let msg = Message::create_or_fallback("a", DataType::FinancialRatios, content, None);
        assert_eq!(msg.data_type, DataType::FinancialRatios);
        assert!(!msg.metadata.contains_key("schema_fallback_from"));
    }

    #[test]
    fn test_wire_round_trip() {
        let content = map(json!({"charts": []}));
        let msg = Message::create("ChartGeneratorAgent", DataType::ChartData, content, None)
            .unwrap()
            .with_receiver("ReportAgent");

        let wire = serde_json::to_string(&msg).unwrap();
        let parsed = Message::from_json_str(&wire);
        assert_eq!(parsed.data_type, DataType::ChartData);
        assert_eq!(parsed.receiver.as_deref(), Some("ReportAgent"));
        assert_eq!(parsed.timestamp, msg.timestamp);
    }

    #[test]
    fn test_wire_defaults_applied() {
        let parsed = Message::from_json_str(
            r#"{"sender": "DataAgent", "data_type": "text_summary", "content": {}}"#,
        );
        assert_eq!(parsed.version, "1.0");
        assert!(parsed.metadata.is_empty());
    }

    #[test]
    fn test_unparseable_payload_wrapped() {
        let parsed = Message::from_json_str("plain text, not json");
        assert_eq!(parsed.data_type, DataType::TextSummary);
        assert_eq!(parsed.sender, "unknown");
        assert_eq!(parsed.content.get("parse_error"), Some(&Value::Bool(true)));
        assert_eq!(
            parsed.content.get("raw_output"),
            Some(&Value::String("plain text, not json".to_string()))
        );
    }
}
