//! The conversion engine and its immutable rule table

use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

use flow_core::{DataType, Message};

use crate::rules::{
    ConversionFn, financial_ratios_to_chart, raw_financial_to_chart, text_to_chart,
    text_to_financial_ratios,
};

/// Adapts a message's content from its declared kind to the kind expected
/// by the next stage
///
/// The rule table is populated once at construction and never mutated
/// afterwards, so a shared engine is safe for unsynchronized concurrent
/// reads across analysis requests. The engine never guesses: a pair
/// without a registered rule degrades to an `error_info` message rather
/// than attempting a shape-sniffing fallback.
pub struct ConversionEngine {
    rules: HashMap<(DataType, DataType), ConversionFn>,
}

impl Default for ConversionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionEngine {
    /// Create an engine with the standard rule set registered
    pub fn new() -> Self {
        let mut rules: HashMap<(DataType, DataType), ConversionFn> = HashMap::new();
        rules.insert(
            (DataType::FinancialRatios, DataType::ChartData),
            financial_ratios_to_chart,
        );
        rules.insert(
            (DataType::RawFinancialData, DataType::ChartData),
            raw_financial_to_chart,
        );
        rules.insert(
            (DataType::TextSummary, DataType::FinancialRatios),
            text_to_financial_ratios,
        );
        rules.insert((DataType::TextSummary, DataType::ChartData), text_to_chart);
        Self { rules }
    }

    /// Whether a rule is registered for the pair
    pub fn has_rule(&self, source: DataType, target: DataType) -> bool {
        self.rules.contains_key(&(source, target))
    }

    /// Number of registered rules
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Convert a message to `target_type` for `target_agent`
    ///
    /// Identity conversions short-circuit: the message is returned
    /// unchanged, with no rule lookup and no metadata added. A missing
    /// rule yields an `error_info` message carrying the reason, the
    /// requested kind, and the untouched original content under
    /// `metadata.original_content`.
    pub fn convert(
        &self,
        message: &Message,
        target_type: DataType,
        target_agent: Option<&str>,
    ) -> Message {
        if message.data_type == target_type {
            return message.clone();
        }

        let Some(rule) = self.rules.get(&(message.data_type, target_type)) else {
            warn!(
                source = %message.data_type,
                target = %target_type,
                "no conversion rule registered"
            );
            return self.no_rule_error(message, target_type, target_agent);
        };

        debug!(
            source = %message.data_type,
            target = %target_type,
            sender = %message.sender,
            "converting message"
        );

        let converted = rule(&message.content);

        let mut metadata = message.metadata.clone();
        metadata.insert(
            "converted_from".to_string(),
            Value::String(message.data_type.to_string()),
        );
        metadata.insert(
            "converted_by".to_string(),
            Value::String(target_agent.unwrap_or("ConversionEngine").to_string()),
        );

        Message {
            sender: message.sender.clone(),
            receiver: target_agent.map(str::to_string),
            data_type: target_type,
            content: converted,
            metadata,
            timestamp: chrono::Utc::now(),
            version: message.version.clone(),
        }
    }

    fn no_rule_error(
        &self,
        message: &Message,
        target_type: DataType,
        target_agent: Option<&str>,
    ) -> Message {
        let mut content = Map::new();
        content.insert(
            "reason".to_string(),
            Value::String("no conversion rule".to_string()),
        );
        content.insert(
            "requested".to_string(),
            Value::String(target_type.to_string()),
        );

        let mut metadata = message.metadata.clone();
        metadata.insert(
            "original_content".to_string(),
            Value::Object(message.content.clone()),
        );

        Message {
            sender: message.sender.clone(),
            receiver: target_agent.map(str::to_string),
            data_type: DataType::ErrorInfo,
            content,
            metadata,
            timestamp: chrono::Utc::now(),
            version: message.version.clone(),
        }
    }
}
