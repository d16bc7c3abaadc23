//! The context compressor and its strategy bands

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

use flow_core::serialize::truncate_chars;
use flow_core::{DataType, Message, compact_text};

use crate::config::CompressorConfig;
use crate::metrics::{CompressionMetrics, CompressionStrategy};

static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?\d+(?:\.\d+)?%?").expect("number pattern compiles"));

/// Pick the strategy band for a size ratio
///
/// Band edges belong to the lower band: 1.5 maps to selective
/// preservation, 3.0 to semantic compression, 6.0 to data extraction,
/// 10.0 to temporal compression.
pub fn strategy_for_ratio(ratio: f64) -> CompressionStrategy {
    if ratio <= 1.5 {
        CompressionStrategy::SelectivePreservation
    } else if ratio <= 3.0 {
        CompressionStrategy::SemanticCompression
    } else if ratio <= 6.0 {
        CompressionStrategy::DataExtraction
    } else if ratio <= 10.0 {
        CompressionStrategy::TemporalCompression
    } else {
        CompressionStrategy::HierarchicalCompression
    }
}

/// Bounds a trajectory's serialized size while preserving the most recent
/// structured content of every data kind
///
/// `compress` is a pure function of the input slice and the budget: the
/// compressor holds configuration only, never trajectory state. Whatever
/// the strategy, the most recent retained message of a kind keeps its
/// content byte-for-byte; only earlier entries of that kind are
/// summarized, stripped, dropped, or merged.
pub struct ContextCompressor {
    config: CompressorConfig,
}

impl Default for ContextCompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextCompressor {
    /// Create a compressor with default configuration
    pub fn new() -> Self {
        Self {
            config: CompressorConfig::default(),
        }
    }

    /// Create a compressor with explicit configuration
    pub fn with_config(config: CompressorConfig) -> Self {
        Self { config }
    }

    /// The active configuration
    pub fn config(&self) -> &CompressorConfig {
        &self.config
    }

    /// Estimated downstream token cost of a trajectory
    pub fn estimated_tokens(&self, messages: &[Message]) -> usize {
        messages.iter().map(|m| self.message_tokens(m)).sum()
    }

    fn message_tokens(&self, message: &Message) -> usize {
        let chars = compact_text(&message.content, usize::MAX).chars().count();
        chars.div_ceil(self.config.chars_per_token)
    }

    /// Fit `messages` to `max_tokens`
    ///
    /// With no budget the input is returned unchanged and
    /// `strategy_used` is `none`. Otherwise the size ratio selects one of
    /// five mutually exclusive strategies of increasing aggressiveness.
    /// A result that still exceeds the budget is returned best-effort
    /// with `budget_unreachable` set, never as an error.
    pub fn compress(
        &self,
        messages: &[Message],
        max_tokens: Option<usize>,
    ) -> (Vec<Message>, CompressionMetrics) {
        let tokens_before = self.estimated_tokens(messages);

        let Some(budget) = max_tokens else {
            return (
                messages.to_vec(),
                CompressionMetrics {
                    strategy_used: CompressionStrategy::None,
                    original_count: messages.len(),
                    compressed_count: messages.len(),
                    estimated_tokens_before: tokens_before,
                    estimated_tokens_after: tokens_before,
                    budget_unreachable: false,
                },
            );
        };

        let ratio = if tokens_before == 0 {
            0.0
        } else {
            tokens_before as f64 / budget as f64
        };
        let strategy = strategy_for_ratio(ratio);
        debug!(%strategy, ratio, tokens_before, budget, "compressing trajectory");

        let compressed = match strategy {
            CompressionStrategy::None => messages.to_vec(),
            CompressionStrategy::SelectivePreservation => self.selective_preservation(messages),
            CompressionStrategy::SemanticCompression => self.semantic_compression(messages),
            CompressionStrategy::DataExtraction => self.data_extraction(messages),
            CompressionStrategy::TemporalCompression => self.temporal_compression(messages),
            CompressionStrategy::HierarchicalCompression => self.hierarchical_compression(messages),
        };

        let tokens_after = self.estimated_tokens(&compressed);
        let metrics = CompressionMetrics {
            strategy_used: strategy,
            original_count: messages.len(),
            compressed_count: compressed.len(),
            estimated_tokens_before: tokens_before,
            estimated_tokens_after: tokens_after,
            budget_unreachable: tokens_after > budget,
        };
        (compressed, metrics)
    }

    // Collapse each run of consecutive equal kinds to its latest entry.
    fn selective_preservation(&self, messages: &[Message]) -> Vec<Message> {
        let mut kept = Vec::new();
        for (i, message) in messages.iter().enumerate() {
            let run_continues = messages
                .get(i + 1)
                .is_some_and(|next| next.data_type == message.data_type);
            if !run_continues {
                kept.push(message.clone());
            }
        }
        kept
    }

    // Summarize long free-text fields in every message except the most
    // recent of its kind. Structured mapping fields stay untouched.
    fn semantic_compression(&self, messages: &[Message]) -> Vec<Message> {
        let last = last_index_per_type(messages);
        messages
            .iter()
            .enumerate()
            .map(|(i, message)| {
                if last.get(&message.data_type) == Some(&i) {
                    return message.clone();
                }

                let mut content = message.content.clone();
                let mut touched = false;
                for value in content.values_mut() {
                    if let Value::String(text) = value {
                        if text.chars().count() > self.config.long_text_threshold {
                            *value = Value::String(self.extractive_summary(text));
                            touched = true;
                        }
                    }
                }
                if !touched {
                    return message.clone();
                }

                let mut metadata = message.metadata.clone();
                metadata.insert("compressed".to_string(), Value::Bool(true));
                Message {
                    content,
                    metadata,
                    ..message.clone()
                }
            })
            .collect()
    }

    // First sentence, last sentence, and every numeric token, capped.
    fn extractive_summary(&self, text: &str) -> String {
        let sentences: Vec<&str> = text
            .split(['.', '。'])
            .map(str::trim)
            .filter(|sentence| !sentence.is_empty())
            .collect();
        let numbers: Vec<&str> = NUMBER_PATTERN.find_iter(text).map(|m| m.as_str()).collect();

        let mut summary = match (sentences.first(), sentences.last()) {
            (Some(first), Some(last)) if sentences.len() > 1 => format!("{first} … {last}"),
            (Some(first), _) => (*first).to_string(),
            _ => String::new(),
        };
        if !numbers.is_empty() {
            summary.push_str(&format!(" ({})", numbers.join(", ")));
        }
        truncate_chars(&summary, self.config.summary_max_chars)
    }

    // Strip narrative fields entirely from every message except the most
    // recent of its kind.
    fn data_extraction(&self, messages: &[Message]) -> Vec<Message> {
        let last = last_index_per_type(messages);
        messages
            .iter()
            .enumerate()
            .map(|(i, message)| {
                if last.get(&message.data_type) == Some(&i) {
                    return message.clone();
                }

                let content = self.structured_fields(&message.content);
                let mut metadata = message.metadata.clone();
                metadata.insert("compressed".to_string(), Value::Bool(true));
                Message {
                    content,
                    metadata,
                    ..message.clone()
                }
            })
            .collect()
    }

    fn structured_fields(&self, content: &Map<String, Value>) -> Map<String, Value> {
        let mut filtered = Map::new();
        for (key, value) in content {
            if let Some(kept) = self.structured_value(value) {
                filtered.insert(key.clone(), kept);
            }
        }
        filtered
    }

    // Numbers, booleans, and short categorical strings survive; narrative
    // strings do not. Containers are filtered recursively.
    fn structured_value(&self, value: &Value) -> Option<Value> {
        match value {
            Value::Number(_) | Value::Bool(_) => Some(value.clone()),
            Value::String(text) => {
                (text.chars().count() <= self.config.categorical_max_chars).then(|| value.clone())
            }
            Value::Array(items) => Some(Value::Array(
                items.iter().filter_map(|item| self.structured_value(item)).collect(),
            )),
            Value::Object(map) => Some(Value::Object(self.structured_fields(map))),
            Value::Null => None,
        }
    }

    // Keep only the `k` most recent messages per kind; annotate each
    // kind's most recent retained message with the number removed.
    fn temporal_compression(&self, messages: &[Message]) -> Vec<Message> {
        let k = self.config.keep_per_type;
        let mut per_type: HashMap<DataType, Vec<usize>> = HashMap::new();
        for (i, message) in messages.iter().enumerate() {
            per_type.entry(message.data_type).or_default().push(i);
        }

        let mut kept: Vec<Option<Message>> = vec![None; messages.len()];
        for indices in per_type.values() {
            let start = indices.len().saturating_sub(k);
            for &i in &indices[start..] {
                kept[i] = Some(messages[i].clone());
            }
            if let Some(&newest) = indices.last() {
                if let Some(message) = kept[newest].as_mut() {
                    message
                        .metadata
                        .insert("n_dropped".to_string(), Value::from(start));
                }
            }
        }
        kept.into_iter().flatten().collect()
    }

    // Merge every kind into one synthetic message, ordered by each
    // kind's most recent appearance.
    fn hierarchical_compression(&self, messages: &[Message]) -> Vec<Message> {
        let last = last_index_per_type(messages);
        let mut groups: HashMap<DataType, Vec<&Message>> = HashMap::new();
        for message in messages {
            groups.entry(message.data_type).or_default().push(message);
        }

        let mut types: Vec<DataType> = groups.keys().copied().collect();
        types.sort_by_key(|data_type| last.get(data_type).copied().unwrap_or(usize::MAX));
        types
            .into_iter()
            .filter_map(|data_type| {
                groups
                    .get(&data_type)
                    .and_then(|group| self.merge_group(group))
            })
            .collect()
    }

    // Numeric and structured fields take the most recent value; text
    // fields concatenate chronologically, then truncate.
    fn merge_group(&self, group: &[&Message]) -> Option<Message> {
        let (newest, _) = group.split_last()?;
        if group.len() == 1 {
            return Some((*newest).clone());
        }

        let mut merged = Map::new();
        let mut texts: HashMap<String, String> = HashMap::new();
        for message in group {
            for (key, value) in &message.content {
                if let Value::String(text) = value {
                    let entry = texts.entry(key.clone()).or_default();
                    if !entry.is_empty() {
                        entry.push('\n');
                    }
                    entry.push_str(text);
                }
                merged.insert(key.clone(), value.clone());
            }
        }
        for (key, value) in &mut merged {
            if value.is_string() {
                if let Some(concatenated) = texts.get(key) {
                    *value = Value::String(truncate_chars(
                        concatenated,
                        self.config.merged_text_max_chars,
                    ));
                }
            }
        }

        let mut metadata = newest.metadata.clone();
        metadata.insert("merged_count".to_string(), Value::from(group.len()));
        Some(Message {
            sender: newest.sender.clone(),
            receiver: newest.receiver.clone(),
            data_type: newest.data_type,
            content: merged,
            metadata,
            timestamp: newest.timestamp,
            version: newest.version.clone(),
        })
    }
}

fn last_index_per_type(messages: &[Message]) -> HashMap<DataType, usize> {
    let mut last = HashMap::new();
    for (i, message) in messages.iter().enumerate() {
        last.insert(message.data_type, i);
    }
    last
}
