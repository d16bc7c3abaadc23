//! Trajectory serialization for the language-model stage
//!
//! Each retained message is rendered as a `<subtask>` / `<output>` pair in
//! chronological order. The rendering is deterministic and length-capped
//! so repeated runs over the same trajectory produce identical prompts.

use serde_json::{Map, Value};

use crate::message::Message;

/// Default character cap for a single message's compact rendering
pub const DEFAULT_COMPACT_CHARS: usize = 2000;

/// Deterministic, length-capped textual rendering of message content
///
/// Compact JSON, truncated at a character boundary with a `…` marker when
/// it exceeds `max_chars`.
pub fn compact_text(content: &Map<String, Value>, max_chars: usize) -> String {
    let rendered =
        serde_json::to_string(content).unwrap_or_else(|_| "{}".to_string());
    truncate_chars(&rendered, max_chars)
}

/// Serialize a trajectory for delivery to the language-model stage
///
/// Emits `"<subtask>{sender}</subtask>\n<output>{content}</output>"` per
/// message, newline-joined, in the order given (callers pass messages in
/// chronological order).
pub fn render_trajectory(messages: &[Message], max_chars_per_message: usize) -> String {
    messages
        .iter()
        .map(|message| {
            format!(
                "<subtask>{}</subtask>\n<output>{}</output>",
                message.sender,
                compact_text(&message.content, max_chars_per_message)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate at a character boundary, marking the cut with `…`
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_type::DataType;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn msg(sender: &str, data_type: DataType, content: Value) -> Message {
        Message::create(sender, data_type, map(content), None).unwrap()
    }

    #[test]
    fn test_compact_text_is_deterministic() {
        let content = map(json!({"b": 1, "a": {"nested": [1, 2]}}));
        assert_eq!(
            compact_text(&content, 100),
            compact_text(&content, 100)
        );
        // Insertion order is preserved, not alphabetized.
        assert!(compact_text(&content, 100).starts_with("{\"b\""));
    }

    #[test]
    fn test_compact_text_caps_length() {
        let content = map(json!({"text": "x".repeat(500)}));
        let rendered = compact_text(&content, 64);
        assert_eq!(rendered.chars().count(), 64);
        assert!(rendered.ends_with('…'));
    }

    #[test]
    fn test_render_trajectory_framing() {
        let messages = vec![
            msg("DataAgent", DataType::TextSummary, json!({"raw_output": "fetched"})),
            msg(
                "DataAnalysisAgent",
                DataType::FinancialRatios,
                json!({"profitability": {"roe": 0.1}}),
            ),
        ];

        let rendered = render_trajectory(&messages, DEFAULT_COMPACT_CHARS);
        let expected = "<subtask>DataAgent</subtask>\n\
                        <output>{\"raw_output\":\"fetched\"}</output>\n\
                        <subtask>DataAnalysisAgent</subtask>\n\
                        <output>{\"profitability\":{\"roe\":0.1}}</output>";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_render_empty_trajectory() {
        assert_eq!(render_trajectory(&[], DEFAULT_COMPACT_CHARS), "");
    }
}
