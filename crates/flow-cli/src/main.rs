//! Command-line interface for the flow data-exchange layer
//!
//! Stands in for the pipeline orchestrator: reads a JSON trajectory file,
//! drives conversion, compression, or serialization, and prints the
//! results. Untagged entries are classified through the ingestion-boundary
//! heuristic, exactly as stage output arriving without a data_type tag
//! would be.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

use flow_compress::{CompressionMetrics, ContextCompressor};
use flow_core::{DataType, Message, infer, render_trajectory};
use flow_trace::FlowTracer;
use flow_utils::ExchangeConfig;

#[derive(Parser, Debug)]
#[command(name = "flow-cli")]
#[command(about = "Drive the inter-stage data-exchange layer over a JSON trajectory", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert every message in a trajectory to a target data kind
    Convert {
        /// Path to a JSON array of messages
        #[arg(short, long)]
        input: PathBuf,
        /// Target data kind (e.g. chart_data)
        #[arg(short, long)]
        target: String,
        /// Target agent recorded on the converted messages
        #[arg(short, long)]
        agent: Option<String>,
    },
    /// Compress a trajectory to a token budget
    Compress {
        /// Path to a JSON array of messages
        #[arg(short, long)]
        input: PathBuf,
        /// Token budget; defaults to the exchange configuration
        #[arg(short, long)]
        max_tokens: Option<usize>,
    },
    /// Serialize a trajectory for the language-model stage
    Render {
        /// Path to a JSON array of messages
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    flow_utils::init_tracing();

    let args = Args::parse();
    let config = ExchangeConfig::default();

    match args.command {
        Command::Convert {
            input,
            target,
            agent,
        } => {
            let target: DataType = target
                .parse()
                .with_context(|| format!("'{target}' is not a recognized data kind"))?;
            run_convert(&input, target, agent.as_deref())
        }
        Command::Compress { input, max_tokens } => {
            run_compress(&input, max_tokens.unwrap_or(config.default_max_tokens))
        }
        Command::Render { input } => {
            let messages = load_trajectory(&input)?;
            println!("{}", render_trajectory(&messages, config.compact_chars));
            Ok(())
        }
    }
}

fn run_convert(input: &Path, target: DataType, agent: Option<&str>) -> Result<()> {
    let messages = load_trajectory(input)?;
    info!(count = messages.len(), %target, "converting trajectory");

    let tracer = FlowTracer::new();
    for message in &messages {
        let (converted, trace) = tracer.trace(message, target, agent);
        println!("{}", serde_json::to_string_pretty(&converted)?);
        if !trace.success {
            info!(trace_id = %trace.trace_id, errors = ?trace.errors, "conversion degraded");
        }
    }

    let report = tracer.report();
    let mut table = Table::new();
    table.set_header(vec!["conversion", "count"]);
    for (path, count) in &report.conversions {
        table.add_row(vec![path.clone(), count.to_string()]);
    }
    table.add_row(vec![
        "success rate".to_string(),
        format!("{:.0}%", report.success_rate * 100.0),
    ]);
    println!("{table}");
    Ok(())
}

fn run_compress(input: &Path, max_tokens: usize) -> Result<()> {
    let messages = load_trajectory(input)?;
    let compressor = ContextCompressor::new();
    let (compressed, metrics) = compressor.compress(&messages, Some(max_tokens));

    for message in &compressed {
        println!("{}", serde_json::to_string_pretty(message)?);
    }
    println!("{}", metrics_table(&metrics));
    Ok(())
}

fn metrics_table(metrics: &CompressionMetrics) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["metric", "value"]);
    table.add_row(vec!["strategy", metrics.strategy_used.as_str()]);
    table.add_row(vec![
        "messages".to_string(),
        format!("{} -> {}", metrics.original_count, metrics.compressed_count),
    ]);
    table.add_row(vec![
        "estimated tokens".to_string(),
        format!(
            "{} -> {}",
            metrics.estimated_tokens_before, metrics.estimated_tokens_after
        ),
    ]);
    table.add_row(vec![
        "budget unreachable".to_string(),
        metrics.budget_unreachable.to_string(),
    ]);
    table
}

fn load_trajectory(path: &Path) -> Result<Vec<Message>> {
    let payload = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read trajectory file {}", path.display()))?;
    let entries: Vec<Value> = serde_json::from_str(&payload)
        .with_context(|| format!("{} is not a JSON array", path.display()))?;
    Ok(entries.iter().map(message_from_value).collect())
}

// Tagged entries parse as envelopes; untagged objects go through the
// ingestion-boundary classifier; anything else is wrapped as raw text.
fn message_from_value(value: &Value) -> Message {
    if let Ok(message) = serde_json::from_value::<Message>(value.clone()) {
        return message;
    }
    if let Some(content) = value.as_object() {
        let data_type = infer(content);
        return Message::create_or_fallback("unknown", data_type, content.clone(), None);
    }
    Message::from_json_str(&value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tagged_entry_parses_as_envelope() {
        let value = json!({
            "sender": "DataAgent",
            "data_type": "raw_financial_data",
            "content": {"income_statement": {"revenue": 216.4}},
            "timestamp": "2024-06-01T00:00:00Z"
        });
        let message = message_from_value(&value);
        assert_eq!(message.sender, "DataAgent");
        assert_eq!(message.data_type, DataType::RawFinancialData);
    }

    #[test]
    fn test_untagged_entry_goes_through_infer() {
        let value = json!({"profitability": {"roe": 0.15}});
        let message = message_from_value(&value);
        assert_eq!(message.sender, "unknown");
        assert_eq!(message.data_type, DataType::FinancialRatios);
    }

    #[test]
    fn test_non_object_entry_wrapped_as_text() {
        let value = json!("free floating note");
        let message = message_from_value(&value);
        assert_eq!(message.data_type, DataType::TextSummary);
    }
}
