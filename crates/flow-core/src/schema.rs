//! Required-field sets per data kind and the ingestion-boundary classifier

use serde_json::{Map, Value};

use crate::data_type::DataType;
use crate::error::{FlowError, Result};

/// Ratio category keys recognized in `financial_ratios` content
pub const RATIO_CATEGORIES: [&str; 4] = ["profitability", "solvency", "efficiency", "growth"];

/// Statement section keys recognized in `raw_financial_data` content
pub const STATEMENT_SECTIONS: [&str; 3] = ["income_statement", "balance_sheet", "cash_flow"];

/// Minimal required keys for a data kind
///
/// The sets are any-of: content satisfies the schema when at least one of
/// the listed keys is present. An empty set means the kind accepts any
/// content (`text_summary` is the universal fallback).
pub fn required_keys(data_type: DataType) -> &'static [&'static str] {
    match data_type {
        DataType::FinancialRatios => &RATIO_CATEGORIES,
        DataType::RawFinancialData => &STATEMENT_SECTIONS,
        DataType::FinancialAnalysis => &["performance_analysis", "risk_assessment", "recommendation"],
        DataType::ChartData => &["charts"],
        DataType::AnalysisInsights => &["key_insights"],
        DataType::ReportData => &["report_summary", "key_findings"],
        DataType::ErrorInfo => &["reason"],
        DataType::TextSummary => &[],
    }
}

/// Check `content` against the minimal required-field set of `data_type`
pub fn validate(data_type: DataType, content: &Map<String, Value>) -> Result<()> {
    let required = required_keys(data_type);
    if required.is_empty() || required.iter().any(|key| content.contains_key(*key)) {
        Ok(())
    } else {
        Err(FlowError::SchemaMismatch {
            data_type,
            required,
        })
    }
}

/// Heuristic classifier for content arriving without an explicit tag
///
/// Used only at the ingestion boundary, never inside the pipeline.
/// Precedence when several shapes match: ratio category keys win over
/// statement section keys (the more specific signal), and anything else
/// falls back to `text_summary`.
pub fn infer(content: &Map<String, Value>) -> DataType {
    if RATIO_CATEGORIES.iter().any(|key| content.contains_key(*key)) {
        return DataType::FinancialRatios;
    }
    if STATEMENT_SECTIONS.iter().any(|key| content.contains_key(*key)) {
        return DataType::RawFinancialData;
    }
    DataType::TextSummary
}
