//! The closed enumeration of data kinds flowing between stages

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FlowError;

/// Kind of payload carried by a [`crate::Message`]
///
/// The set is fixed process-wide; adding a kind means redeploying the
/// conversion rule table along with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Statement-level data straight from the data-fetch stage
    RawFinancialData,
    /// Categorized ratio results from the ratio-computation stage
    FinancialRatios,
    /// Narrative analysis produced by the analysis stage
    FinancialAnalysis,
    /// Chart-ready records for the charting collaborator
    ChartData,
    /// Distilled insights extracted from an analysis
    AnalysisInsights,
    /// Payload passed through unmodified to the reporting collaborator
    ReportData,
    /// Free-form text; the universal fallback with no required fields
    TextSummary,
    /// Typed failure surfaced instead of an exception
    ErrorInfo,
}

impl DataType {
    /// All variants, in registry order
    pub const ALL: [DataType; 8] = [
        DataType::RawFinancialData,
        DataType::FinancialRatios,
        DataType::FinancialAnalysis,
        DataType::ChartData,
        DataType::AnalysisInsights,
        DataType::ReportData,
        DataType::TextSummary,
        DataType::ErrorInfo,
    ];

    /// The wire tag for this kind (snake_case, matching serde)
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::RawFinancialData => "raw_financial_data",
            DataType::FinancialRatios => "financial_ratios",
            DataType::FinancialAnalysis => "financial_analysis",
            DataType::ChartData => "chart_data",
            DataType::AnalysisInsights => "analysis_insights",
            DataType::ReportData => "report_data",
            DataType::TextSummary => "text_summary",
            DataType::ErrorInfo => "error_info",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FlowError::UnknownDataType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_tags_round_trip() {
        for t in DataType::ALL {
            assert_eq!(t.as_str().parse::<DataType>().unwrap(), t);
        }
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&DataType::FinancialRatios).unwrap();
        assert_eq!(json, "\"financial_ratios\"");

        let parsed: DataType = serde_json::from_str("\"chart_data\"").unwrap();
        assert_eq!(parsed, DataType::ChartData);
    }

    #[test]
    fn test_unknown_tag_rejected() {
        assert!("not_a_kind".parse::<DataType>().is_err());
    }
}
