//! Chart-ready record types handed to the charting collaborator

use serde::{Deserialize, Serialize};

/// Chart form accepted by the charting collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Bar,
    Radar,
    Line,
    Pie,
}

/// One named data series within a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub data: Vec<f64>,
}

/// A single chart specification
///
/// Bar, line, and pie charts carry `x_axis` labels; radar charts carry
/// `categories` instead. Exactly one of the two is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRecord {
    pub title: String,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    pub series: Vec<Series>,
}

impl ChartRecord {
    /// Build a bar chart with a single series
    pub fn bar(
        title: impl Into<String>,
        x_axis: Vec<String>,
        series_name: impl Into<String>,
        data: Vec<f64>,
    ) -> Self {
        Self {
            title: title.into(),
            chart_type: ChartType::Bar,
            x_axis: Some(x_axis),
            categories: None,
            series: vec![Series {
                name: series_name.into(),
                data,
            }],
        }
    }

    /// Build a radar chart with a single series
    pub fn radar(
        title: impl Into<String>,
        categories: Vec<String>,
        series_name: impl Into<String>,
        data: Vec<f64>,
    ) -> Self {
        Self {
            title: title.into(),
            chart_type: ChartType::Radar,
            x_axis: None,
            categories: Some(categories),
            series: vec![Series {
                name: series_name.into(),
                data,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_serialization_shape() {
        let record = ChartRecord::bar(
            "profitability 指标分析",
            vec!["净利率".to_string()],
            "指标值",
            vec![0.0192],
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "bar");
        assert_eq!(value["x_axis"][0], "净利率");
        assert_eq!(value["series"][0]["name"], "指标值");
        // Radar-only field is absent, not null.
        assert!(value.get("categories").is_none());
    }

    #[test]
    fn test_radar_uses_categories() {
        let record = ChartRecord::radar(
            "综合财务指标雷达图",
            vec!["a".to_string(), "b".to_string()],
            "指标值",
            vec![1.0, 2.0],
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "radar");
        assert!(value.get("x_axis").is_none());
        assert_eq!(value["categories"][1], "b");
    }
}
