//! Conversion rule functions
//!
//! Every rule is a pure function of `content`: no external state, no
//! mutation of the input, identical input always yields identical output.
//! Rules project into the target shape and are not invertible.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use flow_core::schema::{RATIO_CATEGORIES, STATEMENT_SECTIONS};

use crate::chart::ChartRecord;
use crate::labels::metric_label;

/// Signature shared by all registered conversion rules
pub type ConversionFn = fn(&Map<String, Value>) -> Map<String, Value>;

/// `financial_ratios` → `chart_data`
///
/// One bar record per present ratio category, in canonical category
/// order, with indicator values in key order. When two or more categories
/// are present, one aggregate radar record over all leaf indicators is
/// appended; a single category yields bars only.
pub fn financial_ratios_to_chart(content: &Map<String, Value>) -> Map<String, Value> {
    let mut charts = Vec::new();
    let mut radar_labels = Vec::new();
    let mut radar_values = Vec::new();
    let mut present_categories = 0;

    for category in RATIO_CATEGORIES {
        let Some(Value::Object(indicators)) = content.get(category) else {
            continue;
        };
        present_categories += 1;

        let (labels, values) = numeric_leaves(indicators);
        radar_labels.extend(labels.clone());
        radar_values.extend(values.clone());
        charts.push(ChartRecord::bar(
            format!("{category} 指标分析"),
            labels,
            "指标值",
            values,
        ));
    }

    if present_categories >= 2 {
        charts.push(ChartRecord::radar(
            "综合财务指标雷达图",
            radar_labels,
            "指标值",
            radar_values,
        ));
    }

    charts_content(&charts)
}

/// `raw_financial_data` → `chart_data`
///
/// Analogous extraction keyed by statement section names: one bar record
/// per present section, no aggregate radar.
pub fn raw_financial_to_chart(content: &Map<String, Value>) -> Map<String, Value> {
    let mut charts = Vec::new();

    for section in STATEMENT_SECTIONS {
        let Some(Value::Object(items)) = content.get(section) else {
            continue;
        };
        let (labels, values) = numeric_leaves(items);
        charts.push(ChartRecord::bar(
            format!("{section} 指标分析"),
            labels,
            "指标值",
            values,
        ));
    }

    charts_content(&charts)
}

struct RatioPattern {
    category: &'static str,
    key: &'static str,
    regex: Regex,
    percent: bool,
}

static RATIO_PATTERNS: LazyLock<Vec<RatioPattern>> = LazyLock::new(|| {
    let specs: [(&str, &str, &str, bool); 6] = [
        ("profitability", "gross_profit_margin", r"(?:毛利率|销售毛利率)[：:]\s*([0-9.]+)%", true),
        ("profitability", "net_profit_margin", r"(?:净利率|销售净利率)[：:]\s*([0-9.]+)%", true),
        ("profitability", "roe", r"(?i)(?:ROE|净资产收益率)[：:]\s*([0-9.]+)%", true),
        ("profitability", "roa", r"(?i)(?:ROA|总资产收益率)[：:]\s*([0-9.]+)%", true),
        ("solvency", "debt_to_asset_ratio", r"(?:资产负债率|负债率)[：:]\s*([0-9.]+)%", true),
        ("solvency", "current_ratio", r"流动比率[：:]\s*([0-9.]+)", false),
    ];
    specs
        .into_iter()
        .map(|(category, key, pattern, percent)| RatioPattern {
            category,
            key,
            regex: Regex::new(pattern).expect("ratio pattern compiles"),
            percent,
        })
        .collect()
});

/// `text_summary` → `financial_ratios`
///
/// Extracts labelled indicator values from free text and groups them into
/// ratio categories. Percent-denominated indicators are normalized to
/// fractions. When nothing matches the result is an empty mapping.
pub fn text_to_financial_ratios(content: &Map<String, Value>) -> Map<String, Value> {
    let text = free_text(content);
    let mut result = Map::new();

    for pattern in RATIO_PATTERNS.iter() {
        let Some(captures) = pattern.regex.captures(&text) else {
            continue;
        };
        let Some(value) = captures.get(1).and_then(|m| m.as_str().parse::<f64>().ok()) else {
            continue;
        };
        let value = if pattern.percent { value / 100.0 } else { value };

        let category = result
            .entry(pattern.category.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(indicators) = category {
            indicators.insert(pattern.key.to_string(), json_number(value));
        }
    }

    result
}

/// `text_summary` → `chart_data`
///
/// Text-statistics bar record: word count, sentence count, and mean
/// sentence length.
pub fn text_to_chart(content: &Map<String, Value>) -> Map<String, Value> {
    let text = free_text(content);
    let words = text.split_whitespace().count();
    let sentences = text
        .split(['.', '。'])
        .filter(|sentence| !sentence.trim().is_empty())
        .count();
    let mean_length = if sentences > 0 {
        round2(words as f64 / sentences as f64)
    } else {
        0.0
    };

    let record = ChartRecord::bar(
        "文本统计分析",
        vec!["总字数".to_string(), "总句数".to_string(), "平均句长".to_string()],
        "指标值",
        vec![words as f64, sentences as f64, mean_length],
    );
    charts_content(&[record])
}

/// Wrap chart records under the `charts` key of a `chart_data` content map
pub fn charts_content(records: &[ChartRecord]) -> Map<String, Value> {
    let mut content = Map::new();
    let charts = records
        .iter()
        .map(|record| serde_json::to_value(record).unwrap_or(Value::Null))
        .collect();
    content.insert("charts".to_string(), Value::Array(charts));
    content
}

// Numeric leaves in key order; non-numeric values are skipped so labels
// and data stay aligned.
fn numeric_leaves(indicators: &Map<String, Value>) -> (Vec<String>, Vec<f64>) {
    let mut labels = Vec::new();
    let mut values = Vec::new();
    for (key, value) in indicators {
        if let Some(number) = value.as_f64() {
            labels.push(metric_label(key).to_string());
            values.push(number);
        }
    }
    (labels, values)
}

fn free_text(content: &Map<String, Value>) -> String {
    match content.get("raw_output").and_then(Value::as_str) {
        Some(text) => text.to_string(),
        None => serde_json::to_string(content).unwrap_or_default(),
    }
}

fn json_number(value: f64) -> Value {
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_single_category_yields_one_bar_no_radar() {
        let content = map(json!({
            "profitability": {"net_profit_margin": 0.0192, "roe": 0.0282}
        }));
        let converted = financial_ratios_to_chart(&content);
        let charts = converted["charts"].as_array().unwrap();
        assert_eq!(charts.len(), 1);
        assert_eq!(
            charts[0],
            json!({
                "title": "profitability 指标分析",
                "type": "bar",
                "x_axis": ["净利率", "净资产收益率(ROE)"],
                "series": [{"name": "指标值", "data": [0.0192, 0.0282]}]
            })
        );
    }

    #[test]
    fn test_two_categories_add_exactly_one_radar() {
        let content = map(json!({
            "profitability": {"roe": 0.15},
            "solvency": {"current_ratio": 1.8}
        }));
        let converted = financial_ratios_to_chart(&content);
        let charts = converted["charts"].as_array().unwrap();
        assert_eq!(charts.len(), 3);

        let radar = &charts[2];
        assert_eq!(radar["type"], "radar");
        assert_eq!(radar["title"], "综合财务指标雷达图");
        assert_eq!(
            radar["categories"],
            json!(["净资产收益率(ROE)", "流动比率"])
        );
        assert_eq!(radar["series"][0]["data"], json!([0.15, 1.8]));
    }

    #[test]
    fn test_all_four_categories_in_canonical_order() {
        let content = map(json!({
            "growth": {"revenue_growth": 0.1},
            "profitability": {"roe": 0.2},
            "efficiency": {"asset_turnover": 0.9},
            "solvency": {"current_ratio": 1.5}
        }));
        let converted = financial_ratios_to_chart(&content);
        let charts = converted["charts"].as_array().unwrap();
        let titles: Vec<_> = charts.iter().map(|c| c["title"].as_str().unwrap()).collect();
        assert_eq!(
            titles,
            vec![
                "profitability 指标分析",
                "solvency 指标分析",
                "efficiency 指标分析",
                "growth 指标分析",
                "综合财务指标雷达图",
            ]
        );
    }

    #[test]
    fn test_unmapped_indicator_keeps_its_key() {
        let content = map(json!({"efficiency": {"bespoke_metric": 3.5}}));
        let converted = financial_ratios_to_chart(&content);
        let charts = converted["charts"].as_array().unwrap();
        assert_eq!(charts[0]["x_axis"], json!(["bespoke_metric"]));
    }

    #[test]
    fn test_non_numeric_leaves_skipped() {
        let content = map(json!({
            "profitability": {"roe": 0.1, "comment": "strong quarter"}
        }));
        let converted = financial_ratios_to_chart(&content);
        let charts = converted["charts"].as_array().unwrap();
        assert_eq!(charts[0]["x_axis"], json!(["净资产收益率(ROE)"]));
        assert_eq!(charts[0]["series"][0]["data"], json!([0.1]));
    }

    #[test]
    fn test_rule_is_deterministic() {
        let content = map(json!({
            "profitability": {"net_profit_margin": 0.0192},
            "growth": {"revenue_growth": 0.07}
        }));
        assert_eq!(
            financial_ratios_to_chart(&content),
            financial_ratios_to_chart(&content)
        );
    }

    #[test]
    fn test_raw_sections_to_bars() {
        let content = map(json!({
            "income_statement": {"revenue": 216.4, "net_profit": 4.2},
            "balance_sheet": {"total_assets": 890.0}
        }));
        let converted = raw_financial_to_chart(&content);
        let charts = converted["charts"].as_array().unwrap();
        assert_eq!(charts.len(), 2);
        assert_eq!(charts[0]["title"], "income_statement 指标分析");
        assert_eq!(charts[0]["x_axis"], json!(["营业收入", "净利润"]));
        assert_eq!(charts[1]["x_axis"], json!(["总资产"]));
        // No radar for statement data.
        assert!(charts.iter().all(|c| c["type"] == "bar"));
    }

    #[test]
    fn test_text_extraction_groups_by_category() {
        let content = map(json!({
            "raw_output": "本期净利率: 1.92%，ROE: 2.82%，资产负债率: 78.5%，流动比率: 1.12"
        }));
        let converted = text_to_financial_ratios(&content);

        let profitability = converted["profitability"].as_object().unwrap();
        assert_eq!(profitability["net_profit_margin"], json!(0.0192));
        assert_eq!(profitability["roe"], json!(0.0282));

        let solvency = converted["solvency"].as_object().unwrap();
        assert_eq!(solvency["debt_to_asset_ratio"], json!(0.785));
        assert_eq!(solvency["current_ratio"], json!(1.12));
    }

    #[test]
    fn test_text_extraction_without_matches_is_empty() {
        let content = map(json!({"raw_output": "nothing quantitative here"}));
        assert!(text_to_financial_ratios(&content).is_empty());
    }

    #[test]
    fn test_text_statistics_chart() {
        let content = map(json!({"raw_output": "one two three. four five six."}));
        let converted = text_to_chart(&content);
        let charts = converted["charts"].as_array().unwrap();
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0]["title"], "文本统计分析");
        assert_eq!(charts[0]["x_axis"], json!(["总字数", "总句数", "平均句长"]));
        assert_eq!(charts[0]["series"][0]["data"], json!([6.0, 2.0, 3.0]));
    }
}
