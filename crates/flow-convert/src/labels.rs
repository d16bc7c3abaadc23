//! Fixed metric-to-display-label dictionary
//!
//! Populated once at compile time and read concurrently without
//! synchronization. Unmapped keys fall back to the key itself so no
//! indicator is ever dropped from a chart for lacking a label.

/// Display label for a metric or statement-item key
pub fn metric_label(key: &str) -> &str {
    match key {
        // Profitability
        "gross_profit_margin" => "毛利率",
        "net_profit_margin" => "净利率",
        "roe" => "净资产收益率(ROE)",
        "roa" => "总资产收益率(ROA)",
        "operating_margin" => "营业利润率",

        // Solvency
        "debt_to_asset_ratio" => "资产负债率",
        "current_ratio" => "流动比率",
        "quick_ratio" => "速动比率",
        "debt_to_equity_ratio" => "产权比率",

        // Efficiency
        "asset_turnover" => "总资产周转率",
        "inventory_turnover" => "存货周转率",
        "receivables_turnover" => "应收账款周转率",

        // Growth
        "revenue_growth" => "营收增长率",
        "profit_growth" => "利润增长率",
        "eps_growth" => "每股收益增长率",

        // Cash flow
        "operating_cash_flow" => "经营活动现金流",
        "cash_flow_ratio" => "现金流比率",
        "free_cash_flow" => "自由现金流",

        // Statement items
        "revenue" => "营业收入",
        "gross_profit" => "毛利润",
        "net_profit" => "净利润",
        "total_assets" => "总资产",
        "total_liabilities" => "总负债",
        "total_equity" => "净资产",

        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapped_keys() {
        assert_eq!(metric_label("net_profit_margin"), "净利率");
        assert_eq!(metric_label("roe"), "净资产收益率(ROE)");
        assert_eq!(metric_label("total_assets"), "总资产");
    }

    #[test]
    fn test_unmapped_key_kept_verbatim() {
        assert_eq!(metric_label("custom_indicator"), "custom_indicator");
    }
}
