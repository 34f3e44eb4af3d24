use serde::Serialize;

/// 整体数据摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallSummary {
    pub industry_count: usize,
    pub record_count: usize,
    pub company_count: usize,
    pub avg_penetration_rate_pct: f64,
    pub avg_capacity_utilization_pct: f64,
    pub avg_gross_margin_pct: f64,
    pub total_market_size_hundred_million_cny: f64,
    pub avg_annual_growth_rate_pct: f64,
}

/// 按行业汇总的指标
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustrySummary {
    pub industry_name: String,
    pub company_count: usize,
    pub avg_penetration_rate_pct: f64,
    pub avg_capacity_utilization_pct: f64,
    pub avg_gross_margin_pct: f64,
    pub market_size_hundred_million_cny: f64,
    pub annual_growth_rate_pct: f64,
}

/// 单个数值列的描述统计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricStatistics {
    pub column: &'static str,
    pub count: usize,
    pub mean: f64,
    /// 样本标准差，单条记录时为 None
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}
