use std::collections::{HashMap, HashSet};

use crate::errors::{CrawlerError, Result};
use crate::models::record::{columns, IndustryRecord};
use crate::models::summary::{IndustrySummary, MetricStatistics, OverallSummary};
use crate::util::{self, mean};

/// 行业汇总时市场规模和增长率的取值方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMode {
    /// 市场规模求和，增长率取均值
    SumMean,
    /// 市场规模和增长率取行业内第一条记录（行业级指标）
    First,
}

fn ensure_not_empty(records: &[IndustryRecord]) -> Result<()> {
    if records.is_empty() {
        return Err(CrawlerError::EmptyData);
    }
    Ok(())
}

fn column_values(records: &[&IndustryRecord], pick: fn(&IndustryRecord) -> f64) -> Vec<f64> {
    records.iter().map(|r| pick(r)).collect()
}

fn mean2(values: &[f64]) -> f64 {
    mean(values).map(util::round2).unwrap_or(0.0)
}

/// 生成整体摘要
pub fn summarize(records: &[IndustryRecord]) -> Result<OverallSummary> {
    ensure_not_empty(records)?;

    let all: Vec<&IndustryRecord> = records.iter().collect();
    let industries: HashSet<&str> = records.iter().map(|r| r.industry_name.as_str()).collect();
    let companies: HashSet<&str> = records.iter().map(|r| r.company_name.as_str()).collect();
    let total_market_size: f64 = records.iter().map(|r| r.market_size_hundred_million_cny).sum();

    Ok(OverallSummary {
        industry_count: industries.len(),
        record_count: records.len(),
        company_count: companies.len(),
        avg_penetration_rate_pct: mean2(&column_values(&all, |r| r.penetration_rate_pct)),
        avg_capacity_utilization_pct: mean2(&column_values(&all, |r| r.capacity_utilization_pct)),
        avg_gross_margin_pct: mean2(&column_values(&all, |r| r.gross_margin_pct)),
        total_market_size_hundred_million_cny: util::round0(total_market_size),
        avg_annual_growth_rate_pct: mean2(&column_values(&all, |r| r.annual_growth_rate_pct)),
    })
}

// 按首次出现顺序分组
fn group_by_industry(records: &[IndustryRecord]) -> Vec<(&str, Vec<&IndustryRecord>)> {
    let mut order: Vec<(&str, Vec<&IndustryRecord>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let key = record.industry_name.as_str();
        match index.get(key) {
            Some(&i) => order[i].1.push(record),
            None => {
                index.insert(key, order.len());
                order.push((key, vec![record]));
            }
        }
    }

    order
}

/// 按行业汇总，结果按平均毛利率降序排列
pub fn industry_breakdown(records: &[IndustryRecord], mode: AggregationMode) -> Result<Vec<IndustrySummary>> {
    ensure_not_empty(records)?;

    let mut summaries: Vec<IndustrySummary> = group_by_industry(records)
        .into_iter()
        .map(|(industry, group)| {
            let market_sizes = column_values(&group, |r| r.market_size_hundred_million_cny);
            let growth = column_values(&group, |r| r.annual_growth_rate_pct);

            let (market_size, growth_rate) = match mode {
                AggregationMode::SumMean => (util::round2(market_sizes.iter().sum()), mean2(&growth)),
                AggregationMode::First => (util::round2(market_sizes[0]), util::round2(growth[0])),
            };

            IndustrySummary {
                industry_name: industry.to_string(),
                company_count: group.len(),
                avg_penetration_rate_pct: mean2(&column_values(&group, |r| r.penetration_rate_pct)),
                avg_capacity_utilization_pct: mean2(&column_values(&group, |r| r.capacity_utilization_pct)),
                avg_gross_margin_pct: mean2(&column_values(&group, |r| r.gross_margin_pct)),
                market_size_hundred_million_cny: market_size,
                annual_growth_rate_pct: growth_rate,
            }
        })
        .collect();

    // sort_by 是稳定排序，毛利率相同时保持行业出现顺序
    summaries.sort_by(|a, b| b.avg_gross_margin_pct.total_cmp(&a.avg_gross_margin_pct));
    Ok(summaries)
}

/// 毛利率最高的 n 条记录，并列时保持输入顺序
pub fn top_n(records: &[IndustryRecord], n: usize) -> Result<Vec<&IndustryRecord>> {
    ensure_not_empty(records)?;

    let mut ranked: Vec<&IndustryRecord> = records.iter().collect();
    ranked.sort_by(|a, b| b.gross_margin_pct.total_cmp(&a.gross_margin_pct));
    ranked.truncate(n);
    Ok(ranked)
}

/// 各行业的记录数，数量降序，相同数量按首次出现顺序
pub fn industry_distribution(records: &[IndustryRecord]) -> Result<Vec<(String, usize)>> {
    ensure_not_empty(records)?;

    let mut counts: Vec<(String, usize)> = group_by_industry(records)
        .into_iter()
        .map(|(industry, group)| (industry.to_string(), group.len()))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(counts)
}

// 线性插值分位数，values 需已排序
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
}

fn describe_column(column: &'static str, mut values: Vec<f64>) -> MetricStatistics {
    values.sort_by(|a, b| a.total_cmp(b));
    let count = values.len();
    let avg = mean(&values).unwrap_or(0.0);
    let std = if count > 1 {
        let var = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (count - 1) as f64;
        Some(util::round2(var.sqrt()))
    } else {
        None
    };

    MetricStatistics {
        column,
        count,
        mean: util::round2(avg),
        std,
        min: values[0],
        q25: util::round2(quantile(&values, 0.25)),
        median: util::round2(quantile(&values, 0.5)),
        q75: util::round2(quantile(&values, 0.75)),
        max: values[count - 1],
    }
}

/// 数值列的描述统计
pub fn describe(records: &[IndustryRecord]) -> Result<Vec<MetricStatistics>> {
    ensure_not_empty(records)?;

    let all: Vec<&IndustryRecord> = records.iter().collect();
    let metrics: [(&'static str, fn(&IndustryRecord) -> f64); 5] = [
        (columns::PENETRATION, |r| r.penetration_rate_pct),
        (columns::CAPACITY, |r| r.capacity_utilization_pct),
        (columns::MARGIN, |r| r.gross_margin_pct),
        (columns::MARKET_SIZE, |r| r.market_size_hundred_million_cny),
        (columns::GROWTH, |r| r.annual_growth_rate_pct),
    ];

    Ok(metrics
        .iter()
        .map(|(name, pick)| describe_column(*name, column_values(&all, *pick)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(industry: &str, company: &str, margin: f64, market_size: f64) -> IndustryRecord {
        IndustryRecord {
            industry_name: industry.to_string(),
            company_name: company.to_string(),
            ticker: None,
            market_cap_label: None,
            main_products: None,
            penetration_rate_pct: 10.0,
            capacity_utilization_pct: 80.0,
            gross_margin_pct: margin,
            market_size_hundred_million_cny: market_size,
            annual_growth_rate_pct: 20.0,
            source_label: "模拟数据".to_string(),
            updated_at: NaiveDate::from_ymd_opt(2025, 6, 3).unwrap().and_hms_opt(10, 0, 0).unwrap(),
        }
    }

    fn batch() -> Vec<IndustryRecord> {
        vec![
            record("人工智能", "A1", 30.0, 1000.0),
            record("人工智能", "A2", 40.0, 1000.0),
            record("半导体", "B1", 45.0, 500.0),
            record("半导体", "B2", 40.0, 500.0),
            record("云计算", "C1", 20.0, 800.0),
        ]
    }

    #[test]
    fn empty_batch_reports_no_data() {
        assert!(matches!(summarize(&[]), Err(CrawlerError::EmptyData)));
        assert!(matches!(industry_breakdown(&[], AggregationMode::SumMean), Err(CrawlerError::EmptyData)));
        assert!(matches!(top_n(&[], 3), Err(CrawlerError::EmptyData)));
        assert!(matches!(industry_distribution(&[]), Err(CrawlerError::EmptyData)));
        assert!(matches!(describe(&[]), Err(CrawlerError::EmptyData)));
    }

    #[test]
    fn summary_counts_and_means() {
        let summary = summarize(&batch()).unwrap();
        assert_eq!(summary.industry_count, 3);
        assert_eq!(summary.record_count, 5);
        assert_eq!(summary.company_count, 5);
        assert_eq!(summary.avg_gross_margin_pct, 35.0);
        assert_eq!(summary.total_market_size_hundred_million_cny, 3800.0);
        assert_eq!(summary.avg_annual_growth_rate_pct, 20.0);
    }

    #[test]
    fn breakdown_sorted_by_margin_descending() {
        let rows = industry_breakdown(&batch(), AggregationMode::SumMean).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.industry_name.as_str()).collect();
        assert_eq!(names, vec!["半导体", "人工智能", "云计算"]);
        assert_eq!(rows[0].avg_gross_margin_pct, 42.5);
        assert_eq!(rows[0].market_size_hundred_million_cny, 1000.0);
        assert_eq!(rows[0].company_count, 2);
    }

    #[test]
    fn first_mode_keeps_industry_level_value() {
        let rows = industry_breakdown(&batch(), AggregationMode::First).unwrap();
        let ai = rows.iter().find(|r| r.industry_name == "人工智能").unwrap();
        assert_eq!(ai.market_size_hundred_million_cny, 1000.0);
        assert_eq!(ai.annual_growth_rate_pct, 20.0);
    }

    #[test]
    fn breakdown_is_idempotent() {
        let records = batch();
        let first = industry_breakdown(&records, AggregationMode::SumMean).unwrap();
        let second = industry_breakdown(&records, AggregationMode::SumMean).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn top_n_is_stable_on_ties() {
        let records = batch();
        let top = top_n(&records, 3).unwrap();
        let names: Vec<&str> = top.iter().map(|r| r.company_name.as_str()).collect();
        // A2 与 B2 毛利率相同，A2 在输入中更靠前
        assert_eq!(names, vec!["B1", "A2", "B2"]);
    }

    #[test]
    fn top_n_larger_than_batch_returns_everything() {
        assert_eq!(top_n(&batch(), 20).unwrap().len(), 5);
    }

    #[test]
    fn nan_margin_does_not_panic() {
        let mut records = batch();
        records[0].gross_margin_pct = f64::NAN;
        assert_eq!(top_n(&records, 5).unwrap().len(), 5);
        assert!(industry_breakdown(&records, AggregationMode::SumMean).is_ok());
    }

    #[test]
    fn distribution_counts_per_industry() {
        let counts = industry_distribution(&batch()).unwrap();
        assert_eq!(
            counts,
            vec![("人工智能".to_string(), 2), ("半导体".to_string(), 2), ("云计算".to_string(), 1)]
        );
    }

    #[test]
    fn describe_matches_linear_quantiles() {
        let stats = describe(&batch()).unwrap();
        let margin = stats.iter().find(|s| s.column == columns::MARGIN).unwrap();
        assert_eq!(margin.count, 5);
        assert_eq!(margin.min, 20.0);
        assert_eq!(margin.q25, 30.0);
        assert_eq!(margin.median, 40.0);
        assert_eq!(margin.q75, 40.0);
        assert_eq!(margin.max, 45.0);
        assert_eq!(margin.std, Some(10.0));

        let single = describe(&batch()[..1]).unwrap();
        assert_eq!(single[0].std, None);
    }
}
