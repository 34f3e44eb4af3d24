use log::{info, warn};
use std::fmt::Write as _;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::models::record::{columns, IndustryRecord};
use crate::models::summary::OverallSummary;
use crate::services::aggregator::{self, AggregationMode};
use crate::services::chart::{self, TOP_COMPANIES_CHART};
use crate::util;

pub const STATISTICS_FILE: &str = "统计摘要.csv";
pub const RANKING_FILE: &str = "行业排名.csv";

/// 综合分析报告中的表格部分
pub struct ReportWriter {
    report_dir: PathBuf,
    top_n: usize,
    charts: bool,
}

impl ReportWriter {
    pub fn new<P: AsRef<Path>>(report_dir: P) -> Self {
        Self {
            report_dir: report_dir.as_ref().to_path_buf(),
            top_n: 15,
            charts: true,
        }
    }

    /// 图表中的企业数量
    pub fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = n;
        self
    }

    pub fn with_charts(mut self, enabled: bool) -> Self {
        self.charts = enabled;
        self
    }

    /// 写入统计摘要与行业排名，开启图表时附带龙头企业柱状图，返回生成的文件
    pub fn write(&self, records: &[IndustryRecord]) -> Result<Vec<PathBuf>> {
        let statistics = aggregator::describe(records)?;
        let rankings = aggregator::industry_breakdown(records, AggregationMode::SumMean)?;
        util::ensure_dir(&self.report_dir)?;

        let stats_path = self.report_dir.join(STATISTICS_FILE);
        {
            let mut buf = BufWriter::new(File::create(&stats_path)?);
            util::write_bom(&mut buf)?;
            let mut writer = csv::Writer::from_writer(buf);
            writer.write_record(["指标", "count", "mean", "std", "min", "25%", "50%", "75%", "max"])?;
            for s in &statistics {
                writer.write_record([
                    s.column.to_string(),
                    s.count.to_string(),
                    s.mean.to_string(),
                    s.std.map(|v| v.to_string()).unwrap_or_default(),
                    s.min.to_string(),
                    s.q25.to_string(),
                    s.median.to_string(),
                    s.q75.to_string(),
                    s.max.to_string(),
                ])?;
            }
            writer.flush()?;
        }

        let ranking_path = self.report_dir.join(RANKING_FILE);
        {
            let mut buf = BufWriter::new(File::create(&ranking_path)?);
            util::write_bom(&mut buf)?;
            let mut writer = csv::Writer::from_writer(buf);
            writer.write_record([
                columns::INDUSTRY,
                columns::PENETRATION,
                columns::CAPACITY,
                columns::MARGIN,
                columns::MARKET_SIZE,
                columns::GROWTH,
            ])?;
            for r in &rankings {
                writer.write_record([
                    r.industry_name.clone(),
                    r.avg_penetration_rate_pct.to_string(),
                    r.avg_capacity_utilization_pct.to_string(),
                    r.avg_gross_margin_pct.to_string(),
                    r.market_size_hundred_million_cny.to_string(),
                    r.annual_growth_rate_pct.to_string(),
                ])?;
            }
            writer.flush()?;
        }

        let mut files = vec![stats_path, ranking_path];

        if self.charts && self.top_n > 0 {
            let leaders = aggregator::top_n(records, self.top_n)?;
            let chart_path = self.report_dir.join(TOP_COMPANIES_CHART);
            match chart::write_top_companies_chart(&chart_path, &leaders) {
                Ok(()) => files.push(chart_path),
                Err(e) => warn!("生成图表失败: {}", e),
            }
        }

        info!("综合报告已生成到 {} 目录", self.report_dir.display());
        Ok(files)
    }
}

/// 控制台输出的数据摘要
pub fn render_summary(summary: &OverallSummary, distribution: &[(String, usize)]) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "行业研报数据摘要");
    let _ = writeln!(text, "================");
    let _ = writeln!(text, "总行业数: {}", summary.industry_count);
    let _ = writeln!(text, "总记录数: {}", summary.record_count);
    let _ = writeln!(text, "涉及公司数: {}", summary.company_count);
    let _ = writeln!(text, "平均渗透率: {}%", summary.avg_penetration_rate_pct);
    let _ = writeln!(text, "平均产能利用率: {}%", summary.avg_capacity_utilization_pct);
    let _ = writeln!(text, "平均毛利率: {}%", summary.avg_gross_margin_pct);
    let _ = writeln!(text, "总市场规模: {}亿元", summary.total_market_size_hundred_million_cny);
    let _ = writeln!(text, "平均增长率: {}%", summary.avg_annual_growth_rate_pct);

    if !distribution.is_empty() {
        let _ = writeln!(text);
        let _ = writeln!(text, "行业分布:");
        for (industry, count) in distribution {
            let _ = writeln!(text, "  {:<12} {}", industry, count);
        }
    }

    text
}
