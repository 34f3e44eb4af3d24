use plotters::prelude::*;
use std::path::Path;

use crate::errors::{CrawlerError, Result};
use crate::models::record::IndustryRecord;

pub const TOP_COMPANIES_CHART: &str = "龙头企业毛利率排名.svg";

fn chart_error<E: std::fmt::Display>(e: E) -> CrawlerError {
    CrawlerError::ChartError(e.to_string())
}

/// 按毛利率绘制龙头企业柱状图，`ranked` 需已排序
pub fn write_top_companies_chart(path: &Path, ranked: &[&IndustryRecord]) -> Result<()> {
    if ranked.is_empty() {
        return Err(CrawlerError::EmptyData);
    }

    let labels: Vec<String> = ranked
        .iter()
        .map(|r| format!("{}({})", r.company_name, r.industry_name))
        .collect();
    let top = ranked
        .iter()
        .map(|r| r.gross_margin_pct)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let y_max = if top > 0.0 { top * 1.1 } else { 1.0 };

    let root = SVGBackend::new(path, (1400, 800)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("毛利率前{}名企业", ranked.len()), ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(120)
        .y_label_area_size(60)
        .build_cartesian_2d((0..ranked.len()).into_segmented(), 0.0..y_max)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(ranked.len())
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .y_desc("平均毛利率(%)")
        .draw()
        .map_err(chart_error)?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BLUE.mix(0.7).filled())
                .margin(8)
                .data(ranked.iter().enumerate().map(|(i, r)| (i, r.gross_margin_pct))),
        )
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    Ok(())
}
