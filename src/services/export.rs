use calamine::{open_workbook_auto, DataType, Reader};
use chrono::NaiveDateTime;
use log::{error, info, warn};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::ExportFormat;
use crate::errors::{CrawlerError, Result};
use crate::models::record::{columns, IndustryRecord, TIMESTAMP_FORMAT};
use crate::services::aggregator::{self, AggregationMode};
use crate::util;

pub const SHEET_RAW: &str = "行业数据";
pub const SHEET_SUMMARY: &str = "行业汇总";
pub const SHEET_RANKING: &str = "龙头企业排名";
pub const SHEET_DETAILS: &str = "公司详情";

pub const DEFAULT_FILE_STEM: &str = "行业研报数据";

const COMPANY_COUNT_COLUMN: &str = "企业数量";

const BASIC_COLUMNS: [&str; 9] = [
    columns::INDUSTRY,
    columns::COMPANY,
    columns::PENETRATION,
    columns::CAPACITY,
    columns::MARGIN,
    columns::MARKET_SIZE,
    columns::GROWTH,
    columns::SOURCE,
    columns::UPDATED_AT,
];

const FULL_COLUMNS: [&str; 12] = [
    columns::INDUSTRY,
    columns::COMPANY,
    columns::TICKER,
    columns::MARKET_CAP,
    columns::MAIN_PRODUCTS,
    columns::PENETRATION,
    columns::CAPACITY,
    columns::MARGIN,
    columns::MARKET_SIZE,
    columns::GROWTH,
    columns::SOURCE,
    columns::UPDATED_AT,
];

const SUMMARY_COLUMNS: [&str; 7] = [
    columns::INDUSTRY,
    COMPANY_COUNT_COLUMN,
    columns::PENETRATION,
    columns::CAPACITY,
    columns::MARGIN,
    columns::MARKET_SIZE,
    columns::GROWTH,
];

const RANKING_COLUMNS: [&str; 4] = [columns::COMPANY, columns::INDUSTRY, columns::MARGIN, columns::MARKET_SIZE];

const DETAIL_COLUMNS: [&str; 5] = [
    columns::COMPANY,
    columns::TICKER,
    columns::MARKET_CAP,
    columns::MAIN_PRODUCTS,
    columns::INDUSTRY,
];

/// 原始数据表的列布局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnLayout {
    /// 不含股票代码、市值、主要产品
    Basic,
    /// 含真实公司信息
    Full,
}

impl ColumnLayout {
    pub fn for_records(records: &[IndustryRecord]) -> Self {
        if records.iter().any(|r| r.has_company_details()) {
            ColumnLayout::Full
        } else {
            ColumnLayout::Basic
        }
    }

    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            ColumnLayout::Basic => &BASIC_COLUMNS,
            ColumnLayout::Full => &FULL_COLUMNS,
        }
    }

    /// 增强版数据的市场规模是行业级指标，汇总时取首值
    pub fn aggregation_mode(&self) -> AggregationMode {
        match self {
            ColumnLayout::Basic => AggregationMode::SumMean,
            ColumnLayout::Full => AggregationMode::First,
        }
    }
}

enum Cell<'a> {
    Text(&'a str),
    Owned(String),
    Number(f64),
}

impl Cell<'_> {
    fn to_text(&self) -> String {
        match self {
            Cell::Text(s) => s.to_string(),
            Cell::Owned(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
        }
    }
}

fn raw_cells(record: &IndustryRecord, layout: ColumnLayout) -> Vec<Cell<'_>> {
    let mut cells = vec![Cell::Text(&record.industry_name), Cell::Text(&record.company_name)];
    if layout == ColumnLayout::Full {
        cells.push(Cell::Text(record.ticker.as_deref().unwrap_or_default()));
        cells.push(Cell::Text(record.market_cap_label.as_deref().unwrap_or_default()));
        cells.push(Cell::Text(record.main_products.as_deref().unwrap_or_default()));
    }
    cells.extend([
        Cell::Number(record.penetration_rate_pct),
        Cell::Number(record.capacity_utilization_pct),
        Cell::Number(record.gross_margin_pct),
        Cell::Number(record.market_size_hundred_million_cny),
        Cell::Number(record.annual_growth_rate_pct),
        Cell::Text(&record.source_label),
        Cell::Owned(record.updated_at_text()),
    ]);
    cells
}

fn write_header(sheet: &mut Worksheet, headers: &[&str], format: &Format) -> Result<()> {
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, format)?;
        sheet.set_column_width(col as u16, 14)?;
    }
    Ok(())
}

fn write_row(sheet: &mut Worksheet, row: u32, cells: &[Cell<'_>]) -> Result<()> {
    for (col, cell) in cells.iter().enumerate() {
        let col = col as u16;
        match cell {
            Cell::Text(s) => sheet.write_string(row, col, *s)?,
            Cell::Owned(s) => sheet.write_string(row, col, s.as_str())?,
            Cell::Number(n) => sheet.write_number(row, col, *n)?,
        };
    }
    Ok(())
}

/// 导出结果：每种格式独立成功或失败
#[derive(Debug, Default)]
pub struct ExportReport {
    pub succeeded: Vec<(ExportFormat, PathBuf)>,
    pub failed: Vec<(ExportFormat, String)>,
}

impl ExportReport {
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn files(&self) -> Vec<&Path> {
        self.succeeded.iter().map(|(_, path)| path.as_path()).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// 将记录导出为 Excel / CSV / JSON 文件
pub struct ExportWriter {
    output_dir: PathBuf,
    file_stem: String,
    timestamp: String,
    top_n: usize,
}

impl ExportWriter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            file_stem: DEFAULT_FILE_STEM.to_string(),
            timestamp: util::file_timestamp(),
            top_n: 20,
        }
    }

    pub fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = n;
        self
    }

    pub fn with_timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = timestamp.to_string();
        self
    }

    pub fn with_file_stem(mut self, stem: &str) -> Self {
        self.file_stem = util::sanitize_file_stem(stem);
        self
    }

    /// 指定格式的输出路径
    pub fn path_for(&self, format: ExportFormat) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}.{}", self.file_stem, self.timestamp, format.extension()))
    }

    fn prepare(&self, records: &[IndustryRecord], format: ExportFormat) -> Result<PathBuf> {
        if records.is_empty() {
            warn!("没有数据可保存");
            return Err(CrawlerError::EmptyData);
        }
        util::ensure_dir(&self.output_dir)?;
        Ok(self.path_for(format))
    }

    /// 写入多工作表 Excel 文件
    pub fn write_excel(&self, records: &[IndustryRecord]) -> Result<PathBuf> {
        let path = self.prepare(records, ExportFormat::Excel)?;
        let layout = ColumnLayout::for_records(records);
        let summaries = aggregator::industry_breakdown(records, layout.aggregation_mode())?;
        let ranking = aggregator::top_n(records, self.top_n)?;

        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();

        // 主数据表
        {
            let sheet = workbook.add_worksheet();
            sheet.set_name(SHEET_RAW)?;
            write_header(sheet, layout.headers(), &bold)?;
            for (i, record) in records.iter().enumerate() {
                write_row(sheet, (i + 1) as u32, &raw_cells(record, layout))?;
            }
        }

        // 行业汇总表
        {
            let sheet = workbook.add_worksheet();
            sheet.set_name(SHEET_SUMMARY)?;
            write_header(sheet, &SUMMARY_COLUMNS, &bold)?;
            for (i, s) in summaries.iter().enumerate() {
                let cells = [
                    Cell::Text(&s.industry_name),
                    Cell::Number(s.company_count as f64),
                    Cell::Number(s.avg_penetration_rate_pct),
                    Cell::Number(s.avg_capacity_utilization_pct),
                    Cell::Number(s.avg_gross_margin_pct),
                    Cell::Number(s.market_size_hundred_million_cny),
                    Cell::Number(s.annual_growth_rate_pct),
                ];
                write_row(sheet, (i + 1) as u32, &cells)?;
            }
        }

        // 龙头企业排名表
        {
            let sheet = workbook.add_worksheet();
            sheet.set_name(SHEET_RANKING)?;
            write_header(sheet, &RANKING_COLUMNS, &bold)?;
            for (i, r) in ranking.iter().enumerate() {
                let cells = [
                    Cell::Text(&r.company_name),
                    Cell::Text(&r.industry_name),
                    Cell::Number(r.gross_margin_pct),
                    Cell::Number(r.market_size_hundred_million_cny),
                ];
                write_row(sheet, (i + 1) as u32, &cells)?;
            }
        }

        // 公司详情表，仅增强版数据
        if layout == ColumnLayout::Full {
            let sheet = workbook.add_worksheet();
            sheet.set_name(SHEET_DETAILS)?;
            write_header(sheet, &DETAIL_COLUMNS, &bold)?;
            for (i, r) in records.iter().enumerate() {
                let cells = [
                    Cell::Text(&r.company_name),
                    Cell::Text(r.ticker.as_deref().unwrap_or_default()),
                    Cell::Text(r.market_cap_label.as_deref().unwrap_or_default()),
                    Cell::Text(r.main_products.as_deref().unwrap_or_default()),
                    Cell::Text(&r.industry_name),
                ];
                write_row(sheet, (i + 1) as u32, &cells)?;
            }
        }

        workbook.save(&path)?;
        info!("数据已保存到: {}", path.display());
        Ok(path)
    }

    /// 写入带 BOM 的 CSV 文件
    pub fn write_csv(&self, records: &[IndustryRecord]) -> Result<PathBuf> {
        let path = self.prepare(records, ExportFormat::Csv)?;
        let layout = ColumnLayout::for_records(records);

        let mut buf = BufWriter::new(File::create(&path)?);
        util::write_bom(&mut buf)?;

        let mut writer = csv::Writer::from_writer(buf);
        writer.write_record(layout.headers())?;
        for record in records {
            let row: Vec<String> = raw_cells(record, layout).iter().map(Cell::to_text).collect();
            writer.write_record(&row)?;
        }
        writer.flush()?;

        info!("CSV文件已保存: {}", path.display());
        Ok(path)
    }

    /// 写入 JSON 记录数组，保留中文字符
    pub fn write_json(&self, records: &[IndustryRecord]) -> Result<PathBuf> {
        let path = self.prepare(records, ExportFormat::Json)?;

        let mut buf = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut buf, records)?;
        buf.flush()?;

        info!("JSON文件已保存: {}", path.display());
        Ok(path)
    }

    /// 按格式逐一导出，单个格式失败不影响其他格式
    pub fn export(&self, records: &[IndustryRecord], formats: &[ExportFormat]) -> ExportReport {
        let mut report = ExportReport::default();

        for format in ExportFormat::expand(formats) {
            let result = match format {
                ExportFormat::Excel => self.write_excel(records),
                ExportFormat::Csv => self.write_csv(records),
                ExportFormat::Json => self.write_json(records),
                ExportFormat::All => continue,
            };

            match result {
                Ok(path) => report.succeeded.push((format, path)),
                Err(e) => {
                    error!("导出 {} 文件失败: {}", format, e);
                    report.failed.push((format, e.to_string()));
                }
            }
        }

        report
    }
}

/// 读取导出的 CSV 文件
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Vec<IndustryRecord>> {
    let text = fs::read_to_string(path)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let mut records = Vec::new();
    for row in reader.deserialize::<IndustryRecord>() {
        records.push(row?);
    }
    Ok(records)
}

/// 读取导出的 JSON 文件
pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Vec<IndustryRecord>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

struct RowView<'a> {
    header: &'a HashMap<String, usize>,
    row: &'a [DataType],
}

impl RowView<'_> {
    fn cell(&self, column: &str) -> Option<&DataType> {
        self.header.get(column).and_then(|&idx| self.row.get(idx))
    }

    fn text(&self, column: &str) -> Result<String> {
        self.opt_text(column)
            .ok_or_else(|| CrawlerError::DataError(format!("缺少列或数据为空: {}", column)))
    }

    fn opt_text(&self, column: &str) -> Option<String> {
        self.cell(column)
            .map(|cell| cell.to_string())
            .filter(|text| !text.is_empty())
    }

    fn number(&self, column: &str) -> Result<f64> {
        self.cell(column)
            .and_then(|cell| cell.as_f64())
            .ok_or_else(|| CrawlerError::DataError(format!("列 {} 不是数值", column)))
    }
}

/// 读取导出的 Excel 文件中的原始数据表
pub fn read_excel<P: AsRef<Path>>(path: P) -> Result<Vec<IndustryRecord>> {
    let mut workbook = open_workbook_auto(path)?;
    if !workbook.sheet_names().iter().any(|name| name == SHEET_RAW) {
        return Err(CrawlerError::DataError(format!("Excel文件中没有工作表 {}", SHEET_RAW)));
    }
    let range = workbook.worksheet_range(SHEET_RAW)?;

    let mut rows = range.rows();
    let header: HashMap<String, usize> = match rows.next() {
        Some(first) => first.iter().enumerate().map(|(i, cell)| (cell.to_string(), i)).collect(),
        None => return Ok(Vec::new()),
    };

    let mut records = Vec::new();
    for row in rows {
        let view = RowView { header: &header, row };
        let updated_at = NaiveDateTime::parse_from_str(&view.text(columns::UPDATED_AT)?, TIMESTAMP_FORMAT)?;

        records.push(IndustryRecord {
            industry_name: view.text(columns::INDUSTRY)?,
            company_name: view.text(columns::COMPANY)?,
            ticker: view.opt_text(columns::TICKER),
            market_cap_label: view.opt_text(columns::MARKET_CAP),
            main_products: view.opt_text(columns::MAIN_PRODUCTS),
            penetration_rate_pct: view.number(columns::PENETRATION)?,
            capacity_utilization_pct: view.number(columns::CAPACITY)?,
            gross_margin_pct: view.number(columns::MARGIN)?,
            market_size_hundred_million_cny: view.number(columns::MARKET_SIZE)?,
            annual_growth_rate_pct: view.number(columns::GROWTH)?,
            source_label: view.text(columns::SOURCE)?,
            updated_at,
        });
    }

    Ok(records)
}

/// 按扩展名读取任意导出文件
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<IndustryRecord>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xls" => read_excel(path),
        "csv" => read_csv(path),
        "json" => read_json(path),
        other => Err(CrawlerError::DataError(format!("不支持的文件类型: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_depends_on_company_details() {
        assert_eq!(ColumnLayout::Basic.headers().len(), 9);
        assert_eq!(ColumnLayout::Full.headers().len(), 12);
        assert_eq!(ColumnLayout::for_records(&[]), ColumnLayout::Basic);
        assert_eq!(ColumnLayout::Full.aggregation_mode(), AggregationMode::First);
    }

    #[test]
    fn file_names_use_stem_and_timestamp() {
        let writer = ExportWriter::new("out")
            .with_file_stem("AR/VR_行业数据")
            .with_timestamp("20250603_093000");
        assert_eq!(
            writer.path_for(ExportFormat::Csv),
            Path::new("out").join("AR-VR_行业数据_20250603_093000.csv")
        );
    }

    #[test]
    fn empty_batch_writes_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("never");
        let report = ExportWriter::new(&out).export(&[], &[ExportFormat::All]);
        assert_eq!(report.success_count(), 0);
        assert_eq!(report.failed.len(), 3);
        assert!(!out.exists());
    }

    #[test]
    fn workbook_without_raw_sheet_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("other.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("其他").unwrap();
        sheet.write_string(0, 0, "x").unwrap();
        workbook.save(&path).unwrap();

        assert!(matches!(read_excel(&path), Err(CrawlerError::DataError(_))));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(matches!(read_records("data.parquet"), Err(CrawlerError::DataError(_))));
    }
}
