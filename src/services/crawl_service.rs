use crate::config::{Config, DataVariant, ExportFormat};
use crate::data_provider::CompanyDirectory;
use crate::errors::{CrawlerError, Result};
use crate::generator::SyntheticGenerator;
use crate::models::record::IndustryRecord;
use crate::models::summary::OverallSummary;
use crate::scrapers::base::IndustrySource;
use crate::scrapers::portal::PortalSource;
use crate::services::aggregator;
use crate::services::export::{ExportReport, ExportWriter};
use crate::services::report::ReportWriter;
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;

/// 一次完整收集任务的结果
#[derive(Debug)]
pub struct RunOutcome {
    pub records: Vec<IndustryRecord>,
    pub summary: OverallSummary,
    pub distribution: Vec<(String, usize)>,
    pub export: ExportReport,
    pub report_files: Vec<PathBuf>,
}

/// 行业数据收集服务：依次尝试各数据源，无数据时回退到合成数据
pub struct CrawlService {
    config: Config,
    sources: Vec<Arc<dyn IndustrySource + Send + Sync>>,
    directory: CompanyDirectory,
    generator: SyntheticGenerator,
}

impl CrawlService {
    /// 创建新的收集服务实例
    pub fn new(
        config: Config,
        sources: Vec<Arc<dyn IndustrySource + Send + Sync>>,
        directory: CompanyDirectory,
    ) -> Self {
        let generator = SyntheticGenerator::new(config.bounds.clone(), config.seed);
        Self {
            config,
            sources,
            directory,
            generator,
        }
    }

    /// 使用配置中启用的门户数据源
    pub fn with_portal_sources(config: Config, directory: CompanyDirectory) -> Result<Self> {
        let mut sources: Vec<Arc<dyn IndustrySource + Send + Sync>> = Vec::new();
        for source_config in config.active_sources() {
            sources.push(Arc::new(PortalSource::new(source_config, config.pacing_enabled)?));
        }
        Ok(Self::new(config, sources, directory))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn directory(&self) -> &CompanyDirectory {
        &self.directory
    }

    /// 处理单个行业
    pub async fn collect_industry(&mut self, industry: &str) -> Vec<IndustryRecord> {
        info!("开始处理 {} 行业数据...", industry);

        let mut records = Vec::new();
        for source in &self.sources {
            let mut fetched = source.fetch_or_empty(industry).await;

            let before = fetched.len();
            fetched.retain(|r| r.industry_name == industry);
            if fetched.len() < before {
                warn!(
                    "数据源 {} 返回了 {} 条不属于 {} 的记录，已丢弃",
                    source.source_name(), before - fetched.len(), industry
                );
            }

            records.extend(fetched);
        }

        if !records.is_empty() {
            return records;
        }

        // 所有数据源都没有数据，使用合成数据
        match self.config.variant {
            DataVariant::Basic => self.generator.generate_basic(industry, self.config.companies_per_industry),
            DataVariant::Enhanced => match self.directory.get_companies(industry) {
                Some(companies) => self.generator.generate_for_companies(industry, companies),
                None => {
                    warn!("不支持的行业: {}", industry);
                    Vec::new()
                }
            },
        }
    }

    /// 处理配置中的所有行业
    pub async fn collect_all(&mut self) -> Result<Vec<IndustryRecord>> {
        if self.config.industries.is_empty() {
            return Err(CrawlerError::Config("行业列表为空".to_string()));
        }
        self.config.bounds.validate()?;

        info!("开始爬取 {} 个行业数据...", self.config.industries.len());

        let industries = self.config.industries.clone();
        let mut all_records = Vec::new();

        for industry in &industries {
            let records = self.collect_industry(industry).await;
            info!("完成 {} 行业数据收集，共 {} 条记录", industry, records.len());
            all_records.extend(records);
        }

        if all_records.is_empty() {
            warn!("No records collected for {} industries", industries.len());
            return Err(CrawlerError::NothingCollected);
        }

        info!("成功生成 {} 条行业数据", all_records.len());
        Ok(all_records)
    }

    pub fn export_writer(&self) -> ExportWriter {
        ExportWriter::new(&self.config.output_dir)
            .with_file_stem(&self.config.file_stem)
            .with_top_n(self.config.export_top_n)
    }

    /// 收集、汇总、导出，并可选生成分析报告
    pub async fn run(&mut self, formats: &[ExportFormat], with_report: bool) -> Result<RunOutcome> {
        let records = self.collect_all().await?;
        let summary = aggregator::summarize(&records)?;
        let distribution = aggregator::industry_distribution(&records)?;

        let export = self.export_writer().export(&records, formats);
        info!(
            "导出完成: {} 个文件成功, {} 个失败",
            export.success_count(), export.failed.len()
        );

        let report_files = if with_report {
            let writer = ReportWriter::new(&self.config.report_dir).with_top_n(self.config.report_top_n);
            match writer.write(&records) {
                Ok(files) => files,
                Err(e) => {
                    error!("生成分析报告时出错: {}", e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Ok(RunOutcome {
            records,
            summary,
            distribution,
            export,
            report_files,
        })
    }
}
