use industry_report_crawler::config::{Config, DataVariant, ExportFormat};
use industry_report_crawler::data_provider::CompanyDirectory;
use industry_report_crawler::errors::CrawlerError;
use industry_report_crawler::services::aggregator;
use industry_report_crawler::services::crawl_service::{CrawlService, RunOutcome};
use industry_report_crawler::models::record::columns;
use industry_report_crawler::services::export::read_records;
use industry_report_crawler::services::report::render_summary;

use anyhow::{anyhow, Context};
use clap::{App, Arg, ArgMatches, SubCommand};
use log::{error, info, warn, LevelFilter};

fn output_args<'a>(cmd: App<'a>) -> App<'a> {
    cmd.arg(
        Arg::with_name("format")
            .short('f')
            .long("format")
            .value_name("FORMAT")
            .help("Output format (excel, csv, json, all)")
            .takes_value(true)
            .multiple_occurrences(true)
            .default_value("excel"),
    )
    .arg(
        Arg::with_name("variant")
            .long("variant")
            .value_name("VARIANT")
            .help("Data variant (basic, enhanced)")
            .takes_value(true)
            .default_value("enhanced"),
    )
    .arg(
        Arg::with_name("seed")
            .long("seed")
            .value_name("SEED")
            .help("Random seed for reproducible output")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("output-dir")
            .short('o')
            .long("output-dir")
            .value_name("DIR")
            .help("Directory for exported files")
            .takes_value(true)
            .default_value("output"),
    )
    .arg(
        Arg::with_name("report-dir")
            .long("report-dir")
            .value_name("DIR")
            .help("Directory for the analysis report")
            .takes_value(true)
            .default_value("reports"),
    )
    .arg(
        Arg::with_name("no-report")
            .long("no-report")
            .help("Skip the analysis report")
            .takes_value(false),
    )
    .arg(
        Arg::with_name("companies")
            .long("companies")
            .value_name("FILE")
            .help("JSON file with the company directory")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("no-delay")
            .long("no-delay")
            .help("Disable pacing between source requests")
            .takes_value(false),
    )
}

fn init_logger(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    } else if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(LevelFilter::Info);
    }
    builder.init();
}

fn load_directory(matches: &ArgMatches) -> anyhow::Result<CompanyDirectory> {
    match matches.value_of("companies") {
        Some(path) => CompanyDirectory::load_from_file(path)
            .with_context(|| format!("Failed to load company directory from {}", path)),
        None => Ok(CompanyDirectory::builtin()),
    }
}

/// 根据命令行参数构造配置与输出格式
fn build_config(matches: &ArgMatches, industries: &[String]) -> anyhow::Result<(Config, Vec<ExportFormat>)> {
    let variant: DataVariant = matches.value_of("variant").unwrap_or("enhanced").parse()?;

    let formats = matches
        .values_of("format")
        .map(|values| values.map(|v| v.parse::<ExportFormat>()).collect::<Result<Vec<_>, _>>())
        .transpose()?
        .unwrap_or_else(|| vec![ExportFormat::Excel]);

    let seed = matches
        .value_of("seed")
        .map(|s| s.parse::<u64>())
        .transpose()
        .context("Seed must be an unsigned integer")?;

    let config = Config::new()
        .with_industries(industries)
        .with_variant(variant)
        .with_seed(seed)
        .with_output_dir(matches.value_of("output-dir").unwrap_or("output"))
        .with_report_dir(matches.value_of("report-dir").unwrap_or("reports"))
        .with_pacing(!matches.is_present("no-delay"));

    Ok((config, formats))
}

fn parse_limit(value: Option<&str>) -> anyhow::Result<usize> {
    value
        .unwrap_or("10")
        .parse::<usize>()
        .with_context(|| format!("Limit must be an unsigned integer: {}", value.unwrap_or_default()))
}

fn print_outcome(outcome: &RunOutcome, report_top_n: usize) {
    println!("{}", render_summary(&outcome.summary, &outcome.distribution));

    if let Ok(leaders) = aggregator::top_n(&outcome.records, report_top_n) {
        println!("毛利率前 {} 名:", leaders.len());
        for (i, r) in leaders.iter().enumerate() {
            println!("  {:>2}. {:<16} {:<10} {:.2}%", i + 1, r.company_name, r.industry_name, r.gross_margin_pct);
        }
    }

    for (format, path) in &outcome.export.succeeded {
        println!("[{}] {}", format, path.display());
    }
    for path in &outcome.report_files {
        println!("[report] {}", path.display());
    }
    println!(
        "成功生成 {} 个文件",
        outcome.export.success_count() + outcome.report_files.len()
    );
}

async fn run_crawl(matches: &ArgMatches, config: Config, formats: Vec<ExportFormat>) -> anyhow::Result<()> {
    let with_report = !matches.is_present("no-report");
    let report_top_n = config.report_top_n;
    let directory = load_directory(matches)?;

    info!(
        "Crawling {} industries, variant: {}, formats: {:?}",
        config.industries.len(), config.variant, formats
    );

    let mut service = CrawlService::with_portal_sources(config, directory)?;
    match service.run(&formats, with_report).await {
        Ok(outcome) => {
            print_outcome(&outcome, report_top_n);
            if !outcome.export.is_complete() {
                warn!("{} 种格式导出失败", outcome.export.failed.len());
            }
            Ok(())
        }
        Err(CrawlerError::NothingCollected) => {
            error!("未获取到任何数据");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app = App::new("IndustryReportCrawler")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Emerging industry research data collector")
        .arg(
            Arg::with_name("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .global(true)
                .takes_value(false),
        )
        .subcommand(SubCommand::with_name("list").about("List supported industries and companies"))
        .subcommand(SubCommand::with_name("sources").about("List configured data sources"))
        .subcommand(SubCommand::with_name("config").about("Show the effective configuration"))
        .subcommand(output_args(
            SubCommand::with_name("crawl")
                .about("Collect data for a set of industries")
                .arg(
                    Arg::with_name("industries")
                        .short('i')
                        .long("industries")
                        .value_name("NAME")
                        .help("Industries to collect (default: all)")
                        .takes_value(true)
                        .multiple_values(true),
                ),
        ))
        .subcommand(output_args(
            SubCommand::with_name("industry")
                .about("Collect data for a single industry")
                .arg(
                    Arg::with_name("name")
                        .value_name("NAME")
                        .help("Industry name")
                        .required(true)
                        .index(1),
                ),
        ))
        .subcommand(
            SubCommand::with_name("inspect")
                .about("Read an exported file back and summarize it")
                .arg(
                    Arg::with_name("file")
                        .value_name("FILE")
                        .help("Exported xlsx, csv or json file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("limit")
                        .short('l')
                        .long("limit")
                        .value_name("LIMIT")
                        .help("Limit the number of records to display")
                        .takes_value(true)
                        .default_value("10"),
                ),
        );

    let matches = app.get_matches();
    init_logger(matches.is_present("verbose"));

    if matches.subcommand_matches("list").is_some() {
        let directory = CompanyDirectory::builtin();
        println!("支持的行业 ({}):", directory.industries().len());
        for entry in directory.entries() {
            let names: Vec<&str> = entry.companies.iter().map(|c| c.name.as_str()).collect();
            println!("  {:<10} {}", entry.industry, names.join(", "));
        }
    } else if matches.subcommand_matches("sources").is_some() {
        let config = Config::new();
        for source in &config.data_sources {
            let state = if source.enabled { "启用" } else { "禁用" };
            println!("  {:<10} {:<4} {}", source.name, state, source.base_url);
        }
    } else if matches.subcommand_matches("config").is_some() {
        let config = Config::new();
        println!("行业数量: {}", config.industries.len());
        println!("生成方式: {}", config.variant);
        println!("每行业企业数: {}", config.companies_per_industry);
        println!("输出目录: {}", config.output_dir);
        println!("报告目录: {}", config.report_dir);
        println!("排名数量: {} (导出) / {} (报告)", config.export_top_n, config.report_top_n);
        println!("请求间隔: {}", if config.pacing_enabled { "开启" } else { "关闭" });
        let active: Vec<&str> = config.active_sources().iter().map(|s| s.name.as_str()).collect();
        println!("启用数据源: {}", active.join(", "));
    } else if let Some(matches) = matches.subcommand_matches("crawl") {
        let industries: Vec<String> = match matches.values_of("industries") {
            Some(values) => values.map(|s| s.to_string()).collect(),
            None => Config::new().industries,
        };
        let (config, formats) = build_config(matches, &industries)?;
        run_crawl(matches, config, formats).await?;
    } else if let Some(matches) = matches.subcommand_matches("industry") {
        let name = matches
            .value_of("name")
            .ok_or_else(|| anyhow!("Industry name is required"))?;
        let (config, formats) = build_config(matches, &[name.to_string()])?;
        let config = config.with_file_stem(&format!("{}_行业数据", name));
        run_crawl(matches, config, formats).await?;
    } else if let Some(matches) = matches.subcommand_matches("inspect") {
        let file = matches
            .value_of("file")
            .ok_or_else(|| anyhow!("File is required"))?;
        let limit = parse_limit(matches.value_of("limit"))?;

        let records = read_records(file).with_context(|| format!("Failed to read {}", file))?;
        info!("Found {} records in {}", records.len(), file);
        if records.is_empty() {
            warn!("文件中没有数据");
            return Ok(());
        }

        let headers = [
            columns::INDUSTRY,
            columns::COMPANY,
            columns::PENETRATION,
            columns::CAPACITY,
            columns::MARGIN,
            columns::MARKET_SIZE,
            columns::GROWTH,
            columns::UPDATED_AT,
        ];
        println!("{}", headers.join(" | "));
        for record in records.iter().take(limit) {
            println!(
                "{} | {} | {:.2} | {:.2} | {:.2} | {} | {:.2} | {}",
                record.industry_name,
                record.company_name,
                record.penetration_rate_pct,
                record.capacity_utilization_pct,
                record.gross_margin_pct,
                record.market_size_hundred_million_cny,
                record.annual_growth_rate_pct,
                record.updated_at_text(),
            );
        }
        if records.len() > limit {
            println!("... and {} more records", records.len() - limit);
        }

        let summary = aggregator::summarize(&records)?;
        let distribution = aggregator::industry_distribution(&records)?;
        println!();
        println!("{}", render_summary(&summary, &distribution));
    } else {
        info!("No command specified. Use --help for usage information.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_rejects_garbage() {
        assert_eq!(parse_limit(None).unwrap(), 10);
        assert_eq!(parse_limit(Some("3")).unwrap(), 3);
        assert!(parse_limit(Some("ten")).is_err());
        assert!(parse_limit(Some("-1")).is_err());
    }
}
