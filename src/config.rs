use crate::errors::CrawlerError;
use std::fmt;
use std::str::FromStr;

/// 默认的新兴细分行业列表
pub const EMERGING_INDUSTRIES: [&str; 20] = [
    "人工智能",
    "新能源汽车",
    "半导体",
    "生物医药",
    "5G通信",
    "云计算",
    "物联网",
    "区块链",
    "氢能源",
    "储能技术",
    "机器人",
    "AR/VR",
    "量子计算",
    "基因治疗",
    "碳中和技术",
    "芯片设计",
    "自动驾驶",
    "智能制造",
    "数字孪生",
    "边缘计算",
];

/// 数据生成方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataVariant {
    /// 合成的"龙头企业"名称
    Basic,
    /// 真实公司名称与股票代码
    Enhanced,
}

impl DataVariant {
    pub fn source_label(&self) -> &'static str {
        match self {
            DataVariant::Basic => "模拟数据",
            DataVariant::Enhanced => "多源数据整合",
        }
    }

    /// 该方式下依次尝试的数据源
    pub fn source_names(&self) -> &'static [&'static str] {
        match self {
            DataVariant::Basic => &["东方财富网", "新浪财经", "和讯网"],
            DataVariant::Enhanced => &["东方财富网", "新浪财经", "雪球", "巨潮资讯"],
        }
    }
}

impl FromStr for DataVariant {
    type Err = CrawlerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(DataVariant::Basic),
            "enhanced" => Ok(DataVariant::Enhanced),
            other => Err(CrawlerError::Config(format!("Unknown variant: {}", other))),
        }
    }
}

impl fmt::Display for DataVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataVariant::Basic => write!(f, "basic"),
            DataVariant::Enhanced => write!(f, "enhanced"),
        }
    }
}

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Excel,
    Csv,
    Json,
    All,
}

impl ExportFormat {
    /// 展开 `All` 为具体格式，保持顺序并去重
    pub fn expand(formats: &[ExportFormat]) -> Vec<ExportFormat> {
        let mut expanded = Vec::new();
        for format in formats {
            let concrete: &[ExportFormat] = match format {
                ExportFormat::All => &[ExportFormat::Excel, ExportFormat::Csv, ExportFormat::Json],
                ExportFormat::Excel => &[ExportFormat::Excel],
                ExportFormat::Csv => &[ExportFormat::Csv],
                ExportFormat::Json => &[ExportFormat::Json],
            };
            for f in concrete {
                if !expanded.contains(f) {
                    expanded.push(*f);
                }
            }
        }
        expanded
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Excel => "xlsx",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::All => "",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = CrawlerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "all" => Ok(ExportFormat::All),
            other => Err(CrawlerError::Config(format!("Unknown output format: {}", other))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Excel => "excel",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::All => "all",
        };
        write!(f, "{}", name)
    }
}

/// 闭区间 [min, max]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

impl MetricRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// 各指标的取值范围与企业级扰动幅度
#[derive(Debug, Clone, PartialEq)]
pub struct MetricBounds {
    pub penetration: MetricRange,
    pub capacity: MetricRange,
    pub margin: MetricRange,
    pub market_size: MetricRange,
    pub growth: MetricRange,
    pub penetration_jitter: f64,
    pub capacity_jitter: f64,
    pub margin_jitter: f64,
}

impl MetricBounds {
    pub fn basic() -> Self {
        Self {
            penetration: MetricRange::new(5.0, 35.0),
            capacity: MetricRange::new(60.0, 95.0),
            margin: MetricRange::new(15.0, 45.0),
            market_size: MetricRange::new(100.0, 2000.0),
            growth: MetricRange::new(10.0, 50.0),
            penetration_jitter: 10.0,
            capacity_jitter: 15.0,
            margin_jitter: 8.0,
        }
    }

    pub fn enhanced() -> Self {
        Self {
            penetration: MetricRange::new(5.0, 40.0),
            capacity: MetricRange::new(65.0, 95.0),
            margin: MetricRange::new(20.0, 50.0),
            market_size: MetricRange::new(200.0, 5000.0),
            growth: MetricRange::new(15.0, 60.0),
            penetration_jitter: 10.0,
            capacity_jitter: 15.0,
            margin_jitter: 8.0,
        }
    }

    pub fn for_variant(variant: DataVariant) -> Self {
        match variant {
            DataVariant::Basic => Self::basic(),
            DataVariant::Enhanced => Self::enhanced(),
        }
    }

    /// 检查区间合法（有限、min <= max 且非负），扰动幅度有限且非负
    pub fn validate(&self) -> Result<(), CrawlerError> {
        let ranges = [
            ("penetration", self.penetration),
            ("capacity", self.capacity),
            ("margin", self.margin),
            ("market_size", self.market_size),
            ("growth", self.growth),
        ];
        for (name, range) in ranges {
            if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max || range.min < 0.0 {
                return Err(CrawlerError::Config(format!(
                    "Invalid {} range: [{}, {}]", name, range.min, range.max
                )));
            }
        }

        let jitters = [
            ("penetration", self.penetration_jitter),
            ("capacity", self.capacity_jitter),
            ("margin", self.margin_jitter),
        ];
        for (name, jitter) in jitters {
            if !jitter.is_finite() || jitter < 0.0 {
                return Err(CrawlerError::Config(format!("Invalid {} jitter: {}", name, jitter)));
            }
        }
        Ok(())
    }
}

/// 数据源配置
#[derive(Debug, Clone, PartialEq)]
pub struct DataSourceConfig {
    pub name: String,
    pub base_url: String,
    pub enabled: bool,
    /// 每次请求前的随机等待区间（秒）
    pub delay_range: (u64, u64),
    pub timeout_secs: u64,
}

impl DataSourceConfig {
    pub fn new(name: &str, base_url: &str, enabled: bool, delay_range: (u64, u64), timeout_secs: u64) -> Self {
        Self {
            name: name.to_string(),
            base_url: base_url.to_string(),
            enabled,
            delay_range,
            timeout_secs,
        }
    }

    pub fn default_catalog() -> Vec<DataSourceConfig> {
        vec![
            Self::new("东方财富网", "http://data.eastmoney.com", true, (1, 3), 30),
            Self::new("新浪财经", "https://finance.sina.com.cn", true, (1, 3), 30),
            Self::new("和讯网", "http://www.hexun.com", true, (1, 3), 30),
            Self::new("雪球", "https://xueqiu.com", true, (2, 4), 30),
            Self::new("巨潮资讯", "http://www.cninfo.com.cn", true, (1, 3), 30),
            Self::new("证券时报", "http://www.stcn.com", true, (1, 3), 30),
            Self::new("中国证券报", "http://www.cs.com.cn", true, (1, 3), 30),
            Self::new("上海证券报", "http://www.cnstock.com", true, (1, 3), 30),
            Self::new("第一财经", "https://www.yicai.com", true, (1, 3), 30),
            Self::new("同花顺", "http://www.10jqka.com.cn", false, (2, 5), 30),
            Self::new("Wind资讯", "https://www.wind.com.cn", false, (3, 6), 45),
        ]
    }
}

pub struct Config {
    pub industries: Vec<String>,
    pub variant: DataVariant,
    pub bounds: MetricBounds,
    pub companies_per_industry: usize,
    pub seed: Option<u64>,
    pub output_dir: String,
    pub report_dir: String,
    pub file_stem: String,
    pub export_top_n: usize,
    pub report_top_n: usize,
    pub pacing_enabled: bool,
    pub data_sources: Vec<DataSourceConfig>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            industries: EMERGING_INDUSTRIES.iter().map(|s| s.to_string()).collect(),
            variant: DataVariant::Enhanced,
            bounds: MetricBounds::enhanced(),
            companies_per_industry: 3,
            seed: None,
            output_dir: "output".to_string(),
            report_dir: "reports".to_string(),
            file_stem: "行业研报数据".to_string(),
            export_top_n: 20,
            report_top_n: 15,
            pacing_enabled: true,
            data_sources: DataSourceConfig::default_catalog(),
        }
    }

    pub fn with_industries<S: AsRef<str>>(mut self, industries: &[S]) -> Self {
        self.industries = industries.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    /// 切换生成方式，同时切换到该方式的默认指标区间
    pub fn with_variant(mut self, variant: DataVariant) -> Self {
        self.variant = variant;
        self.bounds = MetricBounds::for_variant(variant);
        self
    }

    pub fn with_bounds(mut self, bounds: MetricBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_companies_per_industry(mut self, count: usize) -> Self {
        self.companies_per_industry = count;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_output_dir(mut self, dir: &str) -> Self {
        self.output_dir = dir.to_string();
        self
    }

    pub fn with_report_dir(mut self, dir: &str) -> Self {
        self.report_dir = dir.to_string();
        self
    }

    pub fn with_file_stem(mut self, stem: &str) -> Self {
        self.file_stem = stem.to_string();
        self
    }

    pub fn with_export_top_n(mut self, n: usize) -> Self {
        self.export_top_n = n;
        self
    }

    pub fn with_report_top_n(mut self, n: usize) -> Self {
        self.report_top_n = n;
        self
    }

    pub fn with_pacing(mut self, enabled: bool) -> Self {
        self.pacing_enabled = enabled;
        self
    }

    pub fn with_data_sources(mut self, sources: Vec<DataSourceConfig>) -> Self {
        self.data_sources = sources;
        self
    }

    /// 当前生成方式下启用的数据源
    pub fn active_sources(&self) -> Vec<&DataSourceConfig> {
        self.variant
            .source_names()
            .iter()
            .filter_map(|name| self.data_sources.iter().find(|s| s.name == *name))
            .filter(|s| s.enabled)
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_output_formats() {
        assert_eq!("excel".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert_eq!("XLSX".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert_eq!("all".parse::<ExportFormat>().unwrap(), ExportFormat::All);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn all_expands_to_three_formats_once() {
        let expanded = ExportFormat::expand(&[ExportFormat::Csv, ExportFormat::All]);
        assert_eq!(expanded, vec![ExportFormat::Csv, ExportFormat::Excel, ExportFormat::Json]);
    }

    #[test]
    fn variant_switch_replaces_bounds() {
        let config = Config::new().with_variant(DataVariant::Basic);
        assert_eq!(config.bounds, MetricBounds::basic());
        assert_eq!(config.variant.source_label(), "模拟数据");
    }

    #[test]
    fn active_sources_follow_variant_and_enabled_flag() {
        let config = Config::new();
        let names: Vec<&str> = config.active_sources().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["东方财富网", "新浪财经", "雪球", "巨潮资讯"]);

        let mut catalog = DataSourceConfig::default_catalog();
        catalog.iter_mut().filter(|s| s.name == "和讯网").for_each(|s| s.enabled = false);
        let config = Config::new().with_variant(DataVariant::Basic).with_data_sources(catalog);
        assert_eq!(config.active_sources().len(), 2);
    }

    #[test]
    fn rejects_inverted_ranges() {
        let mut bounds = MetricBounds::enhanced();
        bounds.margin = MetricRange::new(50.0, 20.0);
        assert!(bounds.validate().is_err());
        assert!(MetricBounds::basic().validate().is_ok());
    }

    #[test]
    fn rejects_non_finite_ranges_and_jitter() {
        let mut bounds = MetricBounds::enhanced();
        bounds.market_size = MetricRange::new(100.0, f64::INFINITY);
        assert!(matches!(bounds.validate(), Err(CrawlerError::Config(_))));

        let mut bounds = MetricBounds::enhanced();
        bounds.growth = MetricRange::new(f64::NAN, 30.0);
        assert!(bounds.validate().is_err());

        let mut bounds = MetricBounds::enhanced();
        bounds.margin_jitter = f64::INFINITY;
        assert!(bounds.validate().is_err());

        let mut bounds = MetricBounds::basic();
        bounds.capacity_jitter = -1.0;
        assert!(bounds.validate().is_err());
    }
}
