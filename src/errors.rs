use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Excel parsing error: {0}")]
    ExcelError(#[from] calamine::Error),

    #[error("Excel writing error: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),

    #[error("Chart rendering error: {0}")]
    ChartError(String),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("没有数据可处理")]
    EmptyData,

    #[error("未收集到任何数据")]
    NothingCollected,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, CrawlerError>;

// 用于从字符串创建错误
impl From<String> for CrawlerError {
    fn from(s: String) -> Self {
        CrawlerError::Unknown(s)
    }
}

// 用于从&str创建错误
impl From<&str> for CrawlerError {
    fn from(s: &str) -> Self {
        CrawlerError::Unknown(s.to_string())
    }
}
