// 公开导出的模块，供外部使用
pub mod models;
pub mod data_provider;
pub mod errors;
pub mod generator;

// 命令行程序使用的模块
#[doc(hidden)]
pub mod scrapers;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod services;
#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use models::record::{CompanyProfile, IndustryRecord};
pub use models::summary::{IndustrySummary, MetricStatistics, OverallSummary};
pub use data_provider::CompanyDirectory;
pub use errors::{Result, CrawlerError};
