use crate::models::record::IndustryRecord;
use crate::errors::Result;
use async_trait::async_trait;
use log::warn;

/// Base trait for industry data sources
#[async_trait]
pub trait IndustrySource: Send + Sync {
    /// Display name of the source
    fn source_name(&self) -> &str;

    /// Fetch records for one industry, may return an empty list
    async fn fetch_industry(&self, industry: &str) -> Result<Vec<IndustryRecord>>;

    /// Fetch records and swallow any failure, yielding zero rows instead
    async fn fetch_or_empty(&self, industry: &str) -> Vec<IndustryRecord> {
        match self.fetch_industry(industry).await {
            Ok(records) => records,
            Err(e) => {
                warn!("数据源 {} 获取 {} 行业数据失败: {}", self.source_name(), industry, e);
                Vec::new()
            }
        }
    }
}
