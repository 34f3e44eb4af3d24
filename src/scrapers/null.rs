use crate::models::record::IndustryRecord;
use crate::errors::Result;
use crate::scrapers::base::IndustrySource;
use async_trait::async_trait;

/// 不返回任何数据的空数据源
#[derive(Debug, Default)]
pub struct NullSource;

#[async_trait]
impl IndustrySource for NullSource {
    fn source_name(&self) -> &str {
        "null"
    }

    async fn fetch_industry(&self, _industry: &str) -> Result<Vec<IndustryRecord>> {
        Ok(Vec::new())
    }
}
