use crate::config::DataSourceConfig;
use crate::errors::Result;
use crate::models::record::IndustryRecord;
use crate::scrapers::base::IndustrySource;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use std::time::Duration;

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// 财经门户网站数据源
///
/// 门户页面存在反爬机制，页面解析尚未实现：每次调用只做限速与请求准备，
/// 然后返回空列表，由上层回退到合成数据。
pub struct PortalSource {
    client: Client,
    name: String,
    base_url: String,
    delay_range: (u64, u64),
    pacing: bool,
}

impl PortalSource {
    /// 根据数据源配置创建抓取器
    pub fn new(config: &DataSourceConfig, pacing: bool) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.8,en-US;q=0.5,en;q=0.3"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            name: config.name.clone(),
            base_url: config.base_url.clone(),
            delay_range: config.delay_range,
            pacing,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 请求前随机等待，模拟对远端站点的礼貌访问
    async fn wait_for_rate_limit(&self) {
        if !self.pacing {
            return;
        }

        let (low, high) = self.delay_range;
        let millis = if high > low {
            rand::random_range(low * 1000..=high * 1000)
        } else {
            low * 1000
        };

        if millis > 0 {
            debug!("等待 {} 毫秒以遵守频率限制", millis);
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }
}

#[async_trait]
impl IndustrySource for PortalSource {
    fn source_name(&self) -> &str {
        &self.name
    }

    async fn fetch_industry(&self, industry: &str) -> Result<Vec<IndustryRecord>> {
        info!("正在爬取{} {} 行业数据...", self.name, industry);

        // 限制请求频率
        self.wait_for_rate_limit().await;

        let request = self.client
            .get(&self.base_url)
            .query(&[("industry", industry)])
            .build()?;
        debug!("{} 已准备请求: {}", self.name, request.url());

        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> DataSourceConfig {
        DataSourceConfig::new("东方财富网", url, true, (1, 3), 30)
    }

    #[tokio::test]
    async fn portal_returns_no_rows_without_pacing() {
        let source = PortalSource::new(&config("http://data.eastmoney.com"), false).unwrap();
        assert_eq!(source.source_name(), "东方财富网");
        assert!(source.fetch_industry("人工智能").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_base_url_is_swallowed_at_the_boundary() {
        let source = PortalSource::new(&config("not a url"), false).unwrap();
        assert!(source.fetch_industry("人工智能").await.is_err());
        assert!(source.fetch_or_empty("人工智能").await.is_empty());
    }
}
