use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 导出文件中使用的列名
pub mod columns {
    pub const INDUSTRY: &str = "行业名称";
    pub const COMPANY: &str = "企业名称";
    pub const TICKER: &str = "股票代码";
    pub const MARKET_CAP: &str = "市值";
    pub const MAIN_PRODUCTS: &str = "主要产品";
    pub const PENETRATION: &str = "行业渗透率(%)";
    pub const CAPACITY: &str = "产能利用率(%)";
    pub const MARGIN: &str = "平均毛利率(%)";
    pub const MARKET_SIZE: &str = "市场规模(亿元)";
    pub const GROWTH: &str = "年增长率(%)";
    pub const SOURCE: &str = "数据来源";
    pub const UPDATED_AT: &str = "更新时间";
}

/// 更新时间的文本格式（秒级精度）
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 静态参考数据中的公司描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    pub code: String,
    pub market_cap: String,
    pub main_products: String,
}

/// 单条行业-企业观测记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryRecord {
    #[serde(rename = "行业名称")]
    pub industry_name: String,
    #[serde(rename = "企业名称")]
    pub company_name: String,
    #[serde(rename = "股票代码", default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(rename = "市值", default, skip_serializing_if = "Option::is_none")]
    pub market_cap_label: Option<String>,
    #[serde(rename = "主要产品", default, skip_serializing_if = "Option::is_none")]
    pub main_products: Option<String>,
    #[serde(rename = "行业渗透率(%)")]
    pub penetration_rate_pct: f64,
    #[serde(rename = "产能利用率(%)")]
    pub capacity_utilization_pct: f64,
    #[serde(rename = "平均毛利率(%)")]
    pub gross_margin_pct: f64,
    #[serde(rename = "市场规模(亿元)")]
    pub market_size_hundred_million_cny: f64,
    #[serde(rename = "年增长率(%)")]
    pub annual_growth_rate_pct: f64,
    #[serde(rename = "数据来源")]
    pub source_label: String,
    #[serde(rename = "更新时间", with = "timestamp_format")]
    pub updated_at: NaiveDateTime,
}

impl IndustryRecord {
    /// 是否携带真实公司信息（增强版数据）
    pub fn has_company_details(&self) -> bool {
        self.ticker.is_some() || self.market_cap_label.is_some() || self.main_products.is_some()
    }

    pub fn updated_at_text(&self) -> String {
        self.updated_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

mod timestamp_format {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> IndustryRecord {
        IndustryRecord {
            industry_name: "人工智能".to_string(),
            company_name: "科大讯飞".to_string(),
            ticker: Some("002230.SZ".to_string()),
            market_cap_label: Some("800亿".to_string()),
            main_products: Some("语音识别、智能教育".to_string()),
            penetration_rate_pct: 12.5,
            capacity_utilization_pct: 80.0,
            gross_margin_pct: 35.25,
            market_size_hundred_million_cny: 1200.0,
            annual_growth_rate_pct: 22.1,
            source_label: "多源数据整合".to_string(),
            updated_at: NaiveDate::from_ymd_opt(2025, 6, 3)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        }
    }

    #[test]
    fn serializes_with_chinese_keys_and_text_timestamp() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["行业名称"], "人工智能");
        assert_eq!(value["股票代码"], "002230.SZ");
        assert_eq!(value["更新时间"], "2025-06-03 09:30:00");
    }

    #[test]
    fn basic_records_omit_company_details() {
        let mut record = sample();
        record.ticker = None;
        record.market_cap_label = None;
        record.main_products = None;
        assert!(!record.has_company_details());

        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("股票代码").is_none());

        let back: IndustryRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
