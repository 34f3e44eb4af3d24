//! 合成行业指标生成器
//!
//! 每个行业先抽取一组行业基准值，再对每家公司的三个百分比指标做独立扰动；
//! 市场规模与年增长率属于行业级指标，同一行业内的所有公司共享同一个值。
//! 指定种子时结果可复现。

use chrono::NaiveDateTime;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{DataVariant, MetricBounds, MetricRange};
use crate::models::record::{CompanyProfile, IndustryRecord};
use crate::util;

/// 行业级基准值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndustryBaseline {
    pub penetration: f64,
    pub capacity: f64,
    pub margin: f64,
    pub market_size: f64,
    pub growth: f64,
}

pub struct SyntheticGenerator {
    bounds: MetricBounds,
    rng: StdRng,
}

impl SyntheticGenerator {
    /// 创建生成器，`seed` 为 None 时使用系统随机源
    pub fn new(bounds: MetricBounds, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { bounds, rng }
    }

    pub fn bounds(&self) -> &MetricBounds {
        &self.bounds
    }

    /// 抽取行业基准值
    pub fn draw_baseline(&mut self) -> IndustryBaseline {
        let b = &self.bounds;
        IndustryBaseline {
            penetration: util::round2(Self::uniform(&mut self.rng, b.penetration)),
            capacity: util::round2(Self::uniform(&mut self.rng, b.capacity)),
            margin: util::round2(Self::uniform(&mut self.rng, b.margin)),
            market_size: util::round0(Self::uniform(&mut self.rng, b.market_size)),
            growth: util::round2(Self::uniform(&mut self.rng, b.growth)),
        }
    }

    /// 为真实公司列表生成数据（增强版）
    pub fn generate_for_companies(&mut self, industry: &str, companies: &[CompanyProfile]) -> Vec<IndustryRecord> {
        let baseline = self.draw_baseline();
        let updated_at = util::now_to_second();
        debug!("{} 行业基准值: {:?}", industry, baseline);

        companies
            .iter()
            .map(|company| {
                let mut record = self.company_record(industry, &company.name, &baseline, DataVariant::Enhanced, updated_at);
                record.ticker = Some(company.code.clone());
                record.market_cap_label = Some(company.market_cap.clone());
                record.main_products = Some(company.main_products.clone());
                record
            })
            .collect()
    }

    /// 生成 `count` 家合成龙头企业的数据（基础版）
    pub fn generate_basic(&mut self, industry: &str, count: usize) -> Vec<IndustryRecord> {
        let baseline = self.draw_baseline();
        let updated_at = util::now_to_second();
        debug!("{} 行业基准值: {:?}", industry, baseline);

        (1..=count)
            .map(|i| {
                let name = format!("{}龙头企业{}", industry, i);
                self.company_record(industry, &name, &baseline, DataVariant::Basic, updated_at)
            })
            .collect()
    }

    fn company_record(
        &mut self,
        industry: &str,
        company_name: &str,
        baseline: &IndustryBaseline,
        variant: DataVariant,
        updated_at: NaiveDateTime,
    ) -> IndustryRecord {
        let b = &self.bounds;
        let penetration = Self::perturb(&mut self.rng, baseline.penetration, b.penetration_jitter, b.penetration);
        let capacity = Self::perturb(&mut self.rng, baseline.capacity, b.capacity_jitter, b.capacity);
        let margin = Self::perturb(&mut self.rng, baseline.margin, b.margin_jitter, b.margin);

        IndustryRecord {
            industry_name: industry.to_string(),
            company_name: company_name.to_string(),
            ticker: None,
            market_cap_label: None,
            main_products: None,
            penetration_rate_pct: penetration,
            capacity_utilization_pct: capacity,
            gross_margin_pct: margin,
            market_size_hundred_million_cny: baseline.market_size,
            annual_growth_rate_pct: baseline.growth,
            source_label: variant.source_label().to_string(),
            updated_at,
        }
    }

    fn uniform(rng: &mut StdRng, range: MetricRange) -> f64 {
        if range.max > range.min {
            rng.random_range(range.min..=range.max)
        } else {
            range.min
        }
    }

    // 扰动后截断到 [max(min, 0), max]
    fn perturb(rng: &mut StdRng, base: f64, jitter: f64, range: MetricRange) -> f64 {
        let offset = if jitter > 0.0 { rng.random_range(-jitter..=jitter) } else { 0.0 };
        let lower = range.min.max(0.0);
        util::round2((base + offset).clamp(lower, range.max.max(lower)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_provider::CompanyDirectory;

    #[test]
    fn one_record_per_company_in_order() {
        let directory = CompanyDirectory::builtin();
        let companies = directory.get_companies("人工智能").unwrap();
        let mut generator = SyntheticGenerator::new(MetricBounds::enhanced(), Some(7));

        let records = generator.generate_for_companies("人工智能", companies);
        let names: Vec<&str> = records.iter().map(|r| r.company_name.as_str()).collect();
        assert_eq!(names, vec!["科大讯飞", "寒武纪", "商汤科技"]);
        assert!(records.iter().all(|r| r.industry_name == "人工智能"));
        assert_eq!(records[1].ticker.as_deref(), Some("688256.SH"));
        assert_eq!(records[0].source_label, "多源数据整合");
    }

    #[test]
    fn basic_companies_are_numbered_from_one() {
        let mut generator = SyntheticGenerator::new(MetricBounds::basic(), Some(1));
        let records = generator.generate_basic("半导体", 3);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].company_name, "半导体龙头企业1");
        assert_eq!(records[2].company_name, "半导体龙头企业3");
        assert!(records.iter().all(|r| !r.has_company_details()));
        assert_eq!(records[0].source_label, "模拟数据");
    }

    #[test]
    fn market_size_and_growth_are_shared_within_industry() {
        let mut generator = SyntheticGenerator::new(MetricBounds::basic(), Some(99));
        let records = generator.generate_basic("区块链", 5);
        let first = &records[0];
        for record in &records {
            assert_eq!(record.market_size_hundred_million_cny, first.market_size_hundred_million_cny);
            assert_eq!(record.annual_growth_rate_pct, first.annual_growth_rate_pct);
        }
        assert_eq!(first.market_size_hundred_million_cny.fract(), 0.0);
    }

    #[test]
    fn same_seed_same_metrics() {
        let mut a = SyntheticGenerator::new(MetricBounds::enhanced(), Some(42));
        let mut b = SyntheticGenerator::new(MetricBounds::enhanced(), Some(42));
        let ra = a.generate_basic("云计算", 3);
        let rb = b.generate_basic("云计算", 3);
        for (x, y) in ra.iter().zip(rb.iter()) {
            assert_eq!(x.gross_margin_pct, y.gross_margin_pct);
            assert_eq!(x.penetration_rate_pct, y.penetration_rate_pct);
            assert_eq!(x.market_size_hundred_million_cny, y.market_size_hundred_million_cny);
        }
    }

    #[test]
    fn perturbation_is_clamped_at_zero() {
        let mut bounds = MetricBounds::basic();
        bounds.penetration = MetricRange::new(0.0, 1.0);
        bounds.penetration_jitter = 50.0;
        let mut generator = SyntheticGenerator::new(bounds, Some(3));
        for record in generator.generate_basic("氢能源", 50) {
            assert!(record.penetration_rate_pct >= 0.0);
            assert!(record.penetration_rate_pct <= 1.0);
        }
    }

    #[test]
    fn degenerate_range_yields_constant() {
        let mut bounds = MetricBounds::enhanced();
        bounds.margin = MetricRange::new(30.0, 30.0);
        bounds.margin_jitter = 0.0;
        let mut generator = SyntheticGenerator::new(bounds, None);
        assert!(generator.generate_basic("机器人", 4).iter().all(|r| r.gross_margin_pct == 30.0));
    }
}
