use industry_report_crawler::config::MetricBounds;
use industry_report_crawler::data_provider::CompanyDirectory;
use industry_report_crawler::generator::SyntheticGenerator;
use industry_report_crawler::models::record::IndustryRecord;
use proptest::prelude::*;

fn assert_within(bounds: &MetricBounds, records: &[IndustryRecord]) {
    for r in records {
        assert!(bounds.penetration.contains(r.penetration_rate_pct), "penetration {}", r.penetration_rate_pct);
        assert!(bounds.capacity.contains(r.capacity_utilization_pct), "capacity {}", r.capacity_utilization_pct);
        assert!(bounds.margin.contains(r.gross_margin_pct), "margin {}", r.gross_margin_pct);
        assert!(bounds.market_size.contains(r.market_size_hundred_million_cny));
        assert!(bounds.growth.contains(r.annual_growth_rate_pct));
    }
}

proptest! {
    #[test]
    fn enhanced_values_stay_in_bounds(seed in any::<u64>()) {
        let directory = CompanyDirectory::builtin();
        let mut generator = SyntheticGenerator::new(MetricBounds::enhanced(), Some(seed));
        for industry in directory.industries() {
            let companies = directory.get_companies(industry).unwrap();
            let records = generator.generate_for_companies(industry, companies);
            prop_assert_eq!(records.len(), companies.len());
            assert_within(generator.bounds(), &records);

            // 行业级指标在同一行业内一致
            let first = &records[0];
            prop_assert!(records.iter().all(|r| r.market_size_hundred_million_cny == first.market_size_hundred_million_cny));
            prop_assert!(records.iter().all(|r| r.annual_growth_rate_pct == first.annual_growth_rate_pct));
        }
    }

    #[test]
    fn basic_values_stay_in_bounds(seed in any::<u64>(), count in 1usize..8) {
        let mut generator = SyntheticGenerator::new(MetricBounds::basic(), Some(seed));
        let records = generator.generate_basic("人工智能", count);
        prop_assert_eq!(records.len(), count);
        assert_within(generator.bounds(), &records);
    }

    #[test]
    fn same_seed_same_numbers(seed in any::<u64>()) {
        let a = SyntheticGenerator::new(MetricBounds::basic(), Some(seed)).generate_basic("区块链", 3);
        let b = SyntheticGenerator::new(MetricBounds::basic(), Some(seed)).generate_basic("区块链", 3);
        let margins = |rs: &[IndustryRecord]| rs.iter().map(|r| r.gross_margin_pct).collect::<Vec<_>>();
        prop_assert_eq!(margins(&a), margins(&b));
    }
}
