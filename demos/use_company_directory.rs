use industry_report_crawler::config::MetricBounds;
use industry_report_crawler::data_provider::CompanyDirectory;
use industry_report_crawler::generator::SyntheticGenerator;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 内置公司目录
    let directory = CompanyDirectory::builtin();
    println!("支持的行业数量: {}", directory.industries().len());
    println!("公司总数: {}", directory.company_count());

    // 查询特定行业的公司
    let industry = "人工智能";
    if let Some(companies) = directory.get_companies(industry) {
        println!("\n{} 行业公司:", industry);
        println!("{:<12} {:<10} {:<10} {}", "公司", "代码", "市值", "主要产品");
        println!("{:-<60}", "");
        for c in companies {
            println!("{:<12} {:<10} {:<10} {}", c.name, c.code, c.market_cap, c.main_products);
        }

        // 为这些公司生成一组可复现的模拟指标
        let mut generator = SyntheticGenerator::new(MetricBounds::enhanced(), Some(42));
        let records = generator.generate_for_companies(industry, companies);
        println!("\n{:<12} {:<10} {:<10} {:<10}", "公司", "渗透率", "产能利用率", "毛利率");
        for r in &records {
            println!(
                "{:<12} {:<10.2} {:<10.2} {:<10.2}",
                r.company_name, r.penetration_rate_pct, r.capacity_utilization_pct, r.gross_margin_pct
            );
        }
    } else {
        println!("未找到行业: {}", industry);
    }

    // 按股票代码查找
    let code = "002230.SZ";
    for (industry, company) in directory.find_by_code(code) {
        println!("\n{} 属于 {} 行业: {}", code, industry, company.name);
    }

    Ok(())
}
