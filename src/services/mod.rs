pub mod aggregator;
pub mod chart;
pub mod crawl_service;
pub mod export;
pub mod report;
