//! Google Maps スクレイパーライブラリ
//!
//! - 検索語ごとにビジネスリスティングを発見・抽出
//! - 結果バッチをCSV / Excelにエクスポート
//!
//! # サービス経由の使用例
//!
//! ```rust,ignore
//! use maps_scraper_service::{ScrapeRequest, ScraperService};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut service = ScraperService::new();
//!
//!     let request = ScrapeRequest::new(vec!["Dentist London".to_string()])
//!         .with_total(20)
//!         .with_output_path("./output");
//!
//!     let result = service.call(request).await.unwrap();
//!     for term in &result.terms {
//!         println!("{}: {} records -> {:?}", term.search_term, term.records, term.export.csv_path);
//!     }
//! }
//! ```
//!
//! # スクレイパー直接使用例
//!
//! ```rust,ignore
//! use maps_scraper_service::{MapsScraper, ScraperConfig, Scraper, SearchQuery};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut scraper = MapsScraper::new(ScraperConfig::default());
//!     let queries = vec![SearchQuery::new("Dentist London", 20)];
//!     let batches = scraper.execute(&queries).await.unwrap();
//!     println!("Businesses: {}", batches[0].len());
//! }
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod maps;
pub mod service;
pub mod traits;

// 主要な型をリエクスポート
pub use config::ScraperConfig;
pub use error::ScraperError;
pub use export::{write_batch, ExportPaths};
pub use maps::{Business, BusinessBatch, MapsScraper, SearchQuery};
pub use service::{ScrapeRequest, ScrapeResult, ScraperService, TermResult};
pub use traits::Scraper;
