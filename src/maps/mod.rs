//! Google Maps スクレイパーモジュール
//!
//! 検索語ごとにビジネスリスティングを発見・抽出してバッチにまとめる

mod coords;
mod discover;
mod fields;
mod scraper;
mod types;

pub use coords::extract_coordinates;
pub use discover::{ListingHandle, ScrollStatus, ScrollTracker};
pub use fields::{parse_reviews_average, parse_reviews_count};
pub use scraper::MapsScraper;
pub use types::{Business, BusinessBatch, SearchQuery, DEFAULT_TOTAL, MAX_TOTAL};
