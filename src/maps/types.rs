//! Google Maps スクレイプ関連の型定義

use serde::{Deserialize, Serialize};

/// 検索結果のデフォルト件数
pub const DEFAULT_TOTAL: usize = 100;
/// 検索結果件数の上限（フロントエンドの数値入力と同じ範囲）
pub const MAX_TOTAL: usize = 500;

/// 1件のビジネスリスティング
///
/// 全フィールドがOptional。リモートページのDOMは読み取り時点で
/// 部分的にしか描画されていないことがあるため、欠損はエラーではなく
/// 正常な結果として扱う。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Business {
    pub name: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub phone_number: Option<String>,
    pub reviews_count: Option<u64>,
    pub reviews_average: Option<f64>,
    /// latitude / longitude は同じURLから1回のパースで導出されるため
    /// 必ず両方揃うか両方欠けるかのどちらか
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// 1検索語分のスクレイプ結果（発見順を保持）
#[derive(Debug, Clone, Default)]
pub struct BusinessBatch {
    /// 元の検索語
    pub search_term: String,
    /// 発見順に並んだビジネスリスティング
    pub businesses: Vec<Business>,
}

impl BusinessBatch {
    pub fn new(search_term: impl Into<String>) -> Self {
        Self {
            search_term: search_term.into(),
            businesses: Vec::new(),
        }
    }

    pub fn push(&mut self, business: Business) {
        self.businesses.push(business);
    }

    pub fn len(&self) -> usize {
        self.businesses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.businesses.is_empty()
    }

    /// エクスポートファイル名のステム（空白を'_'に置換、固定プレフィックス付き）
    pub fn filename_stem(&self) -> String {
        let term: String = self
            .search_term
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");
        format!("google_maps_data_{}", term)
    }
}

/// 検索クエリ（ラン開始後は不変）
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// 業種+地域などを呼び出し側で結合したフリーテキスト
    pub query: String,
    /// 取得目標件数
    pub total: usize,
}

impl SearchQuery {
    /// totalは 1..=MAX_TOTAL にクランプされる
    pub fn new(query: impl Into<String>, total: usize) -> Self {
        Self {
            query: query.into(),
            total: total.clamp(1, MAX_TOTAL),
        }
    }

    pub fn with_default_total(query: impl Into<String>) -> Self {
        Self::new(query, DEFAULT_TOTAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_stem_replaces_whitespace() {
        let batch = BusinessBatch::new("Dentist London");
        assert_eq!(batch.filename_stem(), "google_maps_data_Dentist_London");
    }

    #[test]
    fn test_filename_stem_collapses_inner_whitespace() {
        let batch = BusinessBatch::new("  coffee   shop  Tokyo ");
        assert_eq!(batch.filename_stem(), "google_maps_data_coffee_shop_Tokyo");
    }

    #[test]
    fn test_search_query_clamps_total() {
        assert_eq!(SearchQuery::new("a", 0).total, 1);
        assert_eq!(SearchQuery::new("a", 20).total, 20);
        assert_eq!(SearchQuery::new("a", 10_000).total, MAX_TOTAL);
        assert_eq!(SearchQuery::with_default_total("a").total, DEFAULT_TOTAL);
    }

    #[test]
    fn test_business_default_is_all_absent() {
        let b = Business::default();
        assert!(b.name.is_none());
        assert!(b.reviews_count.is_none());
        assert!(b.latitude.is_none() && b.longitude.is_none());
    }

    #[test]
    fn test_batch_preserves_insertion_order() {
        let mut batch = BusinessBatch::new("x");
        for i in 0..3 {
            batch.push(Business {
                name: Some(format!("biz{}", i)),
                ..Default::default()
            });
        }
        let names: Vec<_> = batch
            .businesses
            .iter()
            .map(|b| b.name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["biz0", "biz1", "biz2"]);
    }
}
