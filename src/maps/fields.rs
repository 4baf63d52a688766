//! 詳細パネルのテキストからのフィールド値パース
//!
//! スクレイパー本体はここの失敗をフィールド欠損に変換する。
//! FieldParseエラーがリスティング境界を越えて伝播することはない。

use crate::error::ScraperError;

/// レビュー件数テキストをパースする（例: `"1,234 reviews"` → 1234）
///
/// 先頭の空白区切りトークンを取り、桁区切りを除去して整数化する。
pub fn parse_reviews_count(text: &str) -> Result<u64, ScraperError> {
    let token = text
        .split_whitespace()
        .next()
        .ok_or_else(|| ScraperError::FieldParse("empty reviews count text".into()))?;

    token
        .replace(',', "")
        .replace('.', "")
        .parse()
        .map_err(|_| ScraperError::FieldParse(format!("bad reviews count token '{}'", token)))
}

/// 平均評価テキストをパースする（例: `"4,5 stars"` → 4.5）
///
/// リモートロケールによっては小数点がカンマなので '.' に正規化する。
pub fn parse_reviews_average(text: &str) -> Result<f64, ScraperError> {
    let token = text
        .split_whitespace()
        .next()
        .ok_or_else(|| ScraperError::FieldParse("empty reviews average text".into()))?;

    token
        .replace(',', ".")
        .parse()
        .map_err(|_| ScraperError::FieldParse(format!("bad reviews average token '{}'", token)))
}
