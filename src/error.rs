use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ブラウザ初期化エラー: {0}")]
    BrowserInit(String),

    #[error("ナビゲーションエラー: {0}")]
    Navigation(String),

    #[error("検索クエリ送信エラー: {0}")]
    QuerySubmit(String),

    #[error("タイムアウト: {0}")]
    Timeout(String),

    #[error("要素が見つかりません: {0}")]
    ElementNotFound(String),

    #[error("リスティング取得エラー: {0}")]
    Listing(String),

    #[error("フィールド解析エラー: {0}")]
    FieldParse(String),

    #[error("座標フォーマットエラー: {0}")]
    CoordinateFormat(String),

    #[error("エクスポートエラー: {0}")]
    Export(String),

    #[error("ファイル操作エラー: {0}")]
    FileIO(#[from] std::io::Error),
}

impl ScraperError {
    /// ランを中断させてよいエラーか（リスティング単位で握りつぶすべきでないか）
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScraperError::Config(_)
                | ScraperError::BrowserInit(_)
                | ScraperError::Navigation(_)
                | ScraperError::QuerySubmit(_)
                | ScraperError::ElementNotFound(_)
                | ScraperError::Export(_)
                | ScraperError::FileIO(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(ScraperError::Config("no terms".into()).is_fatal());
        assert!(ScraperError::Navigation("goto failed".into()).is_fatal());
        assert!(ScraperError::ElementNotFound("search box".into()).is_fatal());
        assert!(!ScraperError::Listing("listing 3".into()).is_fatal());
        assert!(!ScraperError::FieldParse("bad number".into()).is_fatal());
        assert!(!ScraperError::CoordinateFormat("no /@ segment".into()).is_fatal());
        assert!(!ScraperError::Timeout("results panel".into()).is_fatal());
    }
}
