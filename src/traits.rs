use async_trait::async_trait;

use crate::error::ScraperError;
use crate::maps::{BusinessBatch, SearchQuery};

#[async_trait]
pub trait Scraper: Send + Sync {
    /// ブラウザ初期化
    async fn initialize(&mut self) -> Result<(), ScraperError>;

    /// 1検索語分のスクレイプ実行
    async fn scrape(&mut self, query: &SearchQuery) -> Result<BusinessBatch, ScraperError>;

    /// リソース解放
    async fn close(&mut self) -> Result<(), ScraperError>;

    /// 一括実行（initialize → scrape×N → close）
    ///
    /// 途中でエラーが出てもブラウザは必ず解放する。
    async fn execute(
        &mut self,
        queries: &[SearchQuery],
    ) -> Result<Vec<BusinessBatch>, ScraperError> {
        self.initialize().await?;

        let mut batches = Vec::with_capacity(queries.len());
        let mut run_error = None;
        for query in queries {
            match self.scrape(query).await {
                Ok(batch) => batches.push(batch),
                Err(e) => {
                    run_error = Some(e);
                    break;
                }
            }
        }

        self.close().await?;

        match run_error {
            Some(e) => Err(e),
            None => Ok(batches),
        }
    }
}
