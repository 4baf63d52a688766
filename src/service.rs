use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use tower::Service;
use tracing::info;

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::export::{write_batch, ExportPaths};
use crate::maps::{MapsScraper, SearchQuery, DEFAULT_TOTAL};

/// スクレイピングリクエスト
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub search_terms: Vec<String>,
    pub total: usize,
    pub output_path: PathBuf,
    pub headless: bool,
    pub debug: bool,
}

impl ScrapeRequest {
    pub fn new(search_terms: Vec<String>) -> Self {
        Self {
            search_terms,
            total: DEFAULT_TOTAL,
            output_path: PathBuf::from("./output"),
            headless: true,
            debug: false,
        }
    }

    pub fn with_total(mut self, total: usize) -> Self {
        self.total = total;
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl From<&ScrapeRequest> for ScraperConfig {
    fn from(req: &ScrapeRequest) -> Self {
        ScraperConfig::new()
            .with_headless(req.headless)
            .with_debug(req.debug)
            .with_output_path(req.output_path.clone())
    }
}

/// 1検索語分の実行結果
#[derive(Debug, Clone)]
pub struct TermResult {
    pub search_term: String,
    pub records: usize,
    pub export: ExportPaths,
}

/// スクレイピング結果
#[derive(Debug, Clone)]
pub struct ScrapeResult {
    pub terms: Vec<TermResult>,
}

/// tower::Serviceを実装したスクレイパーサービス
#[derive(Debug, Clone, Default)]
pub struct ScraperService {
    // 将来的な拡張用（レートリミット、キャッシュなど）
}

impl ScraperService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Service<ScrapeRequest> for ScraperService {
    type Response = ScrapeResult;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ScrapeRequest) -> Self::Future {
        info!(
            "Scrape request received: {} term(s), total={}",
            req.search_terms.len(),
            req.total
        );

        Box::pin(async move {
            if req.search_terms.is_empty() {
                return Err(ScraperError::Config("検索語が指定されていません".into()));
            }

            let config: ScraperConfig = (&req).into();
            let output_path = config.output_path.clone();
            let mut scraper = MapsScraper::new(config);

            scraper.initialize().await?;

            // 同一セッションで検索語を順番に処理し、1語終わるごとにエクスポート。
            // 途中でエラーが出てもブラウザは必ず解放する
            let run_result = Self::run_terms(&mut scraper, &req, &output_path).await;
            scraper.close().await?;

            let terms = run_result?;
            info!("Scrape request completed: {} batch(es) exported", terms.len());
            Ok(ScrapeResult { terms })
        })
    }
}

impl ScraperService {
    async fn run_terms(
        scraper: &mut MapsScraper,
        req: &ScrapeRequest,
        output_path: &std::path::Path,
    ) -> Result<Vec<TermResult>, ScraperError> {
        let mut terms = Vec::with_capacity(req.search_terms.len());

        for term in &req.search_terms {
            let query = SearchQuery::new(term.clone(), req.total);
            let batch = scraper.scrape(&query).await?;
            let export = write_batch(&batch, output_path)?;
            terms.push(TermResult {
                search_term: term.clone(),
                records: batch.len(),
                export,
            });
        }

        Ok(terms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_request_builder() {
        let req = ScrapeRequest::new(vec!["Dentist London".into()])
            .with_total(20)
            .with_output_path("/tmp/out")
            .with_headless(false)
            .with_debug(true);

        assert_eq!(req.search_terms, vec!["Dentist London".to_string()]);
        assert_eq!(req.total, 20);
        assert_eq!(req.output_path, PathBuf::from("/tmp/out"));
        assert!(!req.headless);
        assert!(req.debug);
    }

    #[test]
    fn test_scrape_request_to_config() {
        let req = ScrapeRequest::new(vec!["cafe Tokyo".into()])
            .with_headless(false)
            .with_output_path("/tmp/maps");
        let config: ScraperConfig = (&req).into();

        assert!(!config.headless);
        assert_eq!(config.output_path, PathBuf::from("/tmp/maps"));
    }

    #[tokio::test]
    async fn test_empty_terms_is_config_error() {
        let mut service = ScraperService::new();
        let err = service
            .call(ScrapeRequest::new(Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, ScraperError::Config(_)));
    }
}
