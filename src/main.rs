use std::path::PathBuf;

use clap::Parser;
use tower::Service;
use tracing::{error, info};

use maps_scraper_service::{ScrapeRequest, ScraperError, ScraperService};

/// Google Maps ビジネス情報スクレイパー
#[derive(Debug, Parser)]
#[command(name = "maps-scraper", version)]
struct Cli {
    /// 検索語（業種+地域、例: "Dentist London"）。省略時は入力ファイルから読む
    #[arg(short, long)]
    search: Option<String>,

    /// 取得目標件数
    #[arg(short, long, default_value_t = 100)]
    total: usize,

    /// 検索語フォールバック入力ファイル（1行1検索語）
    #[arg(long, default_value = "input.txt")]
    input: PathBuf,

    /// エクスポート先ディレクトリ
    #[arg(long, default_value = "output")]
    output: PathBuf,

    /// ブラウザを表示モードで起動する
    #[arg(long)]
    headed: bool,

    /// デバッグログ（スクリーンショット含む）
    #[arg(long)]
    debug: bool,
}

impl Cli {
    /// 検索語を解決する。-s 指定が無ければ入力ファイルの各行を使う
    fn resolve_search_terms(&self) -> Result<Vec<String>, ScraperError> {
        if let Some(term) = &self.search {
            return Ok(vec![term.clone()]);
        }

        let terms = match std::fs::read_to_string(&self.input) {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => Vec::new(),
        };

        if terms.is_empty() {
            return Err(ScraperError::Config(format!(
                "検索語が指定されておらず、{:?} からも読めませんでした",
                self.input
            )));
        }
        Ok(terms)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.debug {
        "info,maps_scraper_service=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    // 設定エラーはブラウザを起動する前に落とす
    let search_terms = match cli.resolve_search_terms() {
        Ok(terms) => terms,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };

    let request = ScrapeRequest::new(search_terms)
        .with_total(cli.total)
        .with_output_path(cli.output)
        .with_headless(!cli.headed)
        .with_debug(cli.debug);

    let mut service = ScraperService::new();
    match service.call(request).await {
        Ok(result) => {
            for term in &result.terms {
                info!(
                    "{}: {} records -> {:?}, {:?}",
                    term.search_term, term.records, term.export.csv_path, term.export.xlsx_path
                );
            }
        }
        Err(e) => {
            error!("Scrape run failed: {}", e);
            std::process::exit(1);
        }
    }
}
