//! Google Maps スクレイパー実装
//!
//! 1つのブラウザセッションで検索→スクロール探索→リスティング抽出を行う

use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::ScraperError;

use super::coords::extract_coordinates;
use super::discover::{ListingHandle, ScrollStatus, ScrollTracker};
use super::fields::{parse_reviews_average, parse_reviews_count};
use super::types::{Business, BusinessBatch, SearchQuery};

const GOOGLE_MAPS_URL: &str = "https://www.google.com/maps";

/// 検索ボックス
const SEARCH_BOX_SELECTOR: &str = "#searchboxinput";
/// 結果パネル内の場所アンカー
const PLACE_ANCHOR_SELECTOR: &str = "a[href*='https://www.google.com/maps/place']";
/// 住所フィールド
const ADDRESS_SELECTOR: &str = "button[data-item-id='address'] div[class*='fontBodyMedium']";
/// ウェブサイトフィールド
const WEBSITE_SELECTOR: &str = "a[data-item-id='authority'] div[class*='fontBodyMedium']";
/// 電話番号フィールド
const PHONE_SELECTOR: &str = "button[data-item-id^='phone:tel:'] div[class*='fontBodyMedium']";
/// レビュー件数（「クチコミをもっと見る」ボタン内）
const REVIEWS_COUNT_SELECTOR: &str = "button[jsaction='pane.reviewChart.moreReviews'] span";
/// 平均評価（レーティングウィジェットのaria-label）
const REVIEWS_AVERAGE_SELECTOR: &str =
    "div[jsaction='pane.reviewChart.moreReviews'] div[role='img']";

/// 1回のスクロール量（px）
const SCROLL_DELTA: u32 = 10_000;

/// DOM条件ポーリングのインターバル（ミリ秒）
const READY_CHECK_INTERVAL_MS: u64 = 250;
/// アンカー数安定判定のインターバル（ミリ秒）
const COUNT_CHECK_INTERVAL_MS: u64 = 300;
/// 連続で同数ならレンダリング完了とみなす回数
const REQUIRED_STABLE_CHECKS: u32 = 3;

/// クリック後の詳細パネル準備完了判定
///
/// 場所URLかどうかを見るだけでは2件目以降で直前のリスティングの
/// 場所URLがそのまま成立してしまうため、クリック前のURLからの
/// 遷移も要求する
fn detail_panel_ready(current: &str, before: &str) -> bool {
    current != before && current.contains("/maps/place") && current.contains("/@")
}

/// クエリ送信後のナビゲーション完了判定
///
/// 2語目以降は前の検索語の結果パネルが既に描画されているので、
/// 送信前のURLから離れたことを新しい検索の証拠にする
fn results_navigation_ready(current: &str, before: &str) -> bool {
    current != before && (current.contains("/maps/search") || current.contains("/maps/place"))
}

/// 詳細パネルへの探索操作
///
/// 抽出ロジックをブラウザ実体から切り離すための継ぎ目。
/// 本番実装はPage越しのJS探索、テストはスタブ
#[async_trait::async_trait]
trait PanelProbe: Send + Sync {
    /// index番目の場所アンカーのaria-label（リスティング名）
    async fn anchor_label(&self, index: usize) -> Result<Option<String>, ScraperError>;

    /// index番目のリスティングを開き、詳細パネルの準備完了を待つ
    async fn open(&self, index: usize) -> Result<(), ScraperError>;

    /// 1フィールドを独立に探索する。アンカーが無ければNone（エラーではない）
    async fn text(&self, selector: &str, what: &str) -> Result<Option<String>, ScraperError>;

    /// 属性値版のフィールド探索
    async fn attribute(
        &self,
        selector: &str,
        attribute: &str,
        what: &str,
    ) -> Result<Option<String>, ScraperError>;

    /// 現在のナビゲーションURL
    async fn navigation_url(&self) -> Result<String, ScraperError>;
}

/// 1リスティングを開いて全フィールドを読む
///
/// フィールドごとの欠損・パース失敗は欠損として吸収する。
/// それ以外の失敗（要素消失、ナビゲーション競合、座標パース失敗）は
/// リスティング全体の破棄としてErrで返す。
async fn extract_business(
    probe: &dyn PanelProbe,
    handle: ListingHandle,
) -> Result<Business, ScraperError> {
    // 名前は詳細パネルではなくアンカーのaria-labelから取る
    // （パネルのタイトルはナビゲーションより遅れることがある）
    let name = probe.anchor_label(handle.index).await?;

    probe.open(handle.index).await?;

    let address = probe.text(ADDRESS_SELECTOR, "address").await?;
    let website = probe.text(WEBSITE_SELECTOR, "website").await?;
    let phone_number = probe.text(PHONE_SELECTOR, "phone").await?;

    // レビュー件数: 「もっと見る」ボタンが無ければ欠損
    let reviews_count = probe
        .text(REVIEWS_COUNT_SELECTOR, "reviews count")
        .await?
        .and_then(|text| match parse_reviews_count(&text) {
            Ok(count) => Some(count),
            Err(e) => {
                debug!("Listing {}: {}", handle.index, e);
                None
            }
        });

    // 平均評価: レーティングウィジェットが無ければ欠損
    let reviews_average = probe
        .attribute(REVIEWS_AVERAGE_SELECTOR, "aria-label", "reviews average")
        .await?
        .and_then(|text| match parse_reviews_average(&text) {
            Ok(avg) => Some(avg),
            Err(e) => {
                debug!("Listing {}: {}", handle.index, e);
                None
            }
        });

    // 座標は現在のナビゲーションURLから1回のパースで両方導出する。
    // 失敗したらこのリスティングは信頼できないので丸ごと捨てる
    let url = probe.navigation_url().await?;
    let (latitude, longitude) = extract_coordinates(&url)?;

    Ok(Business {
        name,
        address,
        website,
        phone_number,
        reviews_count,
        reviews_average,
        latitude: Some(latitude),
        longitude: Some(longitude),
    })
}

/// ハンドル列を順に抽出してバッチに積む
///
/// リスティング単位の失敗はログだけ残して次へ進む。セッション境界級の
/// エラーだけが伝播する
async fn collect_batch(
    probe: &dyn PanelProbe,
    handles: &[ListingHandle],
    search_term: &str,
) -> Result<BusinessBatch, ScraperError> {
    let mut batch = BusinessBatch::new(search_term);

    for handle in handles {
        match extract_business(probe, *handle).await {
            Ok(business) => batch.push(business),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                // リスティング単位で破棄。部分レコードは出力しない
                warn!("Listing {} dropped: {}", handle.index, e);
            }
        }
    }

    Ok(batch)
}

/// Google Maps スクレイパー
pub struct MapsScraper {
    config: ScraperConfig,
    browser: Option<Browser>,
    page: Option<Arc<Page>>,
    home_loaded: bool,
}

impl MapsScraper {
    pub fn new(config: ScraperConfig) -> Self {
        Self {
            config,
            browser: None,
            page: None,
            home_loaded: false,
        }
    }

    fn get_page(&self) -> Result<&Arc<Page>, ScraperError> {
        self.page
            .as_ref()
            .ok_or_else(|| ScraperError::BrowserInit("ブラウザが初期化されていません".into()))
    }

    /// ブラウザを初期化
    pub async fn initialize(&mut self) -> Result<(), ScraperError> {
        info!("Initializing browser for maps scraper...");

        // ユニークなユーザーデータディレクトリを生成
        let unique_id = format!(
            "{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );
        let user_data_dir = std::env::temp_dir().join(format!("maps-scraper-{}", unique_id));

        // Chrome パスを取得
        let chrome_path = std::env::var("CHROME_PATH")
            .or_else(|_| std::env::var("CHROMIUM_PATH"))
            .unwrap_or_else(|_| "chromium".to_string());

        // ブラウザ設定を構築
        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .user_data_dir(&user_data_dir);

        if !self.config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .no_sandbox()
            .window_size(1280, 800)
            .request_timeout(self.config.navigation_timeout)
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu");

        if self.config.debug {
            builder = builder.arg("--enable-logging=stderr").arg("--v=1");
        }

        let browser_config = builder
            .build()
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        // ブラウザを起動
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        // ハンドラータスクを起動
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        });

        // セッション全体で使い回す1ページを作成
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        self.browser = Some(browser);
        self.page = Some(Arc::new(page));
        self.home_loaded = false;

        info!("Browser initialized successfully");
        Ok(())
    }

    /// 1検索語分のスクレイプを実行し、抽出できたリスティングのバッチを返す
    ///
    /// ホームナビゲーションとクエリ送信の失敗はこの検索語のランとして
    /// 致命的（伝播）。リスティング単位・フィールド単位の失敗はここで
    /// 吸収してランを継続する。
    pub async fn scrape(&mut self, query: &SearchQuery) -> Result<BusinessBatch, ScraperError> {
        let page = self.get_page()?.clone();
        info!("Starting maps scrape for '{}' (total={})", query.query, query.total);

        self.ensure_home(&page).await?;
        self.submit_query(&page, &query.query).await?;

        if self.config.debug {
            self.log_debug_screenshot(&page).await;
        }

        let handles = self.discover_listings(&page, query.total).await?;
        info!("Discovered {} listings", handles.len());

        let probe = PageProbe {
            scraper: self,
            page: &page,
        };
        let batch = collect_batch(&probe, &handles, &query.query).await?;

        info!(
            "Scrape for '{}' completed: {} businesses extracted",
            query.query,
            batch.len()
        );
        Ok(batch)
    }

    /// ブラウザを閉じる
    pub async fn close(&mut self) -> Result<(), ScraperError> {
        info!("Closing browser...");
        self.page = None;
        self.browser = None;
        self.home_loaded = false;
        Ok(())
    }

    /// Maps のホームページへナビゲート（セッション中1回だけ）
    async fn ensure_home(&mut self, page: &Page) -> Result<(), ScraperError> {
        if self.home_loaded {
            return Ok(());
        }
        info!("Navigating to {}", GOOGLE_MAPS_URL);

        page.goto(GOOGLE_MAPS_URL)
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;

        // 固定スリープではなく検索ボックスの出現を準備完了条件にする
        let ready = format!(
            r#"document.querySelector("{}") !== null"#,
            SEARCH_BOX_SELECTOR
        );
        self.wait_for(page, &ready, "search box")
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;

        self.home_loaded = true;
        debug!("Maps home loaded");
        Ok(())
    }

    /// 検索ボックスにクエリを入れてEnter送信し、結果パネルの出現を待つ
    async fn submit_query(&self, page: &Page, query: &str) -> Result<(), ScraperError> {
        info!("Submitting query: {}", query);

        let search_box = page
            .find_element(SEARCH_BOX_SELECTOR)
            .await
            .map_err(|e| ScraperError::ElementNotFound(format!("検索ボックス: {}", e)))?;

        // 前の検索語が残っているので入力前にクリア
        let clear_script = format!(
            r#"(function() {{
                var box = document.querySelector("{}");
                if (box) box.value = '';
            }})()"#,
            SEARCH_BOX_SELECTOR
        );
        page.evaluate(clear_script.as_str())
            .await
            .map_err(|e| ScraperError::QuerySubmit(e.to_string()))?;

        search_box
            .click()
            .await
            .map_err(|e| ScraperError::QuerySubmit(format!("検索ボックスクリック: {}", e)))?;
        search_box
            .type_str(query)
            .await
            .map_err(|e| ScraperError::QuerySubmit(format!("クエリ入力: {}", e)))?;
        // 前の検索語の結果パネルと区別するため、送信前のURLを控えておく
        let before = self.read_href(page).await.unwrap_or_default();

        search_box
            .press_key("Enter")
            .await
            .map_err(|e| ScraperError::QuerySubmit(format!("Enter送信: {}", e)))?;

        // まず新しい検索へのナビゲーションを待ち、その上で結果パネルの描画を待つ。
        // 前の検索語のfeedやアンカーが残っていても準備完了とは見なさない
        self.wait_for_url_state(page, &before, results_navigation_ready, "query navigation")
            .await
            .map_err(|e| ScraperError::QuerySubmit(e.to_string()))?;

        let ready = format!(
            r#"document.querySelector("div[role='feed']") !== null ||
               document.querySelectorAll("{}").length > 0"#,
            PLACE_ANCHOR_SELECTOR
        );
        self.wait_for(page, &ready, "results panel")
            .await
            .map_err(|e| ScraperError::QuerySubmit(e.to_string()))?;

        debug!("Query submitted, results panel visible");
        Ok(())
    }

    /// 目標件数に達するか結果が伸びなくなるまで結果パネルをスクロールし、
    /// 採用するリスティングハンドルを返す
    async fn discover_listings(
        &self,
        page: &Page,
        total: usize,
    ) -> Result<Vec<ListingHandle>, ScraperError> {
        let mut tracker = ScrollTracker::new(total, self.config.max_scroll_iterations);
        let mut rendered = self.wait_count_stable(page).await?;

        loop {
            match tracker.observe(rendered)? {
                ScrollStatus::TargetReached => {
                    debug!("Target of {} listings reached ({} rendered)", total, rendered);
                    break;
                }
                ScrollStatus::Stalled => {
                    // 結果セットの終端。目標未達でも成功
                    debug!("Listing count stalled at {} (target {})", rendered, total);
                    break;
                }
                ScrollStatus::Continue => {}
            }

            self.scroll_results_panel(page).await?;
            rendered = self.wait_count_stable(page).await?;
        }

        let take = tracker.take_count(rendered);
        Ok((0..take).map(ListingHandle::new).collect())
    }

    /// index番目の場所アンカーを包含行ごとクリックし、詳細パネルを待つ
    async fn open_listing(&self, page: &Page, index: usize) -> Result<(), ScraperError> {
        // クリック前のURLを控える。直前のリスティングの場所URLが
        // まだ表示されている状態を準備完了と誤認しないため
        let before = self.read_href(page).await.unwrap_or_default();

        let script = format!(
            r#"(function() {{
                var anchors = document.querySelectorAll("{}");
                var anchor = anchors[{}];
                if (!anchor) return false;
                var row = anchor.parentElement || anchor;
                row.click();
                return true;
            }})()"#,
            PLACE_ANCHOR_SELECTOR, index
        );

        let clicked: bool = page
            .evaluate(script.as_str())
            .await
            .map_err(|e| ScraperError::Listing(format!("listing {} click: {}", index, e)))?
            .into_value()
            .unwrap_or(false);

        if !clicked {
            return Err(ScraperError::Listing(format!(
                "listing {} anchor vanished before click",
                index
            )));
        }

        // 別の場所URL（/@座標セグメント付き）への遷移を
        // 詳細パネルの準備完了条件にする
        self.wait_for_url_state(page, &before, detail_panel_ready, "listing detail panel")
            .await
            .map_err(|e| ScraperError::Listing(e.to_string()))?;

        Ok(())
    }

    /// index番目の場所アンカーのaria-label（リスティング名）を読む
    async fn probe_anchor_label(
        &self,
        page: &Page,
        index: usize,
    ) -> Result<Option<String>, ScraperError> {
        let script = format!(
            r#"(function() {{
                var anchor = document.querySelectorAll("{}")[{}];
                if (!anchor) return null;
                var label = anchor.getAttribute('aria-label') || '';
                label = label.trim();
                return label.length > 0 ? label : null;
            }})()"#,
            PLACE_ANCHOR_SELECTOR, index
        );

        let value = page
            .evaluate(script.as_str())
            .await
            .map_err(|e| ScraperError::Listing(format!("listing {} name probe: {}", index, e)))?;
        Ok(value.into_value::<Option<String>>().unwrap_or(None))
    }

    /// 1フィールドを独立に探索する。アンカーが無ければNone（エラーではない）
    async fn probe_text(
        &self,
        page: &Page,
        selector: &str,
        what: &str,
    ) -> Result<Option<String>, ScraperError> {
        let script = format!(
            r#"(function() {{
                var el = document.querySelector("{}");
                if (!el) return null;
                var text = (el.innerText || '').trim();
                return text.length > 0 ? text : null;
            }})()"#,
            selector
        );

        let value = page
            .evaluate(script.as_str())
            .await
            .map_err(|e| ScraperError::Listing(format!("{} probe: {}", what, e)))?;
        Ok(value.into_value::<Option<String>>().unwrap_or(None))
    }

    /// 属性値版のフィールド探索
    async fn probe_attribute(
        &self,
        page: &Page,
        selector: &str,
        attribute: &str,
        what: &str,
    ) -> Result<Option<String>, ScraperError> {
        let script = format!(
            r#"(function() {{
                var el = document.querySelector("{}");
                if (!el) return null;
                var value = (el.getAttribute('{}') || '').trim();
                return value.length > 0 ? value : null;
            }})()"#,
            selector, attribute
        );

        let value = page
            .evaluate(script.as_str())
            .await
            .map_err(|e| ScraperError::Listing(format!("{} probe: {}", what, e)))?;
        Ok(value.into_value::<Option<String>>().unwrap_or(None))
    }

    /// 結果パネルを1回分スクロールする（パネルが無ければウィンドウごと）
    async fn scroll_results_panel(&self, page: &Page) -> Result<(), ScraperError> {
        let script = format!(
            r#"(function() {{
                var feed = document.querySelector("div[role='feed']");
                if (feed) {{
                    feed.scrollBy(0, {});
                    return true;
                }}
                window.scrollBy(0, {});
                return false;
            }})()"#,
            SCROLL_DELTA, SCROLL_DELTA
        );

        let scrolled_feed: bool = page
            .evaluate(script.as_str())
            .await
            .map_err(|e| ScraperError::Navigation(format!("results panel scroll: {}", e)))?
            .into_value()
            .unwrap_or(false);

        if !scrolled_feed {
            debug!("Results feed not found, scrolled window instead");
        }
        Ok(())
    }

    /// 描画済み場所アンカー数を数える
    async fn count_place_anchors(&self, page: &Page) -> Result<usize, ScraperError> {
        let script = format!(
            r#"document.querySelectorAll("{}").length"#,
            PLACE_ANCHOR_SELECTOR
        );
        let count = page
            .evaluate(script.as_str())
            .await
            .map_err(|e| ScraperError::Navigation(format!("anchor count: {}", e)))?
            .into_value::<usize>()
            .unwrap_or(0);
        Ok(count)
    }

    /// 遅延ロード分の描画が落ち着くまでアンカー数をポーリングし、最終値を返す
    ///
    /// タイムアウトはエラーにしない。停滞かどうかの判定はScrollTrackerの仕事
    async fn wait_count_stable(&self, page: &Page) -> Result<usize, ScraperError> {
        let start = std::time::Instant::now();
        let mut last_count = self.count_place_anchors(page).await?;
        let mut stable_checks = 0;

        while start.elapsed() < self.config.ready_timeout {
            sleep(Duration::from_millis(COUNT_CHECK_INTERVAL_MS)).await;
            let count = self.count_place_anchors(page).await?;

            if count == last_count {
                stable_checks += 1;
                if stable_checks >= REQUIRED_STABLE_CHECKS {
                    return Ok(count);
                }
            } else {
                stable_checks = 0;
                last_count = count;
            }
        }

        warn!(
            "Anchor count still moving after {:?}, using last observation ({})",
            start.elapsed(),
            last_count
        );
        Ok(last_count)
    }

    /// JS述語がtrueになるまでポーリングする。期限切れはTimeoutエラー
    async fn wait_for(&self, page: &Page, predicate: &str, what: &str) -> Result<(), ScraperError> {
        let start = std::time::Instant::now();

        while start.elapsed() < self.config.ready_timeout {
            let ready = page
                .evaluate(predicate)
                .await
                .map(|v| v.into_value::<bool>().unwrap_or(false))
                .unwrap_or(false);

            if ready {
                debug!("{} ready after {:?}", what, start.elapsed());
                return Ok(());
            }
            sleep(Duration::from_millis(READY_CHECK_INTERVAL_MS)).await;
        }

        Err(ScraperError::Timeout(format!(
            "{} not ready after {:?}",
            what,
            self.config.ready_timeout
        )))
    }

    /// 現在のナビゲーションURLを読む（失敗・空はNone）
    async fn read_href(&self, page: &Page) -> Option<String> {
        let value = page.evaluate("window.location.href").await.ok()?;
        value
            .into_value::<String>()
            .ok()
            .filter(|url| !url.is_empty())
    }

    /// URLが指定の状態に遷移するまでポーリングする。期限切れはTimeoutエラー
    async fn wait_for_url_state(
        &self,
        page: &Page,
        before: &str,
        ready: fn(&str, &str) -> bool,
        what: &str,
    ) -> Result<String, ScraperError> {
        let start = std::time::Instant::now();

        while start.elapsed() < self.config.ready_timeout {
            if let Some(current) = self.read_href(page).await {
                if ready(&current, before) {
                    debug!("{} ready after {:?}", what, start.elapsed());
                    return Ok(current);
                }
            }
            sleep(Duration::from_millis(READY_CHECK_INTERVAL_MS)).await;
        }

        Err(ScraperError::Timeout(format!(
            "{} not ready after {:?}",
            what,
            self.config.ready_timeout
        )))
    }

    /// 現在のナビゲーションURLを取得する
    async fn current_url(&self, page: &Page) -> Result<String, ScraperError> {
        self.read_href(page)
            .await
            .ok_or_else(|| ScraperError::Listing("current URL unavailable".into()))
    }

    /// デバッグスクリーンショットをdata URIとしてログ出力
    async fn log_debug_screenshot(&self, page: &Page) {
        if let Ok(screenshot) = page
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
        {
            use base64::Engine;
            let encoded = base64::engine::general_purpose::STANDARD.encode(&screenshot);
            debug!("Results screenshot: data:image/png;base64,{}", encoded);
        }
    }
}

/// Page越しのJS探索によるPanelProbe本番実装
struct PageProbe<'a> {
    scraper: &'a MapsScraper,
    page: &'a Page,
}

#[async_trait::async_trait]
impl PanelProbe for PageProbe<'_> {
    async fn anchor_label(&self, index: usize) -> Result<Option<String>, ScraperError> {
        self.scraper.probe_anchor_label(self.page, index).await
    }

    async fn open(&self, index: usize) -> Result<(), ScraperError> {
        self.scraper.open_listing(self.page, index).await
    }

    async fn text(&self, selector: &str, what: &str) -> Result<Option<String>, ScraperError> {
        self.scraper.probe_text(self.page, selector, what).await
    }

    async fn attribute(
        &self,
        selector: &str,
        attribute: &str,
        what: &str,
    ) -> Result<Option<String>, ScraperError> {
        self.scraper
            .probe_attribute(self.page, selector, attribute, what)
            .await
    }

    async fn navigation_url(&self) -> Result<String, ScraperError> {
        self.scraper.current_url(self.page).await
    }
}

#[async_trait::async_trait]
impl crate::traits::Scraper for MapsScraper {
    async fn initialize(&mut self) -> Result<(), ScraperError> {
        MapsScraper::initialize(self).await
    }

    async fn scrape(&mut self, query: &SearchQuery) -> Result<BusinessBatch, ScraperError> {
        MapsScraper::scrape(self, query).await
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        MapsScraper::close(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Scraper as _;
    use std::sync::Mutex;

    #[test]
    fn test_maps_scraper_new() {
        let scraper = MapsScraper::new(ScraperConfig::default());
        assert!(scraper.browser.is_none());
        assert!(scraper.page.is_none());
        assert!(!scraper.home_loaded);
    }

    #[test]
    fn test_detail_panel_not_ready_while_previous_place_url_loaded() {
        // 直前のリスティングの場所URLが残っている間は準備完了にならない
        let previous = "https://www.google.com/maps/place/A/@12.34,-56.78,15z/data=!3m1";
        assert!(!detail_panel_ready(previous, previous));

        let next = "https://www.google.com/maps/place/B/@13.0,-57.0,15z/data=!3m1";
        assert!(detail_panel_ready(next, previous));
    }

    #[test]
    fn test_detail_panel_requires_place_url_with_coordinates() {
        let before = "https://www.google.com/maps/search/Dentist+London";
        assert!(!detail_panel_ready("https://www.google.com/maps/place/A", before));
        assert!(!detail_panel_ready("https://www.google.com/maps/@12.3,4.5,15z", before));
        assert!(detail_panel_ready(
            "https://www.google.com/maps/place/A/@12.3,4.5,15z",
            before
        ));
    }

    #[test]
    fn test_results_not_ready_while_previous_term_results_loaded() {
        // 2語目の送信直後、前の検索語の結果URLのままでは準備完了にならない
        let previous = "https://www.google.com/maps/place/A/@12.34,-56.78,15z";
        assert!(!results_navigation_ready(previous, previous));
        assert!(results_navigation_ready(
            "https://www.google.com/maps/search/Plumber+Leeds",
            previous
        ));
    }

    #[test]
    fn test_results_ready_accepts_single_match_place_navigation() {
        // 結果が1件だけの検索は検索結果ページを経ずに場所URLへ飛ぶ
        let before = "https://www.google.com/maps";
        assert!(results_navigation_ready(
            "https://www.google.com/maps/place/Only+One/@1.0,2.0,15z",
            before
        ));
        assert!(!results_navigation_ready("https://example.com/other", before));
    }

    /// 缶詰回答を返すPanelProbeスタブ
    struct StubPanel {
        /// このindexのopen()をリスティング単位のエラーにする
        fail_open_at: Option<usize>,
        /// このindexのopen()をセッション級のエラーにする
        fatal_open_at: Option<usize>,
        /// レーティングウィジェットのaria-label（Noneでウィジェット不在）
        rating_label: Option<String>,
        opened: Mutex<Option<usize>>,
    }

    impl StubPanel {
        fn new() -> Self {
            Self {
                fail_open_at: None,
                fatal_open_at: None,
                rating_label: Some("4,5 stars".into()),
                opened: Mutex::new(None),
            }
        }
    }

    #[async_trait::async_trait]
    impl PanelProbe for StubPanel {
        async fn anchor_label(&self, index: usize) -> Result<Option<String>, ScraperError> {
            Ok(Some(format!("Business {}", index)))
        }

        async fn open(&self, index: usize) -> Result<(), ScraperError> {
            if self.fail_open_at == Some(index) {
                return Err(ScraperError::Listing(format!(
                    "listing {} anchor vanished before click",
                    index
                )));
            }
            if self.fatal_open_at == Some(index) {
                return Err(ScraperError::Navigation("browser gone".into()));
            }
            *self.opened.lock().unwrap() = Some(index);
            Ok(())
        }

        async fn text(&self, selector: &str, _what: &str) -> Result<Option<String>, ScraperError> {
            Ok(match selector {
                ADDRESS_SELECTOR => Some("1 High St".to_string()),
                WEBSITE_SELECTOR => Some("https://biz.example".to_string()),
                PHONE_SELECTOR => None,
                REVIEWS_COUNT_SELECTOR => Some("1,234 reviews".to_string()),
                _ => None,
            })
        }

        async fn attribute(
            &self,
            _selector: &str,
            _attribute: &str,
            _what: &str,
        ) -> Result<Option<String>, ScraperError> {
            Ok(self.rating_label.clone())
        }

        async fn navigation_url(&self) -> Result<String, ScraperError> {
            let index = self.opened.lock().unwrap().unwrap_or(0);
            Ok(format!(
                "https://www.google.com/maps/place/Business+{}/@12.34,-56.78,15z",
                index
            ))
        }
    }

    #[tokio::test]
    async fn test_absent_rating_widget_leaves_other_fields_unaffected() {
        // レーティングウィジェット不在でも他のフィールドは独立に読める
        let mut panel = StubPanel::new();
        panel.rating_label = None;

        let business = extract_business(&panel, ListingHandle::new(0)).await.unwrap();
        assert_eq!(business.reviews_average, None);
        assert_eq!(business.name.as_deref(), Some("Business 0"));
        assert_eq!(business.address.as_deref(), Some("1 High St"));
        assert_eq!(business.reviews_count, Some(1234));
        assert_eq!(business.phone_number, None);
        assert_eq!(business.latitude, Some(12.34));
        assert_eq!(business.longitude, Some(-56.78));
    }

    #[tokio::test]
    async fn test_rating_parse_failure_is_field_absence() {
        let mut panel = StubPanel::new();
        panel.rating_label = Some("unrated".into());

        let business = extract_business(&panel, ListingHandle::new(0)).await.unwrap();
        assert_eq!(business.reviews_average, None);
        assert_eq!(business.reviews_count, Some(1234));
    }

    #[tokio::test]
    async fn test_failed_listing_is_dropped_and_run_continues() {
        // 5件中3件目が開けなくても残り4件のバッチで完走する
        let mut panel = StubPanel::new();
        panel.fail_open_at = Some(2);
        let handles: Vec<_> = (0..5).map(ListingHandle::new).collect();

        let batch = collect_batch(&panel, &handles, "Dentist London").await.unwrap();
        assert_eq!(batch.len(), 4);
        let names: Vec<_> = batch
            .businesses
            .iter()
            .map(|b| b.name.clone().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["Business 0", "Business 1", "Business 3", "Business 4"]
        );
    }

    #[tokio::test]
    async fn test_session_level_error_escalates_out_of_iteration() {
        let mut panel = StubPanel::new();
        panel.fatal_open_at = Some(1);
        let handles: Vec<_> = (0..3).map(ListingHandle::new).collect();

        let err = collect_batch(&panel, &handles, "x").await.unwrap_err();
        assert!(matches!(err, ScraperError::Navigation(_)));
    }

    #[tokio::test]
    #[ignore] // 実環境テスト用: cargo test test_live_maps_scrape -- --ignored --nocapture
    async fn test_live_maps_scrape() {
        // トレーシング初期化
        tracing_subscriber::fmt()
            .with_env_filter("info,maps_scraper_service=debug")
            .init();

        let config = ScraperConfig::new().with_debug(true);
        let mut scraper = MapsScraper::new(config);

        let queries = vec![SearchQuery::new("Dentist London", 20)];
        let batches = scraper
            .execute(&queries)
            .await
            .expect("live scrape failed");

        let batch = &batches[0];
        println!("\n=== Scrape Result ===");
        println!("Businesses: {}", batch.len());
        for b in &batch.businesses {
            println!(
                "  - {:?} @ ({:?}, {:?})",
                b.name, b.latitude, b.longitude
            );
        }
        assert!(batch.len() <= 20);
        assert!(batch.businesses.iter().all(|b| b.name.is_some()));
    }
}
