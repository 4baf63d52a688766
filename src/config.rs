use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// ヘッドレスモード
    pub headless: bool,
    /// デバッグモード（スクリーンショットログ出力）
    pub debug: bool,
    /// エクスポート先ディレクトリ
    pub output_path: PathBuf,
    /// 初回ナビゲーションのタイムアウト
    pub navigation_timeout: Duration,
    /// DOM条件ポーリングのタイムアウト
    pub ready_timeout: Duration,
    /// スクロール探索の最大反復回数
    pub max_scroll_iterations: u32,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: true,
            debug: false,
            output_path: PathBuf::from("./output"),
            navigation_timeout: Duration::from_secs(60),
            ready_timeout: Duration::from_secs(15),
            max_scroll_iterations: 60,
        }
    }
}

impl ScraperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    pub fn with_max_scroll_iterations(mut self, max: u32) -> Self {
        self.max_scroll_iterations = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ScraperConfig::new()
            .with_headless(false)
            .with_debug(true)
            .with_output_path("/tmp/out")
            .with_ready_timeout(Duration::from_secs(30))
            .with_max_scroll_iterations(10);

        assert!(!config.headless);
        assert!(config.debug);
        assert_eq!(config.output_path, PathBuf::from("/tmp/out"));
        assert_eq!(config.ready_timeout, Duration::from_secs(30));
        assert_eq!(config.max_scroll_iterations, 10);
    }

    #[test]
    fn test_config_defaults() {
        let config = ScraperConfig::default();
        assert!(config.headless);
        assert!(!config.debug);
        assert_eq!(config.navigation_timeout, Duration::from_secs(60));
        assert_eq!(config.max_scroll_iterations, 60);
    }
}
