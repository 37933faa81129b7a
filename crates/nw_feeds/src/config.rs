use nw_core::{Error, Result};
use std::time::Duration;
use url::Url;

pub const DEFAULT_FEEDS: &[&str] = &[
    "https://feeds.finance.yahoo.com/rss/2.0/headline",
    "https://www.cnbc.com/id/100003114/device/rss/rss.html",
    "https://feeds.marketwatch.com/marketwatch/topstories",
];

pub const DEFAULT_MAX_ENTRIES_PER_FEED: usize = 20;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CLASSIFY_CONCURRENCY: usize = 10;
pub const DEFAULT_USER_AGENT: &str = concat!("newswire/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub feeds: Vec<String>,
    pub max_entries_per_feed: usize,
    pub fetch_timeout: Duration,
    pub classify_concurrency: usize,
    pub user_agent: String,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            feeds: DEFAULT_FEEDS.iter().map(|f| f.to_string()).collect(),
            max_entries_per_feed: DEFAULT_MAX_ENTRIES_PER_FEED,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            classify_concurrency: DEFAULT_CLASSIFY_CONCURRENCY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl AggregatorConfig {
    pub fn with_feeds<I, S>(mut self, feeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feeds = feeds.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Rejects feeds that are not absolute http(s) URLs and limits of zero.
    pub fn validate(&self) -> Result<()> {
        for feed in &self.feeds {
            let url = Url::parse(feed).map_err(|e| Error::InvalidUrl(format!("{feed}: {e}")))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::InvalidUrl(format!("{feed}: unsupported scheme {}", url.scheme())));
            }
        }
        if self.max_entries_per_feed == 0 {
            return Err(Error::Feed("max entries per feed must be at least 1".to_string()));
        }
        if self.classify_concurrency == 0 {
            return Err(Error::Feed("classification concurrency must be at least 1".to_string()));
        }
        if self.fetch_timeout.is_zero() {
            return Err(Error::Feed("fetch timeout must be positive".to_string()));
        }
        Ok(())
    }
}
