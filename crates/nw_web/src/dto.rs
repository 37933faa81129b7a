use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_NEWS_LIMIT: usize = 20;
pub const DEFAULT_TICKER_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    pub limit: Option<usize>,
    pub ticker: Option<String>,
}

impl NewsQuery {
    /// Blank `ticker` means no filter.
    pub fn ticker(&self) -> Option<&str> {
        self.ticker.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub accepted: usize,
    pub rejected: usize,
    pub failed_feeds: usize,
    pub inserted: usize,
    pub replaced: usize,
}
