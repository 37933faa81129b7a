use async_trait::async_trait;
use nw_core::{RawEntry, Result};
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::config::AggregatorConfig;

/// Why a feed produced nothing this cycle. Always names the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("{endpoint}: timed out")]
    Timeout { endpoint: String },

    #[error("{endpoint}: request failed: {reason}")]
    Network { endpoint: String, reason: String },

    #[error("{endpoint}: unexpected status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("{endpoint}: unreadable feed: {reason}")]
    Parse { endpoint: String, reason: String },
}

impl FeedError {
    pub fn endpoint(&self) -> &str {
        match self {
            FeedError::Timeout { endpoint }
            | FeedError::Network { endpoint, .. }
            | FeedError::Status { endpoint, .. }
            | FeedError::Parse { endpoint, .. } => endpoint,
        }
    }

    fn from_reqwest(endpoint: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FeedError::Timeout { endpoint: endpoint.to_string() }
        } else {
            FeedError::Network {
                endpoint: endpoint.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

/// Something that turns a feed endpoint into raw entries.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, endpoint: &str) -> std::result::Result<Vec<RawEntry>, FeedError>;
}

/// Fetches feeds over HTTP and parses RSS, Atom and JSON Feed payloads.
#[derive(Debug, Clone)]
pub struct HttpFeedFetcher {
    client: Client,
    max_entries: usize,
}

impl HttpFeedFetcher {
    pub fn new(config: &AggregatorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            max_entries: config.max_entries_per_feed,
        })
    }
}

#[async_trait]
impl FeedSource for HttpFeedFetcher {
    async fn fetch(&self, endpoint: &str) -> std::result::Result<Vec<RawEntry>, FeedError> {
        let response = self
            .client
            .get(endpoint)
            .send()
            .await
            .map_err(|e| FeedError::from_reqwest(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::from_reqwest(endpoint, e))?;
        debug!("Fetched {} bytes from {}", body.len(), endpoint);

        parse_feed(&body, self.max_entries).map_err(|e| FeedError::Parse {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Parses a syndication document, keeping at most `max_entries` entries.
pub fn parse_feed(
    body: &[u8],
    max_entries: usize,
) -> std::result::Result<Vec<RawEntry>, feed_rs::parser::ParseFeedError> {
    let feed = feed_rs::parser::parse(body)?;
    Ok(feed
        .entries
        .into_iter()
        .take(max_entries)
        .map(|entry| RawEntry {
            title: entry.title.map(|t| t.content),
            link: entry.links.into_iter().next().map(|l| l.href),
            summary: entry
                .summary
                .map(|t| t.content)
                .or_else(|| entry.content.and_then(|c| c.body)),
            published: entry.published,
            updated: entry.updated,
        })
        .collect())
}
