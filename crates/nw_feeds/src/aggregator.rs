use chrono::{DateTime, Utc};
use futures::future::join_all;
use nw_core::{sort_by_recency, Article, ArticleStorage, MergeStats, NewsSummary, Result, Sentiment};
use nw_inference::{summarize, SentimentClassifier};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{RwLock, Semaphore};
use tokio::time::timeout;
use tracing::info;

use crate::config::AggregatorConfig;
use crate::fetcher::{FeedError, FeedSource, HttpFeedFetcher};
use crate::logging::Logger;
use crate::normalizer::normalize;
use crate::sources;

/// Outcome of one feed within a refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedReport {
    pub endpoint: String,
    pub source: String,
    /// Entries received, after the per-feed cap.
    pub fetched: usize,
    pub accepted: usize,
    pub rejected: Vec<String>,
    pub error: Option<String>,
}

impl FeedReport {
    fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            source: sources::resolve(endpoint).to_string(),
            fetched: 0,
            accepted: 0,
            rejected: Vec::new(),
            error: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub feeds: Vec<FeedReport>,
    pub merge: MergeStats,
    /// Articles that got the neutral fallback instead of a model result.
    pub degraded: usize,
}

impl RefreshReport {
    pub fn accepted(&self) -> usize {
        self.feeds.iter().map(|f| f.accepted).sum()
    }

    pub fn rejected(&self) -> usize {
        self.feeds.iter().map(|f| f.rejected.len()).sum()
    }

    pub fn failed_feeds(&self) -> usize {
        self.feeds.iter().filter(|f| !f.is_ok()).count()
    }
}

/// Owns the article store and runs refresh cycles into it.
///
/// Cheap to share behind an `Arc`: refreshes and queries take `&self`, and
/// overlapping refreshes serialize only on the store merge.
pub struct Aggregator {
    config: AggregatorConfig,
    source: Arc<dyn FeedSource>,
    classifier: Arc<SentimentClassifier>,
    storage: Arc<dyn ArticleStorage>,
    semaphore: Arc<Semaphore>,
    last_refresh: RwLock<Option<DateTime<Utc>>>,
}

impl Aggregator {
    pub fn new(
        config: AggregatorConfig,
        source: Arc<dyn FeedSource>,
        classifier: Arc<SentimentClassifier>,
        storage: Arc<dyn ArticleStorage>,
    ) -> Self {
        let permits = config.classify_concurrency.max(1);
        Self {
            config,
            source,
            classifier,
            storage,
            semaphore: Arc::new(Semaphore::new(permits)),
            last_refresh: RwLock::new(None),
        }
    }

    /// Aggregator fetching over HTTP. Fails on an invalid config.
    pub fn with_http(
        config: AggregatorConfig,
        classifier: Arc<SentimentClassifier>,
        storage: Arc<dyn ArticleStorage>,
    ) -> Result<Self> {
        config.validate()?;
        let fetcher = HttpFeedFetcher::new(&config)?;
        Ok(Self::new(config, Arc::new(fetcher), classifier, storage))
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn classifier(&self) -> &Arc<SentimentClassifier> {
        &self.classifier
    }

    /// Runs one refresh cycle and returns the whole store afterwards,
    /// most recent first.
    pub async fn refresh(&self) -> Result<Vec<Article>> {
        self.refresh_with_report().await?;
        self.get_articles().await
    }

    pub async fn refresh_with_report(&self) -> Result<RefreshReport> {
        let started = Instant::now();
        let started_at = Utc::now();
        info!("🔄 Refreshing {} feeds", self.config.feeds.len());

        let outcomes = join_all(
            self.config
                .feeds
                .iter()
                .map(|endpoint| self.collect_feed(endpoint, started_at)),
        )
        .await;

        let mut feeds = Vec::with_capacity(outcomes.len());
        let mut articles = Vec::new();
        for (report, mut batch) in outcomes {
            feeds.push(report);
            articles.append(&mut batch);
        }

        let (articles, degraded) = self.classify_all(articles).await;
        let merge = self.storage.merge(articles).await?;
        let finished_at = Utc::now();
        *self.last_refresh.write().await = Some(finished_at);

        let report = RefreshReport {
            started_at,
            finished_at,
            elapsed_ms: started.elapsed().as_millis() as u64,
            feeds,
            merge,
            degraded,
        };
        info!(
            "✅ Refresh done in {}ms: {} accepted, {} rejected, {} feeds failed, {} new, {} replaced",
            report.elapsed_ms,
            report.accepted(),
            report.rejected(),
            report.failed_feeds(),
            report.merge.inserted,
            report.merge.replaced,
        );
        Ok(report)
    }

    /// Fetches and normalizes one feed. Never fails: problems land in the report.
    async fn collect_feed(&self, endpoint: &str, now: DateTime<Utc>) -> (FeedReport, Vec<Article>) {
        let logger = Logger::for_feed(endpoint);
        let mut report = FeedReport::new(endpoint);

        let fetched = match timeout(self.config.fetch_timeout, self.source.fetch(endpoint)).await {
            Ok(result) => result,
            Err(_) => Err(FeedError::Timeout {
                endpoint: endpoint.to_string(),
            }),
        };

        let mut entries = match fetched {
            Ok(entries) => entries,
            Err(e) => {
                logger.warn(&format!("Skipping feed: {}", e));
                report.error = Some(e.to_string());
                return (report, Vec::new());
            }
        };
        entries.truncate(self.config.max_entries_per_feed);
        report.fetched = entries.len();

        let mut articles = Vec::with_capacity(entries.len());
        for entry in entries {
            match normalize(entry, endpoint, now) {
                Ok(article) => articles.push(article),
                Err(e) => {
                    logger.warn(&format!("Dropping entry: {}", e));
                    report.rejected.push(e.to_string());
                }
            }
        }
        report.accepted = articles.len();
        logger.info(&format!("Fetched {} entries, {} accepted", report.fetched, report.accepted));

        (report, articles)
    }

    /// Classifies every article concurrently, bounded by the permit pool.
    /// Returns the articles and how many fell back to neutral.
    async fn classify_all(&self, articles: Vec<Article>) -> (Vec<Article>, usize) {
        let tasks = articles.into_iter().map(|mut article| {
            let classifier = self.classifier.clone();
            let semaphore = self.semaphore.clone();
            async move {
                let degraded = match semaphore.acquire().await {
                    Ok(_permit) => classifier.classify_article(&mut article).await.is_err(),
                    Err(_) => {
                        article.set_sentiment(Sentiment::neutral());
                        true
                    }
                };
                (article, degraded)
            }
        });

        let mut degraded = 0;
        let articles = join_all(tasks)
            .await
            .into_iter()
            .map(|(article, fell_back)| {
                if fell_back {
                    degraded += 1;
                }
                article
            })
            .collect();
        (articles, degraded)
    }

    /// Every stored article, most recent first.
    pub async fn get_articles(&self) -> Result<Vec<Article>> {
        let mut articles = self.storage.snapshot().await?;
        sort_by_recency(&mut articles);
        Ok(articles)
    }

    /// Articles mentioning `entity` (case-insensitive), most recent first.
    pub async fn get_by_entity(&self, entity: &str) -> Result<Vec<Article>> {
        let mut articles: Vec<Article> = self
            .storage
            .snapshot()
            .await?
            .into_iter()
            .filter(|a| a.mentions(entity))
            .collect();
        sort_by_recency(&mut articles);
        Ok(articles)
    }

    pub async fn list_articles(&self, limit: usize, entity: Option<&str>) -> Result<Vec<Article>> {
        let mut articles = match entity {
            Some(entity) => self.get_by_entity(entity).await?,
            None => self.get_articles().await?,
        };
        articles.truncate(limit);
        Ok(articles)
    }

    pub async fn articles_for_entity(&self, entity: &str, limit: usize) -> Result<Vec<Article>> {
        self.list_articles(limit, Some(entity)).await
    }

    /// Summary over the store. Input is newest first, so ties go to the
    /// most recent article.
    pub async fn summary(&self) -> Result<NewsSummary> {
        let articles = self.get_articles().await?;
        Ok(summarize(&articles))
    }

    /// When the last refresh finished merging, if one has.
    pub async fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.read().await
    }

    pub async fn article_count(&self) -> Result<usize> {
        self.storage.len().await
    }
}
