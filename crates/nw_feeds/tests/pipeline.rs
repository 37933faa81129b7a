use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use futures::future::join_all;
use nw_core::{Error, ModelLoader, Prediction, RawEntry, Result, SentimentLabel, SentimentModel};
use nw_feeds::{Aggregator, AggregatorConfig, FeedError, FeedSource};
use nw_inference::SentimentClassifier;
use nw_storage::MemoryStorage;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const YAHOO: &str = "https://feeds.finance.yahoo.com/rss/2.0/headline";
const CNBC: &str = "https://www.cnbc.com/id/100003114/device/rss/rss.html";
const MARKETWATCH: &str = "https://feeds.marketwatch.com/marketwatch/topstories";
const REUTERS: &str = "https://www.reuters.com/markets/rss";

#[derive(Clone)]
enum Behavior {
    Entries(Vec<RawEntry>),
    Fail(u16),
    Hang,
}

struct FakeSource {
    feeds: HashMap<String, Behavior>,
}

impl FakeSource {
    fn new(feeds: Vec<(&str, Behavior)>) -> Arc<Self> {
        Arc::new(Self {
            feeds: feeds.into_iter().map(|(e, b)| (e.to_string(), b)).collect(),
        })
    }
}

#[async_trait]
impl FeedSource for FakeSource {
    async fn fetch(&self, endpoint: &str) -> std::result::Result<Vec<RawEntry>, FeedError> {
        match self.feeds.get(endpoint) {
            Some(Behavior::Entries(entries)) => Ok(entries.clone()),
            Some(Behavior::Fail(status)) => Err(FeedError::Status {
                endpoint: endpoint.to_string(),
                status: *status,
            }),
            Some(Behavior::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(vec![])
            }
            None => Err(FeedError::Network {
                endpoint: endpoint.to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}

/// Positive when the text says "beat", negative when it says "miss".
struct HeadlineModel;

#[async_trait]
impl SentimentModel for HeadlineModel {
    fn name(&self) -> &str {
        "headline"
    }

    async fn predict(&self, text: &str) -> Result<Prediction> {
        if text.contains("beat") {
            Ok(Prediction::new("positive", 0.9))
        } else if text.contains("miss") {
            Ok(Prediction::new("negative", 0.8))
        } else if text.contains("garbled") {
            Err(Error::Inference("tokenizer error".to_string()))
        } else {
            Ok(Prediction::new("neutral", 0.7))
        }
    }
}

struct HeadlineLoader;

#[async_trait]
impl ModelLoader for HeadlineLoader {
    fn name(&self) -> &str {
        "headline"
    }

    async fn load(&self) -> Result<Arc<dyn SentimentModel>> {
        Ok(Arc::new(HeadlineModel))
    }
}

fn entry(title: &str, link: &str, minutes: i64) -> RawEntry {
    RawEntry {
        title: Some(title.to_string()),
        link: Some(link.to_string()),
        summary: None,
        published: Some(Utc.with_ymd_and_hms(2024, 5, 7, 12, 0, 0).unwrap() + ChronoDuration::minutes(minutes)),
        updated: None,
    }
}

fn build(
    feeds: Vec<(&str, Behavior)>,
    classifier: SentimentClassifier,
    timeout: Duration,
) -> Aggregator {
    let endpoints: Vec<String> = feeds.iter().map(|(e, _)| e.to_string()).collect();
    Aggregator::new(
        AggregatorConfig::default()
            .with_feeds(endpoints)
            .with_fetch_timeout(timeout),
        FakeSource::new(feeds),
        Arc::new(classifier),
        Arc::new(MemoryStorage::new()),
    )
}

fn headline_classifier() -> SentimentClassifier {
    SentimentClassifier::new(Arc::new(HeadlineLoader))
}

#[tokio::test]
async fn test_partial_failure_isolation() {
    let aggregator = build(
        vec![
            (YAHOO, Behavior::Entries(vec![entry("AAPL beat", "https://finance.yahoo.com/1", 1)])),
            (CNBC, Behavior::Fail(503)),
            (MARKETWATCH, Behavior::Hang),
            (REUTERS, Behavior::Entries(vec![entry("Oil steady", "https://www.reuters.com/2", 2)])),
        ],
        headline_classifier(),
        Duration::from_millis(100),
    );

    let report = aggregator.refresh_with_report().await.unwrap();
    assert_eq!(report.feeds.len(), 4);
    assert_eq!(report.failed_feeds(), 2);
    assert!(report.feeds[1].error.as_deref().unwrap().contains("503"));
    assert!(report.feeds[2].error.as_deref().unwrap().contains("timed out"));

    let articles = aggregator.get_articles().await.unwrap();
    let sources: Vec<_> = articles.iter().map(|a| a.source.as_str()).collect();
    assert_eq!(sources, vec!["Reuters", "Yahoo Finance"]);
}

#[tokio::test]
async fn test_no_reachable_feeds_still_completes() {
    let aggregator = build(
        vec![(YAHOO, Behavior::Fail(500)), (CNBC, Behavior::Fail(404))],
        headline_classifier(),
        Duration::from_secs(1),
    );
    let articles = aggregator.refresh().await.unwrap();
    assert!(articles.is_empty());
    assert!(aggregator.last_refresh().await.is_some());
}

#[tokio::test]
async fn test_per_source_cap() {
    let entries = (0..50)
        .map(|n| entry(&format!("Story {n}"), &format!("https://www.cnbc.com/{n}"), n))
        .collect();
    let aggregator = build(vec![(CNBC, Behavior::Entries(entries))], headline_classifier(), Duration::from_secs(1));

    let report = aggregator.refresh_with_report().await.unwrap();
    assert_eq!(report.feeds[0].fetched, 20);
    assert_eq!(aggregator.get_articles().await.unwrap().len(), 20);
}

#[tokio::test]
async fn test_idempotent_refetch() {
    let entries = vec![
        entry("AAPL beat", "https://www.cnbc.com/a", 1),
        entry("MSFT miss", "https://www.cnbc.com/b", 2),
    ];
    let aggregator = build(
        vec![(CNBC, Behavior::Entries(entries.clone())), (YAHOO, Behavior::Entries(entries))],
        headline_classifier(),
        Duration::from_secs(1),
    );

    let first = aggregator.refresh().await.unwrap();
    let second = aggregator.refresh().await.unwrap();
    assert_eq!(first.len(), 2);
    let first_ids: Vec<_> = first.iter().map(|a| a.id.clone()).collect();
    let second_ids: Vec<_> = second.iter().map(|a| a.id.clone()).collect();
    assert_eq!(first_ids, second_ids);
}

#[tokio::test]
async fn test_sentiment_is_attached() {
    let aggregator = build(
        vec![(
            CNBC,
            Behavior::Entries(vec![
                entry("NVDA earnings beat", "https://www.cnbc.com/1", 1),
                entry("INTC revenue miss", "https://www.cnbc.com/2", 2),
                entry("Fed minutes", "https://www.cnbc.com/3", 3),
                entry("garbled feed item", "https://www.cnbc.com/4", 4),
            ]),
        )],
        headline_classifier(),
        Duration::from_secs(1),
    );

    let report = aggregator.refresh_with_report().await.unwrap();
    assert_eq!(report.degraded, 1);

    let articles = aggregator.get_articles().await.unwrap();
    let by_title: HashMap<_, _> = articles.iter().map(|a| (a.title.as_str(), a)).collect();

    assert_eq!(by_title["NVDA earnings beat"].sentiment, Some(SentimentLabel::Positive));
    assert_eq!(by_title["NVDA earnings beat"].sentiment_score, Some(0.9));
    assert_eq!(by_title["INTC revenue miss"].sentiment, Some(SentimentLabel::Negative));
    assert_eq!(by_title["INTC revenue miss"].sentiment_score, Some(-0.8));
    assert_eq!(by_title["Fed minutes"].sentiment_score, Some(0.0));
    assert_eq!(by_title["garbled feed item"].sentiment, Some(SentimentLabel::Neutral));
}

#[tokio::test]
async fn test_unavailable_classifier_degrades_to_neutral() {
    let aggregator = build(
        vec![(
            CNBC,
            Behavior::Entries(vec![
                entry("AAPL beat", "https://www.cnbc.com/1", 1),
                entry("TSLA miss", "https://www.cnbc.com/2", 2),
            ]),
        )],
        SentimentClassifier::disabled(),
        Duration::from_secs(1),
    );

    let articles = aggregator.refresh().await.unwrap();
    assert_eq!(articles.len(), 2);
    for article in &articles {
        assert_eq!(article.sentiment, Some(SentimentLabel::Neutral));
        assert_eq!(article.sentiment_score, Some(0.0));
    }

    let summary = aggregator.summary().await.unwrap();
    assert_eq!(summary.overall_sentiment, SentimentLabel::Neutral);
    assert_eq!(summary.sentiment_breakdown[&SentimentLabel::Neutral], 2);
}

#[tokio::test]
async fn test_query_ordering_ignores_merge_order() {
    let aggregator = build(
        vec![
            (CNBC, Behavior::Entries(vec![entry("Middle", "https://www.cnbc.com/m", 5), entry("Oldest", "https://www.cnbc.com/o", 0)])),
            (YAHOO, Behavior::Entries(vec![entry("Newest", "https://finance.yahoo.com/n", 10)])),
        ],
        headline_classifier(),
        Duration::from_secs(1),
    );
    aggregator.refresh().await.unwrap();

    let titles: Vec<_> = aggregator
        .get_articles()
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.title)
        .collect();
    assert_eq!(titles, vec!["Newest", "Middle", "Oldest"]);
}

#[tokio::test]
async fn test_entity_filter_is_case_insensitive() {
    let aggregator = build(
        vec![(
            CNBC,
            Behavior::Entries(vec![
                entry("AAPL beat", "https://www.cnbc.com/1", 1),
                entry("MSFT and AAPL rally", "https://www.cnbc.com/2", 2),
                entry("TSLA miss", "https://www.cnbc.com/3", 3),
            ]),
        )],
        headline_classifier(),
        Duration::from_secs(1),
    );
    aggregator.refresh().await.unwrap();

    let apple = aggregator.get_by_entity("aapl").await.unwrap();
    assert_eq!(apple.len(), 2);
    assert!(apple.iter().all(|a| a.entities.contains(&"AAPL".to_string())));
    assert_eq!(apple[0].title, "MSFT and AAPL rally");

    assert_eq!(aggregator.articles_for_entity("AAPL", 1).await.unwrap().len(), 1);
    assert!(aggregator.get_by_entity("AA").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_summary_over_store() {
    let aggregator = build(
        vec![(
            CNBC,
            Behavior::Entries(vec![
                entry("AAPL beat", "https://www.cnbc.com/1", 1),
                entry("AAPL beat again", "https://www.cnbc.com/2", 2),
                entry("MSFT miss", "https://www.cnbc.com/3", 3),
            ]),
        )],
        headline_classifier(),
        Duration::from_secs(1),
    );
    aggregator.refresh().await.unwrap();

    let summary = aggregator.summary().await.unwrap();
    assert_eq!(summary.overall_sentiment, SentimentLabel::Positive);
    assert_eq!(summary.top_entities, vec!["AAPL", "MSFT"]);
    assert_eq!(summary.articles.len(), 3);
    assert_eq!(summary.articles[0].title, "MSFT miss");
}

#[tokio::test]
async fn test_summary_ties_favor_newest() {
    let aggregator = build(
        vec![(
            CNBC,
            Behavior::Entries(vec![
                entry("AA beat", "https://www.cnbc.com/older", 1),
                entry("BB miss", "https://www.cnbc.com/newer", 2),
            ]),
        )],
        headline_classifier(),
        Duration::from_secs(1),
    );
    aggregator.refresh().await.unwrap();

    for _ in 0..5 {
        let summary = aggregator.summary().await.unwrap();
        assert_eq!(summary.top_entities, vec!["BB", "AA"]);
        assert_eq!(summary.overall_sentiment, SentimentLabel::Negative);
        assert_eq!(summary.sentiment_breakdown[&SentimentLabel::Positive], 1);
        assert_eq!(summary.sentiment_breakdown[&SentimentLabel::Negative], 1);
    }
}

#[tokio::test]
async fn test_summary_ticker_ties_follow_recency() {
    let entries = ["AA", "BB", "CC", "DD", "EE", "FF"]
        .iter()
        .enumerate()
        .map(|(n, ticker)| entry(&format!("{ticker} flat"), &format!("https://www.cnbc.com/t{n}"), n as i64))
        .collect();
    let aggregator = build(vec![(CNBC, Behavior::Entries(entries))], headline_classifier(), Duration::from_secs(1));
    aggregator.refresh().await.unwrap();

    let summary = aggregator.summary().await.unwrap();
    assert_eq!(summary.top_entities, vec!["FF", "EE", "DD", "CC", "BB", "AA"]);
}

#[tokio::test]
async fn test_overlapping_refreshes_and_reads() {
    let entries = (0..20)
        .map(|n| entry(&format!("Story {n}"), &format!("https://www.cnbc.com/{n}"), n))
        .collect();
    let aggregator = Arc::new(build(
        vec![(CNBC, Behavior::Entries(entries))],
        headline_classifier(),
        Duration::from_secs(1),
    ));

    let refreshes = (0..4).map(|_| {
        let aggregator = aggregator.clone();
        tokio::spawn(async move { aggregator.refresh().await.map(|a| a.len()) })
    });
    let reads = (0..8).map(|_| {
        let aggregator = aggregator.clone();
        tokio::spawn(async move { aggregator.get_articles().await.map(|a| a.len()) })
    });

    for result in join_all(refreshes).await {
        assert_eq!(result.unwrap().unwrap(), 20);
    }
    for result in join_all(reads).await {
        let len = result.unwrap().unwrap();
        assert!(len == 0 || len == 20);
    }
}
