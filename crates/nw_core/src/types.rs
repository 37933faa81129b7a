use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A feed item exactly as the syndication parser handed it over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Negative => write!(f, "negative"),
            SentimentLabel::Neutral => write!(f, "neutral"),
        }
    }
}

impl FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(SentimentLabel::Positive),
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            _ => Err(format!("Unknown sentiment label: {s}")),
        }
    }
}

/// Label plus signed score in [-1, 1]. Neutral always carries 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub score: f64,
}

impl Sentiment {
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.0,
        }
    }

    /// Maps a model's label and confidence onto the signed scale. Negative
    /// confidences are flipped below zero, unknown labels collapse to neutral.
    pub fn from_prediction(label: &str, confidence: f64) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };

        match label.parse::<SentimentLabel>() {
            Ok(SentimentLabel::Positive) => Self {
                label: SentimentLabel::Positive,
                score: confidence,
            },
            Ok(SentimentLabel::Negative) => Self {
                label: SentimentLabel::Negative,
                score: -confidence,
            },
            _ => Self::neutral(),
        }
    }
}

impl Default for Sentiment {
    fn default() -> Self {
        Self::neutral()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub summary: Option<String>,
    pub url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    #[serde(rename = "tickers", default)]
    pub entities: Vec<String>,
    pub sentiment: Option<SentimentLabel>,
    pub sentiment_score: Option<f64>,
}

impl Article {
    pub fn sentiment(&self) -> Option<Sentiment> {
        self.sentiment.map(|label| Sentiment {
            label,
            score: self.sentiment_score.unwrap_or(0.0),
        })
    }

    pub fn set_sentiment(&mut self, sentiment: Sentiment) {
        self.sentiment = Some(sentiment.label);
        self.sentiment_score = Some(sentiment.score);
    }

    /// Exact, case-insensitive membership in the entity set.
    pub fn mentions(&self, entity: &str) -> bool {
        let wanted = entity.trim().to_uppercase();
        !wanted.is_empty() && self.entities.iter().any(|e| *e == wanted)
    }

    /// Text handed to the sentiment model: title, then the summary if any.
    pub fn classification_text(&self) -> String {
        match self.summary.as_deref() {
            Some(summary) if !summary.trim().is_empty() => format!("{}. {}", self.title, summary),
            _ => self.title.clone(),
        }
    }
}

/// Aggregate view over a set of articles, rebuilt on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsSummary {
    pub articles: Vec<Article>,
    pub overall_sentiment: SentimentLabel,
    pub sentiment_breakdown: BTreeMap<SentimentLabel, usize>,
    #[serde(rename = "top_tickers")]
    pub top_entities: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

/// Stable content fingerprint used as the article id.
pub fn fingerprint(key: &str) -> String {
    format!("{:x}", Sha256::digest(key.as_bytes()))
}

/// Newest first; ids break ties so the order never depends on map iteration.
pub fn sort_by_recency(articles: &mut [Article]) {
    articles.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
