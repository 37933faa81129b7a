use chrono::{DateTime, Utc};
use nw_core::{sort_by_recency, Article, NewsSummary, SentimentLabel};
use std::collections::{BTreeMap, HashMap};

pub const SUMMARY_ARTICLE_LIMIT: usize = 50;
pub const TOP_ENTITY_LIMIT: usize = 10;

/// Folds a set of articles into a [`NewsSummary`]. Holds no state between calls.
#[derive(Debug, Clone, Copy)]
pub struct SummaryBuilder {
    pub article_limit: usize,
    pub entity_limit: usize,
}

impl Default for SummaryBuilder {
    fn default() -> Self {
        Self {
            article_limit: SUMMARY_ARTICLE_LIMIT,
            entity_limit: TOP_ENTITY_LIMIT,
        }
    }
}

impl SummaryBuilder {
    pub fn build(&self, articles: &[Article], now: DateTime<Utc>) -> NewsSummary {
        let mut breakdown: BTreeMap<SentimentLabel, usize> = BTreeMap::new();
        let mut label_order: Vec<SentimentLabel> = Vec::new();
        let mut entity_counts: Vec<(String, usize)> = Vec::new();
        let mut entity_index: HashMap<&str, usize> = HashMap::new();

        for article in articles {
            if let Some(label) = article.sentiment {
                *breakdown.entry(label).or_default() += 1;
                if !label_order.contains(&label) {
                    label_order.push(label);
                }
            }
            for entity in &article.entities {
                match entity_index.get(entity.as_str()) {
                    Some(&idx) => entity_counts[idx].1 += 1,
                    None => {
                        entity_index.insert(entity.as_str(), entity_counts.len());
                        entity_counts.push((entity.clone(), 1));
                    }
                }
            }
        }

        // Strictly-greater keeps the first label seen when counts tie.
        let mut overall = SentimentLabel::Neutral;
        let mut best = 0;
        for label in label_order {
            let count = breakdown[&label];
            if count > best {
                best = count;
                overall = label;
            }
        }

        // Stable sort: equal counts stay in first-seen order.
        entity_counts.sort_by(|a, b| b.1.cmp(&a.1));
        let top_entities = entity_counts
            .into_iter()
            .take(self.entity_limit)
            .map(|(entity, _)| entity)
            .collect();

        let mut recent = articles.to_vec();
        sort_by_recency(&mut recent);
        recent.truncate(self.article_limit);

        NewsSummary {
            articles: recent,
            overall_sentiment: overall,
            sentiment_breakdown: breakdown,
            top_entities,
            last_updated: now,
        }
    }
}

pub fn summarize(articles: &[Article]) -> NewsSummary {
    summarize_at(articles, Utc::now())
}

pub fn summarize_at(articles: &[Article], now: DateTime<Utc>) -> NewsSummary {
    SummaryBuilder::default().build(articles, now)
}
