use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use lazy_static::lazy_static;
use nw_core::{ModelLoader, Prediction, Result, SentimentModel};

lazy_static! {
    static ref POSITIVE_TERMS: HashSet<&'static str> = [
        "beat", "beats", "bullish", "boost", "boosts", "climb", "climbs", "exceed",
        "exceeds", "gain", "gains", "growth", "jump", "jumps", "outperform", "profit",
        "rally", "rallies", "rebound", "record", "rise", "rises", "soar", "soars",
        "strong", "surge", "surges", "upgrade", "upgraded",
    ]
    .into_iter()
    .collect();

    static ref NEGATIVE_TERMS: HashSet<&'static str> = [
        "bankruptcy", "bearish", "concern", "concerns", "crash", "cut", "cuts",
        "decline", "declines", "downgrade", "downgraded", "drop", "drops", "fall",
        "falls", "fear", "fears", "layoffs", "loss", "losses", "miss", "misses",
        "plunge", "plunges", "recession", "slump", "slumps", "tumble", "weak",
    ]
    .into_iter()
    .collect();
}

/// Lexicon model: counts finance-flavoured positive and negative terms.
pub struct KeywordModel;

impl fmt::Debug for KeywordModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeywordModel").finish()
    }
}

impl KeywordModel {
    pub fn new() -> Self {
        Self
    }

    fn score(text: &str) -> (usize, usize) {
        let lowered = text.to_lowercase();
        lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .fold((0, 0), |(pos, neg), word| {
                if POSITIVE_TERMS.contains(word) {
                    (pos + 1, neg)
                } else if NEGATIVE_TERMS.contains(word) {
                    (pos, neg + 1)
                } else {
                    (pos, neg)
                }
            })
    }
}

impl Default for KeywordModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SentimentModel for KeywordModel {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn predict(&self, text: &str) -> Result<Prediction> {
        let (pos, neg) = Self::score(text);
        let total = (pos + neg) as f64;
        // Confidence rises from 0.5 towards 1.0 as the vote gets lopsided.
        let prediction = if pos > neg {
            Prediction::new("positive", 0.5 + 0.5 * (pos - neg) as f64 / total)
        } else if neg > pos {
            Prediction::new("negative", 0.5 + 0.5 * (neg - pos) as f64 / total)
        } else {
            Prediction::new("neutral", 1.0)
        };
        Ok(prediction)
    }
}

pub struct KeywordLoader;

#[async_trait]
impl ModelLoader for KeywordLoader {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn load(&self) -> Result<Arc<dyn SentimentModel>> {
        Ok(Arc::new(KeywordModel::new()))
    }
}
