use std::fmt;
use std::str::FromStr;

pub mod classifier;
pub mod models;
pub mod summary;

pub use classifier::{ClassifierState, ClassifyError, SentimentClassifier};
pub use models::create_loader;
pub use summary::{summarize, summarize_at, SummaryBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelKind {
    #[default]
    Keyword,
    FinBert,
    None,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Keyword => write!(f, "keyword"),
            ModelKind::FinBert => write!(f, "finbert"),
            ModelKind::None => write!(f, "none"),
        }
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keyword" => Ok(ModelKind::Keyword),
            "finbert" => Ok(ModelKind::FinBert),
            "none" | "off" => Ok(ModelKind::None),
            _ => Err(format!("Unknown sentiment model: {s}. Available: keyword, finbert, none")),
        }
    }
}

#[derive(Clone, Default)]
pub struct Config {
    pub model: ModelKind,
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub endpoint: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

pub type ClassifierConfig = Config;

/// Classifier for the configured model, not yet loaded.
pub fn create_classifier(config: &Config) -> SentimentClassifier {
    match create_loader(config) {
        Some(loader) => SentimentClassifier::new(loader),
        None => SentimentClassifier::disabled(),
    }
}

pub mod prelude {
    pub use super::{create_classifier, Config, ModelKind};
    pub use super::classifier::{ClassifierState, SentimentClassifier};
    pub use super::summary::{summarize, SummaryBuilder};
    pub use nw_core::{Article, NewsSummary, Result, Error, Sentiment, SentimentLabel};
}
