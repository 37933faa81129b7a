pub mod error;
pub mod models;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use models::{ModelLoader, Prediction, SentimentModel};
pub use storage::{ArticleStorage, MergeStats};
pub use types::{
    fingerprint, sort_by_recency, Article, NewsSummary, RawEntry, Sentiment, SentimentLabel,
};
