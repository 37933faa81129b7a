use async_trait::async_trait;
use std::sync::Arc;
use crate::Result;

/// Raw output of a sentiment model before it is mapped onto the signed scale.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub confidence: f64,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

#[async_trait]
pub trait SentimentModel: Send + Sync {
    fn name(&self) -> &str;

    /// Classify a single piece of text.
    async fn predict(&self, text: &str) -> Result<Prediction>;
}

/// Produces a ready model. Called at most once per classifier.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    fn name(&self) -> &str;

    async fn load(&self) -> Result<Arc<dyn SentimentModel>>;
}
