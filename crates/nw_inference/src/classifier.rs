use nw_core::{Article, ModelLoader, Sentiment, SentimentModel};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

/// Longest input, in characters, handed to a model.
pub const MAX_INPUT_CHARS: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifierState {
    NotAttempted,
    Ready,
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("sentiment model unavailable: {0}")]
    Unavailable(String),

    #[error("sentiment model failed: {0}")]
    Model(String),
}

enum Loaded {
    Ready(Arc<dyn SentimentModel>),
    Unavailable(String),
}

/// Wraps a sentiment model that is loaded lazily, at most once.
///
/// The first call to [`warm_up`](Self::warm_up) or any classify method runs
/// the loader; concurrent first callers wait on the same load. A failed load
/// parks the classifier in `Unavailable` for good and every later call
/// answers neutral without touching the model.
pub struct SentimentClassifier {
    loader: Option<Arc<dyn ModelLoader>>,
    state: OnceCell<Loaded>,
}

impl fmt::Debug for SentimentClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentimentClassifier")
            .field("loader", &self.loader.as_ref().map(|l| l.name().to_string()))
            .field("state", &self.state())
            .finish()
    }
}

impl SentimentClassifier {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader: Some(loader),
            state: OnceCell::new(),
        }
    }

    /// A classifier with no model behind it. Always neutral.
    pub fn disabled() -> Self {
        Self {
            loader: None,
            state: OnceCell::new(),
        }
    }

    pub fn state(&self) -> ClassifierState {
        match self.state.get() {
            None => ClassifierState::NotAttempted,
            Some(Loaded::Ready(_)) => ClassifierState::Ready,
            Some(Loaded::Unavailable(reason)) => ClassifierState::Unavailable(reason.clone()),
        }
    }

    pub async fn warm_up(&self) -> ClassifierState {
        self.loaded().await;
        self.state()
    }

    async fn loaded(&self) -> &Loaded {
        self.state
            .get_or_init(|| async {
                let Some(loader) = &self.loader else {
                    warn!("🧠 No sentiment model configured, articles will be scored neutral");
                    return Loaded::Unavailable("no sentiment model configured".to_string());
                };

                info!("🧠 Loading sentiment model: {}", loader.name());
                match loader.load().await {
                    Ok(model) => {
                        info!("✨ Sentiment model ready: {}", model.name());
                        Loaded::Ready(model)
                    }
                    Err(e) => {
                        error!("Failed to load sentiment model {}: {}", loader.name(), e);
                        Loaded::Unavailable(e.to_string())
                    }
                }
            })
            .await
    }

    pub async fn try_classify(&self, text: &str) -> Result<Sentiment, ClassifyError> {
        let model = match self.loaded().await {
            Loaded::Ready(model) => model,
            Loaded::Unavailable(reason) => return Err(ClassifyError::Unavailable(reason.clone())),
        };

        let prediction = model
            .predict(truncate_chars(text, MAX_INPUT_CHARS))
            .await
            .map_err(|e| ClassifyError::Model(e.to_string()))?;

        Ok(Sentiment::from_prediction(&prediction.label, prediction.confidence))
    }

    /// Never fails: anything that goes wrong degrades to neutral.
    pub async fn classify(&self, text: &str) -> Sentiment {
        match self.try_classify(text).await {
            Ok(sentiment) => sentiment,
            Err(ClassifyError::Unavailable(_)) => Sentiment::neutral(),
            Err(e) => {
                debug!("Degrading to neutral: {}", e);
                Sentiment::neutral()
            }
        }
    }

    /// Always stamps a sentiment on the article. The error, if any, says why
    /// it is the neutral fallback rather than a model result.
    pub async fn classify_article(&self, article: &mut Article) -> Result<(), ClassifyError> {
        match self.try_classify(&article.classification_text()).await {
            Ok(sentiment) => {
                article.set_sentiment(sentiment);
                Ok(())
            }
            Err(e) => {
                if let ClassifyError::Model(_) = &e {
                    debug!("Sentiment failed for '{}': {}", article.title, e);
                }
                article.set_sentiment(Sentiment::neutral());
                Err(e)
            }
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
