use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use nw_core::{Error, ModelLoader, Prediction, Result, SentimentModel};
use crate::Config;

pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_MODEL: &str = "ProsusAI/finbert";

const PROBE_TEXT: &str = "Stocks closed higher after the earnings report.";

#[derive(Serialize)]
struct ClassificationRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// Text-classification endpoints answer either a flat list of label scores
/// or one such list per input.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassificationResponse {
    Batched(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassificationResponse {
    fn best(self) -> Option<Prediction> {
        let scores = match self {
            ClassificationResponse::Batched(batches) => batches.into_iter().next()?,
            ClassificationResponse::Flat(scores) => scores,
        };
        scores
            .into_iter()
            .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
            .map(|s| Prediction::new(s.label, s.score))
    }
}

/// FinBERT-style classifier served over HTTP.
pub struct FinBertModel {
    client: Arc<Client>,
    api_key: String,
    url: String,
}

impl FinBertModel {
    pub fn new(api_key: String, endpoint: Option<&str>, model: Option<&str>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        let endpoint = endpoint.unwrap_or(DEFAULT_ENDPOINT).trim_end_matches('/');
        Ok(Self {
            client: Arc::new(client),
            api_key,
            url: format!("{}/{}", endpoint, model.unwrap_or(DEFAULT_MODEL)),
        })
    }
}

impl fmt::Debug for FinBertModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinBertModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("url", &self.url)
            .finish()
    }
}

#[async_trait]
impl SentimentModel for FinBertModel {
    fn name(&self) -> &str {
        "FinBERT"
    }

    async fn predict(&self, text: &str) -> Result<Prediction> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&ClassificationRequest { inputs: text })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!("{} returned {status}: {body}", self.url)));
        }

        response
            .json::<ClassificationResponse>()
            .await?
            .best()
            .ok_or_else(|| Error::Inference("Empty classification response".to_string()))
    }
}

/// Builds the remote model and probes it once; any failure leaves the
/// classifier unavailable.
pub struct FinBertLoader {
    config: Config,
}

impl FinBertLoader {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ModelLoader for FinBertLoader {
    fn name(&self) -> &str {
        self.config.model_name.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    async fn load(&self) -> Result<Arc<dyn SentimentModel>> {
        let api_key = self
            .config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Inference("No API token configured for the FinBERT endpoint".to_string()))?;

        let model = FinBertModel::new(
            api_key,
            self.config.endpoint.as_deref(),
            self.config.model_name.as_deref(),
        )?;
        model.predict(PROBE_TEXT).await?;
        Ok(Arc::new(model))
    }
}
