use std::sync::Arc;
use nw_core::ModelLoader;
use crate::{Config, ModelKind};

pub mod finbert;
pub mod keyword;

pub use finbert::{FinBertLoader, FinBertModel};
pub use keyword::{KeywordLoader, KeywordModel};

/// Picks the loader for the configured model. `None` means no model at all.
pub fn create_loader(config: &Config) -> Option<Arc<dyn ModelLoader>> {
    match config.model {
        ModelKind::Keyword => Some(Arc::new(KeywordLoader)),
        ModelKind::FinBert => Some(Arc::new(FinBertLoader::new(config.clone()))),
        ModelKind::None => None,
    }
}
