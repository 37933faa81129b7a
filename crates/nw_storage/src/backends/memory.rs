use async_trait::async_trait;
use nw_core::{Article, ArticleStorage, MergeStats, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Id-keyed article map behind a single async RwLock.
///
/// Merges take the write lock once for the whole batch, so a reader sees
/// either the map before the batch or after it, never a partial batch.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    articles: Arc<RwLock<HashMap<String, Article>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleStorage for MemoryStorage {
    async fn merge(&self, articles: Vec<Article>) -> Result<MergeStats> {
        let mut stats = MergeStats::default();
        let mut store = self.articles.write().await;
        for article in articles {
            match store.insert(article.id.clone(), article) {
                Some(_) => stats.replaced += 1,
                None => stats.inserted += 1,
            }
        }
        debug!(
            "💾 Merged {} new, {} replaced, {} total",
            stats.inserted,
            stats.replaced,
            store.len()
        );
        Ok(stats)
    }

    async fn snapshot(&self) -> Result<Vec<Article>> {
        let store = self.articles.read().await;
        Ok(store.values().cloned().collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Article>> {
        let store = self.articles.read().await;
        Ok(store.get(id).cloned())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.articles.read().await.len())
    }
}
