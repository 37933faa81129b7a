use async_trait::async_trait;
use serde::Serialize;
use crate::types::Article;
use crate::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub inserted: usize,
    pub replaced: usize,
}

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Insert or replace every article by id. The whole batch becomes visible at once.
    async fn merge(&self, articles: Vec<Article>) -> Result<MergeStats>;

    /// Every stored article, in no particular order.
    async fn snapshot(&self) -> Result<Vec<Article>>;

    async fn get(&self, id: &str) -> Result<Option<Article>>;

    async fn len(&self) -> Result<usize>;
}
