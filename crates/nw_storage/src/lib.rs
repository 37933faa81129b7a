use std::sync::Arc;
use nw_core::{ArticleStorage, Error, Result};

pub mod backends;

pub use backends::*;

/// Builds the storage backend named on the command line.
pub fn create_storage(kind: &str) -> Result<Arc<dyn ArticleStorage>> {
    match kind.to_lowercase().as_str() {
        "memory" => Ok(Arc::new(MemoryStorage::new())),
        other => Err(Error::Storage(format!("Unsupported storage backend: {other}"))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::create_storage;
}
