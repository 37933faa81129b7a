pub mod aggregator;
pub mod cli;
pub mod config;
pub mod entities;
pub mod fetcher;
pub mod logging;
pub mod normalizer;
pub mod scheduler;
pub mod sources;

pub use aggregator::{Aggregator, FeedReport, RefreshReport};
pub use cli::{handle_command, FeedCommands};
pub use config::AggregatorConfig;
pub use fetcher::{parse_feed, FeedError, FeedSource, HttpFeedFetcher};
pub use logging::{init_logging, Logger};
pub use normalizer::{normalize, NormalizeError};
pub use scheduler::{RefreshScheduler, DEFAULT_REFRESH_INTERVAL};
pub use sources::{known_sources, SourceMetadata};

pub mod prelude {
    pub use super::{Aggregator, AggregatorConfig, FeedSource, RefreshScheduler};
    pub use nw_core::{Article, Error, RawEntry, Result};
}
