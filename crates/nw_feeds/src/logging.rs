use std::collections::VecDeque;
use std::sync::Once;
use tracing::Level;

use crate::sources;

static INIT: Once = Once::new();

/// Prepends a chain of prefixes (emoji, source label) to every line.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    prefixes: VecDeque<String>,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logger tagged with the emoji and label of a feed endpoint.
    pub fn for_feed(endpoint: &str) -> Self {
        Self::new()
            .with_prefix(sources::emoji(endpoint).to_string())
            .with_prefix(format!("[{}]", sources::resolve(endpoint)))
    }

    pub fn with_prefix(mut self, prefix: String) -> Self {
        self.prefixes.push_back(prefix);
        self
    }

    fn prefix(&self) -> String {
        self.prefixes.iter().map(|p| format!("{} ", p)).collect()
    }

    pub fn info(&self, message: &str) {
        tracing::info!("{}{}", self.prefix(), message);
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!("{}{}", self.prefix(), message);
    }
}

/// Installs the global fmt subscriber. Later calls are no-ops.
pub fn init_logging(level: Level) -> Logger {
    if !tracing::dispatcher::has_been_set() {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_max_level(level)
                .with_target(false)
                .try_init();
        });
    }
    Logger::new()
}
