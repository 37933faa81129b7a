use humantime::format_duration;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::aggregator::Aggregator;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Refreshes an [`Aggregator`] on a fixed period, starting immediately.
pub struct RefreshScheduler {
    aggregator: Arc<Aggregator>,
    period: Duration,
}

impl RefreshScheduler {
    pub fn new(aggregator: Arc<Aggregator>, period: Duration) -> Self {
        Self {
            aggregator,
            // tokio refuses a zero period
            period: period.max(Duration::from_millis(1)),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Starts the refresh loop. Abort the handle to stop it.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.run_once().await;
                info!("⏰ Next refresh in {}", format_duration(self.period));
            }
        })
    }

    async fn run_once(&self) {
        if let Err(e) = self.aggregator.refresh_with_report().await {
            error!("Scheduled refresh failed: {}", e);
        }
    }
}
