use clap::Parser;
use humantime::format_duration;
use nw_feeds::{handle_command, init_logging, Aggregator, AggregatorConfig, FeedCommands, RefreshScheduler};
use nw_inference::{create_classifier, ClassifierConfig, ModelKind};
use nw_web::{create_app, AppState, DEFAULT_ADDR};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};

const API_KEY_ENV: &str = "NEWSWIRE_API_KEY";

#[derive(Parser, Debug)]
#[command(name = "newswire", author, version, about = "Market news aggregation and sentiment", long_about = None)]
pub struct Cli {
    /// Feed URL to poll. Repeat for several; defaults to Yahoo Finance, CNBC and MarketWatch
    #[arg(long = "feed", global = true)]
    feeds: Vec<String>,
    #[arg(long, default_value = "memory", global = true)]
    storage: String,
    #[arg(long, default_value = "keyword", global = true, help = "Sentiment model: keyword (default), finbert, none")]
    model: ModelKind,
    /// Base URL of the remote classification endpoint
    #[arg(long, global = true)]
    model_url: Option<String>,
    /// Remote model name, e.g. ProsusAI/finbert
    #[arg(long, global = true)]
    model_name: Option<String>,
    /// API token for the remote model. Falls back to $NEWSWIRE_API_KEY
    #[arg(long, global = true)]
    api_key: Option<String>,
    /// Per-feed fetch timeout (e.g. 30s, 1m)
    #[arg(long, default_value = "30s", value_parser = humantime::parse_duration, global = true)]
    timeout: Duration,
    #[arg(long, default_value = "info", global = true)]
    log_level: Level,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP API and refresh feeds in the background
    Serve {
        #[arg(long, default_value = DEFAULT_ADDR)]
        addr: SocketAddr,
        /// Refresh period (e.g. 15m, 1h, 1h30m)
        #[arg(long, default_value = "15m", value_parser = humantime::parse_duration)]
        interval: Duration,
    },
    #[command(flatten)]
    Feeds(FeedCommands),
}

impl Cli {
    fn aggregator_config(&self) -> AggregatorConfig {
        let config = AggregatorConfig::default().with_fetch_timeout(self.timeout);
        if self.feeds.is_empty() {
            config
        } else {
            config.with_feeds(self.feeds.clone())
        }
    }

    fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            model: self.model,
            api_key: self.api_key.clone().or_else(|| std::env::var(API_KEY_ENV).ok()),
            model_name: self.model_name.clone(),
            endpoint: self.model_url.clone(),
        }
    }
}

async fn serve(aggregator: Arc<Aggregator>, addr: SocketAddr, interval: Duration) -> anyhow::Result<()> {
    let state = aggregator.classifier().warm_up().await;
    info!("🧠 Sentiment classifier state: {:?}", state);

    let scheduler = RefreshScheduler::new(aggregator.clone(), interval).spawn();
    info!("⏰ Refreshing {} feeds every {}", aggregator.config().feeds.len(), format_duration(interval));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌐 Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_app(AppState::new(aggregator)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.abort();
    info!("👋 Stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let storage = nw_storage::create_storage(&cli.storage)?;
    info!("💾 Storage initialized (using {})", cli.storage);

    let classifier_config = cli.classifier_config();
    info!("🧠 Sentiment model: {}", classifier_config.model);
    let classifier = Arc::new(create_classifier(&classifier_config));

    let aggregator = Arc::new(Aggregator::with_http(cli.aggregator_config(), classifier, storage)?);

    match cli.command {
        Commands::Serve { addr, interval } => serve(aggregator, addr, interval).await?,
        Commands::Feeds(command) => handle_command(command, &aggregator).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["newswire", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { addr, interval } => {
                assert_eq!(addr.port(), 8081);
                assert_eq!(interval, Duration::from_secs(15 * 60));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.model, ModelKind::Keyword);
        assert_eq!(cli.timeout, Duration::from_secs(30));
        assert_eq!(cli.aggregator_config().feeds.len(), 3);
    }

    #[test]
    fn test_feed_overrides_and_subcommands() {
        let cli = Cli::try_parse_from([
            "newswire",
            "refresh",
            "--feed",
            "https://a.example/rss",
            "--feed",
            "https://b.example/rss",
            "--model",
            "none",
            "--timeout",
            "5s",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Feeds(FeedCommands::Refresh)));
        let config = cli.aggregator_config();
        assert_eq!(config.feeds, vec!["https://a.example/rss", "https://b.example/rss"]);
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(cli.classifier_config().model, ModelKind::None);
    }

    #[test]
    fn test_serve_interval() {
        let cli = Cli::try_parse_from(["newswire", "serve", "--interval", "1h30m", "--addr", "127.0.0.1:9000"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Serve { interval, .. } if interval == Duration::from_secs(5400)
        ));
    }

    #[test]
    fn test_rejects_unknown_model() {
        assert!(Cli::try_parse_from(["newswire", "--model", "gpt", "sources"]).is_err());
    }

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
