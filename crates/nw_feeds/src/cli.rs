use clap::Subcommand;
use nw_core::Result;

use crate::aggregator::{Aggregator, RefreshReport};
use crate::sources;

#[derive(Subcommand, Debug, Clone)]
pub enum FeedCommands {
    /// Run one refresh cycle and print what each feed contributed
    Refresh,
    /// Refresh once, then print the aggregated summary as JSON
    Summary,
    /// List the configured feeds and the providers we recognize
    Sources,
}

pub async fn handle_command(command: FeedCommands, aggregator: &Aggregator) -> Result<()> {
    match command {
        FeedCommands::Refresh => {
            let report = aggregator.refresh_with_report().await?;
            print_report(&report);
        }
        FeedCommands::Summary => {
            aggregator.refresh_with_report().await?;
            let summary = aggregator.summary().await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        FeedCommands::Sources => {
            println!("Configured feeds:");
            for feed in &aggregator.config().feeds {
                println!("  {} {} ({})", sources::emoji(feed), feed, sources::resolve(feed));
            }
            println!("Known providers:");
            for source in sources::known_sources() {
                println!("  {} {} [{}]", source.emoji, source.name, source.domain);
            }
        }
    }
    Ok(())
}

fn print_report(report: &RefreshReport) {
    for feed in &report.feeds {
        match &feed.error {
            Some(error) => println!("❌ {} - {}", feed.source, error),
            None => println!(
                "✅ {} - {} fetched, {} accepted, {} rejected",
                feed.source,
                feed.fetched,
                feed.accepted,
                feed.rejected.len()
            ),
        }
        for reason in &feed.rejected {
            println!("   ⏭️ {}", reason);
        }
    }
    println!(
        "🆕 {} new, 📝 {} replaced, {} neutral fallbacks in {}ms",
        report.merge.inserted, report.merge.replaced, report.degraded, report.elapsed_ms
    );
}
