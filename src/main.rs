use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use rss_digest::{AppConfig, DigestPipeline, HttpFeedSource, SmtpSink};

#[derive(Parser)]
#[command(
    name = "rss-digest",
    about = "Aggregates RSS/Atom feeds into a single consolidated digest email"
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch all configured feeds and send the digest.
    Fetch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("creating data dir {}", config.data_dir.display()))?;

    // The bare invocation and `fetch` both run a single pass.
    match cli.command {
        None | Some(Command::Fetch) => {
            let source = HttpFeedSource::new(&config.fetch_config());
            let sink = SmtpSink::from_config(&config.smtp)?;
            let pipeline = DigestPipeline::new(config, source, sink);
            let report = pipeline.run().await?;
            info!(
                channels = report.channels,
                items = report.items,
                fetch_errors = report.fetch_errors,
                "digest run complete"
            );
        }
    }

    Ok(())
}
