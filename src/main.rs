use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use secnews::config::Config;
use secnews::{output, pipeline, subscriptions};

#[derive(Parser, Debug)]
#[command(name = "secnews", about = "Build a JSON digest of recent security news from OPML feeds")]
struct Args {
    /// Path to a TOML config file
    #[arg(long, value_name = "FILE", default_value = "secnews.toml")]
    config: PathBuf,

    /// OPML subscription list (overrides config)
    #[arg(long, value_name = "FILE")]
    opml: Option<PathBuf>,

    /// Output JSON path (overrides config)
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Recency window in days (overrides config)
    #[arg(long, value_name = "DAYS")]
    days: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config).context("Failed to load configuration")?;
    if let Some(opml) = args.opml {
        config.opml_path = opml;
    }
    if let Some(output) = args.output {
        config.output_path = output;
    }
    if let Some(days) = args.days {
        config.days_back = days;
    }

    // Fatal startup error: no subscription list means no run at all.
    let subs = subscriptions::load(&config.opml_path)
        .await
        .with_context(|| {
            format!(
                "Failed to load subscriptions from '{}'",
                config.opml_path.display()
            )
        })?;
    tracing::info!(feeds = subs.len(), opml = %config.opml_path.display(), "Loaded subscriptions");

    let client = reqwest::Client::builder()
        .user_agent(concat!("secnews/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let items = pipeline::aggregate(&client, &subs, config.days_back).await;

    let snapshot = output::build_snapshot(items, config.days_back);
    output::write_snapshot(&snapshot, &config.output_path).with_context(|| {
        format!(
            "Failed to write snapshot to '{}'",
            config.output_path.display()
        )
    })?;

    tracing::info!(
        items = snapshot.total_items,
        output = %config.output_path.display(),
        "Wrote digest"
    );
    println!(
        "Wrote {} items to {}",
        snapshot.total_items,
        config.output_path.display()
    );

    Ok(())
}
