//! Command-line front end for pricewatch.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use pricewatch::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "pricewatch", about = "Extract product prices from e-commerce pages", version)]
struct Cli {
    /// JSON configuration file (defaults apply to missing fields)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract the current price of one product page
    Extract {
        /// Product page URL
        url: String,
    },
    /// Check a list of price alerts
    Check {
        /// JSON file holding `[{"url": ..., "target_price": ...}]`
        #[arg(long)]
        alerts: PathBuf,
    },
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PricewatchConfig> {
    match path {
        Some(path) => PricewatchConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(PricewatchConfig::default()),
    }
}

fn load_alerts(path: &Path) -> anyhow::Result<Vec<PriceAlert>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading alerts from {}", path.display()))?;
    let alerts: Vec<PriceAlert> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing alerts in {}", path.display()))?;
    for (index, alert) in alerts.iter().enumerate() {
        alert
            .validate()
            .with_context(|| format!("alert {index} in {}", path.display()))?;
    }
    Ok(alerts)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let config = load_config(cli.config.as_deref())?;
    let extractor = PriceExtractor::with_reqwest(config.clone()).context("building HTTP client")?;

    match cli.command {
        Commands::Extract { url } => match extractor.extract(&url).await {
            ExtractionResult::Found { price, strategy } => {
                println!("{price:.2} (via {strategy})");
            }
            ExtractionResult::NotFound(reason) => {
                println!("no price found ({reason})");
            }
        },
        Commands::Check { alerts } => {
            let alerts = load_alerts(&alerts)?;
            let runner = BatchRunner::new(Arc::new(extractor), config.batch.clone());
            let summary = runner.run(alerts, &LoggingPriceSink).await;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
