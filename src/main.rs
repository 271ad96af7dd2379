//! Event Collector - Binary Entry Point
//!
//! Runs either the collector (`server`) or a producer (`client`).

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;

use event_collector::config::{CollectorConfig, ProducerConfig};
use event_collector::logging::init_tracing;
use event_collector::producer::Producer;
use event_collector::server::{shutdown_signal, Collector};
use event_collector::CollectorResult;

#[derive(Debug, Parser)]
#[command(name = event_collector::NAME, version = event_collector::VERSION, about = "Telemetry event collector and producer")]
struct Cli {
    /// Path to the JSON config file
    #[arg(short, long, default_value = "config.json", env = "COLLECTOR_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Run the collector until Ctrl-C / SIGTERM
    Server,
    /// Send events to the collector, then report the collector's count
    Client {
        /// Number of events to send
        #[arg(long)]
        events: Option<usize>,
        /// Delay between events in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> CollectorResult<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = CollectorConfig::load(&cli.config)?;

    match cli.mode {
        Mode::Server => {
            let collector = Collector::bind(&config).await?;
            collector.run(shutdown_signal()).await
        }
        Mode::Client { events, delay_ms } => {
            let mut producer_config = ProducerConfig::default();
            if let Some(events) = events {
                producer_config.events = events;
            }
            if let Some(delay_ms) = delay_ms {
                producer_config.delay = Duration::from_millis(delay_ms);
            }

            let producer = Producer::new(config.base_url(), &config.log, producer_config);
            let accepted = producer.send().await?;
            let total = producer.fetch_total().await?;
            info!(accepted, total = ?total, "server logged events");
            Ok(())
        }
    }
}
