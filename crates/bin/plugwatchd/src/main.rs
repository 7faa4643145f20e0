//! # plugwatchd — plugwatch daemon
//!
//! Composition root that wires the adapters together and runs the poll
//! loop.
//!
//! ## Responsibilities
//! - Parse CLI args and the TOML configuration
//! - Construct one monitor service per configured plug (HTTP client, CSV
//!   series, JSON document store, Telegram transport)
//! - Run the sequential poll loop, logging and skipping failed cycles
//! - Offer `--once` (single cycle) and `--replay` (offline regression run)
//! - Handle graceful shutdown (ctrl-c) between cycles
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use plugwatch_adapter_state_json::JsonStateStore;
use plugwatch_adapter_storage_csv::CsvSeriesStore;
use plugwatch_adapter_tasmota::TasmotaClient;
use plugwatch_adapter_telegram::TelegramNotifier;
use plugwatch_app::monitor::MonitorService;
use plugwatch_app::ports::{DeviceClient as _, SeriesStore as _, StateStore as _};
use plugwatch_app::replay::replay;

mod config;

use config::Config;

#[derive(Debug, Parser)]
#[command(name = "plugwatchd", about = "Smart plug power monitor")]
struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "plugwatch.toml")]
    config: PathBuf,
    /// Run a single poll cycle and exit.
    #[arg(long)]
    once: bool,
    /// Re-evaluate the recorded series of one configured host offline,
    /// print one CSV row per offset, and exit without sending anything.
    #[arg(long, value_name = "HOST")]
    replay: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(&args.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    match args.replay {
        Some(host) => run_replay(&config, &host).await,
        None => run_monitor(&config, args.once).await,
    }
}

/// Poll the device for its configured name, falling back to a generic
/// stem when it is unreachable. The name keys the on-disk file pair.
async fn resolve_name(client: &TasmotaClient, host: &str) -> String {
    match client.name().await {
        Ok(name) => name,
        Err(err) => {
            tracing::warn!(host, error = %err, "device name unavailable, using fallback");
            "plug".to_string()
        }
    }
}

fn file_stem(name: &str, host: &str) -> String {
    format!("{name}_{host}_log")
}

async fn run_replay(config: &Config, host: &str) -> anyhow::Result<()> {
    let client = TasmotaClient::new(host)?;
    let name = resolve_name(&client, host).await;
    let stem = file_stem(&name, host);

    let series = CsvSeriesStore::open(format!("{stem}.csv"))?;
    let samples = series.read_all().await?;
    let store = JsonStateStore::new(format!("{stem}.json"), config.document_template());
    let doc = store.load().await?;

    let display = doc.display_name(&name).to_string();
    print!("{}", replay(&samples, doc, &display)?);
    Ok(())
}

async fn run_monitor(config: &Config, once: bool) -> anyhow::Result<()> {
    let token = config.read_token()?;

    let mut services = Vec::new();
    for device in &config.devices {
        let client = TasmotaClient::new(&device.host)?;
        let name = resolve_name(&client, &device.host).await;
        let stem = file_stem(&name, &device.host);

        let series = CsvSeriesStore::open(format!("{stem}.csv"))?;
        let state = JsonStateStore::new(format!("{stem}.json"), config.document_template());
        let notifier = TelegramNotifier::new(&token, config.telegram.thread_id.clone())?;

        tracing::info!(host = %device.host, name = %name, "monitoring");
        services.push((
            device.host.clone(),
            MonitorService::new(client, series, state, notifier),
        ));
    }

    let interval = config.poll_interval();
    loop {
        let cycle_start = Instant::now();
        for (host, service) in &services {
            match service.tick().await {
                Ok(report) => {
                    tracing::debug!(%host, regime = %report.regime, "cycle complete");
                }
                Err(err) => {
                    tracing::warn!(%host, error = %err, "cycle failed, skipping device");
                }
            }
        }
        if once {
            break;
        }

        let wait = interval.saturating_sub(cycle_start.elapsed());
        tokio::select! {
            () = tokio::time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }
    Ok(())
}
