//! crypto_observe - Main Entry Point
//!
//! Polls the ticker endpoint and logs increase/decrease alerts until
//! Ctrl-C, or until the first error when asked to stop on error.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crypto_observe::common::channels::create_event_channel_with_size;
use crypto_observe::config::load_config;
use crypto_observe::{
    ErrorPolicy, EventKind, LogObserver, Scheduler, SnapshotFetcher, TickerRestClient, WatchEvent,
};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Comma-separated list of currencies to watch; overrides the config file
    #[arg(long, env = "CRYPTO_OBSERVE_CURRENCIES")]
    currencies: Option<String>,

    /// Poll once and exit, ignoring the configured frequency
    #[arg(long)]
    once: bool,

    /// Stop polling after the first error event
    #[arg(long)]
    stop_on_error: bool,
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let mut raw = load_config(Some(&args.config)).context("loading configuration")?;

    // Initialize logging
    let level = parse_level(args.log_level.as_deref().unwrap_or(&raw.settings.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting crypto_observe");
    info!("Configuration file: {}", args.config);

    if let Some(list) = &args.currencies {
        raw.currencies = list
            .split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
    }
    if args.once {
        raw.frequency = None;
    }

    let config = raw.validate().context("invalid configuration")?;
    let fetcher = TickerRestClient::from_config(&raw.source)?;

    info!(
        source = fetcher.source_name(),
        url = %fetcher.base_url(),
        currencies = ?config.asset_ids(),
        interval = ?config.poll_interval(),
        rules = config.rules().len(),
        "Observer configured"
    );

    let policy = if args.stop_on_error || raw.settings.stop_on_error {
        ErrorPolicy::Stop
    } else {
        ErrorPolicy::Continue
    };

    let mut scheduler = Scheduler::new(config, fetcher).with_error_policy(policy);
    scheduler.on_any(LogObserver);
    scheduler.on(EventKind::Data, |event: &WatchEvent| {
        if let WatchEvent::Data(batch) = event {
            info!("data length: {}", batch.len());
        }
    });
    scheduler.on(EventKind::Error, |event: &WatchEvent| {
        if let WatchEvent::Error(e) = event {
            if e.is_fetch_error() {
                warn!("Fetch failed, will retry on next cycle: {}", e);
            } else {
                error!("{}", e);
            }
        }
    });

    // Alerts are printed from their own task, fed through a channel
    let (alerts, mut alert_rx) = create_event_channel_with_size(raw.settings.channel_size.max(1));
    for kind in [EventKind::Increase, EventKind::Decrease, EventKind::Danger] {
        scheduler.on(kind, alerts.clone());
    }
    let printer = tokio::spawn(async move {
        while let Some(event) = alert_rx.recv().await {
            if let Some(snapshot) = event.snapshot() {
                let symbol = snapshot.symbol.as_deref().unwrap_or(&snapshot.asset_id);
                let changes: Vec<String> = snapshot
                    .changes
                    .iter()
                    .map(|(window, change)| format!("{}: {:+.2}%", window, change))
                    .collect();
                println!("[{}] {} {}", event.kind(), symbol, changes.join(" "));
            }
        }
    });
    drop(alerts);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal, cleaning up...");
    };

    let cycles = scheduler.run_until(shutdown).await;
    info!(cycles, "Observer stopped");

    // Dropping the scheduler closes the alert channel and lets the printer drain
    drop(scheduler);
    printer.await?;

    Ok(())
}
