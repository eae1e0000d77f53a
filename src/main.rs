use anyhow::{Context, Result};
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "convomux", about = "Voice-agent conversation reconciliation engine")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Session event log to replay (JSON Lines, one event per line)
    events: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = convomux_core::AppConfig::load_from_file(&cli.config)
        .with_context(|| format!("failed to load config from {:?}", cli.config))?;

    let env_filter =
        EnvFilter::try_new(&config.general.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("convomux starting");

    let sink = Arc::new(convomux_session::NullSink::new());
    let mut host = convomux_session::SessionHost::new(&config, sink)
        .context("failed to build session host")?;
    let snapshot_rx = host.subscribe();
    let event_tx = host.event_sender();
    host.start();

    let file = std::fs::File::open(&cli.events)
        .with_context(|| format!("failed to open event log {:?}", cli.events))?;
    let reader = std::io::BufReader::new(file);

    let mut fed = 0usize;
    let mut skipped = 0usize;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.context("failed to read event log")?;
        if line.trim().is_empty() {
            continue;
        }
        match convomux_session::decode_event(&line) {
            Ok(Some(event)) => {
                event_tx
                    .send(event)
                    .context("session host stopped unexpectedly")?;
                fed += 1;
            }
            Ok(None) => {
                skipped += 1;
            }
            Err(e) => {
                tracing::warn!(line = line_no + 1, "skipping undecodable event: {e}");
                skipped += 1;
            }
        }
    }

    tracing::info!("replayed {fed} event(s), skipped {skipped}");

    // Let the host drain the queue, then read the final snapshot
    drop(event_tx);
    host.shutdown().await;

    let snapshot = snapshot_rx.borrow().clone();
    let rendered =
        serde_json::to_string_pretty(&snapshot).context("failed to render snapshot")?;
    println!("{rendered}");

    if snapshot.order.is_complete {
        tracing::info!(
            order_id = ?snapshot.order.order_id,
            "order extracted for {}",
            snapshot.order.customer_name,
        );
    }

    Ok(())
}
