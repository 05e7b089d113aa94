use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use linkwatch::{FileTopology, Server, SessionOptions, Settings};
use linkwatch_overlay::{Mode, Output, Overlay};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "linkwatch")]
#[command(about = "Live link-traffic overlay server for network topology views")]
struct Args {
    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (host:port)
    #[arg(short, long)]
    listen: Option<String>,

    /// Path to the topology JSON document
    #[arg(short, long)]
    topology: Option<PathBuf>,

    /// Interval between highlight builds in milliseconds
    #[arg(long)]
    period_ms: Option<u64>,

    /// Initial traffic threshold in kilobytes/sec
    #[arg(long)]
    threshold_kbps: Option<u64>,

    /// Write one highlight snapshot to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(listen) = &self.listen {
            settings.listen = listen.clone();
        }
        if let Some(topology) = &self.topology {
            settings.topology = topology.clone();
        }
        if let Some(period_ms) = self.period_ms {
            settings.period_ms = period_ms;
        }
        if let Some(threshold_kbps) = self.threshold_kbps {
            settings.threshold_kbps = threshold_kbps;
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings);
    settings.validate()?;

    let rt = tokio::runtime::Runtime::new()?;

    if let Some(export_path) = &args.export {
        return rt.block_on(export_to_file(&settings, export_path));
    }
    rt.block_on(run_server(settings))
}

/// Serve sessions until the listener fails or ctrl-c.
async fn run_server(settings: Settings) -> Result<()> {
    let topology = Arc::new(FileTopology::open(&settings.topology));
    if let Some(e) = topology.error() {
        warn!("Starting with empty topology: {}", e);
    }

    let reload = topology.clone();
    let reload_interval = settings.reload_interval();
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(reload_interval);
        loop {
            timer.tick().await;
            reload.refresh();
        }
    });

    let listener = TcpListener::bind(settings.listen.as_str())
        .await
        .with_context(|| format!("Failed to bind {}", settings.listen))?;
    let server = Server::new(
        topology.clone(),
        topology,
        SessionOptions::from(&settings),
    );

    tokio::select! {
        result = server.serve(listener) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            Ok(())
        }
    }
}

/// Build one snapshot from the topology file and write it out.
async fn export_to_file(settings: &Settings, export_path: &Path) -> Result<()> {
    let topology = Arc::new(FileTopology::open(&settings.topology));
    if let Some(e) = topology.error() {
        anyhow::bail!("Failed to load {}: {}", settings.topology.display(), e);
    }

    let overlay = Overlay::builder()
        .topology(topology.clone())
        .loads(topology)
        .output(Output::file(export_path))
        .threshold_kbps(settings.threshold_kbps)
        .build()?;

    // The immediate build on entering monitor mode overwrites the clear
    overlay.start(Mode::Monitor).await?;

    println!("Exported highlights to {}", export_path.display());
    Ok(())
}
