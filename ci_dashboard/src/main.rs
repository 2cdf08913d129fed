//! Centrix CI Dashboard — replays build events against a dashboard snapshot.
//!
//! Seeds the store from a snapshot, opens a location, then reads one JSON
//! envelope per line (from a file or stdin):
//!
//! ```text
//! {"event": "build:started", "data": {...}}
//! {"navigate": "#!/svenfuchs/minimal/builds"}
//! ```
//!
//! Render intents go to stdout; logs go to stderr.

use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use ci_dashboard::config::{DashboardConfig, OutputMode};
use ci_dashboard::store::EntityStore;
use ci_dashboard::view::navigation::Navigation;
use ci_dashboard::view::screen::Screen;
use ci_dashboard::{metrics, seeder, Dashboard};

#[derive(Parser)]
#[command(name = "centrix-ci-dashboard", about = "Centrix CI live dashboard event replay")]
struct Cli {
    /// Dashboard snapshot (JSON) to seed from
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Newline-delimited event envelopes; stdin when omitted
    #[arg(long)]
    events: Option<PathBuf>,

    /// Initial hash route, e.g. `#!/owner/name/builds`
    #[arg(short, long)]
    location: Option<String>,

    /// Output mode
    #[arg(long, value_enum)]
    output: Option<OutputMode>,

    /// Prometheus listen address
    #[arg(long)]
    metrics_addr: Option<SocketAddr>,

    /// Abort on the first rejected event
    #[arg(long)]
    strict: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope {
    Navigate {
        navigate: String,
    },
    Event {
        event: String,
        #[serde(default)]
        data: serde_json::Value,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .init();
    }

    let cli = Cli::parse();
    let mut config = DashboardConfig::from_env();
    if cli.snapshot.is_some() {
        config.snapshot_path = cli.snapshot;
    }
    if let Some(location) = cli.location {
        config.location = location;
    }
    if let Some(output) = cli.output {
        config.output = output;
    }
    if cli.metrics_addr.is_some() {
        config.metrics_addr = cli.metrics_addr;
    }
    config.strict |= cli.strict;

    tracing::info!("Starting Centrix CI Dashboard...");

    if let Some(addr) = config.metrics_addr {
        metrics::init_metrics(addr);
    }

    // Seed before subscribing, or early events would insert known repositories.
    let store = match &config.snapshot_path {
        Some(path) => seeder::load_snapshot(path).await?,
        None => {
            tracing::warn!("No snapshot configured -- starting from an empty dashboard");
            EntityStore::new()
        }
    };

    let navigation = Rc::new(Navigation::new());
    navigation.visit(&config.location, &store);
    let mut dashboard = Dashboard::new(store, navigation.clone());
    let mut output = Output::new(config.output);
    dashboard.mount();
    output.flush(&mut dashboard)?;

    let reader: Box<dyn AsyncBufRead + Unpin> = match &cli.events {
        Some(path) => Box::new(BufReader::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening events {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };
    let mut lines = reader.lines();

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut line_number = 0usize;
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("reading events")?,
            _ = &mut shutdown => break,
        };
        let Some(line) = line else {
            break;
        };
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Envelope>(&line) {
            Ok(Envelope::Navigate { navigate }) => {
                navigation.visit(&navigate, dashboard.store());
                dashboard.mount();
            }
            Ok(Envelope::Event { event, data }) => {
                if let Err(e) = dashboard.dispatch(&event, data) {
                    if config.strict {
                        return Err(e).with_context(|| format!("line {line_number}"));
                    }
                }
            }
            Err(e) => {
                tracing::warn!(line = line_number, "Skipping unreadable envelope: {e}");
                if config.strict {
                    return Err(e).with_context(|| format!("line {line_number}"));
                }
            }
        }
        output.flush(&mut dashboard)?;
    }

    output.finish()?;
    tracing::info!(
        events = line_number,
        repositories = dashboard.store().len(),
        "Event stream finished"
    );
    Ok(())
}

/// Writes intents as they are produced, or folds them into a screen printed at the end.
struct Output {
    mode: OutputMode,
    screen: Screen,
}

impl Output {
    fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            screen: Screen::new(),
        }
    }

    fn flush(&mut self, dashboard: &mut Dashboard) -> anyhow::Result<()> {
        let intents = dashboard.take_intents();
        match self.mode {
            OutputMode::Intents => {
                let mut stdout = std::io::stdout().lock();
                for intent in &intents {
                    serde_json::to_writer(&mut stdout, intent)?;
                    stdout.write_all(b"\n")?;
                }
                stdout.flush()?;
            }
            OutputMode::Screen => self.screen.apply_all(&intents),
        }
        Ok(())
    }

    fn finish(self) -> anyhow::Result<()> {
        if self.mode == OutputMode::Screen {
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &self.screen)?;
            stdout.write_all(b"\n")?;
        }
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
