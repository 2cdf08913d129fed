//! Dashboard configuration — loaded from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::ValueEnum;

/// What the replay binary writes to stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// One render intent per line, as JSON.
    #[default]
    Intents,
    /// The final rendered screen, as pretty JSON.
    Screen,
}

#[derive(Clone, Debug)]
pub struct DashboardConfig {
    /// Bootstrap snapshot to seed the store from.
    pub snapshot_path: Option<PathBuf>,
    /// Hash route shown before the first event.
    pub location: String,
    /// Prometheus listener; metrics are disabled when unset.
    pub metrics_addr: Option<SocketAddr>,
    pub output: OutputMode,
    /// Stop at the first rejected event instead of skipping it.
    pub strict: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            location: "#!/".to_string(),
            metrics_addr: None,
            output: OutputMode::Intents,
            strict: false,
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let snapshot_path = std::env::var("CI_SNAPSHOT").ok().map(PathBuf::from);
        let location = std::env::var("CI_LOCATION").unwrap_or(defaults.location);
        let metrics_addr = std::env::var("CI_METRICS_ADDR").ok().and_then(|s| {
            s.parse()
                .map_err(|_| tracing::warn!("CI_METRICS_ADDR `{s}` is not a socket address -- metrics disabled"))
                .ok()
        });
        let output = std::env::var("CI_OUTPUT")
            .ok()
            .and_then(|s| OutputMode::from_str(&s, true).ok())
            .unwrap_or(defaults.output);
        let strict = std::env::var("CI_STRICT_EVENTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.strict);

        Self {
            snapshot_path,
            location,
            metrics_addr,
            output,
            strict,
        }
    }
}
