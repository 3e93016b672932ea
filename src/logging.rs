//! Tracing subscriber setup shared by both binaries.

use tracing_subscriber::EnvFilter;

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default filter directive (e.g. `info`, `leafscan=debug`), used when
    /// `RUST_LOG` is unset.
    pub level: String,
    /// Include module path targets.
    pub include_target: bool,
    /// Use ANSI colors.
    pub ansi_colors: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            include_target: false,
            ansi_colors: true,
        }
    }
}

impl LogConfig {
    /// Debug-level output with targets, for tracing individual requests.
    pub fn verbose() -> Self {
        Self {
            level: "debug".into(),
            include_target: true,
            ..Self::default()
        }
    }
}

/// Installs the global fmt subscriber.  Safe to call more than once; only the
/// first call takes effect.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.include_target)
        .with_ansi(config.ansi_colors)
        .compact()
        .try_init();
}
