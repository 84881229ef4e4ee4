use eyre::Result;
use serde::Deserialize;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::prelude::*;

/// Logging level. A "higher level" means more will be logged.
#[derive(Default, Debug, Clone, Copy, Deserialize, PartialOrd, Ord, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Level {
    /// Off
    Off = 0,
    /// Error
    Error = 1,
    /// Warn
    Warn = 2,
    /// Debug
    Debug = 3,
    /// Trace
    Trace = 5,
    /// Trace + Additional logs from dependencies
    DependencyTrace = 6,
    /// Info
    #[serde(other)]
    #[default]
    Info = 4,
}

impl From<Level> for LevelFilter {
    fn from(level: Level) -> LevelFilter {
        match level {
            Level::Off => LevelFilter::OFF,
            Level::Error => LevelFilter::ERROR,
            Level::Warn => LevelFilter::WARN,
            Level::Debug => LevelFilter::DEBUG,
            Level::Trace | Level::DependencyTrace => LevelFilter::TRACE,
            Level::Info => LevelFilter::INFO,
        }
    }
}

/// Output style for log records.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Style {
    /// JSON records, one per line
    Json,
    /// Single-line records
    Compact,
    /// Multi-line human-readable records
    #[default]
    Pretty,
}

/// Configuration for the tracing subscribers used by the relayer.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TracingConfig {
    #[serde(default)]
    fmt: Style,
    #[serde(default)]
    level: Level,
}

impl TracingConfig {
    /// Attempt to instantiate and register a tracing subscriber setup from
    /// settings.
    pub fn start_tracing(&self) -> Result<()> {
        let mut target_layer = Targets::new().with_default(self.level);

        if self.level < Level::DependencyTrace {
            // Reduce log noise from trusted libraries that we can reasonably assume are working correctly
            target_layer = target_layer
                .with_target("hyper", Level::Info)
                .with_target("warp", Level::Info)
                .with_target("tokio", Level::Debug)
                .with_target("tokio_util", Level::Debug);
        }

        let err_layer = tracing_error::ErrorLayer::default();
        let subscriber = tracing_subscriber::Registry::default()
            .with(target_layer)
            .with(err_layer);

        match self.fmt {
            Style::Json => subscriber
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?,
            Style::Compact => subscriber
                .with(tracing_subscriber::fmt::layer().compact())
                .try_init()?,
            Style::Pretty => subscriber
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?,
        }

        Ok(())
    }
}
