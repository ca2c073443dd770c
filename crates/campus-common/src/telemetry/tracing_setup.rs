//! Process-wide tracing subscriber setup.
//!
//! Both binaries (REST API and gateway) install a subscriber as their first
//! act, before configuration is even loaded, so that config errors are
//! visible. `RUST_LOG` overrides the configured level when set.

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Subscriber options, applied through [`TracingConfig::init`]
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Base level filter when `RUST_LOG` is unset
    pub level: Level,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Emit span open/close events
    pub span_events: bool,
    /// Annotate events with file and line
    pub file_line: bool,
    /// Annotate events with thread names
    pub thread_names: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json: false,
            span_events: false,
            file_line: true,
            thread_names: false,
        }
    }
}

impl TracingConfig {
    /// Verbose human-readable output for local work
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            span_events: true,
            thread_names: true,
            ..Self::default()
        }
    }

    /// JSON lines for log shipping
    #[must_use]
    pub fn production() -> Self {
        Self {
            json: true,
            file_line: false,
            ..Self::default()
        }
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    /// Install the global subscriber described by this config.
    ///
    /// Fails if a subscriber is already installed, which happens when
    /// tests or embedding code initialized tracing first. Callers treat
    /// that as harmless.
    pub fn init(self) -> Result<(), TracingError> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.to_string()));
        let registry = tracing_subscriber::registry().with(filter);

        // The JSON and pretty layers are distinct types, hence two arms
        let installed = if self.json {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_file(self.file_line)
                        .with_line_number(self.file_line)
                        .with_thread_names(self.thread_names)
                        .with_span_events(self.span_events()),
                )
                .try_init()
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_file(self.file_line)
                        .with_line_number(self.file_line)
                        .with_thread_names(self.thread_names)
                        .with_span_events(self.span_events()),
                )
                .try_init()
        };

        installed.map_err(|_| TracingError::AlreadyInitialized)
    }
}

/// Install a subscriber with default options
pub fn try_init_tracing() -> Result<(), TracingError> {
    TracingConfig::default().init()
}

/// Tracing initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}
