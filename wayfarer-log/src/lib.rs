//! Wayfarer logging
//!
//! Structured logging for the Wayfarer site backend, built on `tracing`.
//! Defaults to JSON lines on STDOUT at INFO level.
//!
//! # Environment Variables
//!
//! - `WAYFARER_DEBUG=1` - Force debug level
//! - `WAYFARER_LOG_LEVEL=trace|debug|info|warn|error` - Set log level
//! - `WAYFARER_LOG_FORMAT=json|plain|pretty|compact` - Set output format
//! - `RUST_LOG` - Overrides the level filter entirely when set
//!
//! # Usage
//!
//! ```no_run
//! use wayfarer_log::{info, LogConfig};
//!
//! let _guard = LogConfig::from_env().init().expect("logging");
//! info!(port = 3000, "Server starting");
//! ```

use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub use tracing::{Level, debug, error, info, trace, warn};

/// Errors raised while installing the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("Failed to open log file: {0}")]
    Io(#[from] io::Error),

    #[error("A global logger is already installed")]
    AlreadyInitialized,
}

// ============================================================================
// Levels and formats
// ============================================================================

/// Log level filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse a level name. `warning` is accepted as an alias for `warn`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    pub fn to_tracing_level(&self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }

    /// Directive string for `EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Structured, machine-readable (default)
    Json,
    /// Single-line human-readable
    Plain,
    /// Multi-line, for local development
    Pretty,
    /// Minimal output
    Compact,
}

impl LogFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "plain" => Some(LogFormat::Plain),
            "pretty" => Some(LogFormat::Pretty),
            "compact" => Some(LogFormat::Compact),
            _ => None,
        }
    }
}

/// Output destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    /// Append to a single file
    File(String),
    /// Daily-rotated files under `directory`
    RollingFile { directory: String, prefix: String },
}

// ============================================================================
// Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Include target (module path)
    pub targets: bool,
    /// Enable ANSI colors (ignored for JSON)
    pub colors: bool,
    /// Custom filter such as `wayfarer_report=debug,hyper=warn`; overrides `level`
    pub env_filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Json,
            output: LogOutput::Stdout,
            targets: true,
            colors: false,
            env_filter: None,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build from an explicit set of variables.
    ///
    /// Unknown level or format values fall back to the defaults rather than
    /// failing; logging must come up even when misconfigured.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        let mut debug = false;
        let mut level = None;

        for (key, value) in vars {
            let value = value.as_ref();
            match key.as_ref() {
                "WAYFARER_DEBUG" => debug = value == "1" || value.eq_ignore_ascii_case("true"),
                "WAYFARER_LOG_LEVEL" => level = LogLevel::parse(value),
                "WAYFARER_LOG_FORMAT" => {
                    if let Some(format) = LogFormat::parse(value) {
                        config.format = format;
                    }
                }
                "RUST_LOG" if !value.is_empty() => config.env_filter = Some(value.to_string()),
                _ => {}
            }
        }

        config.level = match (level, debug) {
            (Some(level), true) => level.min(LogLevel::Debug),
            (Some(level), false) => level,
            (None, true) => LogLevel::Debug,
            (None, false) => LogLevel::Info,
        };
        config.colors = matches!(config.format, LogFormat::Pretty | LogFormat::Compact);
        config
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_targets(mut self, enable: bool) -> Self {
        self.targets = enable;
        self
    }

    pub fn with_colors(mut self, enable: bool) -> Self {
        self.colors = enable;
        self
    }

    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    fn filter(&self) -> EnvFilter {
        self.env_filter
            .as_deref()
            .and_then(|f| EnvFilter::try_new(f).ok())
            .unwrap_or_else(|| EnvFilter::new(self.level.as_str()))
    }

    /// Install the global subscriber.
    ///
    /// The returned guard flushes buffered lines when dropped and must be
    /// kept alive for the lifetime of the process.
    pub fn init(self) -> Result<WorkerGuard, LogError> {
        let filter = self.filter();

        let (writer, guard) = match &self.output {
            LogOutput::Stdout => tracing_appender::non_blocking(io::stdout()),
            LogOutput::Stderr => tracing_appender::non_blocking(io::stderr()),
            LogOutput::File(path) => {
                let file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)?;
                tracing_appender::non_blocking(file)
            }
            LogOutput::RollingFile { directory, prefix } => {
                tracing_appender::non_blocking(tracing_appender::rolling::daily(directory, prefix))
            }
        };

        let registry = tracing_subscriber::registry().with(filter);
        let installed = match self.format {
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(writer)
                        .with_target(self.targets),
                )
                .try_init(),
            LogFormat::Plain => registry
                .with(
                    fmt::layer()
                        .with_writer(writer)
                        .with_target(self.targets)
                        .with_ansi(self.colors),
                )
                .try_init(),
            LogFormat::Pretty => registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_writer(writer)
                        .with_target(self.targets)
                        .with_ansi(self.colors),
                )
                .try_init(),
            LogFormat::Compact => registry
                .with(
                    fmt::layer()
                        .compact()
                        .with_writer(writer)
                        .with_target(self.targets)
                        .with_ansi(self.colors),
                )
                .try_init(),
        };

        installed.map_err(|_| LogError::AlreadyInitialized)?;
        Ok(guard)
    }
}
