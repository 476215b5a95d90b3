//! Logging setup for the Memoneo diary client
//!
//! Installs a `tracing` subscriber with up to two outputs:
//!
//! - **Console**: pretty human-readable or JSONL
//! - **File**: JSONL through `tracing-appender`, rolled daily or hourly
//!
//! Each output has its own `EnvFilter`; `RUST_LOG` overrides both.
//!
//! # Quick Start
//!
//! ```ignore
//! use memoneo_logging::{LogConfig, SubscriberBuilder};
//!
//! // Keep the guard alive so buffered file output gets flushed
//! let _guard = SubscriberBuilder::new()
//!     .with_config(LogConfig::production("./logs".into()))
//!     .try_init()?;
//! ```

pub mod config;
pub mod error;

pub use config::{ConsoleConfig, FileConfig, JsonlConfig, LogConfig, RotationStrategy};
pub use error::{LogError, LogResult};
pub use tracing_appender::non_blocking::WorkerGuard;

use std::fs::{self, File};

use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, MakeWriter, TestWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn jsonl_layer<W>(jsonl: &JsonlConfig, writer: W, level: &str) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .json()
        .with_current_span(jsonl.include_current_span)
        .with_span_list(jsonl.include_spans)
        .flatten_event(jsonl.flatten_events)
        .with_file(jsonl.include_location)
        .with_line_number(jsonl.include_location)
        .with_writer(writer)
        .with_filter(env_filter(level))
        .boxed()
}

fn pretty_layer<W>(ansi: bool, writer: W, level: &str) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .pretty()
        .with_ansi(ansi)
        .with_target(true)
        .with_writer(writer)
        .with_filter(env_filter(level))
        .boxed()
}

fn console_layer(config: &LogConfig) -> BoxedLayer {
    let level = config.console_level();
    let console = &config.console;
    match (console.pretty, console.test_writer) {
        (true, true) => pretty_layer(console.ansi, TestWriter::new(), level),
        (true, false) => pretty_layer(console.ansi, std::io::stdout, level),
        (false, true) => jsonl_layer(&config.jsonl, TestWriter::new(), level),
        (false, false) => jsonl_layer(&config.jsonl, std::io::stdout, level),
    }
}

/// Open the writer for file output; `Never` truncates a single file
fn file_writer(file: &FileConfig) -> LogResult<(NonBlocking, WorkerGuard)> {
    let rotation = match file.rotation {
        RotationStrategy::Never => {
            fs::create_dir_all(&file.directory)?;
            let path = file.directory.join(format!("{}.log", file.prefix));
            return Ok(tracing_appender::non_blocking(File::create(path)?));
        }
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Hourly => Rotation::HOURLY,
    };

    let mut builder = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(file.prefix.as_str())
        .filename_suffix("log");
    if let Some(max_files) = file.max_files {
        builder = builder.max_log_files(max_files);
    }

    let appender = builder.build(&file.directory)?;
    Ok(tracing_appender::non_blocking(appender))
}

/// Builder for configuring and installing the global subscriber
#[derive(Debug, Default)]
pub struct SubscriberBuilder {
    config: LogConfig,
}

impl SubscriberBuilder {
    /// Default: JSONL output to console
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.default_level = level.into();
        self
    }

    /// Enable or disable console output
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.console.enabled = enabled;
        self
    }

    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Install the subscriber globally.
    ///
    /// The returned guard flushes file output on drop and must outlive all
    /// logging. Fails instead of panicking when a subscriber already exists.
    pub fn try_init(self) -> LogResult<Option<WorkerGuard>> {
        let mut layers: Vec<BoxedLayer> = Vec::new();
        if self.config.console.enabled {
            layers.push(console_layer(&self.config));
        }

        let mut guard = None;
        if let Some(file) = &self.config.file {
            let (writer, file_guard) = file_writer(file)?;
            layers.push(jsonl_layer(
                &self.config.jsonl,
                writer,
                &self.config.default_level,
            ));
            guard = Some(file_guard);
        }

        Registry::default()
            .with(layers)
            .try_init()
            .map_err(|e| LogError::AlreadyInitialized(e.to_string()))?;

        Ok(guard)
    }
}

/// Initialize logging for development (verbose, pretty console output)
pub fn init_development() -> LogResult<()> {
    SubscriberBuilder::new()
        .with_config(LogConfig::development())
        .try_init()
        .map(|_| ())
}

/// Initialize logging for tests; repeated calls are no-ops
pub fn init_testing() {
    let _ = SubscriberBuilder::new()
        .with_config(LogConfig::testing())
        .try_init();
}
