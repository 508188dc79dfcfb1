//! Logging setup.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Console output goes to stderr so
/// command output on stdout stays machine readable. When `file` is set, logs
/// are also appended there as JSON; keep the returned guard alive until exit
/// so buffered lines are flushed.
pub fn setup_logging(level: &str, json: bool, file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log level {:?}", level))?;

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if json {
        layers.push(fmt::layer().json().with_writer(std::io::stderr).boxed());
    } else {
        layers.push(fmt::layer().pretty().with_writer(std::io::stderr).boxed());
    }

    let guard = match file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("log file {} has no file name", path.display()))?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;

            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            layers.push(fmt::layer().json().with_ansi(false).with_writer(writer).boxed());
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(guard)
}
