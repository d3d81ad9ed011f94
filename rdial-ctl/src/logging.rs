//! Log destination setup
//!
//! Logs go to stdout by default, or are appended to a file. The returned
//! [`LogHandle`] owns the destination; close it once the controller has
//! stopped so buffered output reaches the disk.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::Arc;

use rdial_common::config::{expand_home, LoggingConfig};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{Error, Result};

/// Open log destination
#[derive(Debug)]
pub struct LogHandle {
    file: Option<Arc<File>>,
    destination: String,
}

impl LogHandle {
    /// Where log output is going (`stdout` or the file path)
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Flush and sync the log file
    pub fn close(self) -> io::Result<()> {
        match &self.file {
            Some(file) => {
                (&**file).flush()?;
                file.sync_all()
            }
            None => io::stdout().flush(),
        }
    }
}

/// Filter for the configured level; `RUST_LOG` overrides it
pub fn build_filter(level: &str, verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { level };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("rdial_ctl={level},rdial_common={level}"))
    })
}

/// Install the global subscriber
///
/// # Errors
/// `InvalidConfig` if the log file cannot be opened or a subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> Result<LogHandle> {
    let filter = build_filter(&config.level, verbose);

    let (writer, file, destination) = match &config.file {
        Some(path) => {
            let path = expand_home(path);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| {
                    Error::InvalidConfig(format!("cannot open log file {}: {}", path.display(), e))
                })?;
            let file = Arc::new(file);
            (
                BoxMakeWriter::new(file.clone()),
                Some(file),
                path.display().to_string(),
            )
        }
        None => (BoxMakeWriter::new(io::stdout), None, "stdout".to_string()),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(file.is_none()),
        )
        .try_init()
        .map_err(|e| Error::InvalidConfig(format!("logging already initialised: {}", e)))?;

    Ok(LogHandle { file, destination })
}
