//! Bootstrap configuration loading and config file resolution
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments (applied by the binary on top of the loaded file)
//! 2. `--config` path, then the `RDIAL_CONFIG` environment variable
//! 3. `~/.config/rdial/config.toml`, then `/etc/rdial/config.toml`
//! 4. Built-in defaults
//!
//! A missing config file never stops startup: a warning is logged and the
//! built-in defaults are used. A file that exists but cannot be read or
//! parsed is an error.

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "RDIAL_CONFIG";

/// Bootstrap configuration loaded from TOML
///
/// Every section and field is optional; omitted values fall back to the
/// defaults of the stock hardware setup (MPD on localhost, Arduino on
/// `/dev/ttyUSB0`, 100ms ticks).
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    pub mpd: MpdConfig,
    pub sensor: SensorConfig,
    pub controller: ControllerConfig,
    pub logging: LoggingConfig,
}

/// Playback service (MPD) connection settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct MpdConfig {
    pub host: String,
    pub port: u16,

    /// Per-command timeout enforced by the client transport
    pub timeout_ms: u64,
}

impl Default for MpdConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6600,
            timeout_ms: 5000,
        }
    }
}

/// Sensor transport settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SensorConfig {
    /// Serial device the sensor board is attached to
    pub device: PathBuf,

    /// How long to wait for a reply line before re-sending the ACK byte
    pub read_timeout_ms: u64,

    /// Serial line speed (8N1, no flow control)
    pub baud: u32,

    /// Use fixed mock readings instead of the serial device
    pub mock: bool,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/ttyUSB0"),
            read_timeout_ms: 300,
            baud: 9600,
            mock: false,
        }
    }
}

/// Control loop tuning
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControllerConfig {
    /// Numeric range of the station dial, written as `"low-high"`
    pub station_range: String,

    /// Number of samples in each channel's smoothing window
    pub smoothing_window: usize,

    /// Target loop period in milliseconds
    pub tick_period_ms: u64,

    /// Send a heartbeat every this many ticks
    pub heartbeat_ticks: u32,

    /// Check for catalog changes when the virtual clock is a multiple of this
    pub refresh_secs: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            station_range: "0-255".to_string(),
            smoothing_window: 4,
            tick_period_ms: 100,
            heartbeat_ticks: 10,
            refresh_secs: 60,
        }
    }
}

impl ControllerConfig {
    /// Parse the configured station range
    pub fn station_range(&self) -> Result<StationRange> {
        self.station_range.parse()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path (optional, logs to stdout if not specified)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Inclusive-exclusive numeric range of the station dial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationRange {
    pub low: u32,
    pub high: u32,
}

impl FromStr for StationRange {
    type Err = Error;

    /// Parse `"low-high"`, e.g. `"0-255"`. Requires `low < high`.
    fn from_str(s: &str) -> Result<Self> {
        let (low, high) = s
            .split_once('-')
            .ok_or_else(|| Error::InvalidInput(format!("Station range '{}' is not of the form low-high", s)))?;

        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|e| Error::InvalidInput(format!("Station range '{}': {}", s, e)))
        };
        let (low, high) = (parse(low)?, parse(high)?);

        if high <= low {
            return Err(Error::InvalidInput(format!(
                "Station range '{}': high must be greater than low",
                s
            )));
        }

        Ok(Self { low, high })
    }
}

impl fmt::Display for StationRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// Parse a station range string (convenience wrapper over `FromStr`)
pub fn parse_station_range(s: &str) -> Result<StationRange> {
    s.parse()
}

/// Resolve which config file to read
///
/// Returns `None` when no explicit path was given and no default location
/// holds a file.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: user then system config file
    default_config_locations().into_iter().find(|p| p.exists())
}

/// Platform config file locations, searched in order
fn default_config_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join("rdial").join("config.toml"));
    }
    if cfg!(unix) {
        locations.push(PathBuf::from("/etc/rdial/config.toml"));
    }
    locations
}

/// Expand a leading `~` to the user's home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    Ok(config)
}

/// Where a loaded [`TomlConfig`] came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// This file was named but does not exist; built-in defaults used
    Missing(PathBuf),
    /// No file named or found; built-in defaults used
    Defaults,
}

impl ConfigSource {
    /// Report the outcome through `tracing`
    ///
    /// Call once the log destination is set up; config is loaded before the
    /// subscriber exists.
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded configuration from {}", path.display()),
            ConfigSource::Missing(path) => warn!(
                "Config file {} not found, using built-in defaults",
                path.display()
            ),
            ConfigSource::Defaults => info!("No config file found, using built-in defaults"),
        }
    }
}

impl TomlConfig {
    /// Resolve, read and parse the config file, degrading to defaults when
    /// no file exists
    ///
    /// Nothing is logged; the returned [`ConfigSource`] says what happened.
    pub fn load_with_source(cli_arg: Option<&Path>) -> Result<(Self, ConfigSource)> {
        match resolve_config_path(cli_arg) {
            Some(path) if path.exists() => {
                let config = load_toml_config(&path).map_err(|e| {
                    Error::Config(format!("Failed to load {}: {}", path.display(), e))
                })?;
                Ok((config, ConfigSource::File(path)))
            }
            Some(path) => Ok((Self::default(), ConfigSource::Missing(path))),
            None => Ok((Self::default(), ConfigSource::Defaults)),
        }
    }

    /// [`TomlConfig::load_with_source`], logging the outcome immediately
    pub fn load(cli_arg: Option<&Path>) -> Result<Self> {
        let (config, source) = Self::load_with_source(cli_arg)?;
        source.log();
        Ok(config)
    }
}
