//! Control loop settings

use std::time::Duration;

use rdial_common::config::{ControllerConfig, StationRange};

use crate::error::{Error, Result};

/// Tuning consumed by [`super::ControlLoop`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Numeric range of the station dial
    pub station_range: StationRange,

    /// Samples per channel smoothing window
    pub smoothing_window: usize,

    /// Target loop period (best effort)
    pub tick_period: Duration,

    /// Heartbeat every this many ticks
    pub heartbeat_ticks: u32,

    /// Catalog check when the virtual clock is a multiple of this
    pub refresh_secs: u64,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            station_range: StationRange { low: 0, high: 255 },
            smoothing_window: 4,
            tick_period: Duration::from_millis(100),
            heartbeat_ticks: 10,
            refresh_secs: 60,
        }
    }
}

impl ControllerSettings {
    /// Build from the `[controller]` config section and validate
    pub fn from_config(config: &ControllerConfig) -> Result<Self> {
        let station_range = config
            .station_range()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;

        let settings = Self {
            station_range,
            smoothing_window: config.smoothing_window,
            tick_period: Duration::from_millis(config.tick_period_ms),
            heartbeat_ticks: config.heartbeat_ticks,
            refresh_secs: config.refresh_secs,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// # Errors
    /// `InvalidConfig` naming the first offending setting.
    pub fn validate(&self) -> Result<()> {
        if self.station_range.high <= self.station_range.low {
            return Err(Error::InvalidConfig(format!(
                "station range {} is empty",
                self.station_range
            )));
        }
        if self.smoothing_window < 1 {
            return Err(Error::InvalidConfig(
                "smoothing_window must be at least 1".to_string(),
            ));
        }
        if self.tick_period.is_zero() {
            return Err(Error::InvalidConfig(
                "tick_period_ms must be greater than 0".to_string(),
            ));
        }
        // The catalog check runs on the tick after a heartbeat, so the
        // heartbeat cycle needs room for that tick.
        if self.heartbeat_ticks < 2 {
            return Err(Error::InvalidConfig(
                "heartbeat_ticks must be at least 2".to_string(),
            ));
        }
        if self.refresh_secs == 0 {
            return Err(Error::InvalidConfig(
                "refresh_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
