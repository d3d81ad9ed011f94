//! Sensor that replays a script of readings

use std::collections::VecDeque;
use std::time::Duration;

use rdial_ctl::controller::RunFlag;
use rdial_ctl::error::{Error, Result};
use rdial_ctl::sensor::{SensorReading, SensorSource};

/// Replays readings in order and clears its run flag when handing out the
/// last one, so `ControlLoop::run` performs exactly one tick per reading
pub struct ScriptedSensor {
    readings: VecDeque<SensorReading>,
    run_flag: RunFlag,
    reads: usize,
    delay: Option<Duration>,
}

impl ScriptedSensor {
    pub fn new(readings: impl IntoIterator<Item = SensorReading>) -> Self {
        Self {
            readings: readings.into_iter().collect(),
            run_flag: RunFlag::new(),
            reads: 0,
            delay: None,
        }
    }

    /// The same reading `count` times
    pub fn constant(station: u8, volume: u8, count: usize) -> Self {
        Self::new(std::iter::repeat(SensorReading::new(station, 0, volume)).take(count))
    }

    /// Append `count` copies of a reading
    pub fn then(mut self, station: u8, volume: u8, count: usize) -> Self {
        self.readings
            .extend(std::iter::repeat(SensorReading::new(station, 0, volume)).take(count));
        self
    }

    /// Block for `delay` on every read, like a slow board
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Flag cleared when the script runs out
    pub fn run_flag(&self) -> RunFlag {
        self.run_flag.clone()
    }

    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn remaining(&self) -> usize {
        self.readings.len()
    }
}

impl SensorSource for ScriptedSensor {
    async fn read(&mut self) -> Result<SensorReading> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let reading = self
            .readings
            .pop_front()
            .ok_or_else(|| Error::Sensor("script exhausted".to_string()))?;
        self.reads += 1;
        if self.readings.is_empty() {
            self.run_flag.stop();
        }
        Ok(reading)
    }
}
