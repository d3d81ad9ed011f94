//! Fixed-value sensor for running without hardware

use super::{SensorReading, SensorSource};
use crate::error::Result;

/// Reading reported when no hardware is attached: dial and channel 2 at
/// full scale, volume nearly off
pub const MOCK_READING: SensorReading = SensorReading {
    channels: [255, 255, 4],
};

/// Sensor that always returns the same reading without blocking
#[derive(Debug, Clone, Copy)]
pub struct MockSensor {
    reading: SensorReading,
}

impl MockSensor {
    pub fn new(reading: SensorReading) -> Self {
        Self { reading }
    }
}

impl Default for MockSensor {
    fn default() -> Self {
        Self::new(MOCK_READING)
    }
}

impl SensorSource for MockSensor {
    async fn read(&mut self) -> Result<SensorReading> {
        Ok(self.reading)
    }
}
