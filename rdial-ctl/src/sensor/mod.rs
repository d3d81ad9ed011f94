//! Sensor input capability
//!
//! The sensor board reports three 8-bit analog channels per request:
//! channel 1 is the station dial, channel 3 the volume knob. Channel 2 is
//! read and smoothed but drives no policy.

pub mod mock;
pub mod monitor;
pub mod serial;

use std::fmt;

use crate::error::Result;

pub use mock::MockSensor;
pub use monitor::run_sensor_monitor;
pub use serial::{SerialPortSensor, SerialSensor};

/// One complete reading of the three channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorReading {
    pub channels: [u8; 3],
}

impl SensorReading {
    pub fn new(ch1: u8, ch2: u8, ch3: u8) -> Self {
        Self {
            channels: [ch1, ch2, ch3],
        }
    }

    pub fn station(&self) -> u8 {
        self.channels[0]
    }

    pub fn volume(&self) -> u8 {
        self.channels[2]
    }
}

impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.channels;
        write!(f, "[{}, {}, {}]", a, b, c)
    }
}

/// Source of sensor readings
///
/// `read` may block for as long as it takes to get a complete, well-formed
/// reading; implementations handle their own handshake and retries.
#[allow(async_fn_in_trait)]
pub trait SensorSource {
    async fn read(&mut self) -> Result<SensorReading>;
}
