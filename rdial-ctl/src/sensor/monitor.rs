//! Sensor monitor mode: log raw readings without touching the player

use std::time::Duration;

use tracing::info;

use super::SensorSource;
use crate::controller::RunFlag;
use crate::error::Result;

/// Log one reading per `period` until `run_flag` is cleared
///
/// Returns the number of readings taken.
pub async fn run_sensor_monitor<S: SensorSource>(
    sensor: &mut S,
    period: Duration,
    run_flag: &RunFlag,
) -> Result<u64> {
    info!("Sensor monitor started ({:?} period)", period);

    let mut count = 0u64;
    while run_flag.is_running() {
        let reading = sensor.read().await?;
        count += 1;
        info!("Sensors: {}", reading);
        tokio::time::sleep(period).await;
    }

    info!("Sensor monitor stopped after {} readings", count);
    Ok(count)
}
