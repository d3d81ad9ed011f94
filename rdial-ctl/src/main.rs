//! Radio Dial Controller (rdial-ctl) - Main entry point
//!
//! Loads the bootstrap config, applies command-line overrides, then runs
//! either the control loop or the sensor monitor until Ctrl+C / SIGTERM.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use rdial_common::config::{StationRange, TomlConfig};
use tokio::signal;
use tracing::{info, info_span, warn};

use rdial_ctl::controller::{ControlLoop, ControllerSettings, RunFlag};
use rdial_ctl::logging::init_logging;
use rdial_ctl::playback::MpdClient;
use rdial_ctl::sensor::{run_sensor_monitor, MockSensor, SensorSource, SerialPortSensor};

/// Command-line arguments for rdial-ctl
#[derive(Parser, Debug)]
#[command(name = "rdial-ctl")]
#[command(about = "Sensor-driven playlist controller for MPD")]
#[command(version)]
struct Args {
    /// Path to config file
    #[arg(short, long, env = "RDIAL_CONFIG")]
    config: Option<PathBuf>,

    /// MPD host
    #[arg(long, env = "RDIAL_MPD_HOST")]
    host: Option<String>,

    /// MPD port
    #[arg(short, long, env = "RDIAL_MPD_PORT")]
    port: Option<u16>,

    /// Serial device of the sensor board
    #[arg(short, long, env = "RDIAL_USB_SERIAL")]
    usb_serial: Option<PathBuf>,

    /// Serial baud rate
    #[arg(short, long, env = "RDIAL_BAUD")]
    baud: Option<u32>,

    /// Station dial range, e.g. 0-255
    #[arg(long)]
    station_range: Option<StationRange>,

    /// Use fixed mock sensor readings instead of the serial device
    #[arg(short, long)]
    mock_sensors: bool,

    /// Only log sensor readings; never talk to MPD
    #[arg(short, long)]
    debug_sensors: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,

    /// Append logs to this file instead of stdout
    #[arg(short, long, env = "RDIAL_LOG")]
    log: Option<PathBuf>,
}

impl Args {
    /// Command-line values take priority over the config file
    fn apply_to(&self, config: &mut TomlConfig) {
        if let Some(host) = &self.host {
            config.mpd.host = host.clone();
        }
        if let Some(port) = self.port {
            config.mpd.port = port;
        }
        if let Some(device) = &self.usb_serial {
            config.sensor.device = device.clone();
        }
        if let Some(baud) = self.baud {
            config.sensor.baud = baud;
        }
        if let Some(range) = self.station_range {
            config.controller.station_range = range.to_string();
        }
        if self.mock_sensors {
            config.sensor.mock = true;
        }
        if let Some(log) = &self.log {
            config.logging.file = Some(log.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, source) =
        TomlConfig::load_with_source(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply_to(&mut config);

    let log_handle = init_logging(&config.logging, args.verbose).context("Failed to initialize logging")?;
    info!(
        "Starting rdial-ctl v{} (logging to {})",
        env!("CARGO_PKG_VERSION"),
        log_handle.destination()
    );
    source.log();

    let run_flag = RunFlag::new();
    tokio::spawn(stop_on_signal(run_flag.clone()));

    let result = start(&config, &args, run_flag).await;

    info!("Shutdown complete");
    if let Err(e) = log_handle.close() {
        warn!("Failed to flush log file: {}", e);
    }
    result
}

/// Pick the sensor source, then hand over to [`run`]
async fn start(config: &TomlConfig, args: &Args, run_flag: RunFlag) -> Result<()> {
    if config.sensor.mock {
        info!("Using mock sensors");
        return run(config, args, MockSensor::default(), run_flag).await;
    }

    info!("Opening sensor board on {}", config.sensor.device.display());
    let read_timeout = Duration::from_millis(config.sensor.read_timeout_ms);
    let sensor = SerialPortSensor::open(&config.sensor.device, config.sensor.baud, read_timeout)
        .with_context(|| format!("Failed to open sensor device {}", config.sensor.device.display()))?;
    run(config, args, sensor, run_flag).await
}

async fn run<S: SensorSource>(config: &TomlConfig, args: &Args, mut sensor: S, run_flag: RunFlag) -> Result<()> {
    let settings = ControllerSettings::from_config(&config.controller).context("Invalid controller settings")?;

    if args.debug_sensors {
        run_sensor_monitor(&mut sensor, settings.tick_period, &run_flag)
            .await
            .context("Sensor monitor failed")?;
        return Ok(());
    }

    let timeout = Duration::from_millis(config.mpd.timeout_ms);
    let player = MpdClient::connect(config.mpd.host.clone(), config.mpd.port, timeout)
        .await
        .with_context(|| format!("Failed to connect to MPD at {}:{}", config.mpd.host, config.mpd.port))?;

    let mut controller = ControlLoop::new(settings, sensor, player, info_span!("controller"))
        .await
        .context("Failed to start controller")?
        .with_run_flag(run_flag);

    controller.run().await.context("Controller stopped on error")
}

/// Clear the run flag on Ctrl+C or SIGTERM
async fn stop_on_signal(run_flag: RunFlag) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, stopping after the current tick");
        },
        _ = terminate => {
            info!("Received terminate signal, stopping after the current tick");
        },
    }
    run_flag.stop();
}
