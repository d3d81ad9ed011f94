//! Control loop
//!
//! One sequential loop drives everything: read the three sensor channels,
//! smooth them, apply the volume and station policies, sleep out the rest
//! of the tick, send periodic heartbeats, and occasionally look for catalog
//! changes. The sensor read is the only place the loop is expected to
//! block.
//!
//! **States:** `Running` from construction until the run flag is cleared
//! (checked between ticks only) or any step fails; then `Stopped` for good.
//!
//! **Virtual clock:** the real duration of every tick is added to the
//! session's virtual clock, which is never reset. A station switch resumes
//! the new playlist at `virtual_clock mod playlist_length`, as if every
//! station had been looping since startup.

pub mod session;
pub mod settings;
pub mod volume;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, error, info, trace, Instrument, Span};

use crate::catalog::{detect_change, Catalog};
use crate::error::Result;
use crate::playback::PlaybackService;
use crate::resume::resume_point;
use crate::sensor::SensorSource;
use crate::smoothing::SmoothingBuffer;
use crate::station::StationSelector;

pub use session::SessionState;
pub use settings::ControllerSettings;
pub use volume::{exceeds_dead_band, volume_target, VOLUME_DEAD_BAND};

/// Cooperative stop signal shared between the loop and whoever stops it
#[derive(Debug, Clone)]
pub struct RunFlag(Arc<AtomicBool>);

impl RunFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    /// Request a stop; takes effect at the next tick boundary
    pub fn stop(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle state of the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Running,
    Stopped,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerState::Running => write!(f, "running"),
            ControllerState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Step of the loop currently executing, reported when a step fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Startup,
    ReadSensors,
    Volume,
    StationSwitch,
    Heartbeat,
    CatalogRefresh,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Startup => "startup",
            Phase::ReadSensors => "read sensors",
            Phase::Volume => "set volume",
            Phase::StationSwitch => "station switch",
            Phase::Heartbeat => "heartbeat",
            Phase::CatalogRefresh => "catalog refresh",
        };
        f.write_str(name)
    }
}

/// Sensor-driven jukebox controller
pub struct ControlLoop<S, P> {
    settings: ControllerSettings,
    selector: StationSelector,
    sensor: S,
    player: P,
    catalog: Catalog,
    buffers: [SmoothingBuffer; 3],
    session: SessionState,
    state: ControllerState,
    phase: Phase,
    run_flag: RunFlag,
    span: Span,
}

impl<S, P> ControlLoop<S, P>
where
    S: SensorSource,
    P: PlaybackService,
{
    /// Validate settings and load the initial catalog
    ///
    /// All log output of the loop is emitted inside `span`.
    ///
    /// # Errors
    /// - `InvalidConfig` for bad settings or an empty catalog
    /// - `EmptyPlaylist` if a playlist has no playable duration
    /// - `CatalogIntegrity` or a second consecutive `TransientIo` from the
    ///   catalog load
    pub async fn new(settings: ControllerSettings, sensor: S, mut player: P, span: Span) -> Result<Self> {
        settings.validate()?;
        let selector = StationSelector::new(settings.station_range)?;
        let window = settings.smoothing_window;
        let buffers = [
            SmoothingBuffer::new(window)?,
            SmoothingBuffer::new(window)?,
            SmoothingBuffer::new(window)?,
        ];

        let catalog = Catalog::load_with_retry(&mut player)
            .instrument(span.clone())
            .await?;
        catalog.validate()?;

        span.in_scope(|| {
            info!(
                "Controller ready: {} playlists, station range {}, window {}, tick {:?}",
                catalog.len(),
                settings.station_range,
                window,
                settings.tick_period
            );
            for playlist in &catalog {
                debug!("  {}", playlist);
            }
        });

        Ok(Self {
            settings,
            selector,
            sensor,
            player,
            catalog,
            buffers,
            session: SessionState::default(),
            state: ControllerState::Running,
            phase: Phase::Startup,
            run_flag: RunFlag::new(),
            span,
        })
    }

    /// Use an externally created run flag (e.g. one wired to a signal handler)
    pub fn with_run_flag(mut self, run_flag: RunFlag) -> Self {
        self.run_flag = run_flag;
        self
    }

    pub fn run_flag(&self) -> RunFlag {
        self.run_flag.clone()
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// Start playback and tick until stopped
    ///
    /// Returns `Ok` after a requested stop, or the error that stopped the
    /// loop. Either way the controller ends in `Stopped`.
    pub async fn run(&mut self) -> Result<()> {
        let span = self.span.clone();
        async {
            let result = self.drive().await;
            self.state = ControllerState::Stopped;

            match &result {
                Ok(()) => info!(
                    "Controller stopped after {:.1}s on station {}",
                    self.session.virtual_clock_seconds(),
                    self.session.current_station_name().unwrap_or("<none>")
                ),
                Err(e) => error!(
                    operation = %self.phase,
                    tick = self.session.tick_count,
                    virtual_clock = self.session.virtual_clock_seconds(),
                    "Controller failed: {}",
                    e
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn drive(&mut self) -> Result<()> {
        if self.state == ControllerState::Stopped {
            return Ok(());
        }

        self.phase = Phase::Startup;
        self.player.play().await?;

        while self.run_flag.is_running() {
            self.tick().await?;
        }
        Ok(())
    }

    /// One loop iteration
    pub async fn tick(&mut self) -> Result<()> {
        let started = Instant::now();
        self.session.tick_count += 1;

        self.phase = Phase::ReadSensors;
        let reading = self.sensor.read().await?;
        let mut means = [0.0f64; 3];
        for (mean, (buffer, value)) in means
            .iter_mut()
            .zip(self.buffers.iter_mut().zip(reading.channels))
        {
            *mean = buffer.add(f64::from(value));
        }
        debug!(
            "Channel means: [{:.1}, {:.1}, {:.1}]",
            means[0], means[1], means[2]
        );

        self.phase = Phase::Volume;
        self.apply_volume(means[2]).await?;

        self.phase = Phase::StationSwitch;
        self.apply_station(means[0]).await?;

        if let Some(rest) = self.settings.tick_period.checked_sub(started.elapsed()) {
            tokio::time::sleep(rest).await;
        }

        if self.session.tick_count >= self.settings.heartbeat_ticks {
            self.phase = Phase::Heartbeat;
            self.send_heartbeat().await?;
            self.session.tick_count = 0;
        }

        // Once a minute at most, on the first tick after a heartbeat. Edits
        // made while the catalog is being listed can be half-seen; a later
        // check picks them up.
        if self.session.tick_count == 1
            && self.session.clock_whole_seconds() % self.settings.refresh_secs == 0
        {
            self.phase = Phase::CatalogRefresh;
            self.refresh_catalog().await?;
        }

        self.session.virtual_clock += started.elapsed();
        Ok(())
    }

    async fn apply_volume(&mut self, smoothed: f64) -> Result<()> {
        let target = volume_target(smoothed);
        if exceeds_dead_band(self.session.current_volume, target) {
            self.player.set_volume(target).await?;
            debug!("Volume {} -> {}", self.session.current_volume, target);
            self.session.current_volume = target;
        }
        Ok(())
    }

    async fn apply_station(&mut self, smoothed: f64) -> Result<()> {
        let selected = self.selector.select(smoothed, &self.catalog)?;
        if self.session.current_station_name() == Some(selected.name()) {
            return Ok(());
        }
        let playlist = selected.clone();

        let elapsed = self.session.clock_whole_seconds();
        let point = resume_point(&playlist, elapsed)?;
        info!(
            "Playlist: {} SongID: {} Offset: {} secs Total Time: {}",
            playlist.name(),
            point.track_index,
            point.offset_seconds,
            elapsed
        );

        self.player.pause().await?;
        self.player.clear().await?;
        self.player.load(playlist.name()).await?;
        self.player
            .seek(point.track_index, point.offset_seconds)
            .await?;
        self.player.play().await?;

        self.session.current_station = Some(playlist);
        Ok(())
    }

    async fn send_heartbeat(&mut self) -> Result<()> {
        let status = self.player.status().await?;
        trace!("Heartbeat: state={}", status.get("state").unwrap_or("?"));
        self.session.last_status = Some(status);
        Ok(())
    }

    async fn refresh_catalog(&mut self) -> Result<()> {
        let fresh = Catalog::load_with_retry(&mut self.player).await?;
        if detect_change(&self.catalog, &fresh) {
            fresh.validate()?;
            info!(
                "New playlists available! Loaded {} playlists (was {})",
                fresh.len(),
                self.catalog.len()
            );
            self.catalog = fresh;
        } else {
            debug!("Catalog unchanged ({} playlists)", fresh.len());
        }
        Ok(())
    }
}
