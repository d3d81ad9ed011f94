//! Controller session state

use std::time::Duration;

use crate::catalog::Playlist;
use crate::playback::PlayerStatus;

/// Mutable state owned by the control loop for the life of the process
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Station currently loaded on the player, held by value
    pub(crate) current_station: Option<Playlist>,

    /// Last volume sent to the player
    pub(crate) current_volume: u8,

    /// Accumulated real tick durations; never reset
    pub(crate) virtual_clock: Duration,

    /// Ticks since the last heartbeat
    pub(crate) tick_count: u32,

    /// Reply to the most recent heartbeat
    pub(crate) last_status: Option<PlayerStatus>,
}

impl SessionState {
    pub fn current_station(&self) -> Option<&Playlist> {
        self.current_station.as_ref()
    }

    pub fn current_station_name(&self) -> Option<&str> {
        self.current_station.as_ref().map(Playlist::name)
    }

    pub fn current_volume(&self) -> u8 {
        self.current_volume
    }

    pub fn virtual_clock(&self) -> Duration {
        self.virtual_clock
    }

    pub fn virtual_clock_seconds(&self) -> f64 {
        self.virtual_clock.as_secs_f64()
    }

    /// Virtual clock truncated to whole seconds
    pub fn clock_whole_seconds(&self) -> u64 {
        self.virtual_clock.as_secs()
    }

    pub fn tick_count(&self) -> u32 {
        self.tick_count
    }

    pub fn last_status(&self) -> Option<&PlayerStatus> {
        self.last_status.as_ref()
    }
}
