//! Test helpers for rdial-ctl integration tests
//!
//! - ScriptedSensor: replays a fixed list of readings, then stops the loop
//! - RecordingPlayer: in-memory playback service that records every call
//! - FakeMpdServer: scripted MPD protocol peer on a loopback socket

#![allow(dead_code)]

pub mod fake_mpd;
pub mod recording_player;
pub mod scripted_sensor;

pub use fake_mpd::FakeMpdServer;
pub use recording_player::{Call, RecordingPlayer};
pub use scripted_sensor::ScriptedSensor;

use rdial_ctl::controller::ControllerSettings;

/// Default settings with a one-sample window, so each reading acts at once
pub fn unsmoothed_settings() -> ControllerSettings {
    ControllerSettings {
        smoothing_window: 1,
        ..ControllerSettings::default()
    }
}
