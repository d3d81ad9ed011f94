//! # Radio Dial Controller Library (rdial-ctl)
//!
//! Turns a three-channel analog sensor board into a jukebox front panel for
//! an MPD server.
//!
//! **Purpose:** Read the station and volume knobs, smooth the readings, map
//! the station knob to one of the server's playlists and the volume knob to
//! a percentage, and keep every station "playing" on a shared virtual clock
//! so switching back to a station resumes where it would have been.
//!
//! **Architecture:** One sequential [`ControlLoop`] generic over a
//! [`SensorSource`] and a [`PlaybackService`]. The binary wires in the
//! serial sensor (or a mock) and the MPD protocol client; tests wire in
//! scripted fakes.

pub mod catalog;
pub mod controller;
pub mod error;
pub mod logging;
pub mod playback;
pub mod resume;
pub mod sensor;
pub mod smoothing;
pub mod station;

pub use catalog::{detect_change, Catalog, Playlist};
pub use controller::{ControlLoop, ControllerSettings, ControllerState, RunFlag, SessionState};
pub use error::{Error, Result};
pub use playback::{MpdClient, PlaybackService, PlayerStatus, TrackEntry};
pub use resume::{resume_point, ResumePoint};
pub use sensor::{SensorReading, SensorSource};
pub use smoothing::SmoothingBuffer;
pub use station::{station_index, StationSelector};
