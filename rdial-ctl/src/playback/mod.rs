//! Remote playback service capability
//!
//! The controller drives a stateful player session through
//! [`PlaybackService`]. The production implementation is the MPD client in
//! [`mpd`]; tests use a recording fake.
//!
//! Implementations enforce their own per-call timeouts. The controller never
//! retries these calls except when loading the catalog.

pub mod mpd;

use crate::error::Result;

pub use mpd::MpdClient;

/// One entry of a stored playlist as reported by the player
///
/// `time` is the raw duration field (whole seconds as text), parsed by the
/// catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackEntry {
    pub uri: String,
    pub time: Option<String>,
}

impl TrackEntry {
    pub fn new(uri: impl Into<String>, time: Option<&str>) -> Self {
        Self {
            uri: uri.into(),
            time: time.map(str::to_string),
        }
    }
}

/// Opaque player status snapshot (ordered `key: value` pairs)
///
/// Stored after each heartbeat; nothing in the loop interprets it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerStatus {
    fields: Vec<(String, String)>,
}

impl PlayerStatus {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    /// First value recorded for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

/// Transport, queue, volume and library operations on the player session
#[allow(async_fn_in_trait)]
pub trait PlaybackService {
    /// Start or resume playback
    async fn play(&mut self) -> Result<()>;

    /// Pause playback (not a toggle)
    async fn pause(&mut self) -> Result<()>;

    /// Empty the play queue
    async fn clear(&mut self) -> Result<()>;

    /// Append the stored playlist `name` to the queue
    async fn load(&mut self, name: &str) -> Result<()>;

    /// Jump to `offset_seconds` into queue position `track_index`
    async fn seek(&mut self, track_index: usize, offset_seconds: u64) -> Result<()>;

    /// Set output volume, 0–100
    async fn set_volume(&mut self, percent: u8) -> Result<()>;

    /// Lightweight status query
    async fn status(&mut self) -> Result<PlayerStatus>;

    /// Names of all stored playlists
    async fn list_playlists(&mut self) -> Result<Vec<String>>;

    /// Entries of the stored playlist `name`, in order
    async fn list_tracks(&mut self, name: &str) -> Result<Vec<TrackEntry>>;
}
