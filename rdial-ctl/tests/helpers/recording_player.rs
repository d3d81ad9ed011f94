//! In-memory playback service that records what the controller asks for

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use rdial_ctl::error::{Error, Result};
use rdial_ctl::playback::{PlaybackService, PlayerStatus, TrackEntry};

/// One call made against the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Play,
    Pause,
    Clear,
    Load(String),
    Seek(usize, u64),
    SetVolume(u8),
    Status,
    ListPlaylists,
    ListTracks(String),
}

#[derive(Debug, Default)]
struct PlayerState {
    calls: Vec<Call>,
    playlists: Vec<(String, Vec<TrackEntry>)>,
    list_failures: u32,
    rejected_command: Option<String>,
}

/// Fake player; clones share state, so a test keeps one handle while the
/// controller owns another
#[derive(Debug, Clone, Default)]
pub struct RecordingPlayer {
    state: Arc<Mutex<PlayerState>>,
}

impl RecordingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`RecordingPlayer::add_playlist`]
    pub fn with_playlist(self, name: &str, durations: &[u64]) -> Self {
        self.add_playlist(name, durations);
        self
    }

    /// Store a playlist whose tracks have the given durations in seconds
    pub fn add_playlist(&self, name: &str, durations: &[u64]) {
        let entries = durations
            .iter()
            .enumerate()
            .map(|(i, secs)| TrackEntry::new(format!("{}/{:02}.mp3", name, i), Some(secs.to_string().as_str())))
            .collect();
        self.add_playlist_entries(name, entries);
    }

    pub fn add_playlist_entries(&self, name: &str, entries: Vec<TrackEntry>) {
        let mut state = self.lock();
        state.playlists.retain(|(n, _)| n != name);
        state.playlists.push((name.to_string(), entries));
    }

    pub fn remove_playlist(&self, name: &str) {
        self.lock().playlists.retain(|(n, _)| n != name);
    }

    /// Make the next `count` `list_playlists` calls fail with a transient error
    pub fn fail_list_playlists(&self, count: u32) {
        self.lock().list_failures = count;
    }

    /// Answer every future call of this command with a protocol ACK
    pub fn reject(&self, command: &str) {
        self.lock().rejected_command = Some(command.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Calls matching a predicate
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }

    /// The pause/clear/load/seek/play switches, as (playlist, track, offset)
    pub fn switches(&self) -> Vec<(String, usize, u64)> {
        let calls = self.calls();
        calls
            .windows(5)
            .filter_map(|w| match w {
                [Call::Pause, Call::Clear, Call::Load(name), Call::Seek(track, offset), Call::Play] => {
                    Some((name.clone(), *track, *offset))
                }
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, PlayerState> {
        self.state.lock().unwrap()
    }

    fn record(&self, call: Call, command: &str) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(call);
        if state.rejected_command.as_deref() == Some(command) {
            return Err(Error::Command {
                command: command.to_string(),
                message: "rejected by test".to_string(),
            });
        }
        Ok(())
    }
}

impl PlaybackService for RecordingPlayer {
    async fn play(&mut self) -> Result<()> {
        self.record(Call::Play, "play")
    }

    async fn pause(&mut self) -> Result<()> {
        self.record(Call::Pause, "pause")
    }

    async fn clear(&mut self) -> Result<()> {
        self.record(Call::Clear, "clear")
    }

    async fn load(&mut self, name: &str) -> Result<()> {
        self.record(Call::Load(name.to_string()), "load")
    }

    async fn seek(&mut self, track_index: usize, offset_seconds: u64) -> Result<()> {
        self.record(Call::Seek(track_index, offset_seconds), "seek")
    }

    async fn set_volume(&mut self, percent: u8) -> Result<()> {
        self.record(Call::SetVolume(percent), "setvol")
    }

    async fn status(&mut self) -> Result<PlayerStatus> {
        self.record(Call::Status, "status")?;
        Ok(PlayerStatus::new(vec![("state".to_string(), "play".to_string())]))
    }

    async fn list_playlists(&mut self) -> Result<Vec<String>> {
        self.record(Call::ListPlaylists, "listplaylists")?;
        let mut state = self.lock();
        if state.list_failures > 0 {
            state.list_failures -= 1;
            return Err(Error::transient(
                "listplaylists",
                io::Error::new(io::ErrorKind::ConnectionReset, "connection reset by peer"),
            ));
        }
        Ok(state.playlists.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn list_tracks(&mut self, name: &str) -> Result<Vec<TrackEntry>> {
        self.record(Call::ListTracks(name.to_string()), "listplaylistinfo")?;
        let state = self.lock();
        state
            .playlists
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, entries)| entries.clone())
            .ok_or_else(|| Error::Command {
                command: "listplaylistinfo".to_string(),
                message: "No such playlist".to_string(),
            })
    }
}
