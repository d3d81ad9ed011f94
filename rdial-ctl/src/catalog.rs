//! Playlist catalog
//!
//! A [`Catalog`] is an immutable, name-sorted snapshot of the player's
//! stored playlists and their track durations. It is rebuilt wholesale on
//! every load and swapped in by the control loop; nothing mutates it.
//!
//! **Known limitations:**
//! - [`Playlist`] equality only compares name and track count, so a playlist
//!   whose tracks changed but kept the same length is not seen as changed.
//! - [`detect_change`] looks from the old catalog's side only. Adding one
//!   playlist while removing another leaves the counts equal, and the
//!   addition alone is invisible; the removal still trips the check.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::playback::{PlaybackService, TrackEntry};

/// A named stored playlist with per-track durations in whole seconds
#[derive(Debug, Clone)]
pub struct Playlist {
    name: String,
    durations: Vec<u64>,
    total_seconds: u64,
}

impl Playlist {
    /// Total saturates at `u64::MAX`; [`Playlist::from_entries`] rejects
    /// lists that would overflow instead
    pub fn new(name: impl Into<String>, durations: Vec<u64>) -> Self {
        let total_seconds = durations.iter().fold(0u64, |acc, &d| acc.saturating_add(d));
        Self {
            name: name.into(),
            durations,
            total_seconds,
        }
    }

    /// Build from the player's raw track entries
    ///
    /// # Errors
    /// `CatalogIntegrity` if any entry lacks a duration or the duration is
    /// not a whole number of seconds, or the durations add up to more than
    /// `u64::MAX` seconds.
    pub fn from_entries(name: &str, entries: &[TrackEntry]) -> Result<Self> {
        let durations = entries
            .iter()
            .map(|entry| parse_duration(name, entry))
            .collect::<Result<Vec<u64>>>()?;

        let total_seconds = entries
            .iter()
            .zip(&durations)
            .try_fold(0u64, |acc, (entry, &d)| {
                acc.checked_add(d).ok_or_else(|| Error::CatalogIntegrity {
                    playlist: name.to_string(),
                    track: entry.uri.clone(),
                    reason: "total playlist duration overflows".to_string(),
                })
            })?;

        Ok(Self {
            name: name.to_string(),
            durations,
            total_seconds,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn durations(&self) -> &[u64] {
        &self.durations
    }

    pub fn track_count(&self) -> usize {
        self.durations.len()
    }

    /// Sum of all track durations, computed once at construction
    pub fn total_seconds(&self) -> u64 {
        self.total_seconds
    }

    pub fn total_minutes(&self) -> u64 {
        self.total_seconds / 60
    }
}

impl PartialEq for Playlist {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.track_count() == other.track_count()
    }
}

impl Eq for Playlist {}

impl fmt::Display for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{} songs and {} minutes]",
            self.name,
            self.track_count(),
            self.total_minutes()
        )
    }
}

fn parse_duration(playlist: &str, entry: &TrackEntry) -> Result<u64> {
    let raw = entry.time.as_deref().ok_or_else(|| Error::CatalogIntegrity {
        playlist: playlist.to_string(),
        track: entry.uri.clone(),
        reason: "missing duration".to_string(),
    })?;

    raw.trim().parse::<u64>().map_err(|_| Error::CatalogIntegrity {
        playlist: playlist.to_string(),
        track: entry.uri.clone(),
        reason: format!("duration '{}' is not a whole number of seconds", raw),
    })
}

/// Name-sorted set of playlists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    playlists: Vec<Playlist>,
}

impl Catalog {
    /// Build a catalog, sorting playlists by name
    pub fn new(mut playlists: Vec<Playlist>) -> Self {
        playlists.sort_by(|a, b| a.name.cmp(&b.name));
        Self { playlists }
    }

    /// Query the player for every stored playlist and its durations
    ///
    /// # Errors
    /// - `TransientIo` if the player cannot be reached (not retried here)
    /// - `CatalogIntegrity` if any track has a bad duration; the whole load
    ///   fails rather than skipping the track
    pub async fn load<P: PlaybackService>(player: &mut P) -> Result<Self> {
        let names = player.list_playlists().await?;

        let mut playlists = Vec::with_capacity(names.len());
        for name in names {
            let entries = player.list_tracks(&name).await?;
            let playlist = Playlist::from_entries(&name, &entries)?;
            debug!("Loaded playlist {}", playlist);
            playlists.push(playlist);
        }

        Ok(Self::new(playlists))
    }

    /// [`Catalog::load`] with one immediate retry on a transient failure
    ///
    /// A second consecutive transient failure is returned to the caller.
    pub async fn load_with_retry<P: PlaybackService>(player: &mut P) -> Result<Self> {
        match Self::load(player).await {
            Err(e) if e.is_transient() => {
                warn!("Catalog load failed ({}), retrying once", e);
                Self::load(player).await
            }
            other => other,
        }
    }

    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Playlist> {
        self.playlists.get(index)
    }

    pub fn by_name(&self, name: &str) -> Option<&Playlist> {
        self.playlists
            .binary_search_by(|p| p.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.playlists[i])
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Playlist> {
        self.playlists.iter()
    }

    /// Check the catalog is usable for station selection and resume
    ///
    /// # Errors
    /// - `InvalidConfig` if the catalog has no playlists
    /// - `EmptyPlaylist` if a playlist has zero total duration
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::InvalidConfig(
                "no playlists exist on the player; add some and try again".to_string(),
            ));
        }
        if let Some(empty) = self.playlists.iter().find(|p| p.total_seconds() == 0) {
            return Err(Error::EmptyPlaylist(empty.name.clone()));
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Playlist;
    type IntoIter = std::slice::Iter<'a, Playlist>;

    fn into_iter(self) -> Self::IntoIter {
        self.playlists.iter()
    }
}

/// Whether `new` differs from `old`
///
/// True if the counts differ, or any playlist of `old` is missing from `new`
/// or unequal to its namesake there. See the module docs for what this
/// does not catch.
pub fn detect_change(old: &Catalog, new: &Catalog) -> bool {
    if old.len() != new.len() {
        return true;
    }

    let by_name: BTreeMap<&str, &Playlist> = new.iter().map(|p| (p.name(), p)).collect();

    old.iter().any(|playlist| match by_name.get(playlist.name()) {
        None => true,
        Some(candidate) => *candidate != playlist,
    })
}
