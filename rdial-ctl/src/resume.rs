//! Resume point calculation
//!
//! Every station is treated as if it had been looping since the controller
//! started. Switching to a station therefore lands wherever that loop would
//! be now: `elapsed mod total_seconds`, located within the track list.

use crate::catalog::Playlist;
use crate::error::{Error, Result};

/// Position inside a playlist: queue index plus seconds into that track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePoint {
    pub track_index: usize,
    pub offset_seconds: u64,
}

/// Map elapsed seconds to the track and offset a looping playlist would be at
///
/// Linear scan over the durations; tracks of zero length are never selected.
///
/// # Errors
/// - `EmptyPlaylist` if the playlist has zero total duration
/// - `InternalInvariant` if the scan runs off the end, which cannot happen
///   when `total_seconds` is the sum of the durations
///
/// # Examples
/// ```
/// use rdial_ctl::catalog::Playlist;
/// use rdial_ctl::resume::{resume_point, ResumePoint};
///
/// let rock = Playlist::new("rock", vec![180, 200, 220]);
/// // 650 mod 600 = 50, inside the first track
/// assert_eq!(
///     resume_point(&rock, 650).unwrap(),
///     ResumePoint { track_index: 0, offset_seconds: 50 }
/// );
/// ```
pub fn resume_point(playlist: &Playlist, elapsed_seconds: u64) -> Result<ResumePoint> {
    let total = playlist.total_seconds();
    if total == 0 {
        return Err(Error::EmptyPlaylist(playlist.name().to_string()));
    }

    let offset = elapsed_seconds % total;

    let mut running_total = 0u64;
    for (track_index, &duration) in playlist.durations().iter().enumerate() {
        if running_total + duration > offset {
            return Ok(ResumePoint {
                track_index,
                offset_seconds: offset - running_total,
            });
        }
        running_total += duration;
    }

    Err(Error::InternalInvariant(format!(
        "offset {}s not found in playlist '{}' ({}s total)",
        offset,
        playlist.name(),
        total
    )))
}
