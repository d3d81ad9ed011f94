//! Station selection: smoothed dial value → playlist
//!
//! The dial range `[low, high)` is cut into one equal-width bucket per
//! catalog entry. There is no hysteresis at bucket edges; a dial resting
//! exactly on a boundary can toggle between neighbours and the smoothing
//! window is what damps it.

use rdial_common::config::StationRange;

use crate::catalog::{Catalog, Playlist};
use crate::error::{Error, Result};

/// Bucket index for `smoothed_value` with `count` stations over `low..high`
///
/// Values below `low` clamp to the first station, values at or above `high`
/// clamp to the last one.
///
/// # Errors
/// `InvalidConfig` if `count` is zero or `high <= low`.
pub fn station_index(smoothed_value: f64, low: u32, high: u32, count: usize) -> Result<usize> {
    if count == 0 {
        return Err(Error::InvalidConfig(
            "cannot select a station from an empty catalog".to_string(),
        ));
    }
    if high <= low {
        return Err(Error::InvalidConfig(format!(
            "station range {}-{} is empty",
            low, high
        )));
    }

    let bucket_width = f64::from(high - low) / count as f64;
    let raw = ((smoothed_value - f64::from(low)) / bucket_width).floor();

    // NaN and negatives land on the first station; `as` saturates large values
    let index = if raw.is_nan() || raw <= 0.0 { 0 } else { raw as usize };
    Ok(index.min(count - 1))
}

/// Playlist selected by `smoothed_value`
///
/// # Examples
/// ```
/// use rdial_ctl::catalog::{Catalog, Playlist};
/// use rdial_ctl::station::select;
///
/// let catalog = Catalog::new(vec![
///     Playlist::new("ambient", vec![60]),
///     Playlist::new("jazz", vec![60]),
///     Playlist::new("rock", vec![60]),
/// ]);
/// assert_eq!(select(200.0, 0, 255, &catalog).unwrap().name(), "rock");
/// assert_eq!(select(255.0, 0, 255, &catalog).unwrap().name(), "rock");
/// assert_eq!(select(10.0, 0, 255, &catalog).unwrap().name(), "ambient");
/// ```
pub fn select(smoothed_value: f64, low: u32, high: u32, catalog: &Catalog) -> Result<&Playlist> {
    let index = station_index(smoothed_value, low, high, catalog.len())?;
    catalog.get(index).ok_or_else(|| {
        Error::InternalInvariant(format!(
            "station index {} out of range for {} playlists",
            index,
            catalog.len()
        ))
    })
}

/// Station selector bound to a configured dial range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationSelector {
    range: StationRange,
}

impl StationSelector {
    /// # Errors
    /// `InvalidConfig` if the range is empty.
    pub fn new(range: StationRange) -> Result<Self> {
        if range.high <= range.low {
            return Err(Error::InvalidConfig(format!("station range {} is empty", range)));
        }
        Ok(Self { range })
    }

    pub fn range(&self) -> StationRange {
        self.range
    }

    pub fn select<'a>(&self, smoothed_value: f64, catalog: &'a Catalog) -> Result<&'a Playlist> {
        select(smoothed_value, self.range.low, self.range.high, catalog)
    }
}
