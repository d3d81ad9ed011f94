//! Volume knob policy

/// Full-scale sensor value
const SENSOR_MAX: f64 = 255.0;

/// Changes of this many percent or less are ignored as sensor noise
pub const VOLUME_DEAD_BAND: u8 = 1;

/// Volume percentage for a smoothed knob reading, rounded and clamped to 0–100
pub fn volume_target(smoothed: f64) -> u8 {
    (smoothed / SENSOR_MAX * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Whether moving from `current` to `target` clears the dead-band
pub fn exceeds_dead_band(current: u8, target: u8) -> bool {
    current.abs_diff(target) > VOLUME_DEAD_BAND
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_target_scale() {
        assert_eq!(volume_target(0.0), 0);
        assert_eq!(volume_target(255.0), 100);
        assert_eq!(volume_target(127.5), 50);
        // 1.57% and 1.96% round up, 0.39% rounds down
        assert_eq!(volume_target(4.0), 2);
        assert_eq!(volume_target(5.0), 2);
        assert_eq!(volume_target(1.0), 0);
    }

    #[test]
    fn test_volume_target_clamps() {
        assert_eq!(volume_target(-20.0), 0);
        assert_eq!(volume_target(300.0), 100);
    }

    #[test]
    fn test_dead_band() {
        assert!(!exceeds_dead_band(50, 50));
        assert!(!exceeds_dead_band(50, 51));
        assert!(!exceeds_dead_band(50, 49));
        assert!(exceeds_dead_band(50, 52));
        assert!(exceeds_dead_band(50, 48));
        assert!(exceeds_dead_band(0, 100));
    }
}
