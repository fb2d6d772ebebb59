//! Runtime configuration types for the monitor.
//!
//! These are separate from the TOML-deserialized config in `exo_config`;
//! see `conversions` for the mapping.

use crate::history::DEFAULT_CAPACITY;

/// Static alert thresholds, constant for the monitor's lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertThresholds {
    /// `emg > emg` raises `HighEmg`.
    pub emg: f64,
    /// `|accel.x| > accel` raises `HighAccelX`.
    pub accel: f64,
    /// `|gyro.y| > gyro` raises `HighGyroY`.
    pub gyro: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            emg: 900.0,
            accel: 8.0,
            gyro: 200.0,
        }
    }
}

impl AlertThresholds {
    pub(crate) fn check(&self) -> Result<(), &'static str> {
        let ok = |v: f64| v.is_finite() && v >= 0.0;
        if !(ok(self.emg) && ok(self.accel) && ok(self.gyro)) {
            return Err("thresholds must be finite and >= 0");
        }
        Ok(())
    }
}

/// Sizing of the live state and of note queries.
#[derive(Debug, Clone)]
pub struct MonitorCfg {
    /// Samples kept in the history buffer.
    pub history_capacity: usize,
    /// Notes embedded in a snapshot.
    pub recent_notes: usize,
    /// Notes returned by a note listing.
    pub notes_page: usize,
}

impl Default for MonitorCfg {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            recent_notes: 10,
            notes_page: 50,
        }
    }
}
