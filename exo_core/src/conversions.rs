//! `From` implementations bridging `exo_config` types to `exo_core` types.

use crate::config::{AlertThresholds, MonitorCfg};

// ── AlertThresholds ──────────────────────────────────────────────────────────

impl From<&exo_config::Thresholds> for AlertThresholds {
    fn from(c: &exo_config::Thresholds) -> Self {
        Self {
            emg: c.emg,
            accel: c.accel,
            gyro: c.gyro,
        }
    }
}

// ── MonitorCfg ───────────────────────────────────────────────────────────────

impl From<&exo_config::Config> for MonitorCfg {
    fn from(c: &exo_config::Config) -> Self {
        Self {
            history_capacity: c.history.capacity,
            recent_notes: c.dashboard.recent_notes,
            notes_page: c.dashboard.notes_page,
        }
    }
}
