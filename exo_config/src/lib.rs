#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the exosuit telemetry service.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every section is optional; an empty file yields the stock dashboard
//!   settings (240-sample history, 900/8/200 alert thresholds, 800 ms polling).
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct History {
    /// Samples kept in memory for the live dashboard (oldest evicted first).
    pub capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self { capacity: 240 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Alert when emg exceeds this value.
    pub emg: f64,
    /// Alert when |accel_x| exceeds this value.
    pub accel: f64,
    /// Alert when |gyro_y| exceeds this value.
    pub gyro: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            emg: 900.0,
            accel: 8.0,
            gyro: 200.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Dashboard {
    /// Client polling interval in milliseconds
    pub poll_ms: u64,
    /// Notes embedded in each snapshot
    pub recent_notes: usize,
    /// Notes returned by the note listing
    pub notes_page: usize,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            poll_ms: 800,
            recent_notes: 10,
            notes_page: 50,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Device {
    /// Replay rate for recorded sessions
    pub sample_rate_hz: u32,
}

impl Default for Device {
    fn default() -> Self {
        Self { sample_rate_hz: 50 }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Storage {
    /// JSON lines, one accepted sample per line. Absent: samples are not persisted.
    pub samples_path: Option<PathBuf>,
    /// JSON lines, one note per line. Absent: notes live in memory only.
    pub notes_path: Option<PathBuf>,
    /// Single JSON object holding the last command state.
    pub commands_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub history: History,
    pub thresholds: Thresholds,
    pub dashboard: Dashboard,
    pub device: Device,
    pub storage: Storage,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg =
        load_toml(&text).map_err(|e| eyre::eyre!("invalid configuration {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // History
        if self.history.capacity == 0 {
            eyre::bail!("history.capacity must be >= 1");
        }
        if self.history.capacity > 1_000_000 {
            eyre::bail!("history.capacity is unreasonably large (>1e6)");
        }

        // Thresholds
        for (name, v) in [
            ("emg", self.thresholds.emg),
            ("accel", self.thresholds.accel),
            ("gyro", self.thresholds.gyro),
        ] {
            if !v.is_finite() || v < 0.0 {
                eyre::bail!("thresholds.{name} must be a finite value >= 0");
            }
        }

        // Dashboard
        if self.dashboard.poll_ms == 0 {
            eyre::bail!("dashboard.poll_ms must be >= 1");
        }
        if self.dashboard.poll_ms > 60 * 1000 {
            eyre::bail!("dashboard.poll_ms is unreasonably large (>1min)");
        }
        if self.dashboard.recent_notes == 0 {
            eyre::bail!("dashboard.recent_notes must be >= 1");
        }
        if self.dashboard.notes_page == 0 {
            eyre::bail!("dashboard.notes_page must be >= 1");
        }

        // Device
        if self.device.sample_rate_hz == 0 {
            eyre::bail!("device.sample_rate_hz must be > 0");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref() {
            if !matches!(rot, "never" | "daily" | "hourly") {
                eyre::bail!("logging.rotation must be one of never|daily|hourly, got '{rot}'");
            }
        }

        Ok(())
    }
}
