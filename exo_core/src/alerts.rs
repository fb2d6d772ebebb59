//! Threshold alerts for a single sample.

use crate::config::AlertThresholds;
use exo_traits::SensorSample;
use serde::Serialize;

/// Safety alert label. Serialized with its dashboard text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Alert {
    #[serde(rename = "High EMG")]
    HighEmg,
    #[serde(rename = "High Accel X")]
    HighAccelX,
    #[serde(rename = "High Gyro Y")]
    HighGyroY,
}

impl Alert {
    pub fn label(&self) -> &'static str {
        match self {
            Alert::HighEmg => "High EMG",
            Alert::HighAccelX => "High Accel X",
            Alert::HighGyroY => "High Gyro Y",
        }
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Evaluate `sample` against `thresholds`.
///
/// Only emg, accel.x and gyro.y are checked. Comparisons are strict, so a value
/// equal to its threshold raises nothing. The result holds each alert at most
/// once, in declaration order.
pub fn evaluate(sample: &SensorSample, thresholds: &AlertThresholds) -> Vec<Alert> {
    let mut alerts = Vec::with_capacity(3);
    if sample.emg > thresholds.emg {
        alerts.push(Alert::HighEmg);
    }
    if sample.accel.x.abs() > thresholds.accel {
        alerts.push(Alert::HighAccelX);
    }
    if sample.gyro.y.abs() > thresholds.gyro {
        alerts.push(Alert::HighGyroY);
    }
    alerts
}
