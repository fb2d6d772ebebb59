//! Sample normalizer: raw device JSON in, typed `SensorSample` out.
//!
//! Coercion policy per channel field:
//! - missing, `null` or `""` → 0.0
//! - JSON number → its value
//! - string holding a finite number (surrounding whitespace allowed) → parsed
//! - anything else (bool, array, object, unparseable or non-finite) → `Validation`
//!
//! One bad field rejects the whole reading.

use crate::error::{ExoError, Result};
use exo_traits::clock::Clock;
use exo_traits::{SensorSample, Vector3};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Channel fields read from an inbound reading.
pub const SAMPLE_FIELDS: [&str; 7] = [
    "emg", "accel_x", "accel_y", "accel_z", "gyro_x", "gyro_y", "gyro_z",
];

/// Read a JSON value as a finite number. Returns `None` for non-numeric input.
pub fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn channel(obj: &Map<String, Value>, field: &str) -> Result<f64> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(0.0),
        Some(v) => numeric(v)
            .ok_or_else(|| ExoError::Validation(format!("field '{field}' must be numeric, got {v}"))),
    }
}

/// Stamps and validates inbound readings.
///
/// Timestamps come from the server clock and never go backwards for a given
/// normalizer, even across threads or when the wall clock is stepped back.
pub struct Normalizer {
    clock: Arc<dyn Clock + Send + Sync>,
    last_ts: AtomicI64,
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("last_ts", &self.last_ts.load(Ordering::Relaxed))
            .finish()
    }
}

impl Normalizer {
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            clock,
            last_ts: AtomicI64::new(i64::MIN),
        }
    }

    pub fn normalize(&self, raw: &Value) -> Result<SensorSample> {
        let obj = raw
            .as_object()
            .ok_or(ExoError::MalformedBody("invalid json"))?;
        let [emg, ax, ay, az, gx, gy, gz] = {
            let mut out = [0.0; SAMPLE_FIELDS.len()];
            for (slot, field) in out.iter_mut().zip(SAMPLE_FIELDS) {
                *slot = channel(obj, field)?;
            }
            out
        };
        Ok(SensorSample {
            timestamp_ms: self.stamp(),
            emg,
            accel: Vector3::new(ax, ay, az),
            gyro: Vector3::new(gx, gy, gz),
        })
    }

    fn stamp(&self) -> i64 {
        let now = self.clock.now_ms();
        let prev = self.last_ts.fetch_max(now, Ordering::AcqRel);
        prev.max(now)
    }
}
