//! Actuator command store.
//!
//! Holds the single `CommandState`. Every stored angle is
//! `clamp(round(angle), 0, 180)`. The store does not know who is calling;
//! `Monitor` checks the caller's role before any write reaches it.

use crate::error::{ExoError, Result};
use crate::normalize::numeric;
use exo_traits::{CommandState, MAX_ANGLE, MOTOR_COUNT};
use serde_json::{Map, Value};

/// Key that sets every motor at once.
pub const ALL_MOTORS_KEY: &str = "motor_all";

/// Round to the nearest degree (half away from zero) and clamp to `[0, 180]`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clamp_angle(angle: f64) -> Result<u8> {
    if !angle.is_finite() {
        return Err(ExoError::Validation(format!(
            "angle must be a finite number, got {angle}"
        )));
    }
    // In range after the clamp, so the cast is exact.
    Ok(angle.round().clamp(0.0, f64::from(MAX_ANGLE)) as u8)
}

fn angle_field(key: &str, value: &Value) -> Result<u8> {
    let angle = numeric(value)
        .ok_or_else(|| ExoError::Validation(format!("'{key}' must be numeric, got {value}")))?;
    clamp_angle(angle)
}

/// A validated set of motor writes, applied as one unit.
///
/// `all` is applied first, then the per-motor entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandUpdate {
    all: Option<u8>,
    motors: [Option<u8>; MOTOR_COUNT],
}

impl CommandUpdate {
    /// Parse the recognized keys of a request body: `motor_all` and
    /// `motor_1`..`motor_6` (legacy `motor1`..`motor6` also accepted).
    ///
    /// Unrecognized keys are ignored. A recognized key holding a non-numeric
    /// value fails the whole update.
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self> {
        let mut update = Self::default();
        if let Some(v) = fields.get(ALL_MOTORS_KEY) {
            update.all = Some(angle_field(ALL_MOTORS_KEY, v)?);
        }
        for (idx, slot) in update.motors.iter_mut().enumerate() {
            let key = format!("motor_{}", idx + 1);
            let legacy = format!("motor{}", idx + 1);
            if let Some(v) = fields.get(&key).or_else(|| fields.get(&legacy)) {
                *slot = Some(angle_field(&key, v)?);
            }
        }
        Ok(update)
    }

    /// Write one motor (1-based id).
    pub fn motor(motor_id: usize, angle: f64) -> Result<Self> {
        if !(1..=MOTOR_COUNT).contains(&motor_id) {
            return Err(ExoError::Validation(format!(
                "motor id must be in 1..={MOTOR_COUNT}, got {motor_id}"
            )));
        }
        let mut update = Self::default();
        update.motors[motor_id - 1] = Some(clamp_angle(angle)?);
        Ok(update)
    }

    /// Write every motor.
    pub fn all(angle: f64) -> Result<Self> {
        Ok(Self {
            all: Some(clamp_angle(angle)?),
            ..Self::default()
        })
    }

    /// True when no recognized key was present.
    pub fn is_empty(&self) -> bool {
        self.all.is_none() && self.motors.iter().all(Option::is_none)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommandStore {
    state: CommandState,
}

impl CommandStore {
    pub fn new(initial: CommandState) -> Self {
        Self { state: initial }
    }

    pub fn read(&self) -> CommandState {
        self.state
    }

    /// Set one motor. On error the state is untouched.
    pub fn write_one(&mut self, motor_id: usize, angle: f64) -> Result<CommandState> {
        let update = CommandUpdate::motor(motor_id, angle)?;
        Ok(self.apply(&update))
    }

    /// Set all six motors to the same angle in one assignment.
    pub fn write_all(&mut self, angle: f64) -> Result<CommandState> {
        let update = CommandUpdate::all(angle)?;
        Ok(self.apply(&update))
    }

    /// Apply a validated update and return the new state.
    pub fn apply(&mut self, update: &CommandUpdate) -> CommandState {
        let mut next = self.state;
        if let Some(a) = update.all {
            next.set_all(a);
        }
        for (idx, angle) in update.motors.iter().enumerate() {
            if let Some(a) = angle {
                next.set_motor(idx + 1, *a);
            }
        }
        self.state = next;
        next
    }
}
