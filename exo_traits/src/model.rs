//! Plain data shared across the collaborator boundary.

use serde::{Deserialize, Serialize};

/// Number of independently controlled actuators.
pub const MOTOR_COUNT: usize = 6;
/// Upper bound of an actuator setpoint in degrees (lower bound is 0).
pub const MAX_ANGLE: u8 = 180;

/// One axis triple of inertial data.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// One timestamped reading of EMG plus 6-axis inertial data.
///
/// On the wire a sample is flat:
/// `{ts, emg, accel_x, accel_y, accel_z, gyro_x, gyro_y, gyro_z}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "SampleRecord", into = "SampleRecord")]
pub struct SensorSample {
    /// Milliseconds since the Unix epoch, assigned by the server.
    pub timestamp_ms: i64,
    pub emg: f64,
    pub accel: Vector3,
    pub gyro: Vector3,
}

impl SensorSample {
    /// A sample with every channel at zero.
    pub const fn zero(timestamp_ms: i64) -> Self {
        Self {
            timestamp_ms,
            emg: 0.0,
            accel: Vector3::new(0.0, 0.0, 0.0),
            gyro: Vector3::new(0.0, 0.0, 0.0),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct SampleRecord {
    ts: i64,
    emg: f64,
    accel_x: f64,
    accel_y: f64,
    accel_z: f64,
    gyro_x: f64,
    gyro_y: f64,
    gyro_z: f64,
}

impl From<SampleRecord> for SensorSample {
    fn from(r: SampleRecord) -> Self {
        Self {
            timestamp_ms: r.ts,
            emg: r.emg,
            accel: Vector3::new(r.accel_x, r.accel_y, r.accel_z),
            gyro: Vector3::new(r.gyro_x, r.gyro_y, r.gyro_z),
        }
    }
}

impl From<SensorSample> for SampleRecord {
    fn from(s: SensorSample) -> Self {
        Self {
            ts: s.timestamp_ms,
            emg: s.emg,
            accel_x: s.accel.x,
            accel_y: s.accel.y,
            accel_z: s.accel.z,
            gyro_x: s.gyro.x,
            gyro_y: s.gyro.y,
            gyro_z: s.gyro.z,
        }
    }
}

/// The six actuator setpoints. Every angle is kept within `0..=MAX_ANGLE`.
///
/// Serialized as a flat object `{motor_1, ..., motor_6}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "CommandRecord", into = "CommandRecord")]
pub struct CommandState {
    motors: [u8; MOTOR_COUNT],
}

impl CommandState {
    /// All motors at 0 degrees.
    pub const fn zeroed() -> Self {
        Self {
            motors: [0; MOTOR_COUNT],
        }
    }

    /// Build from raw angles, clamping each to `MAX_ANGLE`.
    pub fn from_angles(angles: [u8; MOTOR_COUNT]) -> Self {
        Self {
            motors: angles.map(|a| a.min(MAX_ANGLE)),
        }
    }

    pub fn angles(&self) -> [u8; MOTOR_COUNT] {
        self.motors
    }

    /// Angle of motor `id` (1-based).
    pub fn motor(&self, id: usize) -> Option<u8> {
        id.checked_sub(1).and_then(|i| self.motors.get(i).copied())
    }

    /// Set motor `id` (1-based). Returns false for an unknown motor id.
    pub fn set_motor(&mut self, id: usize, angle: u8) -> bool {
        match id.checked_sub(1).and_then(|i| self.motors.get_mut(i)) {
            Some(slot) => {
                *slot = angle.min(MAX_ANGLE);
                true
            }
            None => false,
        }
    }

    pub fn set_all(&mut self, angle: u8) {
        self.motors = [angle.min(MAX_ANGLE); MOTOR_COUNT];
    }
}

#[derive(Serialize, Deserialize)]
struct CommandRecord {
    #[serde(alias = "motor1", default)]
    motor_1: u8,
    #[serde(alias = "motor2", default)]
    motor_2: u8,
    #[serde(alias = "motor3", default)]
    motor_3: u8,
    #[serde(alias = "motor4", default)]
    motor_4: u8,
    #[serde(alias = "motor5", default)]
    motor_5: u8,
    #[serde(alias = "motor6", default)]
    motor_6: u8,
}

impl From<CommandRecord> for CommandState {
    fn from(r: CommandRecord) -> Self {
        Self::from_angles([
            r.motor_1, r.motor_2, r.motor_3, r.motor_4, r.motor_5, r.motor_6,
        ])
    }
}

impl From<CommandState> for CommandRecord {
    fn from(c: CommandState) -> Self {
        let [motor_1, motor_2, motor_3, motor_4, motor_5, motor_6] = c.motors;
        Self {
            motor_1,
            motor_2,
            motor_3,
            motor_4,
            motor_5,
            motor_6,
        }
    }
}

/// A therapist's care note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub ts: i64,
    pub author: String,
    pub note: String,
}

/// Operator role as reported by the session collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Therapist,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Therapist => "therapist",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patient" => Ok(Role::Patient),
            "therapist" => Ok(Role::Therapist),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}
