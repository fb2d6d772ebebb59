//! CLI argument definitions and shared statics.

use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand, ValueEnum};
use exo_core::Session;
use exo_traits::Role;
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "exo", version, about = "Exosuit telemetry monitor")]
pub struct Cli {
    /// Path to config TOML; built-in defaults when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum RoleArg {
    Patient,
    Therapist,
}

impl From<RoleArg> for Role {
    fn from(r: RoleArg) -> Self {
        match r {
            RoleArg::Patient => Role::Patient,
            RoleArg::Therapist => Role::Therapist,
        }
    }
}

/// Who is making the call.
#[derive(Args, Debug, Clone)]
pub struct Caller {
    /// Authenticated username; anonymous when omitted
    #[arg(long, value_name = "NAME")]
    pub user: Option<String>,
    /// Role of the user
    #[arg(long, value_enum, default_value = "patient")]
    pub role: RoleArg,
}

impl Caller {
    pub fn session(&self) -> Session {
        match &self.user {
            Some(name) => Session::authenticated(name.clone(), self.role.into()),
            None => Session::anonymous(),
        }
    }
}

/// A therapist acting from the command line.
#[derive(Args, Debug, Clone)]
pub struct Operator {
    /// Username recorded with the change
    #[arg(long, value_name = "NAME")]
    pub user: String,
    #[arg(long, value_enum, default_value = "therapist")]
    pub role: RoleArg,
}

impl Operator {
    pub fn session(&self) -> Session {
        Session::authenticated(self.user.clone(), self.role.into())
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve JSON-lines requests {method, path, body} from stdin
    Session {
        #[command(flatten)]
        caller: Caller,
    },
    /// Feed a recorded samples CSV through the monitor while polling snapshots
    Replay {
        /// CSV with headers from emg,accel_x,accel_y,accel_z,gyro_x,gyro_y,gyro_z
        #[arg(long, value_name = "FILE")]
        samples: PathBuf,
        /// Override dashboard.poll_ms
        #[arg(long, value_name = "MS")]
        poll_ms: Option<u64>,
        /// Override device.sample_rate_hz
        #[arg(long, value_name = "HZ")]
        rate_hz: Option<u32>,
        /// Ingest as fast as possible instead of at the device rate
        #[arg(long, action = ArgAction::SetTrue)]
        fast: bool,
        /// Username the dashboard polls as
        #[arg(long, value_name = "NAME", default_value = "dashboard")]
        user: String,
    },
    /// Read or write actuator commands
    Command {
        #[command(subcommand)]
        action: CommandAction,
    },
    /// Therapist notes
    Note {
        #[command(subcommand)]
        action: NoteAction,
    },
    /// Validate config and open storage
    SelfCheck,
    /// Health check for operational monitoring
    Health,
}

#[derive(Subcommand, Debug)]
pub enum CommandAction {
    /// Print the current command state
    Get,
    /// Set one motor or all motors
    #[command(group(ArgGroup::new("target").required(true).args(["motor", "all"])))]
    Set {
        /// Motor number (1-6)
        #[arg(long, value_name = "N")]
        motor: Option<usize>,
        /// Apply to all six motors
        #[arg(long, action = ArgAction::SetTrue)]
        all: bool,
        /// Angle in degrees; rounded and clamped to 0..=180
        #[arg(long, allow_negative_numbers = true)]
        angle: f64,
        #[command(flatten)]
        operator: Operator,
    },
}

#[derive(Subcommand, Debug)]
pub enum NoteAction {
    /// Record a note
    Add {
        #[arg(long)]
        text: String,
        #[command(flatten)]
        operator: Operator,
    },
    /// List the most recent notes, newest first
    List {
        #[command(flatten)]
        caller: Caller,
    },
}
