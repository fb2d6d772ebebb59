#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::must_use_candidate
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Telemetry core of the exosuit monitor (transport-agnostic).
//!
//! Raw device readings go in through `Monitor::ingest`; dashboards read a
//! consistent `Snapshot`; therapists write actuator commands the device polls.
//! Storage, authentication and time are collaborators behind the traits in
//! `exo_traits`.
//!
//! ## Architecture
//!
//! - **Normalizer**: raw JSON reading → `SensorSample` with monotonic stamps (`normalize`)
//! - **History**: bounded FIFO of recent samples (`history`)
//! - **Alerts**: threshold rules over one sample (`alerts`)
//! - **Commands**: clamped motor angles, applied as one unit (`command`)
//! - **Guard**: the single lock around history and commands (`guard`)
//! - **Monitor**: the facade tying it together (`monitor`, built via `builder`)
//! - **API**: status-code level request handling (`api`)
//! - **Feed**: background device thread (`feed`)

pub mod alerts;
pub mod api;
pub mod builder;
pub mod command;
pub mod config;
pub mod conversions;
pub mod error;
pub mod feed;
mod guard;
pub mod history;
pub mod mocks;
pub mod monitor;
pub mod normalize;
pub mod session;
pub mod util;

pub use alerts::{Alert, evaluate};
pub use builder::MonitorBuilder;
pub use config::{AlertThresholds, MonitorCfg};
pub use error::{ExoError, Result};
pub use monitor::{Ingested, Monitor, MonitorStats, Snapshot};
pub use session::Session;
