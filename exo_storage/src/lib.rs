#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! File-backed collaborators for the exosuit monitor.

pub mod commands;
pub mod error;
pub mod notes;
pub mod samples;
pub mod util;

pub use commands::CommandFile;
pub use error::StorageError;
pub use notes::JsonlNoteStore;
pub use samples::{JsonlSampleSink, read_samples};
