//! Config loading and monitor assembly.

use eyre::WrapErr;
use exo_config::Config;
use exo_core::{AlertThresholds, ExoError, Monitor, MonitorCfg};
use exo_storage::{CommandFile, JsonlNoteStore, JsonlSampleSink};
use std::path::Path;
use std::sync::Arc;

/// Load and validate the config file, or the built-in defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> eyre::Result<Config> {
    match path {
        Some(p) => exo_config::load_file(p)
            .map_err(|e| eyre::Report::new(ExoError::Config(format!("{e:#}")))),
        None => Ok(Config::default()),
    }
}

/// Open the configured storage and build the monitor.
pub fn build_monitor(cfg: &Config) -> eyre::Result<Arc<Monitor>> {
    let mut builder = Monitor::builder()
        .with_thresholds(AlertThresholds::from(&cfg.thresholds))
        .with_cfg(MonitorCfg::from(cfg));

    if let Some(path) = &cfg.storage.samples_path {
        let sink = JsonlSampleSink::open(path)
            .wrap_err_with(|| format!("open sample log {}", path.display()))?;
        builder = builder.with_sample_sink(Arc::new(sink));
    }
    if let Some(path) = &cfg.storage.notes_path {
        let notes = JsonlNoteStore::open(path)
            .wrap_err_with(|| format!("open note journal {}", path.display()))?;
        tracing::debug!(count = notes.len(), "notes loaded");
        builder = builder.with_note_store(Arc::new(notes));
    }
    if let Some(path) = &cfg.storage.commands_path {
        builder = builder.with_command_persistence(Arc::new(CommandFile::new(path)));
    }

    let monitor = builder.build()?;
    tracing::info!(
        capacity = monitor.cfg().history_capacity,
        emg = monitor.thresholds().emg,
        "monitor ready"
    );
    Ok(Arc::new(monitor))
}
