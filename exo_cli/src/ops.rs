//! One-shot commands: command get/set, notes, self-check and health.

use exo_config::Config;
use exo_core::Monitor;
use serde_json::json;
use std::io::Write;
use std::path::Path;

use crate::cli::{CommandAction, NoteAction};

pub fn command(
    monitor: &Monitor,
    action: &CommandAction,
    mut out: impl Write,
) -> eyre::Result<()> {
    let state = match action {
        CommandAction::Get => monitor.read_command(),
        CommandAction::Set {
            motor,
            all,
            angle,
            operator,
        } => {
            let who = operator.session();
            match (motor, all) {
                (_, true) => monitor.set_all(&who, *angle)?,
                (Some(id), false) => monitor.set_motor(&who, *id, *angle)?,
                (None, false) => eyre::bail!("either --motor or --all is required"),
            }
        }
    };
    writeln!(out, "{}", serde_json::to_string(&state)?)?;
    Ok(())
}

pub fn note(monitor: &Monitor, action: &NoteAction, mut out: impl Write) -> eyre::Result<()> {
    match action {
        NoteAction::Add { text, operator } => {
            let note = monitor.save_note(&operator.session(), text)?;
            writeln!(out, "{}", json!({ "status": "saved", "note": note }))?;
        }
        NoteAction::List { caller } => {
            for n in monitor.list_notes(&caller.session())? {
                writeln!(out, "{}", serde_json::to_string(&n)?)?;
            }
        }
    }
    Ok(())
}

/// Config already loaded and storage opened by the caller; report what is in use.
pub fn self_check(
    cfg: &Config,
    monitor: &Monitor,
    json_mode: bool,
    mut out: impl Write,
) -> eyre::Result<()> {
    let commands = monitor.read_command();
    if json_mode {
        let report = json!({
            "status": "OK",
            "history_capacity": cfg.history.capacity,
            "commands": commands,
        });
        writeln!(out, "{report}")?;
    } else {
        writeln!(out, "OK")?;
        writeln!(
            out,
            "history capacity {}, thresholds emg {} accel {} gyro {}",
            cfg.history.capacity, cfg.thresholds.emg, cfg.thresholds.accel, cfg.thresholds.gyro
        )?;
    }
    Ok(())
}

fn storage_entry(path: Option<&Path>) -> serde_json::Value {
    match path {
        Some(p) => json!({ "path": p.display().to_string(), "exists": p.exists() }),
        None => serde_json::Value::Null,
    }
}

pub fn health(
    cfg: &Config,
    config_path: Option<&Path>,
    monitor: &Monitor,
    mut out: impl Write,
) -> eyre::Result<()> {
    let report = json!({
        "status": "ok",
        "config": config_path.map_or_else(|| "defaults".into(), |p| p.display().to_string()),
        "version": env!("CARGO_PKG_VERSION"),
        "history_capacity": cfg.history.capacity,
        "poll_ms": cfg.dashboard.poll_ms,
        "sample_rate_hz": cfg.device.sample_rate_hz,
        "storage": {
            "samples": storage_entry(cfg.storage.samples_path.as_deref()),
            "notes": storage_entry(cfg.storage.notes_path.as_deref()),
            "commands": storage_entry(cfg.storage.commands_path.as_deref()),
        },
        "monitor": monitor.stats(),
    });
    writeln!(out, "{report}")?;
    Ok(())
}
