//! Human-readable error descriptions and structured JSON error formatting.

use exo_core::ExoError;
use exo_storage::StorageError;

fn kind_name(err: &eyre::Report) -> &'static str {
    if let Some(e) = err.downcast_ref::<ExoError>() {
        return match e {
            ExoError::MalformedBody(_) | ExoError::Validation(_) => "Validation",
            ExoError::Unauthenticated => "Unauthenticated",
            ExoError::Forbidden => "Forbidden",
            ExoError::Persistence(_) => "Persistence",
            ExoError::Config(_) => "Config",
        };
    }
    if err.downcast_ref::<StorageError>().is_some() {
        return "Persistence";
    }
    "Error"
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(e) = err.downcast_ref::<ExoError>() {
        return match e {
            ExoError::MalformedBody(msg) => format!(
                "What happened: The request was rejected ({msg}).\nHow to fix: Check the values passed on the command line."
            ),
            ExoError::Validation(msg) => format!(
                "What happened: A value was rejected ({msg}).\nHow to fix: Pass a finite number; motor ids run from 1 to 6."
            ),
            ExoError::Unauthenticated => {
                "What happened: The call requires a logged-in user.\nHow to fix: Pass --user <NAME>.".to_string()
            }
            ExoError::Forbidden => {
                "What happened: Only therapists may change commands or write notes.\nHow to fix: Pass --role therapist for a therapist account.".to_string()
            }
            ExoError::Persistence(msg) => format!(
                "What happened: Storage is unavailable ({msg}).\nLikely causes: Missing directory, full disk, or permissions.\nHow to fix: Check the [storage] paths in the config."
            ),
            ExoError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(se) = err.downcast_ref::<StorageError>() {
        return format!(
            "What happened: {err}.\nLikely causes: {se}.\nHow to fix: Check the [storage] paths in the config and their permissions."
        );
    }

    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("samples csv must have headers") {
        return format!(
            "Invalid headers in samples CSV. Expected a subset of 'emg,accel_x,accel_y,accel_z,gyro_x,gyro_y,gyro_z'.\n{msg}"
        );
    }
    if lower.contains("open samples csv") {
        return format!("What happened: {msg}.\nHow to fix: Check the --samples path.");
    }

    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes per failure class; anything unclassified returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match kind_name(err) {
        "Validation" => 3,
        "Unauthenticated" | "Forbidden" => 4,
        "Persistence" => 5,
        "Config" => 6,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": kind_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
