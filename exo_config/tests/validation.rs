use std::fs;

use exo_config::{load_file, load_toml};
use rstest::rstest;
use tempfile::tempdir;

#[test]
fn empty_file_yields_stock_settings() {
    let cfg = load_toml("").expect("parse TOML");
    cfg.validate().expect("defaults should pass");
    assert_eq!(cfg.history.capacity, 240);
    assert_eq!(cfg.thresholds.emg, 900.0);
    assert_eq!(cfg.thresholds.accel, 8.0);
    assert_eq!(cfg.thresholds.gyro, 200.0);
    assert_eq!(cfg.dashboard.poll_ms, 800);
    assert_eq!(cfg.dashboard.recent_notes, 10);
    assert_eq!(cfg.dashboard.notes_page, 50);
    assert!(cfg.storage.samples_path.is_none());
}

#[test]
fn accepts_full_config() {
    let toml = r#"
[history]
capacity = 120

[thresholds]
emg = 750.0
accel = 6.5
gyro = 150.0

[dashboard]
poll_ms = 500
recent_notes = 5
notes_page = 20

[device]
sample_rate_hz = 25

[storage]
samples_path = "var/samples.jsonl"
notes_path = "var/notes.jsonl"
commands_path = "var/commands.json"

[logging]
level = "debug"
rotation = "daily"
"#;

    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.history.capacity, 120);
    assert_eq!(cfg.thresholds.accel, 6.5);
    assert_eq!(
        cfg.storage.commands_path.as_deref(),
        Some(std::path::Path::new("var/commands.json"))
    );
}

#[rstest]
#[case("[history]\ncapacity = 0", "history.capacity must be >= 1")]
#[case("[thresholds]\nemg = -1.0", "thresholds.emg must be a finite value >= 0")]
#[case("[thresholds]\ngyro = nan", "thresholds.gyro must be a finite value >= 0")]
#[case("[dashboard]\npoll_ms = 0", "dashboard.poll_ms must be >= 1")]
#[case("[dashboard]\nrecent_notes = 0", "dashboard.recent_notes must be >= 1")]
#[case("[device]\nsample_rate_hz = 0", "device.sample_rate_hz must be > 0")]
#[case("[logging]\nrotation = \"weekly\"", "logging.rotation must be one of")]
fn rejects_out_of_range_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(
        format!("{err}").contains(needle),
        "expected '{needle}' in '{err}'"
    );
}

#[test]
fn load_file_reports_parse_errors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[history]\ncapacity = \"many\"\n").unwrap();
    let err = load_file(&path).expect_err("should fail");
    assert!(format!("{err}").contains("invalid configuration"));
}

#[test]
fn load_file_validates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cfg.toml");
    fs::write(&path, "[dashboard]\nnotes_page = 0\n").unwrap();
    let err = load_file(&path).expect_err("should fail validation");
    assert!(format!("{err}").contains("notes_page"));
}

#[test]
fn load_file_reports_missing_file() {
    let dir = tempdir().unwrap();
    let err = load_file(&dir.path().join("absent.toml")).expect_err("missing file");
    assert!(format!("{err}").contains("read config"));
}
