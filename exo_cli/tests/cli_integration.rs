use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Minimal valid config with all storage under `dir`
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let root = dir.path().display().to_string().replace('\\', "/");
    let toml = format!(
        r#"
[history]
capacity = 240

[thresholds]
emg = 900.0
accel = 8.0
gyro = 200.0

[dashboard]
poll_ms = 10

[device]
sample_rate_hz = 200

[storage]
samples_path = "{root}/samples.jsonl"
notes_path = "{root}/notes.jsonl"
commands_path = "{root}/commands.json"
"#
    );
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn exo(cfg: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("exo").unwrap();
    cmd.arg("--config").arg(cfg);
    cmd
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["self-check"], 0, "OK", "stdout")]
#[case(&["command", "get"], 0, "\"motor_1\":0", "stdout")]
#[case(&["command", "set", "--angle", "10"], 2, "required", "stderr")]
#[case(&["command", "set", "--all", "--angle", "90", "--user", "pat", "--role", "patient"], 4, "Only therapists", "stderr")]
#[case(&["command", "set", "--motor", "7", "--angle", "90", "--user", "tom"], 3, "motor id", "stderr")]
#[case(&["note", "list"], 4, "--user", "stderr")]
#[case(&["note", "add", "--text", "  ", "--user", "tom"], 3, "empty note", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = exo(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[test]
fn command_state_persists_across_runs() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    exo(&cfg)
        .args(["command", "set", "--motor", "2", "--angle", "300", "--user", "tom"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"motor_2\":180"));

    exo(&cfg)
        .args(["command", "set", "--all", "--angle", "-20", "--user", "tom"])
        .assert()
        .success();

    exo(&cfg)
        .args(["command", "get"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"motor_6\":0"));

    let saved = fs::read_to_string(dir.path().join("commands.json")).unwrap();
    let v: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(v["motor_2"], 0);
}

#[test]
fn notes_are_listed_newest_first() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    for text in ["first", "second"] {
        exo(&cfg)
            .args(["note", "add", "--text", text, "--user", "tom"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"status\":\"saved\""));
    }
    let out = exo(&cfg)
        .args(["note", "list", "--user", "pat"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&out);
    let notes: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0]["note"], "second");
    assert_eq!(notes[1]["author"], "tom");
}

#[test]
fn cli_reports_bad_samples_header() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let bad_csv = dir.path().join("samples.csv");
    let mut f = fs::File::create(&bad_csv).unwrap();
    writeln!(f, "emg,pulse").unwrap();
    writeln!(f, "100,60").unwrap();

    exo(&cfg)
        .arg("replay")
        .arg("--samples")
        .arg(&bad_csv)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid headers"));
}

#[test]
fn invalid_config_exits_with_config_code() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[history]\ncapacity = 0\n").unwrap();
    Command::cargo_bin("exo")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .arg("self-check")
        .assert()
        .code(6)
        .stderr(predicate::str::contains("history.capacity"));
}

#[test]
fn runs_without_config_file() {
    Command::cargo_bin("exo")
        .unwrap()
        .arg("health")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"config\":\"defaults\""));
}
