use exo_core::mocks::{MemoryNoteStore, MemorySampleSink, Unavailable};
use exo_core::{Alert, AlertThresholds, ExoError, Monitor, MonitorCfg, Session};
use exo_traits::{CommandState, ManualClock};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn monitor_at(clock: &ManualClock) -> Monitor {
    Monitor::builder()
        .with_clock(Box::new(clock.clone()))
        .build()
        .unwrap()
}

#[test]
fn ingest_then_snapshot_end_to_end() {
    let clock = ManualClock::new(1_700_000_000_000);
    let monitor = monitor_at(&clock);

    let out = monitor
        .ingest(&json!({"emg": 950, "accel_x": 2, "gyro_y": 10}))
        .unwrap();
    assert_eq!(out.alerts, vec![Alert::HighEmg]);
    assert!(out.persisted);

    let snap = monitor.snapshot(&Session::patient("pat")).unwrap();
    let latest = snap.latest.unwrap();
    assert_eq!(latest.emg, 950.0);
    assert_eq!(latest.timestamp_ms, 1_700_000_000_000);
    assert_eq!(snap.alerts, vec![Alert::HighEmg]);
    assert_eq!(snap.history.len(), 1);
    assert_eq!(snap.commands, CommandState::zeroed());
}

#[test]
fn alert_boundary_is_strict() {
    let monitor = Monitor::builder().build().unwrap();
    assert!(
        monitor
            .ingest(&json!({"emg": 901}))
            .unwrap()
            .alerts
            .contains(&Alert::HighEmg)
    );
    assert!(monitor.ingest(&json!({"emg": 900})).unwrap().alerts.is_empty());
    assert!(monitor.ingest(&json!({"emg": 899})).unwrap().alerts.is_empty());
    let a = monitor
        .ingest(&json!({"accel_x": -8.5, "gyro_y": -201}))
        .unwrap()
        .alerts;
    assert_eq!(a, vec![Alert::HighAccelX, Alert::HighGyroY]);
}

#[test]
fn history_is_bounded_and_ordered() {
    let clock = ManualClock::new(0);
    let monitor = Monitor::builder()
        .with_clock(Box::new(clock.clone()))
        .with_history_capacity(240)
        .build()
        .unwrap();
    for i in 0..300 {
        monitor.ingest(&json!({ "emg": i })).unwrap();
        clock.advance(Duration::from_millis(20));
    }
    let snap = monitor.snapshot(&Session::patient("pat")).unwrap();
    assert_eq!(snap.history.len(), 240);
    assert_eq!(snap.history[0].emg, 60.0);
    assert_eq!(snap.history[239].emg, 299.0);
    assert!(
        snap.history
            .windows(2)
            .all(|w| w[0].timestamp_ms <= w[1].timestamp_ms)
    );
    let stats = monitor.stats();
    assert_eq!(stats.ingested, 300);
    assert_eq!(stats.buffered, 240);
    assert_eq!(stats.capacity, 240);
}

#[test]
fn timestamps_never_go_backwards() {
    let clock = ManualClock::new(10_000);
    let monitor = monitor_at(&clock);
    monitor.ingest(&json!({"emg": 1})).unwrap();
    clock.set_offset_ms(-5_000);
    let s = monitor.ingest(&json!({"emg": 2})).unwrap().sample;
    assert_eq!(s.timestamp_ms, 10_000);
}

#[test]
fn rejected_reading_is_not_buffered() {
    let monitor = Monitor::builder().build().unwrap();
    let err = monitor.ingest(&json!({"emg": [1, 2]})).unwrap_err();
    assert!(matches!(err, ExoError::Validation(ref m) if m.contains("emg")));
    assert_eq!(monitor.stats().rejected, 1);
    assert!(
        monitor
            .snapshot(&Session::patient("pat"))
            .unwrap()
            .history
            .is_empty()
    );
}

#[test]
fn snapshot_requires_authentication() {
    let monitor = Monitor::builder().build().unwrap();
    assert_eq!(
        monitor.snapshot(&Session::anonymous()).unwrap_err(),
        ExoError::Unauthenticated
    );
    let empty = monitor.snapshot(&Session::patient("pat")).unwrap();
    assert!(empty.latest.is_none());
    assert!(empty.alerts.is_empty());
}

#[test]
fn sink_failure_keeps_sample_live() {
    let monitor = Monitor::builder()
        .with_sample_sink(Arc::new(Unavailable))
        .build()
        .unwrap();
    let out = monitor.ingest(&json!({"emg": 5})).unwrap();
    assert!(!out.persisted);
    assert_eq!(monitor.stats().sink_failures, 1);
    let snap = monitor.snapshot(&Session::therapist("tom")).unwrap();
    assert_eq!(snap.latest.unwrap().emg, 5.0);
}

#[test]
fn sink_receives_every_accepted_sample() {
    let sink = Arc::new(MemorySampleSink::default());
    let monitor = Monitor::builder()
        .with_sample_sink(sink.clone())
        .build()
        .unwrap();
    monitor.ingest(&json!({"emg": 1})).unwrap();
    monitor.ingest(&json!({"emg": "x"})).unwrap_err();
    monitor.ingest(&json!({"emg": 3})).unwrap();
    let emg: Vec<f64> = sink.samples().iter().map(|s| s.emg).collect();
    assert_eq!(emg, vec![1.0, 3.0]);
}

#[test]
fn notes_are_saved_and_listed_newest_first() {
    let clock = ManualClock::new(5_000);
    let monitor = Monitor::builder()
        .with_clock(Box::new(clock.clone()))
        .with_note_store(Arc::new(MemoryNoteStore::default()))
        .with_cfg(MonitorCfg {
            recent_notes: 2,
            ..MonitorCfg::default()
        })
        .build()
        .unwrap();
    let tom = Session::therapist("tom");
    for text in ["first", "  second  ", "third"] {
        monitor.save_note(&tom, text).unwrap();
        clock.advance(Duration::from_secs(1));
    }
    let notes = monitor.list_notes(&Session::patient("pat")).unwrap();
    let texts: Vec<&str> = notes.iter().map(|n| n.note.as_str()).collect();
    assert_eq!(texts, ["third", "second", "first"]);
    assert_eq!(notes[0].author, "tom");
    assert_eq!(notes[2].ts, 5_000);

    let snap = monitor.snapshot(&tom).unwrap();
    assert_eq!(snap.notes.len(), 2);
    assert_eq!(snap.notes[0].note, "third");
}

#[test]
fn note_rules() {
    let monitor = Monitor::builder().build().unwrap();
    assert_eq!(
        monitor.save_note(&Session::patient("pat"), "hi").unwrap_err(),
        ExoError::Forbidden
    );
    assert_eq!(
        monitor.save_note(&Session::therapist("tom"), "   ").unwrap_err(),
        ExoError::MalformedBody("empty note")
    );
    assert_eq!(
        monitor.list_notes(&Session::anonymous()).unwrap_err(),
        ExoError::Unauthenticated
    );
}

#[test]
fn note_store_outage() {
    let monitor = Monitor::builder()
        .with_note_store(Arc::new(Unavailable))
        .build()
        .unwrap();
    let tom = Session::therapist("tom");
    let err = monitor.save_note(&tom, "hello").unwrap_err();
    assert!(matches!(err, ExoError::Persistence(_)));
    assert_eq!(err.status(), 503);
    assert!(monitor.list_notes(&tom).unwrap().is_empty());
    assert!(monitor.snapshot(&tom).unwrap().notes.is_empty());
}

#[test]
fn unreadable_persisted_commands_start_from_initial_state() {
    let monitor = Monitor::builder()
        .with_command_persistence(Arc::new(Unavailable))
        .with_initial_commands(CommandState::from_angles([90; 6]))
        .build()
        .unwrap();
    assert_eq!(monitor.read_command().angles(), [90; 6]);
    // a failing save does not fail the write
    let state = monitor.set_motor(&Session::therapist("tom"), 1, 10.0).unwrap();
    assert_eq!(state.motor(1), Some(10));
}

#[test]
fn builder_rejects_bad_values() {
    let err = Monitor::builder()
        .with_history_capacity(0)
        .build()
        .unwrap_err();
    assert!(matches!(err, ExoError::Config(_)));
    let err = Monitor::builder()
        .with_history_capacity(usize::MAX)
        .build()
        .unwrap_err();
    assert!(matches!(err, ExoError::Config(ref m) if m.contains("<= 1000000")));
    assert!(
        Monitor::builder()
            .with_history_capacity(1_000_000)
            .build()
            .is_ok()
    );
    let err = Monitor::builder()
        .with_thresholds(AlertThresholds {
            emg: f64::NAN,
            ..AlertThresholds::default()
        })
        .build()
        .unwrap_err();
    assert!(matches!(err, ExoError::Config(_)));
}

#[test]
fn concurrent_ingest_and_snapshot() {
    let monitor = Arc::new(Monitor::builder().with_history_capacity(64).build().unwrap());
    let producers: Vec<_> = (0..4)
        .map(|t| {
            let m = Arc::clone(&monitor);
            std::thread::spawn(move || {
                for i in 0..250 {
                    m.ingest(&json!({ "emg": t * 1_000 + i })).unwrap();
                }
            })
        })
        .collect();
    let pat = Session::patient("pat");
    for _ in 0..100 {
        let snap = monitor.snapshot(&pat).unwrap();
        assert!(snap.history.len() <= 64);
        assert_eq!(snap.latest, snap.history.last().copied());
    }
    for p in producers {
        p.join().unwrap();
    }
    assert_eq!(monitor.stats().ingested, 1_000);
    assert_eq!(monitor.stats().buffered, 64);
}
