use exo_core::api::{Method, Request, handle};
use exo_core::mocks::{MemoryNoteStore, Unavailable};
use exo_core::{Monitor, Session};
use exo_traits::ManualClock;
use rstest::{fixture, rstest};
use serde_json::json;
use std::sync::Arc;

#[fixture]
fn monitor() -> Monitor {
    Monitor::builder()
        .with_clock(Box::new(ManualClock::new(42_000)))
        .with_note_store(Arc::new(MemoryNoteStore::default()))
        .build()
        .unwrap()
}

#[rstest]
fn ingest_reports_alerts(monitor: Monitor) {
    let r = handle(
        &monitor,
        &Session::anonymous(),
        &Request::json("/ingest", &json!({"emg": 950, "accel_x": 2, "gyro_y": 10})),
    );
    assert_eq!(r.status, 200);
    assert_eq!(r.body, json!({"status": "ok", "alerts": ["High EMG"]}));

    let r = handle(&monitor, &Session::patient("pat"), &Request::get("/get_data"));
    assert_eq!(r.status, 200);
    assert_eq!(r.body["latest"]["emg"], json!(950.0));
    assert_eq!(r.body["alerts"], json!(["High EMG"]));
}

#[rstest]
#[case(None)]
#[case(Some(""))]
#[case(Some("not json"))]
#[case(Some("[1,2,3]"))]
#[case(Some("{}"))]
fn ingest_rejects_unusable_bodies(monitor: Monitor, #[case] body: Option<&str>) {
    let req = Request {
        method: Method::Post,
        path: "/update_data".into(),
        body: body.map(String::from),
    };
    let r = handle(&monitor, &Session::anonymous(), &req);
    assert_eq!(r.status, 400);
    assert_eq!(r.body, json!({"error": "invalid json"}));
}

#[rstest]
fn ingest_field_validation(monitor: Monitor) {
    let r = handle(
        &monitor,
        &Session::anonymous(),
        &Request::json("/ingest", &json!({"emg": "abc"})),
    );
    assert_eq!(r.status, 400);
    assert_eq!(r.body["status"], "error");
    assert!(r.body["error"].as_str().unwrap().contains("emg"));
}

#[rstest]
fn empty_snapshot_has_zero_latest(monitor: Monitor) {
    let r = handle(&monitor, &Session::patient("pat"), &Request::get("/snapshot"));
    assert_eq!(r.status, 200);
    assert_eq!(r.body["latest"]["ts"], json!(42_000));
    assert_eq!(r.body["latest"]["emg"], json!(0.0));
    assert_eq!(r.body["history"], json!([]));
    assert_eq!(r.body["commands"]["motor_1"], json!(0));
}

#[rstest]
fn snapshot_needs_login(monitor: Monitor) {
    let r = handle(&monitor, &Session::anonymous(), &Request::get("/snapshot"));
    assert_eq!(r.status, 401);
    assert_eq!(r.body, json!({"error": "unauthorized"}));
}

#[rstest]
fn command_round_trip(monitor: Monitor) {
    let tom = Session::therapist("tom");
    let r = handle(
        &monitor,
        &tom,
        &Request::json("/set_command", &json!({"motor_1": 300, "motor_2": -5, "motor_3": "90"})),
    );
    assert_eq!(r.status, 200);
    assert_eq!(r.body["status"], "ok");
    assert_eq!(r.body["commands"]["motor_1"], json!(180));

    let r = handle(&monitor, &Session::anonymous(), &Request::get("/get_command"));
    assert_eq!(r.status, 200);
    assert_eq!(
        r.body,
        json!({"motor_1": 180, "motor_2": 0, "motor_3": 90, "motor_4": 0, "motor_5": 0, "motor_6": 0})
    );
}

#[rstest]
fn command_write_checks_role_then_body(monitor: Monitor) {
    let r = handle(&monitor, &Session::patient("pat"), &Request::post("/command", ""));
    assert_eq!(r.status, 403);
    assert_eq!(r.body, json!({"error": "forbidden"}));

    let r = handle(
        &monitor,
        &Session::anonymous(),
        &Request::json("/command", &json!({"motor_1": 90})),
    );
    assert_eq!(r.status, 403);
    assert_eq!(r.body, json!({"error": "forbidden"}));
    assert_eq!(monitor.read_command().motor(1), Some(0));

    let r = handle(
        &monitor,
        &Session::anonymous(),
        &Request::json("/save_note", &json!({"note": "hi"})),
    );
    assert_eq!(r.status, 403);

    let r = handle(&monitor, &Session::therapist("tom"), &Request::post("/command", ""));
    assert_eq!(r.status, 400);
    assert_eq!(r.body, json!({"error": "no json"}));

    let r = handle(
        &monitor,
        &Session::therapist("tom"),
        &Request::json("/command", &json!({"motor_2": [1]})),
    );
    assert_eq!(r.status, 400);
    assert_eq!(r.body["status"], "error");
}

#[rstest]
fn notes_flow(monitor: Monitor) {
    let tom = Session::therapist("tom");
    let r = handle(&monitor, &tom, &Request::json("/save_note", &json!({"note": " knee ok "})));
    assert_eq!(r.status, 200);
    assert_eq!(
        r.body,
        json!({"status": "saved", "note": {"ts": 42_000, "author": "tom", "note": "knee ok"}})
    );

    let r = handle(&monitor, &tom, &Request::json("/notes", &json!({"text": "x"})));
    assert_eq!(r.status, 400);
    assert_eq!(r.body, json!({"error": "missing note"}));

    let r = handle(&monitor, &tom, &Request::json("/notes", &json!({"note": ""})));
    assert_eq!(r.body, json!({"error": "empty note"}));

    let r = handle(&monitor, &Session::patient("pat"), &Request::json("/notes", &json!({"note": "x"})));
    assert_eq!(r.status, 403);

    let r = handle(&monitor, &Session::patient("pat"), &Request::get("/get_notes"));
    assert_eq!(r.status, 200);
    assert_eq!(r.body.as_array().unwrap().len(), 1);
}

#[test]
fn note_store_outage_is_503() {
    let monitor = Monitor::builder()
        .with_note_store(Arc::new(Unavailable))
        .build()
        .unwrap();
    let r = handle(
        &monitor,
        &Session::therapist("tom"),
        &Request::json("/notes", &json!({"note": "hello"})),
    );
    assert_eq!(r.status, 503);
    assert!(!r.is_success());
}

#[rstest]
#[case(Method::Get, "/ingest")]
#[case(Method::Post, "/snapshot")]
#[case(Method::Delete, "/command")]
#[case(Method::Put, "/notes")]
fn wrong_method_is_405(monitor: Monitor, #[case] method: Method, #[case] path: &str) {
    let req = Request {
        method,
        path: path.into(),
        body: None,
    };
    let r = handle(&monitor, &Session::therapist("tom"), &req);
    assert_eq!(r.status, 405);
    assert_eq!(r.body, json!({"error": "method not allowed"}));
}

#[rstest]
fn unknown_path_is_404(monitor: Monitor) {
    let r = handle(&monitor, &Session::therapist("tom"), &Request::get("/dashboard"));
    assert_eq!(r.status, 404);
    assert_eq!(r.body, json!({"error": "not found"}));
}
