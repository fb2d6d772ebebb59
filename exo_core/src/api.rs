//! Request/response surface of the monitor.
//!
//! Transport-free: a front end (HTTP server, the CLI session driver, tests)
//! turns whatever it receives into a `Request`, passes the caller's identity,
//! and writes the `Response` back. Status codes and bodies here are the whole
//! external contract.

use exo_traits::{Authorizer, SensorSample};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::ExoError;
use crate::monitor::Monitor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl std::str::FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            other => Err(format!("unsupported method '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Path, optionally with a query string (ignored).
    pub path: String,
    /// Raw body text as received.
    pub body: Option<String>,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body.into()),
        }
    }

    /// POST with a JSON body.
    pub fn json(path: impl Into<String>, body: &Value) -> Self {
        Self::post(path, body.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<ExoError> for Response {
    fn from(e: ExoError) -> Self {
        match &e {
            ExoError::Validation(reason) => Self {
                status: e.status(),
                body: json!({ "status": "error", "error": reason }),
            },
            ExoError::MalformedBody(m) => Self::error(e.status(), m),
            _ => Self::error(e.status(), &e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Ingest,
    Snapshot,
    Command,
    Notes,
}

fn route(path: &str) -> Option<Route> {
    let path = path.split('?').next().unwrap_or_default();
    let path = match path.strip_suffix('/') {
        Some(p) if !p.is_empty() => p,
        _ => path,
    };
    match path {
        "/ingest" | "/update_data" => Some(Route::Ingest),
        "/snapshot" | "/get_data" => Some(Route::Snapshot),
        "/command" | "/get_command" | "/set_command" => Some(Route::Command),
        "/notes" | "/get_notes" | "/save_note" => Some(Route::Notes),
        _ => None,
    }
}

/// Parse a request body as a non-empty JSON object.
fn object_body(body: Option<&str>) -> Option<Value> {
    let text = body.map(str::trim).filter(|t| !t.is_empty())?;
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(|v| v.as_object().is_some_and(|m| !m.is_empty()))
}

/// Dispatch one request as `caller`.
pub fn handle(monitor: &Monitor, caller: &dyn Authorizer, req: &Request) -> Response {
    let Some(route) = route(&req.path) else {
        tracing::debug!(path = %req.path, "no route");
        return Response::error(404, "not found");
    };
    let body = req.body.as_deref();
    let resp = match (route, req.method) {
        (Route::Ingest, Method::Post) => ingest(monitor, body),
        (Route::Snapshot, Method::Get) => snapshot(monitor, caller),
        (Route::Command, Method::Get) => Response::ok(json!(monitor.read_command())),
        (Route::Command, Method::Post) => write_command(monitor, caller, body),
        (Route::Notes, Method::Post) => save_note(monitor, caller, body),
        (Route::Notes, Method::Get) => match monitor.list_notes(caller) {
            Ok(notes) => Response::ok(json!(notes)),
            Err(e) => e.into(),
        },
        _ => Response::error(405, "method not allowed"),
    };
    tracing::debug!(method = ?req.method, path = %req.path, status = resp.status, "handled");
    resp
}

fn ingest(monitor: &Monitor, body: Option<&str>) -> Response {
    let Some(raw) = object_body(body) else {
        return ExoError::MalformedBody("invalid json").into();
    };
    match monitor.ingest(&raw) {
        Ok(ingested) => Response::ok(json!({ "status": "ok", "alerts": ingested.alerts })),
        Err(e) => e.into(),
    }
}

fn snapshot(monitor: &Monitor, caller: &dyn Authorizer) -> Response {
    match monitor.snapshot(caller) {
        Ok(snap) => {
            let latest = snap
                .latest
                .unwrap_or_else(|| SensorSample::zero(monitor.now_ms()));
            Response::ok(json!({
                "history": snap.history,
                "latest": latest,
                "commands": snap.commands,
                "notes": snap.notes,
                "alerts": snap.alerts,
            }))
        }
        Err(e) => e.into(),
    }
}

fn write_command(monitor: &Monitor, caller: &dyn Authorizer, body: Option<&str>) -> Response {
    // Role is checked before the body is looked at.
    let fields = object_body(body).unwrap_or(Value::Null);
    match monitor.write_command(caller, &fields) {
        Ok(commands) => Response::ok(json!({ "status": "ok", "commands": commands })),
        Err(e) => e.into(),
    }
}

fn save_note(monitor: &Monitor, caller: &dyn Authorizer, body: Option<&str>) -> Response {
    if !caller.is_therapist() {
        return ExoError::Forbidden.into();
    }
    let text = object_body(body)
        .and_then(|v| v.get("note").and_then(Value::as_str).map(String::from));
    let Some(text) = text else {
        return ExoError::MalformedBody("missing note").into();
    };
    match monitor.save_note(caller, &text) {
        Ok(note) => Response::ok(json!({ "status": "saved", "note": note })),
        Err(e) => e.into(),
    }
}
