//! JSON-lines request driver.
//!
//! Each stdin line is `{"method": "GET", "path": "/snapshot", "body": ...}`.
//! A string `body` is passed through as raw text, any other JSON value is
//! re-encoded. Each request yields one `{"status": .., "body": ..}` line.

use exo_core::Monitor;
use exo_core::api::{self, Method, Request, Response};
use exo_traits::Authorizer;
use serde::Deserialize;
use serde_json::{Value, json};
use std::io::{BufRead, Write};

#[derive(Debug, Deserialize)]
struct RequestLine {
    method: String,
    path: String,
    #[serde(default)]
    body: Option<Value>,
}

fn parse_line(line: &str) -> Result<Request, String> {
    let raw: RequestLine =
        serde_json::from_str(line).map_err(|e| format!("invalid request line: {e}"))?;
    let method: Method = raw.method.parse()?;
    let body = match raw.body {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(v) => Some(v.to_string()),
    };
    Ok(Request {
        method,
        path: raw.path,
        body,
    })
}

/// Serve requests until `input` ends. Returns the number of requests handled.
pub fn serve(
    monitor: &Monitor,
    caller: &dyn Authorizer,
    input: impl BufRead,
    mut output: impl Write,
) -> eyre::Result<u64> {
    let mut handled = 0u64;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let resp = match parse_line(&line) {
            Ok(req) => api::handle(monitor, caller, &req),
            Err(msg) => {
                tracing::warn!(error = %msg, "bad request line");
                Response {
                    status: 400,
                    body: json!({ "error": msg }),
                }
            }
        };
        serde_json::to_writer(&mut output, &resp)?;
        output.write_all(b"\n")?;
        output.flush()?;
        handled += 1;
    }
    tracing::info!(handled, "session input closed");
    Ok(handled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use exo_core::Session;

    #[test]
    fn string_body_is_raw_and_object_body_is_encoded() {
        let r = parse_line(r#"{"method":"post","path":"/ingest","body":"{bad"}"#).unwrap();
        assert_eq!(r.body.as_deref(), Some("{bad"));
        let r = parse_line(r#"{"method":"POST","path":"/ingest","body":{"emg":1}}"#).unwrap();
        assert_eq!(r.body.as_deref(), Some(r#"{"emg":1}"#));
        let r = parse_line(r#"{"method":"GET","path":"/command"}"#).unwrap();
        assert!(r.body.is_none());
    }

    #[test]
    fn serve_answers_every_line() {
        let monitor = Monitor::builder().build().unwrap();
        let input = concat!(
            r#"{"method":"POST","path":"/ingest","body":{"emg":950}}"#,
            "\n\n",
            "garbage\n",
            r#"{"method":"GET","path":"/snapshot"}"#,
            "\n",
        );
        let mut out = Vec::new();
        let n = serve(&monitor, &Session::patient("pat"), input.as_bytes(), &mut out).unwrap();
        assert_eq!(n, 3);
        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0]["status"], 200);
        assert_eq!(lines[0]["body"]["alerts"][0], "High EMG");
        assert_eq!(lines[1]["status"], 400);
        assert_eq!(lines[2]["body"]["latest"]["emg"], 950.0);
    }
}
