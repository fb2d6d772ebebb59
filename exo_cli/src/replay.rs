//! Recorded-session replay: a device feed thread plus a polling dashboard.

use exo_core::Monitor;
use exo_core::feed::Feed;
use exo_core::normalize::SAMPLE_FIELDS;
use exo_traits::{Authorizer, SystemClock};
use serde_json::{Map, Value, json};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Read a samples CSV into raw readings. Cells are kept as text; the
/// normalizer decides what is numeric.
pub fn load_samples_csv(path: &Path) -> eyre::Result<Vec<Value>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open samples CSV {:?}: {}", path, e))?;

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .iter()
        .map(str::to_string)
        .collect();
    let unique: BTreeSet<&str> = headers.iter().map(String::as_str).collect();
    let known = headers.iter().all(|h| SAMPLE_FIELDS.contains(&h.as_str()));
    if headers.is_empty() || !known || unique.len() != headers.len() {
        eyre::bail!(
            "samples CSV must have headers from '{}', got: {}",
            SAMPLE_FIELDS.join(","),
            headers.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.records().enumerate() {
        let rec = rec.map_err(|e| eyre::eyre!("invalid CSV row {}: {}", idx + 2, e))?;
        let obj: Map<String, Value> = headers
            .iter()
            .zip(rec.iter())
            .map(|(h, v)| (h.clone(), Value::String(v.to_string())))
            .collect();
        rows.push(Value::Object(obj));
    }
    Ok(rows)
}

#[derive(Debug, Clone)]
pub struct ReplayParams {
    pub rate_hz: u32,
    pub poll: Duration,
    pub fast: bool,
}

/// Feed `rows` through the monitor, printing one JSON line per dashboard poll
/// and a summary line at the end. Returns early when `shutdown` is raised.
pub fn run(
    monitor: &Arc<Monitor>,
    viewer: &dyn Authorizer,
    rows: Vec<Value>,
    params: &ReplayParams,
    shutdown: &AtomicBool,
    mut out: impl Write,
) -> eyre::Result<()> {
    let total = rows.len();
    tracing::info!(rows = total, rate_hz = params.rate_hz, fast = params.fast, "replay start");
    let feed = if params.fast {
        Feed::spawn_burst(rows.into_iter(), Arc::clone(monitor))
    } else {
        Feed::spawn(
            rows.into_iter(),
            Arc::clone(monitor),
            params.rate_hz,
            SystemClock::new(),
        )
    };

    let mut polls = 0u64;
    let mut alert_polls = 0u64;
    let mut alert_events = 0u64;
    let mut interrupted = false;
    loop {
        if shutdown.load(Ordering::Relaxed) {
            interrupted = true;
            tracing::warn!("replay interrupted");
            break;
        }
        // Sample `finished` before polling so the last poll sees every row.
        let done = feed.is_finished();
        let snap = monitor.snapshot(viewer)?;
        // Readings since the last poll; alerts on them may be gone from `latest`.
        let new_alerts = feed
            .drain()
            .iter()
            .filter(|ing| !ing.alerts.is_empty())
            .count() as u64;
        alert_events += new_alerts;
        polls += 1;
        if !snap.alerts.is_empty() {
            alert_polls += 1;
        }
        let line = json!({
            "poll": polls,
            "ts": monitor.now_ms(),
            "buffered": snap.history.len(),
            "latest": snap.latest,
            "alerts": snap.alerts,
            "new_alerts": new_alerts,
            "commands": snap.commands,
        });
        writeln!(out, "{line}")?;
        out.flush()?;
        if done {
            break;
        }
        std::thread::sleep(params.poll);
    }

    let feed_stats = feed.stats();
    drop(feed);
    let summary = json!({
        "summary": {
            "rows": total,
            "accepted": feed_stats.accepted,
            "rejected": feed_stats.rejected,
            "dropped": feed_stats.dropped,
            "polls": polls,
            "alert_polls": alert_polls,
            "alert_events": alert_events,
            "interrupted": interrupted,
            "monitor": monitor.stats(),
        }
    });
    writeln!(out, "{summary}")?;
    out.flush()?;
    tracing::info!(polls, accepted = feed_stats.accepted, "replay done");
    Ok(())
}
