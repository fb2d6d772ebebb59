//! Ingestion/query facade.
//!
//! `Monitor` is built once at startup (see `Monitor::builder`), shared as
//! `Arc<Monitor>` with every request handler, and lives until shutdown. It is
//! the only way to reach the history buffer and the command store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use exo_traits::clock::Clock;
use exo_traits::{
    Authorizer, CommandPersistence, CommandState, Note, NoteStore, SampleSink, SensorSample,
};
use serde::Serialize;
use serde_json::Value;

use crate::alerts::{Alert, evaluate};
use crate::builder::MonitorBuilder;
use crate::command::CommandUpdate;
use crate::config::{AlertThresholds, MonitorCfg};
use crate::error::{ExoError, Result};
use crate::guard::Guard;
use crate::normalize::Normalizer;

/// Result of an accepted reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ingested {
    pub sample: SensorSample,
    pub alerts: Vec<Alert>,
    /// False when the durable sink rejected the sample (the live view still has it).
    pub persisted: bool,
}

/// Consistent view for a dashboard poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Buffered samples, oldest first.
    pub history: Vec<SensorSample>,
    pub latest: Option<SensorSample>,
    pub commands: CommandState,
    /// Most recent notes, newest first.
    pub notes: Vec<Note>,
    /// Alerts raised by `latest`.
    pub alerts: Vec<Alert>,
}

/// Counters for health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonitorStats {
    pub ingested: u64,
    pub rejected: u64,
    pub sink_failures: u64,
    pub buffered: usize,
    pub capacity: usize,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) ingested: AtomicU64,
    pub(crate) rejected: AtomicU64,
    pub(crate) sink_failures: AtomicU64,
}

pub struct Monitor {
    pub(crate) guard: Guard,
    pub(crate) normalizer: Normalizer,
    pub(crate) thresholds: AlertThresholds,
    pub(crate) cfg: MonitorCfg,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) sink: Option<Arc<dyn SampleSink>>,
    pub(crate) notes: Arc<dyn NoteStore>,
    pub(crate) persistence: Option<Arc<dyn CommandPersistence>>,
    // Serializes command saves; each save writes the newest in-memory state.
    pub(crate) persist_lock: Mutex<()>,
    pub(crate) counters: Counters,
}

impl core::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Monitor")
            .field("thresholds", &self.thresholds)
            .field("cfg", &self.cfg)
            .field("has_sink", &self.sink.is_some())
            .field("has_persistence", &self.persistence.is_some())
            .finish()
    }
}

impl Monitor {
    /// Start building a Monitor.
    pub fn builder() -> MonitorBuilder {
        MonitorBuilder::default()
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    pub fn cfg(&self) -> &MonitorCfg {
        &self.cfg
    }

    /// Current time of the monitor's clock, in epoch milliseconds.
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Accept one raw device reading.
    ///
    /// The sample lands in the history buffer before the durable sink is
    /// called, and the sink is called outside the guard; a sink failure is
    /// logged and reported through `Ingested::persisted`.
    pub fn ingest(&self, raw: &Value) -> Result<Ingested> {
        let sample = match self.normalizer.normalize(raw) {
            Ok(s) => s,
            Err(e) => {
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(error = %e, "sample rejected");
                return Err(e);
            }
        };
        self.guard.with(|s| s.history.append(sample));
        self.counters.ingested.fetch_add(1, Ordering::Relaxed);

        let persisted = match &self.sink {
            Some(sink) => match sink.append(&sample) {
                Ok(()) => true,
                Err(e) => {
                    self.counters.sink_failures.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(error = %e, ts = sample.timestamp_ms, "sample sink append failed");
                    false
                }
            },
            None => true,
        };

        let alerts = evaluate(&sample, &self.thresholds);
        if !alerts.is_empty() {
            tracing::info!(ts = sample.timestamp_ms, ?alerts, "threshold alert");
        }
        Ok(Ingested {
            sample,
            alerts,
            persisted,
        })
    }

    /// Dashboard view. Requires an authenticated caller.
    ///
    /// History and commands are copied under one guard acquisition. Notes are
    /// read afterwards; a note store failure yields an empty list.
    pub fn snapshot(&self, caller: &dyn Authorizer) -> Result<Snapshot> {
        if !caller.is_authenticated() {
            return Err(ExoError::Unauthenticated);
        }
        let (history, commands) = self
            .guard
            .with(|s| (s.history.snapshot(), s.commands.read()));
        let notes = self.recent_notes(self.cfg.recent_notes);
        let latest = history.last().copied();
        let alerts = latest
            .map(|s| evaluate(&s, &self.thresholds))
            .unwrap_or_default();
        Ok(Snapshot {
            history,
            latest,
            commands,
            notes,
            alerts,
        })
    }

    /// Current command state. No authorization: this is the device's polling path.
    pub fn read_command(&self) -> CommandState {
        self.guard.with(|s| s.commands.read())
    }

    /// Apply the recognized motor keys of a request body.
    ///
    /// Checks, in order: therapist role (anonymous callers are forbidden),
    /// non-empty JSON object, then each recognized key. Unrecognized keys are ignored; a body with no
    /// recognized key leaves the state unchanged and succeeds.
    pub fn write_command(&self, caller: &dyn Authorizer, fields: &Value) -> Result<CommandState> {
        self.authorize_therapist(caller)?;
        let fields = fields
            .as_object()
            .filter(|m| !m.is_empty())
            .ok_or(ExoError::MalformedBody("no json"))?;
        let update = CommandUpdate::from_fields(fields)?;
        Ok(self.apply_update(caller, &update))
    }

    /// Set one motor (1-based id).
    pub fn set_motor(
        &self,
        caller: &dyn Authorizer,
        motor_id: usize,
        angle: f64,
    ) -> Result<CommandState> {
        self.authorize_therapist(caller)?;
        let update = CommandUpdate::motor(motor_id, angle)?;
        Ok(self.apply_update(caller, &update))
    }

    /// Set all six motors atomically.
    pub fn set_all(&self, caller: &dyn Authorizer, angle: f64) -> Result<CommandState> {
        self.authorize_therapist(caller)?;
        let update = CommandUpdate::all(angle)?;
        Ok(self.apply_update(caller, &update))
    }

    /// Record a therapist note. The text is trimmed and must not be empty.
    pub fn save_note(&self, caller: &dyn Authorizer, text: &str) -> Result<Note> {
        self.authorize_therapist(caller)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ExoError::MalformedBody("empty note"));
        }
        let note = Note {
            ts: self.clock.now_ms(),
            author: caller.username().unwrap_or("therapist").to_string(),
            note: text.to_string(),
        };
        self.notes
            .append(&note)
            .map_err(|e| ExoError::persistence(e.as_ref()))?;
        tracing::info!(author = %note.author, ts = note.ts, "note saved");
        Ok(note)
    }

    /// Latest notes page, newest first. Requires an authenticated caller.
    pub fn list_notes(&self, caller: &dyn Authorizer) -> Result<Vec<Note>> {
        if !caller.is_authenticated() {
            return Err(ExoError::Unauthenticated);
        }
        Ok(self.recent_notes(self.cfg.notes_page))
    }

    pub fn stats(&self) -> MonitorStats {
        let (buffered, capacity) = self
            .guard
            .with(|s| (s.history.len(), s.history.capacity()));
        MonitorStats {
            ingested: self.counters.ingested.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
            sink_failures: self.counters.sink_failures.load(Ordering::Relaxed),
            buffered,
            capacity,
        }
    }

    /// Writes answer `Forbidden` to anyone who is not a therapist, anonymous
    /// callers included.
    fn authorize_therapist(&self, caller: &dyn Authorizer) -> Result<()> {
        if !caller.is_therapist() {
            tracing::warn!(user = caller.username().unwrap_or("?"), "privileged call refused");
            return Err(ExoError::Forbidden);
        }
        Ok(())
    }

    fn apply_update(&self, caller: &dyn Authorizer, update: &CommandUpdate) -> CommandState {
        if update.is_empty() {
            return self.read_command();
        }
        let state = self.guard.with(|s| s.commands.apply(update));
        tracing::info!(
            user = caller.username().unwrap_or("?"),
            angles = ?state.angles(),
            "command updated"
        );
        self.persist_commands();
        state
    }

    fn persist_commands(&self) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        let _serial = self
            .persist_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let latest = self.read_command();
        if let Err(e) = persistence.save(&latest) {
            tracing::warn!(error = %e, "command state not persisted");
        }
    }

    fn recent_notes(&self, limit: usize) -> Vec<Note> {
        match self.notes.recent(limit) {
            Ok(notes) => notes,
            Err(e) => {
                tracing::warn!(error = %e, "note store unavailable");
                Vec::new()
            }
        }
    }
}
