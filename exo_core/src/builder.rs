//! Builder for `Monitor`.
//!
//! Every collaborator is optional: without a sample sink samples only live in
//! the history buffer, without command persistence the command state starts
//! zeroed and is never saved, and notes default to an in-memory store.

use std::sync::{Arc, Mutex};

use exo_traits::clock::{Clock, SystemClock};
use exo_traits::{CommandPersistence, CommandState, NoteStore, SampleSink};

use crate::command::CommandStore;
use crate::config::{AlertThresholds, MonitorCfg};
use crate::error::{ExoError, Result};
use crate::guard::{Guard, LiveState};
use crate::history::{HistoryBuffer, MAX_CAPACITY};
use crate::mocks::MemoryNoteStore;
use crate::monitor::{Counters, Monitor};
use crate::normalize::Normalizer;

/// Builder for `Monitor`. Values are validated on `build()`.
#[derive(Default)]
pub struct MonitorBuilder {
    thresholds: Option<AlertThresholds>,
    cfg: Option<MonitorCfg>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    sink: Option<Arc<dyn SampleSink>>,
    notes: Option<Arc<dyn NoteStore>>,
    persistence: Option<Arc<dyn CommandPersistence>>,
    initial_commands: Option<CommandState>,
}

impl MonitorBuilder {
    pub fn with_thresholds(mut self, thresholds: AlertThresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }
    pub fn with_cfg(mut self, cfg: MonitorCfg) -> Self {
        self.cfg = Some(cfg);
        self
    }
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        let mut cfg = self.cfg.unwrap_or_default();
        cfg.history_capacity = capacity;
        self.cfg = Some(cfg);
        self
    }
    /// Provide a custom clock implementation; defaults to `SystemClock` when not provided.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
    pub fn with_sample_sink(mut self, sink: Arc<dyn SampleSink>) -> Self {
        self.sink = Some(sink);
        self
    }
    pub fn with_note_store(mut self, notes: Arc<dyn NoteStore>) -> Self {
        self.notes = Some(notes);
        self
    }
    /// Durable command state. The last saved state is loaded on `build()`.
    pub fn with_command_persistence(mut self, persistence: Arc<dyn CommandPersistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }
    /// Starting command state when nothing was persisted.
    pub fn with_initial_commands(mut self, state: CommandState) -> Self {
        self.initial_commands = Some(state);
        self
    }

    /// Validate and build the Monitor.
    pub fn build(self) -> Result<Monitor> {
        let thresholds = self.thresholds.unwrap_or_default();
        let cfg = self.cfg.unwrap_or_default();

        thresholds
            .check()
            .map_err(|m| ExoError::Config(m.to_string()))?;
        if cfg.history_capacity == 0 {
            return Err(ExoError::Config("history capacity must be >= 1".into()));
        }
        if cfg.history_capacity > MAX_CAPACITY {
            return Err(ExoError::Config(format!(
                "history capacity must be <= {MAX_CAPACITY}, got {}",
                cfg.history_capacity
            )));
        }
        if cfg.recent_notes == 0 || cfg.notes_page == 0 {
            return Err(ExoError::Config("note limits must be >= 1".into()));
        }

        let clock: Arc<dyn Clock + Send + Sync> = match self.clock {
            Some(b) => Arc::from(b),
            None => Arc::new(SystemClock::new()),
        };

        let mut commands = self.initial_commands.unwrap_or_default();
        if let Some(p) = &self.persistence {
            match p.load() {
                Ok(Some(saved)) => {
                    tracing::info!(angles = ?saved.angles(), "restored command state");
                    commands = saved;
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "persisted command state unreadable; starting fresh"),
            }
        }

        let state = LiveState {
            history: HistoryBuffer::new(cfg.history_capacity),
            commands: CommandStore::new(commands),
        };

        Ok(Monitor {
            guard: Guard::new(state),
            normalizer: Normalizer::new(Arc::clone(&clock)),
            thresholds,
            cfg,
            clock,
            sink: self.sink,
            notes: self
                .notes
                .unwrap_or_else(|| Arc::new(MemoryNoteStore::default())),
            persistence: self.persistence,
            persist_lock: Mutex::new(()),
            counters: Counters::default(),
        })
    }
}
