//! In-memory collaborators for tests and storage-less runs.

use exo_traits::{CommandPersistence, CommandState, Note, NoteStore, SampleSink, SensorSample};
use std::sync::{Mutex, PoisonError};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Keeps every appended sample in memory.
#[derive(Debug, Default)]
pub struct MemorySampleSink {
    samples: Mutex<Vec<SensorSample>>,
}

impl MemorySampleSink {
    pub fn samples(&self) -> Vec<SensorSample> {
        self.samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SampleSink for MemorySampleSink {
    fn append(&self, sample: &SensorSample) -> Result<(), BoxError> {
        self.samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(*sample);
        Ok(())
    }
}

/// Notes in arrival order; `recent` answers newest first.
#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    notes: Mutex<Vec<Note>>,
}

impl NoteStore for MemoryNoteStore {
    fn append(&self, note: &Note) -> Result<(), BoxError> {
        self.notes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(note.clone());
        Ok(())
    }

    fn recent(&self, limit: usize) -> Result<Vec<Note>, BoxError> {
        let notes = self.notes.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(notes.iter().rev().take(limit).cloned().collect())
    }
}

/// Remembers the last saved command state and how many saves happened.
#[derive(Debug, Default)]
pub struct MemoryCommandPersistence {
    inner: Mutex<(Option<CommandState>, usize)>,
}

impl MemoryCommandPersistence {
    pub fn with_state(state: CommandState) -> Self {
        Self {
            inner: Mutex::new((Some(state), 0)),
        }
    }

    pub fn saved(&self) -> Option<CommandState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).0
    }

    pub fn save_count(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).1
    }
}

impl CommandPersistence for MemoryCommandPersistence {
    fn load(&self) -> Result<Option<CommandState>, BoxError> {
        Ok(self.saved())
    }

    fn save(&self, state: &CommandState) -> Result<(), BoxError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.0 = Some(*state);
        inner.1 += 1;
        Ok(())
    }
}

/// A collaborator whose backing store is gone; every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unavailable;

fn unavailable() -> BoxError {
    Box::new(std::io::Error::other("storage unavailable"))
}

impl SampleSink for Unavailable {
    fn append(&self, _sample: &SensorSample) -> Result<(), BoxError> {
        Err(unavailable())
    }
}

impl NoteStore for Unavailable {
    fn append(&self, _note: &Note) -> Result<(), BoxError> {
        Err(unavailable())
    }

    fn recent(&self, _limit: usize) -> Result<Vec<Note>, BoxError> {
        Err(unavailable())
    }
}

impl CommandPersistence for Unavailable {
    fn load(&self) -> Result<Option<CommandState>, BoxError> {
        Err(unavailable())
    }

    fn save(&self, _state: &CommandState) -> Result<(), BoxError> {
        Err(unavailable())
    }
}
