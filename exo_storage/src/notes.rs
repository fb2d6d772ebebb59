//! JSON-lines note journal.
//!
//! Existing notes are loaded when the store opens; afterwards the file is only
//! appended to and queries are answered from memory.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use exo_traits::{Note, NoteStore};

use crate::error::Result;
use crate::util::LineAppender;

#[derive(Debug)]
struct Journal {
    file: LineAppender<File>,
    notes: Vec<Note>,
}

#[derive(Debug)]
pub struct JsonlNoteStore {
    path: PathBuf,
    inner: Mutex<Journal>,
}

impl JsonlNoteStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let notes = load_notes(&path)?;
        tracing::debug!(path = %path.display(), count = notes.len(), "note journal opened");
        let file = LineAppender::open(&path)?;
        Ok(Self {
            path,
            inner: Mutex::new(Journal { file, notes }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .notes
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(&self, note: &Note) -> Result<()> {
        let line = serde_json::to_vec(note)?;
        let mut j = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        j.file.append(&line)?;
        j.notes.push(note.clone());
        Ok(())
    }
}

// Unreadable lines are skipped so one bad write does not hide the rest.
fn load_notes(path: &Path) -> Result<Vec<Note>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut notes = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Note>(&line) {
            Ok(n) => notes.push(n),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    line = idx + 1,
                    error = %e,
                    "skipping unreadable note"
                );
            }
        }
    }
    Ok(notes)
}

impl NoteStore for JsonlNoteStore {
    fn append(
        &self,
        note: &Note,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.write(note).map_err(Into::into)
    }

    fn recent(
        &self,
        limit: usize,
    ) -> std::result::Result<Vec<Note>, Box<dyn std::error::Error + Send + Sync>> {
        let j = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(j.notes.iter().rev().take(limit).cloned().collect())
    }
}
