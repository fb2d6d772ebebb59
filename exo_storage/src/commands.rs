//! Durable command state: one JSON object, replaced atomically on every save.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use exo_traits::{CommandPersistence, CommandState};

use crate::error::{Result, StorageError};
use crate::util::write_atomic;

#[derive(Debug, Clone)]
pub struct CommandFile {
    path: PathBuf,
}

impl CommandFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` when no state has been saved yet.
    pub fn read(&self) -> Result<Option<CommandState>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                path: self.path.clone(),
                msg: e.to_string(),
            })
    }

    pub fn write(&self, state: &CommandState) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let bytes = serde_json::to_vec_pretty(state)?;
        write_atomic(&self.path, &bytes)?;
        tracing::trace!(path = %self.path.display(), "command state saved");
        Ok(())
    }
}

impl CommandPersistence for CommandFile {
    fn load(
        &self,
    ) -> std::result::Result<Option<CommandState>, Box<dyn std::error::Error + Send + Sync>> {
        self.read().map_err(Into::into)
    }

    fn save(
        &self,
        state: &CommandState,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.write(state).map_err(Into::into)
    }
}
