use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Replace `path` with `bytes` so readers see either the old or the new
/// content, never a partial write.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("new");
    {
        let mut f = File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    fs::rename(tmp, path)
}

/// Open `path` for appending, creating it and its parent directory.
pub fn open_append(path: &Path) -> std::io::Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Newline-terminated record writer for JSON-lines journals.
///
/// A failed or interrupted write can leave a torn record at the end of the
/// file. The next append then starts on a fresh line, so only the torn record
/// is lost and the readers' skip/report logic sees it on its own line.
#[derive(Debug)]
pub struct LineAppender<W> {
    out: W,
    torn: bool,
}

impl LineAppender<File> {
    /// Open `path` for appending; a file not ending in `\n` counts as torn.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let torn = ends_mid_line(path)?;
        if torn {
            tracing::warn!(path = %path.display(), "journal ends with a partial line");
        }
        Ok(Self::new(open_append(path)?, torn))
    }
}

impl<W: Write> LineAppender<W> {
    pub fn new(out: W, torn: bool) -> Self {
        Self { out, torn }
    }

    /// Write `record` followed by `\n`.
    pub fn append(&mut self, record: &[u8]) -> std::io::Result<()> {
        if self.torn {
            self.out.write_all(b"\n")?;
            self.torn = false;
        }
        let res = self
            .out
            .write_all(record)
            .and_then(|()| self.out.write_all(b"\n"));
        if res.is_err() {
            self.torn = true;
        }
        res
    }

    pub fn is_torn(&self) -> bool {
        self.torn
    }
}

fn ends_mid_line(path: &Path) -> std::io::Result<bool> {
    let mut f = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if f.metadata()?.len() == 0 {
        return Ok(false);
    }
    f.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    f.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}
