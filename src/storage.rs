//! Upload directory on disk.
//!
//! All task files live flat in one directory; rows in `uploaded_files`
//! reference them by name.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Flat directory holding uploaded files.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create upload dir {:?}", self.dir))
    }

    /// Full path of a stored file.
    pub fn path(&self, stored_name: &str) -> PathBuf {
        self.dir.join(stored_name)
    }

    /// Write `contents` under `{unix_secs}_{name}` and return the stored name.
    ///
    /// `name` must already be sanitised. If another upload in the same second
    /// took that name, `{unix_secs}_{n}_{name}` is used instead; existing files
    /// are never overwritten.
    pub fn save(&self, name: &str, contents: &[u8]) -> Result<String> {
        self.ensure_dir()?;
        let secs = chrono::Utc::now().timestamp();

        let mut attempt = 0u32;
        loop {
            let stored_name = if attempt == 0 {
                format!("{}_{}", secs, name)
            } else {
                format!("{}_{}_{}", secs, attempt, name)
            };
            let path = self.path(&stored_name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(contents)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    debug!(file = %stored_name, bytes = contents.len(), "Stored upload");
                    return Ok(stored_name);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    attempt += 1;
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to create {:?}", path));
                }
            }
        }
    }

    /// Remove a stored file. A file that is already gone is not an error.
    pub fn remove(&self, stored_name: &str) -> Result<bool> {
        let path = self.path(stored_name);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(file = %stored_name, "Stored file already missing");
                Ok(false)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to remove {:?}", path)),
        }
    }
}
