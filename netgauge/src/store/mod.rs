//! Payload persistence in a work directory.
//!
//! Each consumed payload is written to `<dir>/<stem><N>.<ext>` with a
//! monotonically increasing index, the way the panel work directory
//! accumulates `img0.jpeg`, `img1.jpeg`, ... On open the store resumes past
//! the highest index already on disk, so restarts never overwrite earlier
//! payloads.
//!
//! # Example
//!
//! ```ignore
//! use netgauge::store::PayloadStore;
//!
//! let store = PayloadStore::open("/work/netgauge", "img", "jpeg")?;
//! let path = store.persist(&payload)?;   // /work/netgauge/img0.jpeg
//! let stats = store.stats()?;
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tracing::debug;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error reading or writing the work directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Aggregate numbers for the store's directory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of payload files.
    pub files: u64,
    /// Total payload bytes on disk.
    pub bytes: u64,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} files, {} bytes", self.files, self.bytes)
    }
}

/// Sequentially-named payload sink over one work directory.
///
/// Thread-safe: the index counter is atomic, so a store can be shared
/// across gauge instances behind an `Arc`.
pub struct PayloadStore {
    directory: PathBuf,
    stem: String,
    extension: String,
    next_index: AtomicU64,
}

impl PayloadStore {
    /// Opens (creating if necessary) the work directory and positions the
    /// index counter past any existing payload files.
    ///
    /// # Arguments
    ///
    /// * `directory` - work directory for payload files
    /// * `stem` - filename stem, e.g. `img`
    /// * `extension` - filename extension without the dot, e.g. `jpeg`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created or
    /// scanned.
    pub fn open(
        directory: impl Into<PathBuf>,
        stem: impl Into<String>,
        extension: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let directory = directory.into();
        let stem = stem.into();
        let extension = extension.into();

        fs::create_dir_all(&directory)?;

        let mut next_index = 0u64;
        for entry in fs::read_dir(&directory)? {
            let entry = entry?;
            if let Some(index) = parse_index(&entry.file_name().to_string_lossy(), &stem, &extension)
            {
                next_index = next_index.max(index + 1);
            }
        }

        debug!(
            directory = %directory.display(),
            next_index,
            "payload store opened"
        );

        Ok(Self {
            directory,
            stem,
            extension,
            next_index: AtomicU64::new(next_index),
        })
    }

    /// Returns the work directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Writes a payload under the next sequential filename.
    ///
    /// # Returns
    ///
    /// The path of the written file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the write fails. The index is consumed
    /// either way, so a later success never reuses a failed slot's name.
    pub fn persist(&self, payload: &[u8]) -> Result<PathBuf, StoreError> {
        let index = self.next_index.fetch_add(1, Ordering::Relaxed);
        let path = self
            .directory
            .join(format!("{}{}.{}", self.stem, index, self.extension));

        fs::write(&path, payload)?;
        debug!(path = %path.display(), bytes = payload.len(), "payload persisted");
        Ok(path)
    }

    /// Counts the store's payload files and their total size.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be read.
    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        let mut stats = StoreStats::default();
        for entry in fs::read_dir(&self.directory)? {
            let entry = entry?;
            let name = entry.file_name();
            if parse_index(&name.to_string_lossy(), &self.stem, &self.extension).is_some() {
                stats.files += 1;
                stats.bytes += entry.metadata()?.len();
            }
        }
        Ok(stats)
    }

    /// Deletes all of the store's payload files.
    ///
    /// Files not matching the store's naming scheme are left alone.
    ///
    /// # Returns
    ///
    /// What was removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be read or a file
    /// cannot be removed.
    pub fn clear(&self) -> Result<StoreStats, StoreError> {
        let mut removed = StoreStats::default();
        for entry in fs::read_dir(&self.directory)? {
            let entry = entry?;
            let name = entry.file_name();
            if parse_index(&name.to_string_lossy(), &self.stem, &self.extension).is_some() {
                let size = entry.metadata()?.len();
                fs::remove_file(entry.path())?;
                removed.files += 1;
                removed.bytes += size;
            }
        }
        self.next_index.store(0, Ordering::Relaxed);
        Ok(removed)
    }
}

/// Extracts `N` from `<stem>N.<extension>`, or `None` for foreign files.
fn parse_index(file_name: &str, stem: &str, extension: &str) -> Option<u64> {
    let rest = file_name.strip_prefix(stem)?;
    let digits = rest.strip_suffix(&format!(".{}", extension))?;
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
