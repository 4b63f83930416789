//! Scoped on-disk storage for in-flight uploads.

use crate::error::{Error, Result};
use crate::upload::{sanitize_filename, too_large};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Directory that holds uploads for the duration of one request each.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    max_bytes: u64,
}

impl UploadStore {
    /// Open (creating if needed) the upload directory.
    pub fn new(root: impl Into<PathBuf>, max_bytes: u64) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| Error::Storage {
            path: root.clone(),
            source: e,
        })?;
        Ok(Self { root, max_bytes })
    }

    /// Upload directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maximum accepted payload size in bytes.
    pub const fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Storage path for a request id and client filename.
    ///
    /// The id prefix keeps concurrent uploads of the same name apart.
    pub fn path_for(&self, id: Uuid, filename: &str) -> PathBuf {
        self.root
            .join(format!("{}-{}", id.simple(), sanitize_filename(filename)))
    }

    /// Write `bytes` to a fresh file owned by the returned guard.
    pub fn persist(&self, id: Uuid, filename: &str, bytes: &[u8]) -> Result<ScopedFile> {
        if bytes.len() as u64 > self.max_bytes {
            return Err(too_large(self.max_bytes));
        }

        let path = self.path_for(id, filename);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| Error::Storage {
                path: path.clone(),
                source: e,
            })?;

        // From here on the guard owns the path, so a failed write still cleans up.
        let guard = ScopedFile::new(path);
        file.write_all(bytes)
            .and_then(|()| file.flush())
            .map_err(|e| Error::Storage {
                path: guard.path().to_path_buf(),
                source: e,
            })?;

        debug!("Saved {} bytes to {}", bytes.len(), guard.path().display());
        Ok(guard)
    }
}

/// RAII guard for a persisted upload.
///
/// Removal is idempotent: a file that is already gone counts as removed.
/// If explicit removal fails, dropping the guard tries once more.
#[derive(Debug)]
pub struct ScopedFile {
    path: PathBuf,
    removed: bool,
}

impl ScopedFile {
    /// Take ownership of an existing path.
    pub const fn new(path: PathBuf) -> Self {
        Self {
            path,
            removed: false,
        }
    }

    /// Path of the stored upload.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file has been removed through this guard.
    pub const fn is_removed(&self) -> bool {
        self.removed
    }

    /// Delete the file, treating "not found" as success.
    pub fn remove(&mut self) -> Result<()> {
        if self.removed {
            return Ok(());
        }

        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Temporary file cleaned up: {}", self.path.display());
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Temporary file already gone: {}", self.path.display());
            }
            Err(e) => {
                error!(
                    "Failed to remove temporary file {}: {}",
                    self.path.display(),
                    e
                );
                return Err(Error::Storage {
                    path: self.path.clone(),
                    source: e,
                });
            }
        }

        self.removed = true;
        Ok(())
    }
}

impl Drop for ScopedFile {
    fn drop(&mut self) {
        if !self.removed && self.remove().is_err() {
            warn!("Temporary file left behind: {}", self.path.display());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::constants::upload::MAX_BYTES;
    use crate::upload::UploadedAudio;
    use tempfile::TempDir;

    #[test]
    fn test_persist_writes_bytes_under_root() {
        let temp_dir = TempDir::new().unwrap();
        let store = UploadStore::new(temp_dir.path().join("uploads"), 1024).unwrap();

        let file = store.persist(Uuid::new_v4(), "call.wav", b"RIFF").unwrap();
        assert!(file.path().starts_with(store.root()));
        assert_eq!(fs::read(file.path()).unwrap(), b"RIFF");
    }

    #[test]
    fn test_path_for_sanitizes_and_prefixes() {
        let temp_dir = TempDir::new().unwrap();
        let store = UploadStore::new(temp_dir.path(), 1024).unwrap();
        let id = Uuid::new_v4();
        let path = store.path_for(id, "../../etc/evil call.wav");
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(name, format!("{}-evil_call.wav", id.simple()));
        assert_eq!(path.parent().unwrap(), store.root());
    }

    #[test]
    fn test_same_filename_does_not_collide() {
        let temp_dir = TempDir::new().unwrap();
        let store = UploadStore::new(temp_dir.path(), 1024).unwrap();

        let a = store.persist(Uuid::new_v4(), "call.wav", b"a").unwrap();
        let b = store.persist(Uuid::new_v4(), "call.wav", b"b").unwrap();
        assert_ne!(a.path(), b.path());

        drop(a);
        assert!(b.path().exists());
        assert_eq!(fs::read(b.path()).unwrap(), b"b");
    }

    #[test]
    fn test_persist_rejects_oversize() {
        let temp_dir = TempDir::new().unwrap();
        let store = UploadStore::new(temp_dir.path(), 2).unwrap();
        let err = store.persist(Uuid::new_v4(), "x.wav", b"abc").unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
        assert_eq!(err.to_string(), "File too large. Maximum size is 2 bytes");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_persist_oversize_message_matches_validation() {
        let temp_dir = TempDir::new().unwrap();
        let store = UploadStore::new(temp_dir.path(), MAX_BYTES).unwrap();
        let bytes = vec![0u8; usize::try_from(MAX_BYTES).unwrap() + 1];

        let err = store.persist(Uuid::new_v4(), "big.wav", &bytes).unwrap_err();
        let expected = UploadedAudio::new("big.wav", bytes).validate(MAX_BYTES).unwrap_err();
        assert_eq!(err.to_string(), "File too large. Maximum size is 16MB");
        assert_eq!(err.to_string(), expected.to_string());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = UploadStore::new(temp_dir.path(), 1024).unwrap();
        let mut file = store.persist(Uuid::new_v4(), "x.wav", b"abc").unwrap();

        file.remove().unwrap();
        assert!(!file.path().exists());
        file.remove().unwrap();
        assert!(file.is_removed());
    }

    #[test]
    fn test_remove_tolerates_file_already_deleted() {
        let temp_dir = TempDir::new().unwrap();
        let store = UploadStore::new(temp_dir.path(), 1024).unwrap();
        let mut file = store.persist(Uuid::new_v4(), "x.wav", b"abc").unwrap();

        fs::remove_file(file.path()).unwrap();
        assert!(file.remove().is_ok());
    }

    #[test]
    fn test_drop_removes_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = UploadStore::new(temp_dir.path(), 1024).unwrap();
        let file = store.persist(Uuid::new_v4(), "x.wav", b"abc").unwrap();
        let path = file.path().to_path_buf();

        drop(file);
        assert!(!path.exists());
    }
}
