//! Storage for no-show evidence photos.

use std::path::PathBuf;

use crate::error::{BookingError, Result};

/// Persists evidence bytes and returns a URL referring to them.
pub trait EvidenceStore: Send + Sync {
    fn store(&self, appointment_id: u64, bytes: &[u8]) -> Result<String>;
}

/// Writes evidence files under a directory and hands out `file://` URLs.
#[derive(Debug, Clone)]
pub struct FileEvidenceStore {
    root: PathBuf,
}

impl FileEvidenceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory evidence is written to.
    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

impl EvidenceStore for FileEvidenceStore {
    fn store(&self, appointment_id: u64, bytes: &[u8]) -> Result<String> {
        std::fs::create_dir_all(&self.root).map_err(|e| BookingError::FileSystem {
            path: self.root.clone(),
            source: e,
        })?;

        let path = self
            .root
            .join(format!("appointment-{appointment_id}-no-show.bin"));
        std::fs::write(&path, bytes).map_err(|e| BookingError::FileSystem {
            path: path.clone(),
            source: e,
        })?;

        Ok(format!("file://{}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn writes_bytes_and_returns_url() {
        let dir = TempDir::new().unwrap();
        let store = FileEvidenceStore::new(dir.path().join("evidence"));

        let url = store.store(7, b"jpeg").unwrap();
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("appointment-7-no-show.bin"));

        let written = std::fs::read(store.root().join("appointment-7-no-show.bin")).unwrap();
        assert_eq!(written, b"jpeg");
    }
}
