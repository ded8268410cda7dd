//! Legacy hash-file backend.
//!
//! The oldest deployments store OCSP responses in a single flat file: one
//! JSON object mapping base64-encoded keys to base64-encoded values. The
//! whole table lives in memory while the store is open and is written back
//! in one piece on close.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::error::StoreFault;
use crate::store::kv::OpenMode;

/// In-memory view of a legacy hash-file store.
///
/// Callers normally go through [`KvStore`](crate::store::KvStore), which
/// resolves the backing path before opening.
#[derive(Debug)]
pub struct HashFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl HashFileStore {
    /// Open a hash-file store at an already-resolved backing path.
    ///
    /// `MustExist` requires the file to be present; `Create` starts from an
    /// empty table when it is not, creating parent directories as needed.
    pub fn open(path: &Path, mode: OpenMode) -> Result<Self, StoreFault> {
        let entries = match mode {
            OpenMode::MustExist => Self::read_entries(path)?,
            OpenMode::Create => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                if path.exists() { Self::read_entries(path)? } else { BTreeMap::new() }
            }
        };

        Ok(Self { path: path.to_path_buf(), entries })
    }

    fn read_entries(path: &Path) -> Result<BTreeMap<String, String>, StoreFault> {
        let raw = std::fs::read(path)?;
        serde_json::from_slice(&raw).map_err(|e| StoreFault::Corrupt(e.to_string()))
    }

    pub fn try_get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreFault> {
        match self.entries.get(&BASE64.encode(key)) {
            Some(encoded) => {
                let value = BASE64.decode(encoded).map_err(|e| StoreFault::Corrupt(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub fn set(&mut self, key: &[u8], value: &[u8]) {
        self.entries.insert(BASE64.encode(key), BASE64.encode(value));
    }

    /// All keys, ordered by their base64 encoding.
    pub fn keys(&self) -> Result<Vec<Vec<u8>>, StoreFault> {
        self.entries
            .keys()
            .map(|encoded| BASE64.decode(encoded).map_err(|e| StoreFault::Corrupt(e.to_string())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Write the table back to disk and release the store.
    pub fn close(self) -> Result<(), StoreFault> {
        let raw = serde_json::to_vec(&self.entries).map_err(|e| StoreFault::Corrupt(e.to_string()))?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}
