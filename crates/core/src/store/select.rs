//! Backend selection for the OCSP store.
//!
//! Which on-disk format the store uses depends on what the deployment
//! provides: newer servers ship an SQLite-backed session cache, older ones
//! only understand the legacy hash-file format. The selector captures that
//! capability set as a plain value passed to every store open.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::StoreFault;
use crate::store::compat;

/// On-disk format of the OCSP store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Legacy single-file hash database (JSON object of base64 pairs).
    HashFile,
    /// SQLite-native session-cache store.
    Sqlite,
}

impl Backend {
    /// Resolve the logical store path to the actual backing file.
    ///
    /// The legacy format appends a `.db` suffix when the path does not
    /// already carry one; SQLite uses the path as given.
    pub fn backing_file(&self, path: &Path) -> PathBuf {
        match self {
            Backend::Sqlite => path.to_path_buf(),
            Backend::HashFile => {
                if path.extension().is_some_and(|ext| ext == "db") {
                    path.to_path_buf()
                } else {
                    let mut raw = path.as_os_str().to_os_string();
                    raw.push(".db");
                    PathBuf::from(raw)
                }
            }
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::HashFile => f.write_str("hash-file"),
            Backend::Sqlite => f.write_str("sqlite"),
        }
    }
}

/// Store backends available in the current deployment.
///
/// `native_library` names the library backing the server's session-cache
/// engine, when one is present; `has_hash_file` reports whether the legacy
/// hash-file tooling is usable. Built once during configurator startup and
/// passed to every store open.
#[derive(Debug, Clone)]
pub struct BackendSelector {
    native_library: Option<String>,
    has_hash_file: bool,
}

impl BackendSelector {
    /// Deployment with a native session-cache engine (legacy tooling is
    /// assumed present alongside it).
    pub fn native(library: impl Into<String>) -> Self {
        Self { native_library: Some(library.into()), has_hash_file: true }
    }

    /// Deployment with only the legacy hash-file tooling.
    pub fn hash_file_only() -> Self {
        Self { native_library: None, has_hash_file: true }
    }

    /// Deployment with no usable backend at all.
    pub fn none() -> Self {
        Self { native_library: None, has_hash_file: false }
    }

    /// Library backing the native engine, if one is present.
    pub fn native_library(&self) -> Option<&str> {
        self.native_library.as_deref()
    }

    /// Whether the legacy hash-file tooling is available.
    pub fn has_hash_file(&self) -> bool {
        self.has_hash_file
    }

    /// Pick the backend to open with, preferring an accepted native engine
    /// over the legacy format.
    ///
    /// A native engine outside the accepted family is skipped here; the
    /// compatibility check rejects such deployments before any store opens.
    pub fn choose(&self) -> Result<Backend, StoreFault> {
        if let Some(library) = self.native_library.as_deref() {
            if compat::is_accepted(library) {
                return Ok(Backend::Sqlite);
            }
        }
        if self.has_hash_file {
            return Ok(Backend::HashFile);
        }
        Err(StoreFault::NoBackend)
    }
}
