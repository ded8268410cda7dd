//! Unified error types for staplr.

use std::path::PathBuf;

/// Unified error types for the staplr workspace.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Store could not be opened at the given path.
    #[error("STORE_OPEN: {}: {source}", path.display())]
    StoreOpen {
        path: PathBuf,
        #[source]
        source: StoreFault,
    },

    /// Store operation failed after a successful open.
    #[error("STORE_IO: {0}")]
    StoreIo(#[from] StoreFault),

    /// No entry found for the given key.
    #[error("KEY_NOT_FOUND: {0}")]
    KeyNotFound(String),

    /// Available store backend is not of an accepted kind.
    #[error("NOT_SUPPORTED: {0}")]
    NotSupported(String),

    /// Server configuration test failed.
    #[error("CONFIG_TEST_FAILED: {0}")]
    Validation(String),

    /// Server restart or reload failed.
    #[error("RELOAD_FAILED: {0}")]
    Reload(String),

    /// Prefetching an OCSP response failed fatally.
    #[error("PREFETCH_FAILED: {0}")]
    Prefetch(String),

    /// Certificate fingerprint could not be computed.
    #[error("FINGERPRINT_FAILED: {0}")]
    Fingerprint(String),
}

/// Normalized cause of a store failure, independent of the backend in use.
#[derive(Debug, thiserror::Error)]
pub enum StoreFault {
    /// No backend is available in this deployment.
    #[error("no usable store backend available")]
    NoBackend,

    /// Underlying file I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Store file exists but cannot be decoded.
    #[error("corrupt store file: {0}")]
    Corrupt(String),

    /// SQLite operation failed.
    #[error(transparent)]
    Database(#[from] rusqlite::Error),

    /// Schema migration failed to apply.
    #[error("migration failed: {0}")]
    Migration(String),
}
