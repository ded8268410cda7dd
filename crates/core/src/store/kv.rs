//! Key-value store handle over the selected backend.

use std::path::{Path, PathBuf};

use crate::Error;
use crate::store::hash_file::HashFileStore;
use crate::store::select::{Backend, BackendSelector};
use crate::store::sqlite::SqliteStore;

/// How a missing backing file is treated at open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Fail when the backing file does not exist.
    MustExist,
    /// Create the backing file (and parent directories) as needed.
    Create,
}

#[derive(Debug)]
enum StoreImpl {
    HashFile(HashFileStore),
    Sqlite(SqliteStore),
}

/// Open handle to the OCSP store.
///
/// The handle owns the underlying backend; `close` consumes it, so a
/// closed store cannot be used again. One handle per path at a time.
#[derive(Debug)]
pub struct KvStore {
    backend: Backend,
    file: PathBuf,
    inner: StoreImpl,
}

impl KvStore {
    /// Open the store at the given logical path.
    ///
    /// The selector decides which backend handles the path; the legacy
    /// hash-file backend appends a `.db` suffix, SQLite uses the path as
    /// given. Every failure normalizes to `Error::StoreOpen` with the
    /// typed cause preserved.
    pub fn open(path: &Path, mode: OpenMode, selector: &BackendSelector) -> Result<Self, Error> {
        let backend = selector
            .choose()
            .map_err(|fault| Error::StoreOpen { path: path.to_path_buf(), source: fault })?;
        let file = backend.backing_file(path);

        let inner = match backend {
            Backend::HashFile => HashFileStore::open(&file, mode).map(StoreImpl::HashFile),
            Backend::Sqlite => SqliteStore::open(&file, mode).map(StoreImpl::Sqlite),
        }
        .map_err(|fault| Error::StoreOpen { path: file.clone(), source: fault })?;

        tracing::debug!(backend = %backend, file = %file.display(), "opened OCSP store");

        Ok(Self { backend, file, inner })
    }

    /// Backend this handle was opened with.
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Resolved path of the backing file.
    pub fn backing_file(&self) -> &Path {
        &self.file
    }

    /// Look up a key, returning `None` when it is not cached.
    pub fn try_get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        let value = match &self.inner {
            StoreImpl::HashFile(store) => store.try_get(key)?,
            StoreImpl::Sqlite(store) => store.try_get(key)?,
        };
        Ok(value)
    }

    /// Look up a key that is expected to be present.
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyNotFound` when the key is not cached.
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>, Error> {
        self.try_get(key)?.ok_or_else(|| Error::KeyNotFound(hex::encode(key)))
    }

    /// Insert or overwrite one entry. Durable only after `close`.
    pub fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), Error> {
        match &mut self.inner {
            StoreImpl::HashFile(store) => store.set(key, value),
            StoreImpl::Sqlite(store) => store.set(key, value)?,
        }
        Ok(())
    }

    /// Snapshot of all keys, in backend-defined order.
    pub fn keys(&self) -> Result<Vec<Vec<u8>>, Error> {
        let keys = match &self.inner {
            StoreImpl::HashFile(store) => store.keys()?,
            StoreImpl::Sqlite(store) => store.keys()?,
        };
        Ok(keys)
    }

    /// Number of stored entries.
    pub fn len(&self) -> Result<usize, Error> {
        let len = match &self.inner {
            StoreImpl::HashFile(store) => store.len(),
            StoreImpl::Sqlite(store) => store.len()?,
        };
        Ok(len)
    }

    /// Flush and release the store.
    pub fn close(self) -> Result<(), Error> {
        match self.inner {
            StoreImpl::HashFile(store) => store.close()?,
            StoreImpl::Sqlite(store) => store.close()?,
        }
        Ok(())
    }
}
