//! SQLite-native backend.
//!
//! Newer deployments keep the OCSP store in the same SQLite database the
//! server's session-cache module reads. Entries live in a single `entries`
//! table keyed by raw fingerprint bytes.

use std::path::Path;

use rusqlite::{Connection, OpenFlags, params};

use super::migrations;
use crate::error::StoreFault;
use crate::store::kv::OpenMode;

/// Open SQLite store handle.
///
/// Callers normally go through [`KvStore`](crate::store::KvStore), which
/// resolves the backing path before opening.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the database at an already-resolved backing path.
    ///
    /// `Create` makes the file and parent directories as needed;
    /// `MustExist` fails when the file is not already present.
    pub fn open(path: &Path, mode: OpenMode) -> Result<Self, StoreFault> {
        let conn = match mode {
            OpenMode::Create => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                Connection::open(path)?
            }
            OpenMode::MustExist => {
                Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_URI)?
            }
        };

        // The backing file must stay a single copyable unit for restart
        // backups; WAL would leave -wal/-shm sidecars behind.
        conn.execute_batch(
            "PRAGMA journal_mode=DELETE;
             PRAGMA synchronous=FULL;
             PRAGMA temp_store=MEMORY;",
        )?;

        migrations::run(&conn)?;

        Ok(Self { conn })
    }

    pub fn try_get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreFault> {
        let mut stmt = self.conn.prepare("SELECT value FROM entries WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, Vec<u8>>(0));

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert or overwrite one entry.
    pub fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreFault> {
        self.conn.execute(
            "INSERT INTO entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// All keys, in table scan order.
    pub fn keys(&self) -> Result<Vec<Vec<u8>>, StoreFault> {
        let mut stmt = self.conn.prepare("SELECT key FROM entries")?;
        let rows = stmt.query_map([], |row| row.get::<_, Vec<u8>>(0))?;
        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }

    pub fn len(&self) -> Result<usize, StoreFault> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Flush and release the connection.
    pub fn close(self) -> Result<(), StoreFault> {
        self.conn.close().map_err(|(_, e)| StoreFault::Database(e))
    }
}
