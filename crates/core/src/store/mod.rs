//! Key-value store for prefetched OCSP responses.
//!
//! This module provides a persistent byte-keyed store with two
//! interchangeable on-disk backends:
//!
//! - Legacy hash-file format (JSON object of base64 pairs)
//! - SQLite-native format with automatic schema migrations
//!
//! The backend is picked at open time from an injected [`BackendSelector`]
//! describing what the deployment provides.

pub mod compat;
pub mod hash_file;
pub mod kv;
pub mod migrations;
pub mod select;
pub mod sqlite;

pub use crate::Error;

pub use kv::{KvStore, OpenMode};
pub use select::{Backend, BackendSelector};
