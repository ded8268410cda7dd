//! Core types and shared functionality for staplr.
//!
//! This crate provides:
//! - Key-value store with interchangeable on-disk backends
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod store;

pub use config::AppConfig;
pub use error::{Error, StoreFault};
pub use store::{Backend, BackendSelector, KvStore, OpenMode};
