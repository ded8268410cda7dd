//! OCSP-response prefetching for a managed web server.
//!
//! This crate provides:
//! - Certificate fingerprints and the enrollment registry
//! - TTL-driven refresh of cached OCSP responses
//! - A store-preserving restart sequence

pub mod entry;
pub mod fetch;
pub mod fingerprint;
pub mod manager;
pub mod refresh;
pub mod registry;
pub mod restart;
pub mod server;

pub use entry::CacheEntry;
pub use fetch::OcspFetcher;
pub use fingerprint::{Fingerprint, Fingerprinter, Sha256Fingerprinter};
pub use manager::Prefetcher;
pub use refresh::RefreshEngine;
pub use registry::{PrefetchEntry, PrefetchRegistry};
pub use restart::RestartGuard;
pub use server::WebServer;
