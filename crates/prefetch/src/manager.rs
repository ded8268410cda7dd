//! Prefetch lifecycle facade.
//!
//! `Prefetcher` wires the collaborator seams together: compatibility and
//! version preflight, module enabling, enrollment, the immediate first
//! refresh, periodic refresh passes, and the store-preserving restart.

use std::path::Path;

use staplr_core::store::compat;
use staplr_core::{AppConfig, BackendSelector, Error, KvStore, OpenMode};

use crate::fetch::OcspFetcher;
use crate::fingerprint::{Fingerprint, Fingerprinter};
use crate::refresh::RefreshEngine;
use crate::registry::{PrefetchEntry, PrefetchRegistry};
use crate::restart::RestartGuard;
use crate::server::WebServer;

/// Server modules the prefetch feature depends on.
pub const REQUIRED_MODULES: &[&str] = &["socache_dbm", "headers"];

/// Oldest server version whose session-cache module family can staple
/// from a prefetched store.
pub const MIN_SERVER_VERSION: (u32, u32, u32) = (2, 4, 0);

/// Drives the OCSP prefetch lifecycle against one managed server.
pub struct Prefetcher {
    config: AppConfig,
    selector: BackendSelector,
    registry: PrefetchRegistry,
    fetcher: Box<dyn OcspFetcher>,
    server: Box<dyn WebServer>,
    fingerprinter: Box<dyn Fingerprinter>,
}

impl Prefetcher {
    pub fn new(
        config: AppConfig, selector: BackendSelector, fetcher: Box<dyn OcspFetcher>, server: Box<dyn WebServer>,
        fingerprinter: Box<dyn Fingerprinter>,
    ) -> Self {
        Self { config, selector, registry: PrefetchRegistry::new(), fetcher, server, fingerprinter }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn registry(&self) -> &PrefetchRegistry {
        &self.registry
    }

    /// Enroll a certificate for OCSP prefetching and fetch its first
    /// response.
    ///
    /// Preflight order: backend compatibility, server version, required
    /// modules. A fetch that produces no response leaves the enrollment in
    /// place with a warning; a store-level failure rolls the enrollment
    /// back to its prior state, recovers the server configuration, and
    /// surfaces the error.
    pub fn enable(&mut self, cert_path: &Path, chain_path: &Path, server_names: &[String]) -> Result<Fingerprint, Error> {
        compat::ensure_compatible(&self.selector)?;
        self.check_server_version()?;
        for module in REQUIRED_MODULES {
            self.server.enable_module(module)?;
        }

        let fp = self.fingerprinter.compute_fingerprint(cert_path)?;
        let prior = self.registry.get(&fp).cloned();
        let entry = self
            .registry
            .enroll(fp, cert_path.to_path_buf(), chain_path.to_path_buf(), server_names.iter().cloned())
            .clone();

        match self.refresh_now(&fp, &entry) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(
                    fingerprint = %fp,
                    "initial OCSP prefetch produced no response; retrying on the next refresh pass"
                );
            }
            Err(e) => {
                match prior {
                    Some(previous) => self.registry.insert(fp, previous),
                    None => {
                        self.registry.remove(&fp);
                    }
                }
                self.server.recover_config();
                return Err(e);
            }
        }

        tracing::debug!(fingerprint = %fp, names = entry.server_names.len(), "enabled OCSP prefetching");
        Ok(fp)
    }

    /// Drop a certificate from prefetching.
    ///
    /// Its cache entry, if any, stays in the store untouched and simply
    /// stops being refreshed.
    pub fn disable(&mut self, fp: &Fingerprint) -> bool {
        self.registry.remove(fp).is_some()
    }

    /// Refresh every enrolled certificate under the configured TTL.
    pub fn update_all(&self) -> Result<usize, Error> {
        let engine = RefreshEngine::new(&self.config, &self.selector, self.fetcher.as_ref());
        engine.update_all(&self.registry, self.config.refresh_ttl())
    }

    /// Restart the server, preserving the store across the reload.
    pub fn restart(&self) -> Result<(), Error> {
        RestartGuard::new(&self.config, &self.selector).restart(self.server.as_ref(), &self.registry)
    }

    fn refresh_now(&self, fp: &Fingerprint, entry: &PrefetchEntry) -> Result<bool, Error> {
        let engine = RefreshEngine::new(&self.config, &self.selector, self.fetcher.as_ref());
        let mut store = KvStore::open(&self.config.store_path, OpenMode::Create, &self.selector)?;
        let stored = engine.refresh_one(&mut store, fp, entry)?;
        store.close()?;
        Ok(stored)
    }

    fn check_server_version(&self) -> Result<(), Error> {
        let version = self.server.version();
        if version < MIN_SERVER_VERSION {
            let (major, minor, patch) = version;
            let (min_major, min_minor, min_patch) = MIN_SERVER_VERSION;
            return Err(Error::NotSupported(format!(
                "OCSP prefetching requires server {min_major}.{min_minor}.{min_patch} or newer, found {major}.{minor}.{patch}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::path::PathBuf;
    use std::rc::Rc;

    use crate::entry::CacheEntry;

    #[derive(Default)]
    struct ServerLog {
        modules: Vec<String>,
        recoveries: usize,
    }

    struct FakeServer {
        log: Rc<RefCell<ServerLog>>,
        version: (u32, u32, u32),
    }

    impl WebServer for FakeServer {
        fn enable_module(&self, module: &str) -> Result<(), Error> {
            self.log.borrow_mut().modules.push(module.to_string());
            Ok(())
        }

        fn version(&self) -> (u32, u32, u32) {
            self.version
        }

        fn validate_config(&self) -> bool {
            true
        }

        fn reload(&self) -> Result<(), Error> {
            Ok(())
        }

        fn recover_config(&self) {
            self.log.borrow_mut().recoveries += 1;
        }
    }

    struct FakeFetcher {
        response: Option<Vec<u8>>,
        calls: Rc<Cell<usize>>,
    }

    impl OcspFetcher for FakeFetcher {
        fn fetch_ocsp(&self, _cert_path: &Path, _chain_path: &Path, out: &Path) -> bool {
            self.calls.set(self.calls.get() + 1);
            match &self.response {
                Some(bytes) => std::fs::write(out, bytes).is_ok(),
                None => false,
            }
        }
    }

    struct PinnedFingerprinter(Fingerprint);

    impl Fingerprinter for PinnedFingerprinter {
        fn compute_fingerprint(&self, _cert_path: &Path) -> Result<Fingerprint, Error> {
            Ok(self.0)
        }
    }

    struct Harness {
        prefetcher: Prefetcher,
        log: Rc<RefCell<ServerLog>>,
        fetch_calls: Rc<Cell<usize>>,
        fp: Fingerprint,
    }

    fn harness(store_path: PathBuf, selector: BackendSelector, response: Option<&[u8]>) -> Harness {
        harness_with_version(store_path, selector, response, (2, 4, 10))
    }

    fn harness_with_version(
        store_path: PathBuf, selector: BackendSelector, response: Option<&[u8]>, version: (u32, u32, u32),
    ) -> Harness {
        let config = AppConfig { store_path, ..Default::default() };
        let log = Rc::new(RefCell::new(ServerLog::default()));
        let fetch_calls = Rc::new(Cell::new(0));
        let fp = Fingerprint::digest(b"cert-1");
        let prefetcher = Prefetcher::new(
            config,
            selector,
            Box::new(FakeFetcher { response: response.map(<[u8]>::to_vec), calls: Rc::clone(&fetch_calls) }),
            Box::new(FakeServer { log: Rc::clone(&log), version }),
            Box::new(PinnedFingerprinter(fp)),
        );
        Harness { prefetcher, log, fetch_calls, fp }
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_enable_stores_first_response() {
        let dir = tempfile::tempdir().unwrap();
        let selector = BackendSelector::native("SQLite");
        let mut h = harness(dir.path().join("ocsp_cache"), selector.clone(), Some(b"mock_response"));

        let fp = h.prefetcher.enable(Path::new("/a.pem"), Path::new("/a.chain.pem"), &names(&["example.com"])).unwrap();
        assert_eq!(fp, h.fp);
        assert_eq!(h.log.borrow().modules, vec!["socache_dbm".to_string(), "headers".to_string()]);
        assert_eq!(h.prefetcher.registry().len(), 1);

        let store = KvStore::open(h.prefetcher.config().store_path.as_path(), OpenMode::MustExist, &selector).unwrap();
        let record = CacheEntry::from_bytes(&store.get(fp.as_bytes()).unwrap()).unwrap();
        assert_eq!(record.response(), b"mock_response");
    }

    #[test]
    fn test_enable_rejects_unaccepted_backend() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = harness(dir.path().join("ocsp_cache"), BackendSelector::native("LMDB"), Some(b"mock_response"));

        let result = h.prefetcher.enable(Path::new("/a.pem"), Path::new("/a.chain.pem"), &names(&["example.com"]));
        assert!(matches!(result, Err(Error::NotSupported(_))));
        assert!(h.prefetcher.registry().is_empty());
        assert_eq!(h.fetch_calls.get(), 0);
        assert!(h.log.borrow().modules.is_empty());
    }

    #[test]
    fn test_enable_rejects_old_server() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = harness_with_version(
            dir.path().join("ocsp_cache"),
            BackendSelector::native("SQLite"),
            Some(b"mock_response"),
            (2, 2, 34),
        );

        let result = h.prefetcher.enable(Path::new("/a.pem"), Path::new("/a.chain.pem"), &names(&["example.com"]));
        assert!(matches!(result, Err(Error::NotSupported(msg)) if msg.contains("2.2.34")));
        assert!(h.log.borrow().modules.is_empty());
        assert!(h.prefetcher.registry().is_empty());
    }

    #[test]
    fn test_enable_fetch_miss_keeps_enrollment() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = harness(dir.path().join("ocsp_cache"), BackendSelector::native("SQLite"), None);

        let fp = h.prefetcher.enable(Path::new("/a.pem"), Path::new("/a.chain.pem"), &names(&["example.com"])).unwrap();
        assert_eq!(h.prefetcher.registry().len(), 1);
        assert_eq!(h.log.borrow().recoveries, 0);

        let selector = BackendSelector::native("SQLite");
        let store = KvStore::open(h.prefetcher.config().store_path.as_path(), OpenMode::MustExist, &selector).unwrap();
        assert!(store.try_get(fp.as_bytes()).unwrap().is_none());
    }

    #[test]
    fn test_enable_fatal_store_failure_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blocked"), b"in the way").unwrap();
        let mut h = harness(
            dir.path().join("blocked/ocsp_cache"),
            BackendSelector::native("SQLite"),
            Some(b"mock_response"),
        );

        let result = h.prefetcher.enable(Path::new("/a.pem"), Path::new("/a.chain.pem"), &names(&["example.com"]));
        assert!(matches!(result, Err(Error::StoreOpen { .. })));
        assert!(h.prefetcher.registry().is_empty());
        assert_eq!(h.log.borrow().recoveries, 1);
    }

    #[test]
    fn test_enable_merges_on_reenable() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = harness(dir.path().join("ocsp_cache"), BackendSelector::native("SQLite"), Some(b"mock_response"));

        let fp = h.prefetcher.enable(Path::new("/a.pem"), Path::new("/a.chain.pem"), &names(&["example.com"])).unwrap();
        h.prefetcher.enable(Path::new("/a.pem"), Path::new("/a.chain.pem"), &names(&["www.example.com"])).unwrap();

        assert_eq!(h.prefetcher.registry().len(), 1);
        let entry = h.prefetcher.registry().get(&fp).unwrap();
        assert_eq!(entry.server_names.len(), 2);
        assert_eq!(h.fetch_calls.get(), 2);
    }

    #[test]
    fn test_disable() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = harness(dir.path().join("ocsp_cache"), BackendSelector::native("SQLite"), Some(b"mock_response"));

        let fp = h.prefetcher.enable(Path::new("/a.pem"), Path::new("/a.chain.pem"), &names(&["example.com"])).unwrap();
        assert!(h.prefetcher.disable(&fp));
        assert!(h.prefetcher.registry().is_empty());
        assert!(!h.prefetcher.disable(&fp));
    }

    #[test]
    fn test_update_all_skips_fresh_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = harness(dir.path().join("ocsp_cache"), BackendSelector::native("SQLite"), Some(b"mock_response"));

        h.prefetcher.enable(Path::new("/a.pem"), Path::new("/a.chain.pem"), &names(&["example.com"])).unwrap();
        assert_eq!(h.fetch_calls.get(), 1);

        // Entry just written is fresh under the default TTL.
        assert_eq!(h.prefetcher.update_all().unwrap(), 0);
        assert_eq!(h.fetch_calls.get(), 1);
    }

    #[test]
    fn test_restart_through_facade() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = harness(dir.path().join("ocsp_cache"), BackendSelector::native("SQLite"), Some(b"mock_response"));

        h.prefetcher.enable(Path::new("/a.pem"), Path::new("/a.chain.pem"), &names(&["example.com"])).unwrap();
        h.prefetcher.restart().unwrap();
        assert_eq!(h.log.borrow().recoveries, 0);
    }
}
