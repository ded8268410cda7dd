//! TTL-driven refresh of cached OCSP responses.
//!
//! A refresh fetches one certificate's OCSP response through the
//! [`OcspFetcher`] seam into a workfile, wraps it in the stored entry
//! layout, and writes it into the store. Staleness is judged per
//! fingerprint from the timestamp embedded in the cached value, so one
//! stale entry never blocks the others.

use std::time::Duration;

use staplr_core::{AppConfig, BackendSelector, Error, KvStore, OpenMode};

use crate::entry::CacheEntry;
use crate::fetch::OcspFetcher;
use crate::fingerprint::Fingerprint;
use crate::registry::{PrefetchEntry, PrefetchRegistry};

/// Refreshes cache entries for enrolled certificates.
pub struct RefreshEngine<'a> {
    config: &'a AppConfig,
    selector: &'a BackendSelector,
    fetcher: &'a dyn OcspFetcher,
}

impl<'a> RefreshEngine<'a> {
    pub fn new(config: &'a AppConfig, selector: &'a BackendSelector, fetcher: &'a dyn OcspFetcher) -> Self {
        Self { config, selector, fetcher }
    }

    /// Fetch a fresh response for one certificate and store it.
    ///
    /// Returns `Ok(false)` with a warning when the fetcher produced
    /// nothing usable; any existing cache entry is left in place. Never
    /// retries.
    ///
    /// # Errors
    ///
    /// Store writes and workfile handling surface as errors; a fetcher
    /// reporting failure does not.
    pub fn refresh_one(&self, store: &mut KvStore, fp: &Fingerprint, entry: &PrefetchEntry) -> Result<bool, Error> {
        let Some(response) = self.fetch_response(fp, entry)? else {
            return Ok(false);
        };

        let record = CacheEntry::new(response);
        store.set(fp.as_bytes(), &record.to_bytes())?;
        tracing::debug!(fingerprint = %fp, bytes = record.response().len(), "stored fresh OCSP response");
        Ok(true)
    }

    /// Refresh one certificate only when its cached entry is missing,
    /// undecodable, or older than `ttl`.
    ///
    /// Returns whether a fresh response was stored.
    pub fn refresh_if_stale(
        &self, store: &mut KvStore, fp: &Fingerprint, entry: &PrefetchEntry, ttl: Duration,
    ) -> Result<bool, Error> {
        if self.is_fresh(store, fp, ttl)? {
            return Ok(false);
        }
        self.refresh_one(store, fp, entry)
    }

    /// Refresh every enrolled certificate whose entry is stale under `ttl`.
    ///
    /// Opens the store once for the whole batch; an empty registry opens
    /// nothing and fetches nothing. Per-certificate failures are logged
    /// and skipped. Returns the number of entries refreshed.
    pub fn update_all(&self, registry: &PrefetchRegistry, ttl: Duration) -> Result<usize, Error> {
        if registry.is_empty() {
            return Ok(0);
        }

        let mut store = KvStore::open(&self.config.store_path, OpenMode::Create, self.selector)?;
        let mut refreshed = 0;
        for (fp, entry) in registry.iter() {
            match self.refresh_if_stale(&mut store, fp, entry, ttl) {
                Ok(true) => refreshed += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(fingerprint = %fp, error = %e, "skipping OCSP refresh for certificate");
                }
            }
        }
        store.close()?;

        Ok(refreshed)
    }

    fn is_fresh(&self, store: &KvStore, fp: &Fingerprint, ttl: Duration) -> Result<bool, Error> {
        let Some(raw) = store.try_get(fp.as_bytes())? else {
            return Ok(false);
        };
        let Some(record) = CacheEntry::from_bytes(&raw) else {
            tracing::debug!(fingerprint = %fp, "cached entry is undecodable; treating as stale");
            return Ok(false);
        };
        Ok(!record.is_stale(ttl, chrono::Utc::now().timestamp_micros()))
    }

    fn fetch_response(&self, fp: &Fingerprint, entry: &PrefetchEntry) -> Result<Option<Vec<u8>>, Error> {
        let workfile =
            tempfile::NamedTempFile::new().map_err(|e| Error::Prefetch(format!("failed to create workfile: {e}")))?;

        if !self.fetcher.fetch_ocsp(&entry.cert_path, &entry.chain_path, workfile.path()) {
            tracing::warn!(fingerprint = %fp, "Encountered an issue while trying to prefetch OCSP response");
            return Ok(None);
        }

        let response = std::fs::read(workfile.path())
            .map_err(|e| Error::Prefetch(format!("failed to read fetched response: {e}")))?;

        if response.is_empty() {
            tracing::warn!(fingerprint = %fp, "Encountered an issue while trying to prefetch OCSP response");
            return Ok(None);
        }
        if response.len() > self.config.max_response_bytes {
            tracing::warn!(
                fingerprint = %fp,
                bytes = response.len(),
                limit = self.config.max_response_bytes,
                "fetched OCSP response exceeds max_response_bytes; discarding"
            );
            return Ok(None);
        }

        Ok(Some(response))
    }
}
