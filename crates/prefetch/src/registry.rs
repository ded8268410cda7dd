//! Registry of certificates enrolled for OCSP prefetching.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::fingerprint::Fingerprint;

/// One enrolled certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefetchEntry {
    pub cert_path: PathBuf,
    pub chain_path: PathBuf,
    /// Server names whose TLS handshakes staple this certificate's status.
    pub server_names: BTreeSet<String>,
}

/// Mapping from certificate fingerprint to its prefetch enrollment.
///
/// Absence of a fingerprint means the certificate was never enabled or was
/// explicitly removed; enrollments are never dropped as a side effect.
#[derive(Debug, Clone, Default)]
pub struct PrefetchRegistry {
    entries: BTreeMap<Fingerprint, PrefetchEntry>,
}

impl PrefetchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enroll a certificate, merging server names when it is already
    /// registered. Paths are updated to the latest values.
    pub fn enroll(
        &mut self, fp: Fingerprint, cert_path: PathBuf, chain_path: PathBuf,
        server_names: impl IntoIterator<Item = String>,
    ) -> &PrefetchEntry {
        let entry = self
            .entries
            .entry(fp)
            .and_modify(|existing| {
                existing.cert_path = cert_path.clone();
                existing.chain_path = chain_path.clone();
            })
            .or_insert_with(|| PrefetchEntry {
                cert_path: cert_path.clone(),
                chain_path: chain_path.clone(),
                server_names: BTreeSet::new(),
            });
        entry.server_names.extend(server_names);
        entry
    }

    /// Put back an exact enrollment, replacing whatever is there.
    pub fn insert(&mut self, fp: Fingerprint, entry: PrefetchEntry) {
        self.entries.insert(fp, entry);
    }

    pub fn get(&self, fp: &Fingerprint) -> Option<&PrefetchEntry> {
        self.entries.get(fp)
    }

    pub fn remove(&mut self, fp: &Fingerprint) -> Option<PrefetchEntry> {
        self.entries.remove(fp)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Fingerprint, &PrefetchEntry)> {
        self.entries.iter()
    }

    pub fn fingerprints(&self) -> impl Iterator<Item = &Fingerprint> {
        self.entries.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
