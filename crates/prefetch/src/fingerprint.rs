//! Certificate fingerprints.

use std::fmt;
use std::path::Path;

use sha2::{Digest, Sha256};
use staplr_core::Error;

/// Byte width of a fingerprint digest.
pub const FINGERPRINT_LEN: usize = 32;

/// SHA-256 digest identifying one certificate.
///
/// The raw bytes are the store key; the hex form appears in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Digest arbitrary bytes into a fingerprint.
    pub fn digest(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Rebuild a fingerprint from its raw store-key bytes.
    ///
    /// Returns `None` when `raw` is not exactly [`FINGERPRINT_LEN`] bytes.
    pub fn from_bytes(raw: &[u8]) -> Option<Self> {
        Some(Self(raw.try_into().ok()?))
    }

    /// Raw bytes, used as the store key.
    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Stable fingerprinting trait.
///
/// This allows tests to pin fingerprints without certificate files on disk.
pub trait Fingerprinter {
    /// Compute the fingerprint of the certificate at `cert_path`.
    fn compute_fingerprint(&self, cert_path: &Path) -> Result<Fingerprint, Error>;
}

/// Fingerprints a certificate by hashing the file bytes as stored.
///
/// No certificate parsing happens here; two byte-identical files always
/// produce the same fingerprint.
#[derive(Debug, Default)]
pub struct Sha256Fingerprinter;

impl Fingerprinter for Sha256Fingerprinter {
    fn compute_fingerprint(&self, cert_path: &Path) -> Result<Fingerprint, Error> {
        let raw = std::fs::read(cert_path)
            .map_err(|e| Error::Fingerprint(format!("failed to read certificate {}: {e}", cert_path.display())))?;
        Ok(Fingerprint::digest(&raw))
    }
}
