//! OCSP fetch seam.

use std::path::Path;

/// Produces a raw OCSP response for one certificate.
///
/// The network side (request building, responder round-trip, response
/// validation) lives outside this crate. Implementations write the
/// complete response to `out` and return true, or return false and leave
/// `out` untouched; a partial write is never acceptable.
pub trait OcspFetcher {
    fn fetch_ocsp(&self, cert_path: &Path, chain_path: &Path, out: &Path) -> bool;
}
