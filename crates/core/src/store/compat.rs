//! Backend compatibility check.
//!
//! The server's session-cache module and staplr must agree on the store
//! format. A native engine backed by a library outside the accepted family
//! would read entries staplr cannot write, so such deployments are refused
//! before the feature is ever enabled.

use crate::Error;
use crate::store::select::BackendSelector;

/// Native session-cache libraries whose store format staplr can manage.
pub const ACCEPTED_NATIVE_LIBRARIES: &[&str] = &["SQLite"];

pub(crate) fn is_accepted(library: &str) -> bool {
    ACCEPTED_NATIVE_LIBRARIES.contains(&library)
}

/// Verify that the deployment's backend is one staplr can manage.
///
/// Accepts a native engine from the accepted family, or a deployment with
/// only the legacy hash-file tooling.
///
/// # Errors
///
/// Returns `Error::NotSupported` if the native engine is backed by an
/// unaccepted library, or if no backend is available at all.
pub fn ensure_compatible(selector: &BackendSelector) -> Result<(), Error> {
    match selector.native_library() {
        Some(library) if is_accepted(library) => Ok(()),
        Some(library) => Err(Error::NotSupported(format!(
            "session-cache store is backed by {library}, which staplr cannot manage"
        ))),
        None if selector.has_hash_file() => Ok(()),
        None => Err(Error::NotSupported("no OCSP store backend available".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_native_engine() {
        assert!(ensure_compatible(&BackendSelector::native("SQLite")).is_ok());
    }

    #[test]
    fn test_hash_file_only_accepted() {
        assert!(ensure_compatible(&BackendSelector::hash_file_only()).is_ok());
    }

    #[test]
    fn test_unaccepted_native_engine() {
        let result = ensure_compatible(&BackendSelector::native("LMDB"));
        assert!(matches!(result, Err(Error::NotSupported(msg)) if msg.contains("LMDB")));
    }

    #[test]
    fn test_no_backend_at_all() {
        let result = ensure_compatible(&BackendSelector::none());
        assert!(matches!(result, Err(Error::NotSupported(_))));
    }
}
