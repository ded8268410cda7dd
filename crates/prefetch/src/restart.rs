//! Store-preserving restart sequence.
//!
//! Restarting the server may delete and recreate the OCSP store file, so
//! the sequence is: validate the configuration, copy the backing file
//! aside, reload, and copy it back if the reload destroyed it. Backup and
//! restore failures are logged and never abort the restart.

use std::path::{Path, PathBuf};

use staplr_core::{AppConfig, BackendSelector, Error};

use crate::registry::PrefetchRegistry;
use crate::server::WebServer;

/// Wraps the server restart so cached OCSP responses survive it.
pub struct RestartGuard<'a> {
    config: &'a AppConfig,
    selector: &'a BackendSelector,
}

impl<'a> RestartGuard<'a> {
    pub fn new(config: &'a AppConfig, selector: &'a BackendSelector) -> Self {
        Self { config, selector }
    }

    /// Run the restart sequence.
    ///
    /// 1. `validate_config`; on failure, recover and abort without
    ///    restarting.
    /// 2. Back up the store file when any certificate is enrolled.
    /// 3. `reload`; on failure, recover and propagate.
    /// 4. Restore the store file when it went missing during the reload.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` when the configuration test fails, or
    /// the reload error as reported by the server. Backup and restore
    /// failures are debug-logged, never returned.
    pub fn restart(&self, server: &dyn WebServer, registry: &PrefetchRegistry) -> Result<(), Error> {
        if !server.validate_config() {
            server.recover_config();
            return Err(Error::Validation("server configuration test failed".to_string()));
        }

        let backing = if registry.is_empty() { None } else { self.backing_file() };

        if let Some(path) = &backing {
            self.backup(path);
        }

        if let Err(e) = server.reload() {
            server.recover_config();
            return Err(e);
        }

        if let Some(path) = &backing {
            self.restore(path);
        }

        Ok(())
    }

    fn backing_file(&self) -> Option<PathBuf> {
        match self.selector.choose() {
            Ok(backend) => Some(backend.backing_file(&self.config.store_path)),
            Err(fault) => {
                tracing::debug!(error = %fault, "no store backend; skipping OCSP store backup");
                None
            }
        }
    }

    fn backup(&self, backing: &Path) {
        if let Err(e) = std::fs::copy(backing, backup_path(backing)) {
            tracing::debug!(error = %e, "Encountered an issue while trying to back up the OCSP store file");
        }
    }

    fn restore(&self, backing: &Path) {
        if backing.exists() {
            return;
        }
        if let Err(e) = std::fs::copy(backup_path(backing), backing) {
            tracing::debug!(error = %e, "Encountered an issue when trying to restore the OCSP store file");
        }
    }
}

fn backup_path(backing: &Path) -> PathBuf {
    let mut raw = backing.as_os_str().to_os_string();
    raw.push(".bak");
    PathBuf::from(raw)
}
