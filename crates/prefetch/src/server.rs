//! Web-server collaborator seam.

use staplr_core::Error;

/// Operations staplr needs from the managed web server.
///
/// The configurator that owns config parsing and process control implements
/// this; tests substitute fakes. Restart handling goes through
/// [`RestartGuard`](crate::restart::RestartGuard), which drives these calls
/// in a fixed order.
pub trait WebServer {
    /// Enable a server module by name. Must be idempotent.
    fn enable_module(&self, module: &str) -> Result<(), Error>;

    /// Version of the running server as (major, minor, patch).
    fn version(&self) -> (u32, u32, u32);

    /// Run the server's configuration test. False means the current
    /// configuration must not be loaded.
    fn validate_config(&self) -> bool;

    /// Restart or reload the server so the current configuration takes
    /// effect. The server may delete and recreate files it owns during
    /// this call, including the OCSP store.
    fn reload(&self) -> Result<(), Error>;

    /// Roll configuration state back after a failed validation, reload,
    /// or enable.
    fn recover_config(&self);
}
