//! Detaches `nexusd` from its controlling terminal.

use std::ffi::OsStr;

use daemonize_me::Daemon;
use thiserror::Error;
use tracing::info;

use nexus_config::RuntimePaths;

use super::PROCESS_TARGET;

/// Mask applied once detached, keeping runtime files owner-only.
const DAEMON_UMASK: u16 = 0o077;

/// Moves the process into the background.
pub trait Daemonizer: Send + Sync {
    /// Detaches; only the child returns.
    fn daemonize(&self, paths: &RuntimePaths) -> Result<(), DaemonizeError>;
}

/// The fork or session setup failed.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DaemonizeError(#[from] daemonize_me::DaemonError);

/// Detaches with `daemonize-me`, working from the runtime directory.
#[derive(Debug, Default)]
pub struct SystemDaemonizer;

impl SystemDaemonizer {
    pub fn new() -> Self {
        Self
    }
}

impl Daemonizer for SystemDaemonizer {
    fn daemonize(&self, paths: &RuntimePaths) -> Result<(), DaemonizeError> {
        let runtime = paths.runtime_dir();
        info!(target: PROCESS_TARGET, runtime = %runtime.display(), "detaching");
        Daemon::new()
            .work_dir(runtime)
            .umask(DAEMON_UMASK)
            .name(OsStr::new(env!("CARGO_PKG_NAME")))
            .start()?;
        info!(target: PROCESS_TARGET, pid = std::process::id(), "running detached");
        Ok(())
    }
}
