//! Errors raised while launching `nexusd` and managing its runtime files.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTimeError;

use nix::errno::Errno;
use ortho_config::OrthoError;
use thiserror::Error;

use nexus_config::{RuntimePathsError, SocketPreparationError};

use crate::bootstrap::BootstrapError;
use crate::transport::ListenerError;

use super::daemonizer::DaemonizeError;
use super::shutdown::ShutdownError;

/// Reasons the daemon failed to start or stopped abnormally.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] Arc<OrthoError>),
    #[error("failed to prepare control socket directory: {0}")]
    Socket(#[from] SocketPreparationError),
    #[error(transparent)]
    RuntimePaths(#[from] RuntimePathsError),
    /// Another live `nexusd` owns the runtime directory.
    #[error("nexusd is already running with pid {pid}")]
    AlreadyRunning { pid: u32 },
    #[error(transparent)]
    RuntimeFile(#[from] RuntimeFileError),
    #[error("failed to detach from the terminal: {0}")]
    Daemonize(#[from] DaemonizeError),
    #[error("failed to arm shutdown signals: {0}")]
    Shutdown(#[from] ShutdownError),
    #[error("failed to bootstrap controllers: {0}")]
    Bootstrap(#[from] BootstrapError),
    #[error("control socket failed: {0}")]
    Listener(#[from] ListenerError),
}

/// Failures touching the lock, pid or health file.
#[derive(Debug, Error)]
pub enum RuntimeFileError {
    #[error("failed to create lock file '{path}': {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {kind} file '{path}': {source}")]
    Write {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to remove stale file '{path}': {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// `kill(pid, 0)` failed for a reason other than a missing process.
    #[error("failed to probe pid {pid}: {source}")]
    Probe { pid: u32, source: Errno },
    #[error("failed to encode health snapshot: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("system clock is set before the Unix epoch: {0}")]
    Clock(#[from] SystemTimeError),
    /// Health snapshots carry the pid, so it has to be recorded first.
    #[error("health updated before the pid file was written")]
    MissingPid,
}
