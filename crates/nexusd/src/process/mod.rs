//! Daemon process supervision: daemonisation, pid and lock management, and
//! shutdown handling.

pub(crate) mod daemonizer;
mod errors;
mod files;
mod guard;
pub(crate) mod launch;
pub(crate) mod shutdown;

pub use errors::{LaunchError, RuntimeFileError};
pub use launch::{LaunchMode, run_daemon};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
pub(crate) const FOREGROUND_ENV_VAR: &str = "NEXUS_FOREGROUND";
