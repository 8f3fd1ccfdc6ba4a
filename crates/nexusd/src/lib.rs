//! Local control-plane daemon for the WIFI and VPN subsystems.
//!
//! `nexusd` owns one controller per subsystem and exposes them over a
//! line-oriented control socket. Clients send commands such as `wifi_enable`
//! or `wifi_scan_results`; the [`dispatch`] layer routes each line to its
//! handler, which drives the controller held in the [`controller`] registry
//! and answers with `<TAG>:<status>` lines.
//!
//! Startup is split into two layers. [`bootstrap_with`] resolves
//! configuration, installs structured telemetry, and registers the
//! controllers. [`run_daemon`] wraps that in process supervision: the
//! singleton lock, pid and health files, optional daemonisation, the socket
//! listener, and signal-driven shutdown.
//!
//! Set `NEXUS_FOREGROUND` to keep the daemon attached to the terminal.

mod bootstrap;
pub mod controller;
pub mod dispatch;
mod health;
mod process;
mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, ControllerProvider, Daemon, SimulatedControllers,
    StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{LaunchError, LaunchMode, RuntimeFileError, run_daemon};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
