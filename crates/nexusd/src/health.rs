//! Lifecycle events emitted while `nexusd` brings its controllers up.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{error, info};

use nexus_config::Config;

use crate::bootstrap::BootstrapError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer for bootstrap progress.
pub trait HealthReporter: Send + Sync {
    /// Bootstrap is about to load configuration.
    fn bootstrap_starting(&self);

    /// Every controller is registered and the daemon can serve commands.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Bootstrap stopped at `error`; nothing will be served.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// A controller joined the registry under `name`.
    fn controller_registered(&self, name: &str);
}

/// Reporter that logs each event on the `health` target.
#[derive(Debug, Default)]
pub struct StructuredHealthReporter {
    registered: AtomicUsize,
}

impl StructuredHealthReporter {
    /// Builds a reporter with no controllers counted yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Controllers reported as registered so far.
    #[must_use]
    pub fn registered(&self) -> usize {
        self.registered.load(Ordering::Relaxed)
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        self.registered.store(0, Ordering::Relaxed);
        info!(target: HEALTH_TARGET, event = "bootstrap_starting", "loading configuration");
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            controllers = self.registered(),
            socket = %config.daemon_socket(),
            log_format = %config.log_format(),
            "controllers ready"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            controllers = self.registered(),
            %error,
            "bootstrap aborted"
        );
    }

    fn controller_registered(&self, name: &str) {
        let count = self.registered.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            target: HEALTH_TARGET,
            event = "controller_registered",
            controller = name,
            count,
            "controller registered"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_controllers_per_bootstrap() {
        let reporter = StructuredHealthReporter::new();
        reporter.bootstrap_starting();
        reporter.controller_registered("WIFI");
        reporter.controller_registered("VPN");
        assert_eq!(reporter.registered(), 2);

        reporter.bootstrap_starting();
        assert_eq!(reporter.registered(), 0);
    }
}
