//! Termination signal handling for the daemon's main thread.
//!
//! Signals are armed before the daemon reports itself ready. A signal that
//! arrives after that point is queued rather than taking the default action,
//! so the runtime files and control socket are still cleaned up.

use std::io;
use std::sync::{Mutex, PoisonError};

use nix::sys::signal::Signal;
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::{debug, info};

use super::PROCESS_TARGET;

/// Signals that stop `nexusd`.
pub(crate) const SHUTDOWN_SIGNALS: [i32; 4] = [SIGTERM, SIGINT, SIGQUIT, SIGHUP];

/// Source of the request to stop serving.
pub trait ShutdownSignal: Send + Sync {
    /// Starts capturing shutdown requests without blocking.
    fn arm(&self) -> Result<(), ShutdownError> {
        Ok(())
    }

    /// Blocks until shutdown should proceed.
    fn wait(&self) -> Result<(), ShutdownError>;
}

/// Signal handlers could not be installed.
#[derive(Debug, Error)]
#[error("failed to install signal handlers: {0}")]
pub struct ShutdownError(#[from] io::Error);

/// Waits for one of [`SHUTDOWN_SIGNALS`].
#[derive(Debug, Default)]
pub struct SystemShutdownSignal {
    signals: Mutex<Option<Signals>>,
}

impl SystemShutdownSignal {
    /// Creates an unarmed listener; handlers are installed by `arm` or `wait`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShutdownSignal for SystemShutdownSignal {
    fn arm(&self) -> Result<(), ShutdownError> {
        let mut slot = self.signals.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(Signals::new(SHUTDOWN_SIGNALS)?);
            debug!(target: PROCESS_TARGET, "shutdown signals armed");
        }
        Ok(())
    }

    fn wait(&self) -> Result<(), ShutdownError> {
        self.arm()?;
        let mut slot = self.signals.lock().unwrap_or_else(PoisonError::into_inner);
        let received = slot
            .as_mut()
            .and_then(|signals| signals.forever().next());
        if let Some(raw) = received {
            info!(
                target: PROCESS_TARGET,
                signal = signal_name(raw),
                "shutdown requested"
            );
        }
        Ok(())
    }
}

fn signal_name(raw: i32) -> &'static str {
    Signal::try_from(raw).map_or("unknown", Signal::as_str)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use signal_hook::low_level::raise;

    use super::*;

    #[rstest]
    #[case(SIGTERM, "SIGTERM")]
    #[case(SIGHUP, "SIGHUP")]
    #[case(-1, "unknown")]
    fn names_received_signals(#[case] raw: i32, #[case] expected: &str) {
        assert_eq!(signal_name(raw), expected);
    }

    #[test]
    fn armed_listener_returns_once_a_signal_is_queued() {
        let shutdown = SystemShutdownSignal::new();
        shutdown.arm().expect("arm");
        shutdown.arm().expect("arming twice is harmless");

        raise(SIGHUP).expect("raise");

        shutdown.wait().expect("wait");
    }
}
