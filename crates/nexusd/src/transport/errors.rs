//! Failures bringing up or running the control socket.

use std::io;

use thiserror::Error;

use nexus_config::SocketEndpoint;

/// Errors surfaced while binding or running the socket listener.
///
/// Every variant names the endpoint from configuration so the operator can
/// match the message against `daemon_socket`.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// An OS call on the endpoint failed; `step` names the call.
    #[error("cannot {step} control socket {endpoint}: {source}")]
    Io {
        step: &'static str,
        endpoint: SocketEndpoint,
        #[source]
        source: io::Error,
    },
    /// A live process already accepts connections on the Unix socket.
    #[error("control socket {endpoint} is served by another process")]
    InUse { endpoint: SocketEndpoint },
    #[error("control socket path {endpoint} exists and is not a socket")]
    NotSocket { endpoint: SocketEndpoint },
    #[cfg(not(unix))]
    #[error("unix control sockets are unsupported here: {endpoint}")]
    UnsupportedUnix { endpoint: SocketEndpoint },
    #[error("control socket accept thread panicked")]
    ThreadPanic,
}

impl ListenerError {
    /// Builds a `map_err` adapter for an OS call made during `step`.
    pub(crate) fn io(
        step: &'static str,
        endpoint: &SocketEndpoint,
    ) -> impl FnOnce(io::Error) -> Self {
        let endpoint = endpoint.clone();
        move |source| Self::Io {
            step,
            endpoint,
            source,
        }
    }
}
