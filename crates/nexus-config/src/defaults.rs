use camino::Utf8PathBuf;
use std::env;

#[cfg(unix)]
use libc::geteuid;

#[cfg(unix)]
use dirs::runtime_dir;

use crate::logging::LogFormat;
use crate::socket::SocketEndpoint;

/// TCP port used when Unix domain sockets are unavailable.
pub const DEFAULT_TCP_PORT: u16 = 9780;

/// Log filter applied when nothing overrides it.
pub const DEFAULT_LOG_FILTER: &str = "info";

const RUNTIME_NAMESPACE: &str = "nexus";
const SOCKET_FILE: &str = "nexusd.sock";

/// Default log filter expression.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned default log filter, seeded into the defaults layer.
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default telemetry format.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Computes the default control socket endpoint for the daemon.
///
/// On Unix this is `nexus/nexusd.sock` beneath the user's runtime directory.
/// When no runtime directory is available the temporary directory is used
/// instead, namespaced by effective uid so users never share a socket.
#[must_use]
pub fn default_socket_endpoint() -> SocketEndpoint {
    default_socket_endpoint_inner()
}

#[cfg(unix)]
fn default_socket_endpoint_inner() -> SocketEndpoint {
    let (mut base, apply_namespace) = match runtime_base_directory() {
        Some(dir) => (dir, false),
        None => (fallback_base_directory(), true),
    };

    base.push(RUNTIME_NAMESPACE);
    if apply_namespace {
        base.push(user_namespace());
    }

    SocketEndpoint::unix(base.join(SOCKET_FILE))
}

#[cfg(unix)]
fn runtime_base_directory() -> Option<Utf8PathBuf> {
    runtime_dir().and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
}

#[cfg(unix)]
fn fallback_base_directory() -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(env::temp_dir()).unwrap_or_else(|_| Utf8PathBuf::from("/tmp"))
}

#[cfg(unix)]
pub(crate) fn user_namespace() -> String {
    // SAFETY: `geteuid` has no preconditions and cannot fail.
    let uid = unsafe { geteuid() };
    format!("uid-{uid}")
}

#[cfg(not(unix))]
fn default_socket_endpoint_inner() -> SocketEndpoint {
    SocketEndpoint::tcp("127.0.0.1", DEFAULT_TCP_PORT)
}

/// Directory for runtime artefacts when the socket path cannot supply one.
pub(crate) fn default_runtime_directory() -> std::path::PathBuf {
    #[cfg(unix)]
    {
        if let Some(mut dir) = runtime_dir() {
            dir.push(RUNTIME_NAMESPACE);
            return dir;
        }
        let mut dir = env::temp_dir();
        dir.push(RUNTIME_NAMESPACE);
        dir.push(user_namespace());
        dir
    }

    #[cfg(not(unix))]
    {
        let mut dir = env::temp_dir();
        dir.push(RUNTIME_NAMESPACE);
        dir
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn default_endpoint_is_a_namespaced_unix_socket() {
        let endpoint = default_socket_endpoint();
        let path = endpoint.unix_path().expect("unix endpoint on unix hosts");
        assert_eq!(path.file_name(), Some(SOCKET_FILE));
        assert!(
            path.components().any(|part| part.as_str() == RUNTIME_NAMESPACE),
            "socket path should live under the nexus namespace: {path}"
        );
    }
}
