//! Supervises daemon launch sequencing and runtime orchestration.

use std::env;
use std::sync::Arc;

use tracing::info;

use nexus_config::RuntimePaths;

use crate::bootstrap::{
    ConfigLoader, ControllerProvider, SimulatedControllers, StaticConfigLoader, SystemConfigLoader,
    bootstrap_with,
};
use crate::dispatch::DispatchConnectionHandler;
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::transport::SocketListener;

use super::daemonizer::{Daemonizer, SystemDaemonizer};
use super::errors::LaunchError;
use super::guard::{HealthState, ProcessGuard};
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};
use super::{FOREGROUND_ENV_VAR, PROCESS_TARGET};

/// Launch mode for the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Fork into the background and detach from the controlling terminal.
    Background,
    /// Remain attached to the terminal; primarily used for debugging and tests.
    Foreground,
}

impl LaunchMode {
    fn detect() -> Self {
        if env::var_os(FOREGROUND_ENV_VAR).is_some() {
            Self::Foreground
        } else {
            Self::Background
        }
    }
}

/// Process-level collaborators needed to control daemon lifecycle.
pub(crate) struct ProcessControl<D, S> {
    pub(crate) mode: LaunchMode,
    pub(crate) daemonizer: D,
    pub(crate) shutdown: S,
}

/// Service dependencies required to construct the daemon runtime.
pub(crate) struct ServiceDeps<L, P> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) provider: P,
}

/// Collaborators required to launch the daemon runtime.
pub(crate) struct LaunchPlan<L, P, D, S> {
    pub(crate) process: ProcessControl<D, S>,
    pub(crate) services: ServiceDeps<L, P>,
}

/// Runs the daemon using the production collaborators.
///
/// # Errors
///
/// Returns [`LaunchError`] when any launch stage fails or another daemon
/// already owns the runtime directory.
pub fn run_daemon() -> Result<(), LaunchError> {
    let plan = LaunchPlan {
        process: ProcessControl {
            mode: LaunchMode::detect(),
            daemonizer: SystemDaemonizer::new(),
            shutdown: SystemShutdownSignal::new(),
        },
        services: ServiceDeps {
            loader: SystemConfigLoader::default(),
            reporter: Arc::new(StructuredHealthReporter::new()),
            provider: SimulatedControllers::demo(),
        },
    };
    run_daemon_with(plan)
}

/// Runs the daemon with injected collaborators.
pub(crate) fn run_daemon_with<L, P, D, S>(plan: LaunchPlan<L, P, D, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    P: ControllerProvider,
    D: Daemonizer,
    S: ShutdownSignal,
{
    let LaunchPlan { process, services } = plan;
    let ProcessControl {
        mode,
        daemonizer,
        shutdown,
    } = process;
    let ServiceDeps {
        loader,
        reporter,
        provider,
    } = services;

    info!(target: PROCESS_TARGET, ?mode, "starting daemon runtime");
    let config = loader.load()?;
    config.daemon_socket().prepare_filesystem()?;
    let runtime_paths = RuntimePaths::from_config(&config)?;
    let mut guard = ProcessGuard::acquire(runtime_paths)?;
    if matches!(mode, LaunchMode::Background) {
        daemonizer.daemonize(guard.paths())?;
    }
    shutdown.arm()?;
    guard.write_pid(std::process::id())?;
    guard.write_health(HealthState::Starting)?;

    let listener = SocketListener::bind(config.daemon_socket())?;
    if let Some(addr) = listener.local_addr() {
        info!(target: PROCESS_TARGET, %addr, "control socket bound");
    }

    let static_loader = StaticConfigLoader::new(config);
    let daemon = bootstrap_with(&static_loader, &*reporter, &provider)?;
    let handler = Arc::new(DispatchConnectionHandler::new(Arc::new(daemon.dispatcher())));

    let listener_handle = listener.start(handler)?;
    guard.write_health(HealthState::Ready)?;
    shutdown.wait()?;
    guard.write_health(HealthState::Stopping)?;
    listener_handle.shutdown();
    listener_handle.join()?;
    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;
    use std::fs;
    use std::io::{BufRead, BufReader, Write};
    use std::os::unix::net::UnixStream;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use rstest::rstest;

    use nexus_config::{Config, SocketEndpoint};

    use super::*;
    use crate::controller::ScanResult;
    use crate::process::daemonizer::DaemonizeError;
    use crate::process::shutdown::ShutdownError;

    struct ForbiddenDaemonizer;

    impl Daemonizer for ForbiddenDaemonizer {
        fn daemonize(&self, _paths: &RuntimePaths) -> Result<(), DaemonizeError> {
            panic!("foreground launches must not daemonise");
        }
    }

    /// Talks to the running daemon in place of waiting for a signal.
    struct ScriptedShutdown {
        socket: PathBuf,
        health: PathBuf,
        observed: Mutex<Vec<String>>,
    }

    impl ScriptedShutdown {
        fn request(&self, request: &[u8]) -> Vec<String> {
            let mut stream = UnixStream::connect(&self.socket).expect("connect");
            stream.write_all(request).expect("write request");
            stream
                .shutdown(std::net::Shutdown::Write)
                .expect("close write side");
            BufReader::new(stream)
                .lines()
                .collect::<Result<Vec<_>, _>>()
                .expect("read replies")
        }
    }

    impl ShutdownSignal for &ScriptedShutdown {
        fn wait(&self) -> Result<(), ShutdownError> {
            let health = fs::read_to_string(&self.health).expect("health snapshot");
            let mut observed = self.observed.lock().expect("observed lock");
            observed.push(health);
            observed.extend(self.request(b"wifi_enable\nwifi_scan_results\nvpn_enable\n"));
            Ok(())
        }
    }

    fn socket_config(socket: &Path) -> Config {
        Config {
            daemon_socket: SocketEndpoint::unix(socket.to_str().expect("utf8 path")),
            ..Config::default()
        }
    }

    #[rstest]
    fn foreground_launch_serves_commands_until_shutdown() {
        let dir = tempfile::tempdir().expect("temp dir");
        let socket = dir.path().join("run").join("nexusd.sock");
        let shutdown = ScriptedShutdown {
            socket: socket.clone(),
            health: dir.path().join("run").join("nexusd.health"),
            observed: Mutex::new(Vec::new()),
        };
        let plan = LaunchPlan {
            process: ProcessControl {
                mode: LaunchMode::Foreground,
                daemonizer: ForbiddenDaemonizer,
                shutdown: &shutdown,
            },
            services: ServiceDeps {
                loader: StaticConfigLoader::new(socket_config(&socket)),
                reporter: Arc::new(StructuredHealthReporter::new()),
                provider: SimulatedControllers::with_networks(vec![ScanResult::new(
                    "02:00:00:00:00:01",
                    2437,
                    -52,
                    "[ESS]",
                    "office",
                )]),
            },
        };

        run_daemon_with(plan).expect("daemon run");

        let observed = shutdown.observed.into_inner().expect("observed lock");
        let (health, replies) = observed.split_first().expect("health snapshot recorded");
        assert!(health.contains("\"status\":\"ready\""));
        assert_eq!(
            replies,
            [
                "WIFI_ENABLE:0",
                "WIFI_SCAN_RESULT:02:00:00:00:00:01:2437:-52:[ESS]:office",
                "WIFI_SCAN_RESULT:0",
                "VPN_ENABLE:0",
            ]
        );
        assert!(!dir.path().join("run").join("nexusd.lock").exists());
        assert!(!socket.exists());
    }

    #[rstest]
    fn production_loader_resolves_the_socket_from_a_config_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let socket = dir.path().join("run").join("nexusd.sock");
        let file = dir.path().join("nexus.toml");
        let endpoint = SocketEndpoint::unix(socket.to_str().expect("utf8 path"));
        fs::write(&file, format!("daemon_socket = \"{endpoint}\"\n")).expect("write config");
        let shutdown = ScriptedShutdown {
            socket: socket.clone(),
            health: dir.path().join("run").join("nexusd.health"),
            observed: Mutex::new(Vec::new()),
        };
        let plan = LaunchPlan {
            process: ProcessControl {
                mode: LaunchMode::Foreground,
                daemonizer: ForbiddenDaemonizer,
                shutdown: &shutdown,
            },
            services: ServiceDeps {
                loader: SystemConfigLoader::with_args([
                    OsStr::new("nexusd"),
                    OsStr::new("--config-path"),
                    file.as_os_str(),
                ]),
                reporter: Arc::new(StructuredHealthReporter::new()),
                provider: SimulatedControllers::default(),
            },
        };

        run_daemon_with(plan).expect("daemon run");

        let observed = shutdown.observed.into_inner().expect("observed lock");
        assert_eq!(
            observed.get(1..).expect("replies recorded"),
            ["WIFI_ENABLE:0", "WIFI_SCAN_RESULT:0", "VPN_ENABLE:0"]
        );
        assert!(!socket.exists());
    }

    #[rstest]
    fn second_launch_is_refused_while_the_lock_is_held() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = socket_config(&dir.path().join("nexusd.sock"));
        let paths = RuntimePaths::from_config(&config).expect("runtime paths");
        let mut guard = ProcessGuard::acquire(paths).expect("first guard");
        guard.write_pid(std::process::id()).expect("write pid");

        let shutdown = ScriptedShutdown {
            socket: dir.path().join("nexusd.sock"),
            health: dir.path().join("nexusd.health"),
            observed: Mutex::new(Vec::new()),
        };
        let plan = LaunchPlan {
            process: ProcessControl {
                mode: LaunchMode::Foreground,
                daemonizer: ForbiddenDaemonizer,
                shutdown: &shutdown,
            },
            services: ServiceDeps {
                loader: StaticConfigLoader::new(config),
                reporter: Arc::new(StructuredHealthReporter::new()),
                provider: SimulatedControllers::demo(),
            },
        };

        let error = run_daemon_with(plan).expect_err("lock held");
        assert!(matches!(error, LaunchError::AlreadyRunning { .. }));
    }
}
