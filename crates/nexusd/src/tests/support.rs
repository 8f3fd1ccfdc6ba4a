//! Shared doubles and fixtures for the daemon test suites.

use std::ffi::OsString;
use std::sync::{Arc, Mutex};

use mockall::mock;
use ortho_config::{OrthoConfig, OrthoError};
use tempfile::TempDir;

use nexus_config::{Config, SocketEndpoint};

use crate::bootstrap::{BootstrapError, ConfigLoader};
use crate::controller::{
    Controller, ControllerRegistry, ControllerState, ErrorCode, ScanResult, ScanResultCollection,
    SimulatedRadio, SimulatedTunnel, VPN_CONTROLLER, WIFI_CONTROLLER, WirelessController,
};
use crate::health::HealthReporter;

mock! {
    pub Wireless {}

    impl WirelessController for Wireless {
        fn set_scan_mode(&mut self, mode: u32) -> Result<(), ErrorCode>;
        fn query_scan_results(&self) -> ScanResultCollection;
    }
}

/// Controller exposing a mocked wireless capability.
pub(crate) struct MockRadio {
    state: ControllerState,
    wireless: MockWireless,
}

impl MockRadio {
    pub(crate) fn new(wireless: MockWireless) -> Self {
        Self {
            state: ControllerState::Enabled,
            wireless,
        }
    }
}

impl Controller for MockRadio {
    fn enable(&mut self) -> Result<(), ErrorCode> {
        self.state = ControllerState::Enabled;
        Ok(())
    }

    fn disable(&mut self) -> Result<(), ErrorCode> {
        self.state = ControllerState::Disabled;
        Ok(())
    }

    fn state(&self) -> ControllerState {
        self.state
    }

    fn as_wireless(&self) -> Option<&dyn WirelessController> {
        Some(&self.wireless)
    }

    fn as_wireless_mut(&mut self) -> Option<&mut dyn WirelessController> {
        Some(&mut self.wireless)
    }
}

/// Controller whose power transitions always fail with one code.
#[derive(Debug)]
pub(crate) struct FailingController {
    code: ErrorCode,
}

impl FailingController {
    pub(crate) fn new(code: ErrorCode) -> Self {
        Self { code }
    }
}

impl Controller for FailingController {
    fn enable(&mut self) -> Result<(), ErrorCode> {
        Err(self.code)
    }

    fn disable(&mut self) -> Result<(), ErrorCode> {
        Err(self.code)
    }

    fn state(&self) -> ControllerState {
        ControllerState::Disabled
    }
}

/// Scan result on channel 6 with a fixed signal level.
pub(crate) fn sample_result(bssid: &str, ssid: &str) -> ScanResult {
    ScanResult::new(bssid, 2437, -52, "[ESS]", ssid)
}

/// Registry holding a simulated radio that sees no networks and a tunnel.
pub(crate) fn simulated_registry() -> ControllerRegistry {
    simulated_registry_with_networks(Vec::new())
}

/// Registry whose simulated radio reports `networks` once enabled.
pub(crate) fn simulated_registry_with_networks(networks: Vec<ScanResult>) -> ControllerRegistry {
    let mut registry = ControllerRegistry::new();
    registry
        .register(
            WIFI_CONTROLLER,
            Box::new(SimulatedRadio::with_networks(networks)),
        )
        .expect("register radio");
    registry
        .register(VPN_CONTROLLER, Box::new(SimulatedTunnel::new()))
        .expect("register tunnel");
    registry
}

/// Lifecycle events captured by [`RecordingHealthReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    ControllerRegistered(String),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub(crate) struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    pub(crate) fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn controller_registered(&self, name: &str) {
        self.record(HealthEvent::ControllerRegistered(name.to_owned()));
    }
}

/// Loader placing the daemon socket inside a temporary directory.
pub(crate) struct TempSocketLoader {
    socket_dir: Arc<TempDir>,
}

impl TempSocketLoader {
    pub(crate) fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temporary directory for socket");
        Self {
            socket_dir: Arc::new(dir),
        }
    }

    pub(crate) fn socket_path(&self) -> String {
        self.socket_dir
            .path()
            .join("sockets")
            .join("nexusd.sock")
            .to_str()
            .expect("temporary socket path was not valid UTF-8")
            .to_owned()
    }
}

impl ConfigLoader for TempSocketLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config {
            daemon_socket: SocketEndpoint::unix(self.socket_path()),
            ..Config::default()
        })
    }
}

/// Loader that fails by passing an unparseable socket on the command line.
pub(crate) struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load_from_iter([
            OsString::from("nexusd"),
            OsString::from("--daemon-socket"),
            OsString::from("invalid://socket"),
        ])
    }
}
