//! Bootstrap sequencing and health reporting.

use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use rstest::rstest;

use nexus_config::{SocketEndpoint, default_socket_endpoint};

use crate::bootstrap::{
    BootstrapError, ConfigLoader, ControllerProvider, SimulatedControllers, StaticConfigLoader,
    SystemConfigLoader, bootstrap_with,
};
use crate::controller::{
    Controller, ControllerState, RegistryError, SimulatedTunnel, VPN_CONTROLLER, WIFI_CONTROLLER,
};
use crate::tests::support::{
    FailingConfigLoader, HealthEvent, RecordingHealthReporter, TempSocketLoader,
};

/// Provider that registers two tunnels under the same name.
struct DuplicateProvider;

impl ControllerProvider for DuplicateProvider {
    fn controllers(&self) -> Vec<(&'static str, Box<dyn Controller>)> {
        vec![
            (VPN_CONTROLLER, Box::new(SimulatedTunnel::new())),
            (VPN_CONTROLLER, Box::new(SimulatedTunnel::new())),
        ]
    }
}

#[rstest]
fn bootstrap_registers_every_controller() {
    let loader = TempSocketLoader::new();
    let reporter = RecordingHealthReporter::default();

    let daemon = bootstrap_with(&loader, &reporter, &SimulatedControllers::demo())
        .expect("bootstrap succeeds");

    let mut names = daemon.registry().names();
    names.sort_unstable();
    assert_eq!(names, [VPN_CONTROLLER, WIFI_CONTROLLER]);
    assert_eq!(
        reporter.events(),
        [
            HealthEvent::BootstrapStarting,
            HealthEvent::ControllerRegistered(WIFI_CONTROLLER.to_owned()),
            HealthEvent::ControllerRegistered(VPN_CONTROLLER.to_owned()),
            HealthEvent::BootstrapSucceeded,
        ]
    );
    let socket = loader.socket_path();
    let parent = Path::new(&socket).parent().expect("socket parent");
    assert!(parent.is_dir(), "socket directory should be created");
}

#[rstest]
fn controllers_start_disabled() {
    let loader = TempSocketLoader::new();
    let reporter = RecordingHealthReporter::default();

    let daemon = bootstrap_with(&loader, &reporter, &SimulatedControllers::demo())
        .expect("bootstrap succeeds");

    for name in [WIFI_CONTROLLER, VPN_CONTROLLER] {
        let slot = daemon.registry().find(name).expect("controller registered");
        assert_eq!(slot.state(), ControllerState::Disabled);
    }
}

#[rstest]
fn configuration_failure_is_reported() {
    let reporter = RecordingHealthReporter::default();

    let error = bootstrap_with(
        &FailingConfigLoader,
        &reporter,
        &SimulatedControllers::default(),
    )
    .expect_err("configuration must fail");

    assert!(matches!(error, BootstrapError::Configuration { .. }));
    let events = reporter.events();
    assert_eq!(events.first(), Some(&HealthEvent::BootstrapStarting));
    assert!(matches!(events.last(), Some(HealthEvent::BootstrapFailed(_))));
}

#[rstest]
fn duplicate_controller_names_abort_bootstrap() {
    let loader = TempSocketLoader::new();
    let config = loader.load().expect("temporary config");
    let reporter = RecordingHealthReporter::default();

    let error = bootstrap_with(&StaticConfigLoader::new(config), &reporter, &DuplicateProvider)
        .expect_err("duplicate name");

    assert!(matches!(
        error,
        BootstrapError::Registry {
            source: RegistryError::DuplicateName { ref name },
        } if name == VPN_CONTROLLER
    ));
    assert_eq!(
        &reporter.events()[..2],
        [
            HealthEvent::BootstrapStarting,
            HealthEvent::ControllerRegistered(VPN_CONTROLLER.to_owned()),
        ]
    );
}

#[rstest]
fn daemon_dispatcher_serves_the_registry() {
    let loader = TempSocketLoader::new();
    let reporter = RecordingHealthReporter::default();
    let daemon = bootstrap_with(&loader, &reporter, &SimulatedControllers::demo())
        .expect("bootstrap succeeds");
    let dispatcher = daemon.dispatcher();
    let mut reply: Vec<String> = Vec::new();

    dispatcher
        .dispatch("vpn_enable", &mut reply)
        .expect("dispatch");

    assert_eq!(reply, ["VPN_ENABLE:0"]);
    assert_eq!(
        daemon
            .registry()
            .find(VPN_CONTROLLER)
            .expect("tunnel")
            .state(),
        ControllerState::Enabled
    );
}

#[rstest]
fn system_loader_falls_back_to_builtin_defaults() {
    let config = SystemConfigLoader::with_args(["nexusd"])
        .load()
        .expect("defaults resolve without overrides");

    assert_eq!(config.daemon_socket(), &default_socket_endpoint());
}

#[rstest]
fn system_loader_reads_the_configuration_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let socket = dir.path().join("run").join("nexusd.sock");
    let endpoint = SocketEndpoint::unix(socket.to_str().expect("utf8 path"));
    let file = dir.path().join("nexus.toml");
    fs::write(&file, format!("daemon_socket = \"{endpoint}\"\n")).expect("write config");
    let loader = SystemConfigLoader::with_args([
        OsStr::new("nexusd"),
        OsStr::new("--config-path"),
        file.as_os_str(),
    ]);
    let reporter = RecordingHealthReporter::default();

    let daemon = bootstrap_with(&loader, &reporter, &SimulatedControllers::demo())
        .expect("bootstrap succeeds");

    assert_eq!(daemon.config().daemon_socket(), &endpoint);
    assert!(socket.parent().expect("socket parent").is_dir());
}
