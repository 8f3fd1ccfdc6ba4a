//! Daemon bootstrap orchestration.
//!
//! Bootstrap resolves configuration, installs telemetry, prepares the socket
//! directory and builds the controller registry. The resulting [`Daemon`]
//! hands out dispatchers bound to that registry.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use nexus_config::{Config, SocketPreparationError};

use crate::controller::{
    Controller, ControllerRegistry, RegistryError, ScanResult, SimulatedRadio, SimulatedTunnel,
    VPN_CONTROLLER, WIFI_CONTROLLER,
};
use crate::dispatch::CommandDispatcher;
use crate::health::HealthReporter;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader's error when no valid configuration can be built.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that resolves defaults, file, environment and command line.
///
/// Reads the process arguments unless an explicit argument list was given.
#[derive(Debug, Default, Clone)]
pub struct SystemConfigLoader {
    args: Option<Vec<OsString>>,
}

impl SystemConfigLoader {
    /// Resolves configuration from `args` in place of the process arguments.
    ///
    /// The first item is the program name, as in [`std::env::args_os`].
    #[must_use]
    pub fn with_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self {
            args: Some(args.into_iter().map(Into::into).collect()),
        }
    }
}

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        match &self.args {
            Some(args) => Config::load_from_iter(args.iter().cloned()),
            None => Config::load(),
        }
    }
}

/// Loader that hands out a configuration resolved earlier.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Supplies the controllers registered at startup.
pub trait ControllerProvider: Send + Sync {
    /// Controllers to register, paired with their registry names.
    fn controllers(&self) -> Vec<(&'static str, Box<dyn Controller>)>;
}

/// Provider registering the in-memory radio and tunnel.
#[derive(Debug, Default, Clone)]
pub struct SimulatedControllers {
    networks: Vec<ScanResult>,
}

impl SimulatedControllers {
    /// Creates a provider whose radio reports `networks` once enabled.
    #[must_use]
    pub fn with_networks(networks: Vec<ScanResult>) -> Self {
        Self { networks }
    }

    /// Provider with a small fixed set of visible networks.
    #[must_use]
    pub fn demo() -> Self {
        Self::with_networks(vec![
            ScanResult::new("02:00:00:00:01:01", 2412, -41, "[WPA2-PSK-CCMP][ESS]", "nexus-lab"),
            ScanResult::new("02:00:00:00:01:02", 5180, -63, "[WPA2-EAP-CCMP][ESS]", "nexus-corp"),
            ScanResult::new("02:00:00:00:01:03", 2462, -78, "[ESS]", "guest"),
        ])
    }
}

impl ControllerProvider for SimulatedControllers {
    fn controllers(&self) -> Vec<(&'static str, Box<dyn Controller>)> {
        vec![
            (
                WIFI_CONTROLLER,
                Box::new(SimulatedRadio::with_networks(self.networks.clone())),
            ),
            (VPN_CONTROLLER, Box::new(SimulatedTunnel::new())),
        ]
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// Socket preparation failed.
    #[error("failed to prepare daemon socket: {source}")]
    Socket {
        /// Filesystem error reported while preparing the socket directory.
        #[source]
        source: SocketPreparationError,
    },
    /// A controller could not be registered.
    #[error("failed to register controllers: {source}")]
    Registry {
        /// Underlying registry error.
        #[source]
        source: RegistryError,
    },
}

/// Result of a successful bootstrap invocation.
#[derive(Debug)]
pub struct Daemon {
    config: Config,
    registry: Arc<ControllerRegistry>,
    telemetry: TelemetryHandle,
}

impl Daemon {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registry holding every controller.
    #[must_use]
    pub fn registry(&self) -> &ControllerRegistry {
        &self.registry
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Builds a dispatcher serving the built-in commands over this registry.
    #[must_use]
    pub fn dispatcher(&self) -> CommandDispatcher {
        CommandDispatcher::new(Arc::clone(&self.registry))
    }
}

/// Bootstraps the daemon using the supplied collaborators.
///
/// # Errors
///
/// Returns the first failing stage; the reporter sees the same error.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: &dyn HealthReporter,
    provider: &dyn ControllerProvider,
) -> Result<Daemon, BootstrapError> {
    reporter.bootstrap_starting();
    bootstrap_stages(loader, reporter, provider).inspect_err(|error| {
        reporter.bootstrap_failed(error);
    })
}

fn bootstrap_stages(
    loader: &dyn ConfigLoader,
    reporter: &dyn HealthReporter,
    provider: &dyn ControllerProvider,
) -> Result<Daemon, BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    let telemetry =
        telemetry::initialise(&config).map_err(|source| BootstrapError::Telemetry { source })?;
    config
        .daemon_socket()
        .prepare_filesystem()
        .map_err(|source| BootstrapError::Socket { source })?;

    let mut registry = ControllerRegistry::new();
    for (name, controller) in provider.controllers() {
        registry
            .register(name, controller)
            .map_err(|source| BootstrapError::Registry { source })?;
        reporter.controller_registered(name);
    }

    reporter.bootstrap_succeeded(&config);
    Ok(Daemon {
        config,
        registry: Arc::new(registry),
        telemetry,
    })
}
