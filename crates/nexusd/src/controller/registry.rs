//! Name-keyed ownership of the daemon's controllers.

use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tracing::{debug, warn};

use super::{CONTROLLER_TARGET, Controller, ControllerState, ErrorCode, WirelessController};

/// Errors raised by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A controller is already registered under the name.
    #[error("controller '{name}' is already registered")]
    DuplicateName {
        /// Conflicting controller name.
        name: String,
    },
    /// No controller is registered under the name.
    #[error("no controller registered as '{name}'")]
    NotFound {
        /// Requested controller name.
        name: String,
    },
}

/// Owns every controller and resolves them by case-sensitive name.
///
/// The registry is populated during startup and then shared read-only; it
/// never removes a controller. Each controller sits in a [`ControllerSlot`]
/// that serialises mutating operations.
#[derive(Default)]
pub struct ControllerRegistry {
    controllers: HashMap<String, ControllerSlot>,
}

impl ControllerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `controller` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] when the name is taken; the
    /// existing binding is left untouched and `controller` is dropped.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        controller: Box<dyn Controller>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.controllers.contains_key(&name) {
            return Err(RegistryError::DuplicateName { name });
        }
        debug!(target: CONTROLLER_TARGET, controller = %name, "controller registered");
        let slot = ControllerSlot::new(name.clone(), controller);
        self.controllers.insert(name, slot);
        Ok(())
    }

    /// Looks up the controller registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when nothing is registered under
    /// the name.
    pub fn find(&self, name: &str) -> Result<&ControllerSlot, RegistryError> {
        self.controllers
            .get(name)
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_owned(),
            })
    }

    /// Registered controller names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.controllers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered controllers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    /// Returns `true` when no controller has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ControllerRegistry")
            .field("controllers", &self.names())
            .finish()
    }
}

/// A registered controller guarded for concurrent use.
///
/// `enable`, `disable` and `set_scan_mode` hold the write lock for their
/// whole duration, so transitions on one controller never interleave.
/// Queries take the read lock and therefore never observe a controller
/// mid-transition.
pub struct ControllerSlot {
    name: String,
    controller: RwLock<Box<dyn Controller>>,
}

impl ControllerSlot {
    fn new(name: String, controller: Box<dyn Controller>) -> Self {
        Self {
            name,
            controller: RwLock::new(controller),
        }
    }

    /// Name the controller was registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enables the controller.
    ///
    /// # Errors
    ///
    /// Propagates the controller's failure code unchanged.
    pub fn enable(&self) -> Result<(), ErrorCode> {
        self.write().enable()
    }

    /// Disables the controller.
    ///
    /// # Errors
    ///
    /// Propagates the controller's failure code unchanged.
    pub fn disable(&self) -> Result<(), ErrorCode> {
        self.write().disable()
    }

    /// Current power state.
    #[must_use]
    pub fn state(&self) -> ControllerState {
        self.read().state()
    }

    /// Runs `operation` against the wireless capability under the read lock.
    ///
    /// Returns `None` when the controller does not drive a radio.
    pub fn with_wireless<R>(
        &self,
        operation: impl FnOnce(&dyn WirelessController) -> R,
    ) -> Option<R> {
        let guard = self.read();
        guard.as_wireless().map(operation)
    }

    /// Runs `operation` against the wireless capability under the write lock.
    ///
    /// Returns `None` when the controller does not drive a radio.
    pub fn with_wireless_mut<R>(
        &self,
        operation: impl FnOnce(&mut dyn WirelessController) -> R,
    ) -> Option<R> {
        let mut guard = self.write();
        guard.as_wireless_mut().map(operation)
    }

    fn read(&self) -> RwLockReadGuard<'_, Box<dyn Controller>> {
        self.controller.read().unwrap_or_else(|poisoned| {
            self.warn_poisoned();
            PoisonError::into_inner(poisoned)
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, Box<dyn Controller>> {
        self.controller.write().unwrap_or_else(|poisoned| {
            self.warn_poisoned();
            PoisonError::into_inner(poisoned)
        })
    }

    fn warn_poisoned(&self) {
        warn!(
            target: CONTROLLER_TARGET,
            controller = %self.name,
            "controller lock poisoned by a panicked operation; continuing"
        );
    }
}

impl fmt::Debug for ControllerSlot {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ControllerSlot")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
