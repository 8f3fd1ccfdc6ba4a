//! In-memory controllers registered by the daemon binary.
//!
//! These stand in for hardware-backed drivers so the control protocol can be
//! exercised end to end on any host.

use tracing::debug;

use super::{
    CONTROLLER_TARGET, Controller, ControllerState, ErrorCode, ScanResult, ScanResultCollection,
    WirelessController,
};

/// Highest scan mode accepted by [`SimulatedRadio`].
pub const MAX_SCAN_MODE: u32 = 2;

/// Wireless radio backed by a fixed list of visible networks.
#[derive(Debug, Clone, Default)]
pub struct SimulatedRadio {
    state: ControllerState,
    scan_mode: u32,
    visible: Vec<ScanResult>,
}

impl SimulatedRadio {
    /// Creates a disabled radio that sees no networks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a disabled radio that reports `visible` once enabled.
    #[must_use]
    pub fn with_networks(visible: Vec<ScanResult>) -> Self {
        Self {
            visible,
            ..Self::default()
        }
    }

    /// Scan mode most recently accepted.
    #[must_use]
    pub fn scan_mode(&self) -> u32 {
        self.scan_mode
    }
}

impl Controller for SimulatedRadio {
    fn enable(&mut self) -> Result<(), ErrorCode> {
        self.state = ControllerState::Enabled;
        debug!(target: CONTROLLER_TARGET, controller = "radio", "radio enabled");
        Ok(())
    }

    fn disable(&mut self) -> Result<(), ErrorCode> {
        self.state = ControllerState::Disabled;
        debug!(target: CONTROLLER_TARGET, controller = "radio", "radio disabled");
        Ok(())
    }

    fn state(&self) -> ControllerState {
        self.state
    }

    fn as_wireless(&self) -> Option<&dyn WirelessController> {
        Some(self)
    }

    fn as_wireless_mut(&mut self) -> Option<&mut dyn WirelessController> {
        Some(self)
    }
}

impl WirelessController for SimulatedRadio {
    fn set_scan_mode(&mut self, mode: u32) -> Result<(), ErrorCode> {
        if self.state == ControllerState::Disabled {
            return Err(ErrorCode::NETWORK_DOWN);
        }
        if mode > MAX_SCAN_MODE {
            return Err(ErrorCode::INVALID_ARGUMENT);
        }
        self.scan_mode = mode;
        debug!(target: CONTROLLER_TARGET, controller = "radio", mode, "scan mode changed");
        Ok(())
    }

    fn query_scan_results(&self) -> ScanResultCollection {
        match self.state {
            ControllerState::Enabled => self.visible.iter().cloned().collect(),
            ControllerState::Disabled => ScanResultCollection::new(),
        }
    }
}

/// VPN tunnel that only tracks whether it is up.
#[derive(Debug, Clone, Default)]
pub struct SimulatedTunnel {
    state: ControllerState,
}

impl SimulatedTunnel {
    /// Creates a tunnel in the disabled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Controller for SimulatedTunnel {
    fn enable(&mut self) -> Result<(), ErrorCode> {
        self.state = ControllerState::Enabled;
        debug!(target: CONTROLLER_TARGET, controller = "tunnel", "tunnel up");
        Ok(())
    }

    fn disable(&mut self) -> Result<(), ErrorCode> {
        self.state = ControllerState::Disabled;
        debug!(target: CONTROLLER_TARGET, controller = "tunnel", "tunnel down");
        Ok(())
    }

    fn state(&self) -> ControllerState {
        self.state
    }
}
