//! Subsystem controllers and the registry that owns them.
//!
//! Every subsystem the daemon drives (the wireless radio, the VPN tunnel)
//! implements [`Controller`]. Wireless-capable controllers additionally expose
//! [`WirelessController`] through [`Controller::as_wireless`] and
//! [`Controller::as_wireless_mut`], so command handlers can reach scan
//! operations without knowing the concrete type.
//!
//! Controllers are built once at startup, handed to the
//! [`ControllerRegistry`], and live until the daemon exits. The registry wraps
//! each controller in a [`ControllerSlot`] that serialises state transitions.

mod registry;
mod simulated;
mod wireless;

use std::fmt;
use std::num::NonZeroI32;

use nix::errno::Errno;

pub use registry::{ControllerRegistry, ControllerSlot, RegistryError};
pub use simulated::{MAX_SCAN_MODE, SimulatedRadio, SimulatedTunnel};
pub use wireless::{ScanResult, ScanResultCollection, WirelessController};

pub(crate) const CONTROLLER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::controller");

/// Registry name of the wireless radio controller.
pub const WIFI_CONTROLLER: &str = "WIFI";

/// Registry name of the VPN tunnel controller.
pub const VPN_CONTROLLER: &str = "VPN";

/// Non-zero, errno-style failure code reported by a controller.
///
/// Codes are surfaced to clients verbatim in the status field of a response
/// line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(NonZeroI32);

impl ErrorCode {
    /// Argument rejected before reaching the controller (`EINVAL`).
    pub const INVALID_ARGUMENT: Self = Self::from_errno(Errno::EINVAL);
    /// No controller registered under the requested name (`ENODEV`).
    pub const NO_DEVICE: Self = Self::from_errno(Errno::ENODEV);
    /// Controller lacks the requested capability (`EOPNOTSUPP`).
    pub const NOT_SUPPORTED: Self = Self::from_errno(Errno::EOPNOTSUPP);
    /// Operation needs the subsystem to be enabled first (`ENETDOWN`).
    pub const NETWORK_DOWN: Self = Self::from_errno(Errno::ENETDOWN);
    /// Low-level IO failure (`EIO`).
    pub const IO_FAILURE: Self = Self::from_errno(Errno::EIO);

    /// Wraps a raw code, returning `None` for zero (which means success).
    #[must_use]
    pub const fn new(code: i32) -> Option<Self> {
        match NonZeroI32::new(code) {
            Some(code) => Some(Self(code)),
            None => None,
        }
    }

    /// `UnknownErrno` carries no code of its own and maps to `i32::MIN`.
    const fn from_errno(errno: Errno) -> Self {
        match NonZeroI32::new(errno as i32) {
            Some(code) => Self(code),
            None => Self(NonZeroI32::MIN),
        }
    }

    /// Raw code as written on the wire.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0.get()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Observable power state of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    /// The subsystem is switched off.
    #[default]
    Disabled,
    /// The subsystem is running.
    Enabled,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Disabled => "disabled",
            Self::Enabled => "enabled",
        })
    }
}

/// Capability contract shared by every subsystem controller.
///
/// Mutating operations take `&mut self`; the registry guarantees at most one
/// of them runs against a given controller at a time.
pub trait Controller: Send + Sync {
    /// Switches the subsystem on.
    ///
    /// # Errors
    ///
    /// Returns the subsystem's failure code when it cannot be enabled.
    fn enable(&mut self) -> Result<(), ErrorCode>;

    /// Switches the subsystem off.
    ///
    /// # Errors
    ///
    /// Returns the subsystem's failure code when it cannot be disabled.
    fn disable(&mut self) -> Result<(), ErrorCode>;

    /// Current power state.
    fn state(&self) -> ControllerState;

    /// Wireless operations, when the controller drives a radio.
    fn as_wireless(&self) -> Option<&dyn WirelessController> {
        None
    }

    /// Mutable wireless operations, when the controller drives a radio.
    fn as_wireless_mut(&mut self) -> Option<&mut dyn WirelessController> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_an_error_code() {
        assert_eq!(ErrorCode::new(0), None);
        assert_eq!(ErrorCode::new(5).map(ErrorCode::get), Some(5));
    }

    #[test]
    fn fixed_codes_follow_errno() {
        assert_eq!(ErrorCode::INVALID_ARGUMENT.get(), Errno::EINVAL as i32);
        assert_eq!(ErrorCode::NO_DEVICE.get(), Errno::ENODEV as i32);
        assert_eq!(ErrorCode::NOT_SUPPORTED.to_string(), (Errno::EOPNOTSUPP as i32).to_string());
    }

    #[test]
    fn unknown_errno_still_reports_failure() {
        let code = ErrorCode::from_errno(Errno::UnknownErrno);
        assert_eq!(code.get(), i32::MIN);
        assert_eq!(ErrorCode::from_errno(Errno::ENETDOWN), ErrorCode::NETWORK_DOWN);
    }
}
