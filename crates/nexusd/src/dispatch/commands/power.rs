//! Enable and disable commands for any registered controller.

use crate::controller::{ControllerRegistry, VPN_CONTROLLER, WIFI_CONTROLLER};
use crate::dispatch::dispatcher::CommandHandler;
use crate::dispatch::errors::CommandError;
use crate::dispatch::response::{ReplySink, status_line};

/// Power transition requested by a [`PowerCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    /// Switch the controller on.
    Enable,
    /// Switch the controller off.
    Disable,
}

/// Switches a named controller on or off and answers `<TAG>:<status>`.
///
/// The argument string is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerCommand {
    keyword: &'static str,
    tag: &'static str,
    controller: &'static str,
    action: PowerAction,
}

impl PowerCommand {
    /// `wifi_enable`
    pub const WIFI_ENABLE: Self = Self::new(
        "wifi_enable",
        "WIFI_ENABLE",
        WIFI_CONTROLLER,
        PowerAction::Enable,
    );
    /// `wifi_disable`
    pub const WIFI_DISABLE: Self = Self::new(
        "wifi_disable",
        "WIFI_DISABLE",
        WIFI_CONTROLLER,
        PowerAction::Disable,
    );
    /// `vpn_enable`
    pub const VPN_ENABLE: Self = Self::new(
        "vpn_enable",
        "VPN_ENABLE",
        VPN_CONTROLLER,
        PowerAction::Enable,
    );
    /// `vpn_disable`
    pub const VPN_DISABLE: Self = Self::new(
        "vpn_disable",
        "VPN_DISABLE",
        VPN_CONTROLLER,
        PowerAction::Disable,
    );

    /// Builds a power command for `controller`.
    pub const fn new(
        keyword: &'static str,
        tag: &'static str,
        controller: &'static str,
        action: PowerAction,
    ) -> Self {
        Self {
            keyword,
            tag,
            controller,
            action,
        }
    }

    /// Response tag written before the status.
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    fn apply(&self, registry: &ControllerRegistry) -> Result<(), CommandError> {
        let slot = registry.find(self.controller)?;
        let result = match self.action {
            PowerAction::Enable => slot.enable(),
            PowerAction::Disable => slot.disable(),
        };
        result.map_err(|code| CommandError::OperationFailed {
            controller: self.controller,
            code,
        })
    }
}

impl CommandHandler for PowerCommand {
    fn keyword(&self) -> &'static str {
        self.keyword
    }

    fn run(
        &self,
        registry: &ControllerRegistry,
        _arguments: &str,
        reply: &mut dyn ReplySink,
    ) -> Result<(), CommandError> {
        let outcome = self.apply(registry);
        reply.send(&status_line(self.tag, &outcome))?;
        outcome
    }
}
