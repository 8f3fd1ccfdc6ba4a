//! Built-in command handlers.
//!
//! | Keyword             | Response                          |
//! |---------------------|-----------------------------------|
//! | `wifi_enable`       | `WIFI_ENABLE:<status>`            |
//! | `wifi_disable`      | `WIFI_DISABLE:<status>`           |
//! | `wifi_scan`         | `WIFI_SCAN:<status>`              |
//! | `wifi_scan_results` | `WIFI_SCAN_RESULT:...` lines, `WIFI_SCAN_RESULT:0` |
//! | `vpn_enable`        | `VPN_ENABLE:<status>`             |
//! | `vpn_disable`       | `VPN_DISABLE:<status>`            |

mod power;
mod wifi;

pub use power::{PowerAction, PowerCommand};
pub use wifi::{
    MAX_RESULT_LINE_BYTES, SCAN_RESULTS_TERMINATOR, ScanResultFormatError, WifiScanCommand,
    WifiScanResultsCommand, format_scan_result, parse_scan_mode,
};

use super::dispatcher::CommandHandler;

/// Handlers the daemon serves by default.
pub(crate) fn builtin_handlers() -> Vec<Box<dyn CommandHandler>> {
    vec![
        Box::new(PowerCommand::WIFI_ENABLE),
        Box::new(PowerCommand::WIFI_DISABLE),
        Box::new(WifiScanCommand),
        Box::new(WifiScanResultsCommand),
        Box::new(PowerCommand::VPN_ENABLE),
        Box::new(PowerCommand::VPN_DISABLE),
    ]
}
