//! Wireless scan commands.

use thiserror::Error;
use tracing::warn;

use crate::controller::{ControllerRegistry, ScanResult, ScanResultCollection, WIFI_CONTROLLER};
use crate::dispatch::dispatcher::{CommandHandler, DISPATCH_TARGET};
use crate::dispatch::errors::CommandError;
use crate::dispatch::response::{ReplySink, status_line};

/// Line that ends every scan result stream.
///
/// A real result never carries `0` as its BSSID, so clients can tell the two
/// apart by the first field alone.
pub const SCAN_RESULTS_TERMINATOR: &str = "WIFI_SCAN_RESULT:0";

/// Longest scan result line the daemon will emit.
pub const MAX_RESULT_LINE_BYTES: usize = 255;

const SCAN_TAG: &str = "WIFI_SCAN";
const SCAN_RESULT_PREFIX: &str = "WIFI_SCAN_RESULT";

/// Reasons a scan result cannot be put on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanResultFormatError {
    /// The BSSID is empty or would read as the stream terminator.
    #[error("BSSID '{bssid}' is reserved")]
    ReservedBssid {
        /// Offending BSSID.
        bssid: String,
    },
    /// A field contains a line break or NUL.
    #[error("{field} contains a control character")]
    ControlCharacter {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The formatted line is longer than the protocol allows.
    #[error("result line is {length} bytes, limit is {max}")]
    TooLong {
        /// Length of the formatted line.
        length: usize,
        /// Maximum accepted length.
        max: usize,
    },
}

/// Formats `WIFI_SCAN_RESULT:<bssid>:<freq>:<level>:<flags>:<ssid>`.
///
/// # Errors
///
/// Returns a [`ScanResultFormatError`] when the result cannot be framed as a
/// single unambiguous line.
pub fn format_scan_result(result: &ScanResult) -> Result<String, ScanResultFormatError> {
    let bssid = result.bssid();
    if bssid.is_empty() || bssid == "0" {
        return Err(ScanResultFormatError::ReservedBssid {
            bssid: bssid.to_owned(),
        });
    }
    for (field, value) in [
        ("bssid", bssid),
        ("flags", result.flags()),
        ("ssid", result.ssid()),
    ] {
        if value.contains(['\r', '\n', '\0']) {
            return Err(ScanResultFormatError::ControlCharacter { field });
        }
    }

    let line = format!(
        "{SCAN_RESULT_PREFIX}:{bssid}:{}:{}:{}:{}",
        result.frequency(),
        result.level(),
        result.flags(),
        result.ssid()
    );
    if line.len() > MAX_RESULT_LINE_BYTES {
        return Err(ScanResultFormatError::TooLong {
            length: line.len(),
            max: MAX_RESULT_LINE_BYTES,
        });
    }
    Ok(line)
}

/// Parses the `<ignored>:<mode>` argument of `wifi_scan`.
///
/// The first field must be present and is otherwise ignored.
///
/// # Errors
///
/// Returns `CommandError::InvalidArgument` unless the argument holds exactly
/// two colon-delimited fields and the second is a non-negative integer.
pub fn parse_scan_mode(arguments: &str) -> Result<u32, CommandError> {
    let mut fields = arguments.trim().split(':');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(qualifier), Some(mode), None) if !qualifier.trim().is_empty() => {
            mode.trim().parse::<u32>().map_err(|error| {
                CommandError::invalid_argument(format!("scan mode '{mode}': {error}"))
            })
        }
        _ => Err(CommandError::invalid_argument(format!(
            "expected '<qualifier>:<mode>', got '{arguments}'"
        ))),
    }
}

/// `wifi_scan`: changes the radio's scan mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct WifiScanCommand;

impl WifiScanCommand {
    fn apply(registry: &ControllerRegistry, arguments: &str) -> Result<(), CommandError> {
        let mode = parse_scan_mode(arguments)?;
        let slot = registry.find(WIFI_CONTROLLER)?;
        slot.with_wireless_mut(|radio| radio.set_scan_mode(mode))
            .ok_or(CommandError::Unsupported {
                controller: WIFI_CONTROLLER,
                operation: "set_scan_mode",
            })?
            .map_err(|code| CommandError::OperationFailed {
                controller: WIFI_CONTROLLER,
                code,
            })
    }
}

impl CommandHandler for WifiScanCommand {
    fn keyword(&self) -> &'static str {
        "wifi_scan"
    }

    fn run(
        &self,
        registry: &ControllerRegistry,
        arguments: &str,
        reply: &mut dyn ReplySink,
    ) -> Result<(), CommandError> {
        let outcome = Self::apply(registry, arguments);
        reply.send(&status_line(SCAN_TAG, &outcome))?;
        outcome
    }
}

/// `wifi_scan_results`: streams the radio's latest scan results.
///
/// Every result is written once, in the order the radio produced it, and the
/// stream always ends with [`SCAN_RESULTS_TERMINATOR`]. Results that cannot be
/// formatted are logged and skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct WifiScanResultsCommand;

impl WifiScanResultsCommand {
    fn query(registry: &ControllerRegistry) -> Result<ScanResultCollection, CommandError> {
        registry
            .find(WIFI_CONTROLLER)?
            .with_wireless(|radio| radio.query_scan_results())
            .ok_or(CommandError::Unsupported {
                controller: WIFI_CONTROLLER,
                operation: "query_scan_results",
            })
    }

    fn stream(batch: ScanResultCollection, reply: &mut dyn ReplySink) -> Result<(), CommandError> {
        for result in batch {
            match format_scan_result(&result) {
                Ok(line) => reply.send(&line)?,
                Err(error) => warn!(
                    target: DISPATCH_TARGET,
                    bssid = result.bssid(),
                    %error,
                    "skipping scan result"
                ),
            }
        }
        Ok(())
    }
}

impl CommandHandler for WifiScanResultsCommand {
    fn keyword(&self) -> &'static str {
        "wifi_scan_results"
    }

    fn run(
        &self,
        registry: &ControllerRegistry,
        _arguments: &str,
        reply: &mut dyn ReplySink,
    ) -> Result<(), CommandError> {
        let outcome = Self::query(registry).and_then(|batch| Self::stream(batch, reply));
        if matches!(outcome, Err(CommandError::Reply(_))) {
            return outcome;
        }
        reply.send(SCAN_RESULTS_TERMINATOR)?;
        outcome
    }
}
