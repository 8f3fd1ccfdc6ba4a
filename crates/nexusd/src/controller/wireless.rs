//! Wireless radio extension of the controller contract.

use std::vec;

use super::ErrorCode;

/// Operations available on controllers that drive a wireless radio.
pub trait WirelessController {
    /// Selects the radio's scan mode.
    ///
    /// The legal range is controller-defined.
    ///
    /// # Errors
    ///
    /// Returns a failure code for unsupported modes or when the radio cannot
    /// change mode in its current state.
    fn set_scan_mode(&mut self, mode: u32) -> Result<(), ErrorCode>;

    /// Produces a fresh batch of discovered networks.
    ///
    /// An empty collection means no networks were found.
    fn query_scan_results(&self) -> ScanResultCollection;
}

/// A wireless network discovered by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    bssid: String,
    frequency: u32,
    level: i32,
    flags: String,
    ssid: String,
}

impl ScanResult {
    /// Builds a scan result.
    #[must_use]
    pub fn new(
        bssid: impl Into<String>,
        frequency: u32,
        level: i32,
        flags: impl Into<String>,
        ssid: impl Into<String>,
    ) -> Self {
        Self {
            bssid: bssid.into(),
            frequency,
            level,
            flags: flags.into(),
            ssid: ssid.into(),
        }
    }

    /// Station identifier of the access point.
    #[must_use]
    pub fn bssid(&self) -> &str {
        &self.bssid
    }

    /// Channel frequency in MHz.
    #[must_use]
    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    /// Signal level as reported by the driver.
    #[must_use]
    pub fn level(&self) -> i32 {
        self.level
    }

    /// Capability flags, e.g. `[WPA2-PSK-CCMP][ESS]`.
    #[must_use]
    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// Network name.
    #[must_use]
    pub fn ssid(&self) -> &str {
        &self.ssid
    }
}

/// Ordered batch of scan results produced by one query.
///
/// The batch is consumed by value: iterating it yields each result exactly
/// once, and whatever has not been yielded is released with the iterator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResultCollection {
    results: Vec<ScanResult>,
}

impl ScanResultCollection {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of results in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns `true` when the scan found nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Appends a result in production order.
    pub fn push(&mut self, result: ScanResult) {
        self.results.push(result);
    }
}

impl From<Vec<ScanResult>> for ScanResultCollection {
    fn from(results: Vec<ScanResult>) -> Self {
        Self { results }
    }
}

impl FromIterator<ScanResult> for ScanResultCollection {
    fn from_iter<I: IntoIterator<Item = ScanResult>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ScanResultCollection {
    type Item = ScanResult;
    type IntoIter = vec::IntoIter<ScanResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}
