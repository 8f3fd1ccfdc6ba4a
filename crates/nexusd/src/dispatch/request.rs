//! Command line parsing for the dispatch loop.
//!
//! A command line is `<keyword>` optionally followed by a delimiter and an
//! argument string. The keyword ends at the first space or colon, so
//! `wifi_scan x:5` and `wifi_scan:x:5` both carry the argument `x:5`.

use super::errors::DispatchError;

/// A command line split into keyword and argument string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandLine<'a> {
    keyword: &'a str,
    arguments: &'a str,
}

impl<'a> CommandLine<'a> {
    /// Splits a raw line into its keyword and argument string.
    ///
    /// Trailing CR/LF and leading whitespace are ignored. The argument string
    /// is passed on untouched; handlers decide how to parse it.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::MalformedCommand` when the line carries no
    /// keyword.
    pub fn parse(line: &'a str) -> Result<Self, DispatchError> {
        let line = line.trim_end_matches(['\r', '\n']).trim_start();
        if line.trim_end().is_empty() {
            return Err(DispatchError::malformed("empty command line"));
        }

        let (keyword, arguments) = line.split_once([' ', ':']).unwrap_or((line, ""));
        if keyword.is_empty() {
            return Err(DispatchError::malformed("command line starts with a delimiter"));
        }

        Ok(Self { keyword, arguments })
    }

    /// Keyword selecting the handler.
    pub fn keyword(&self) -> &'a str {
        self.keyword
    }

    /// Everything after the keyword delimiter.
    pub fn arguments(&self) -> &'a str {
        self.arguments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("wifi_enable", "wifi_enable", "")]
    #[case("wifi_enable\n", "wifi_enable", "")]
    #[case("wifi_enable\r\n", "wifi_enable", "")]
    #[case("wifi_scan x:5", "wifi_scan", "x:5")]
    #[case("wifi_scan:x:5", "wifi_scan", "x:5")]
    #[case("  vpn_disable", "vpn_disable", "")]
    #[case("wifi_scan  x:5 ", "wifi_scan", " x:5 ")]
    fn splits_keyword_from_arguments(
        #[case] input: &str,
        #[case] keyword: &str,
        #[case] arguments: &str,
    ) {
        let line = CommandLine::parse(input).expect("parse");
        assert_eq!(line.keyword(), keyword);
        assert_eq!(line.arguments(), arguments);
    }

    #[rstest]
    #[case("")]
    #[case("\n")]
    #[case("   \r\n")]
    #[case(":x:5")]
    fn rejects_lines_without_keyword(#[case] input: &str) {
        assert!(matches!(
            CommandLine::parse(input),
            Err(DispatchError::MalformedCommand { .. })
        ));
    }
}
