//! Response framing for the dispatch loop.
//!
//! Handlers never touch the connection directly. They write whole lines into a
//! [`ReplySink`]; the sink appends the newline delimiter and flushes, so lines
//! reach the client in the order they were sent.

use std::io::{self, Write};

use super::errors::CommandError;

/// Ordered, per-connection destination for response lines.
pub trait ReplySink {
    /// Sends one response line. `line` must not contain the delimiter.
    ///
    /// # Errors
    ///
    /// Returns an error when the line cannot be delivered.
    fn send(&mut self, line: &str) -> io::Result<()>;
}

/// Reply sink that frames lines onto a byte stream.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Creates a new response writer wrapping the given output stream.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> ReplySink for ResponseWriter<W> {
    fn send(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

/// Formats the `<TAG>:<status>` line for a handler outcome.
pub fn status_line(tag: &str, outcome: &Result<(), CommandError>) -> String {
    match outcome {
        Ok(()) => format!("{tag}:0"),
        Err(error) => format!("{tag}:{}", error.status_code()),
    }
}

#[cfg(test)]
impl ReplySink for Vec<String> {
    fn send(&mut self, line: &str) -> io::Result<()> {
        self.push(line.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ErrorCode;

    #[test]
    fn writes_one_line_per_send() {
        let mut output: Vec<u8> = Vec::new();
        let mut writer = ResponseWriter::new(&mut output);
        writer.send("WIFI_ENABLE:0").expect("first line");
        writer.send("WIFI_SCAN_RESULT:0").expect("second line");

        let response = String::from_utf8(output).expect("valid utf8");
        assert_eq!(response, "WIFI_ENABLE:0\nWIFI_SCAN_RESULT:0\n");
    }

    #[test]
    fn success_status_is_zero() {
        assert_eq!(status_line("VPN_ENABLE", &Ok(())), "VPN_ENABLE:0");
    }

    #[test]
    fn failure_status_carries_code() {
        let outcome = Err(CommandError::OperationFailed {
            controller: "VPN",
            code: ErrorCode::new(113).expect("non-zero"),
        });
        assert_eq!(status_line("VPN_DISABLE", &outcome), "VPN_DISABLE:113");
    }

    #[test]
    fn invalid_arguments_report_einval() {
        let outcome = Err(CommandError::invalid_argument("missing mode"));
        assert_eq!(
            status_line("WIFI_SCAN", &outcome),
            format!("WIFI_SCAN:{}", ErrorCode::INVALID_ARGUMENT)
        );
    }
}
