//! Line-oriented command dispatch.
//!
//! This module reads command lines from connected clients, routes each one by
//! keyword to a [`CommandHandler`], and writes the handler's response lines
//! back through a [`ReplySink`].
//!
//! ## Protocol
//!
//! Clients send one command per line. The keyword ends at the first space or
//! colon; the rest of the line is the handler's argument string:
//!
//! ```text
//! wifi_enable
//! wifi_scan:any:1
//! wifi_scan_results
//! ```
//!
//! Simple commands answer with `<TAG>:<status>`, where the status is `0` on
//! success and an errno-style code otherwise:
//!
//! ```text
//! WIFI_ENABLE:0
//! WIFI_SCAN:0
//! WIFI_SCAN_RESULT:02:00:00:00:00:01:2437:-52:[ESS]:office
//! WIFI_SCAN_RESULT:0
//! ```
//!
//! `wifi_scan_results` streams one line per network and always finishes with
//! the `WIFI_SCAN_RESULT:0` terminator.
//!
//! ## Dispatch errors
//!
//! Lines that cannot be routed are answered by the dispatcher itself with
//! `ERROR:MALFORMED_COMMAND` or `ERROR:UNKNOWN_COMMAND:<keyword>`; no handler
//! runs. Lines longer than 4096 bytes are answered with
//! `ERROR:REQUEST_TOO_LARGE` and the connection is closed.

pub mod commands;
mod dispatcher;
mod errors;
mod handler;
mod request;
mod response;

pub use self::dispatcher::{CommandDispatcher, CommandHandler};
pub use self::errors::{CommandError, DispatchError};
pub use self::handler::DispatchConnectionHandler;
pub use self::request::CommandLine;
pub use self::response::{ReplySink, ResponseWriter, status_line};
