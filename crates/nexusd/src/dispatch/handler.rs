//! Connection handler that feeds command lines to the dispatcher.
//!
//! This module provides the `DispatchConnectionHandler` which implements the
//! `ConnectionHandler` trait from the transport layer. A connection may carry
//! any number of command lines; each one is dispatched and fully answered
//! before the next is read, and the connection ends when the client closes
//! its side.

use std::io::{BufRead, BufReader, Read};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::transport::{ConnectionHandler, ConnectionStream};

use super::dispatcher::{CommandDispatcher, DISPATCH_TARGET};
use super::errors::DispatchError;
use super::response::{ReplySink, ResponseWriter};

/// Maximum size of a single command line in bytes, excluding the newline.
pub(crate) const MAX_COMMAND_BYTES: usize = 4096;

/// Connection handler that dispatches newline-delimited command lines.
#[derive(Debug)]
pub struct DispatchConnectionHandler {
    dispatcher: Arc<CommandDispatcher>,
}

impl DispatchConnectionHandler {
    /// Creates a handler serving commands through `dispatcher`.
    pub fn new(dispatcher: Arc<CommandDispatcher>) -> Self {
        Self { dispatcher }
    }

    fn serve(&self, stream: ConnectionStream) {
        let peer = stream.peer();
        let writer = match stream.try_clone() {
            Ok(writer) => writer,
            Err(error) => {
                warn!(target: DISPATCH_TARGET, %peer, %error, "failed to split connection");
                return;
            }
        };
        let mut reader = BufReader::new(stream);
        let mut reply = ResponseWriter::new(writer);

        loop {
            let line = match read_command_line(&mut reader) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!(target: DISPATCH_TARGET, %peer, "client closed connection");
                    return;
                }
                Err(error) => {
                    warn!(target: DISPATCH_TARGET, %peer, %error, "failed to read command");
                    reject_request(&mut reply, &peer, &error);
                    return;
                }
            };

            let line = String::from_utf8_lossy(&line);
            if let Err(error) = self.dispatcher.dispatch(&line, &mut reply)
                && error.is_connection_fatal()
            {
                warn!(target: DISPATCH_TARGET, %peer, %error, "closing connection");
                return;
            }
        }
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, stream: ConnectionStream) {
        self.serve(stream);
    }
}

/// Sends the error line for a request that ends the connection.
///
/// Returns `false` when the line could not be delivered.
fn reject_request<S: ReplySink>(reply: &mut S, peer: &str, error: &DispatchError) -> bool {
    let Some(line) = error.response_line() else {
        return true;
    };
    match reply.send(&line) {
        Ok(()) => true,
        Err(send_error) => {
            debug!(
                target: DISPATCH_TARGET,
                %peer,
                error = %send_error,
                "failed to deliver rejection"
            );
            false
        }
    }
}

/// Reads one command line, without its newline.
///
/// Returns `Ok(None)` once the client has closed the connection. A final line
/// without a newline is still returned.
fn read_command_line<R: BufRead>(reader: &mut R) -> Result<Option<Vec<u8>>, DispatchError> {
    let mut buffer = Vec::new();
    let limit = (MAX_COMMAND_BYTES + 1) as u64;
    let read = reader.by_ref().take(limit).read_until(b'\n', &mut buffer)?;
    if read == 0 {
        return Ok(None);
    }
    if buffer.last() == Some(&b'\n') {
        buffer.pop();
    } else if buffer.len() > MAX_COMMAND_BYTES {
        return Err(DispatchError::RequestTooLarge {
            max_size: MAX_COMMAND_BYTES,
        });
    }
    Ok(Some(buffer))
}
