//! Socket transport for the control protocol.
//!
//! [`SocketListener`] binds the configured endpoint and accepts connections on
//! a background thread. Each accepted connection is handed to a
//! [`ConnectionHandler`] on a thread of its own, so a slow client never
//! holds up the others.

mod errors;
mod handler;
mod listener;
#[cfg(test)]
mod test_utils;

pub(crate) use self::errors::ListenerError;
pub(crate) use self::handler::{ConnectionHandler, ConnectionStream};
pub(crate) use self::listener::{ListenerHandle, SocketListener};
#[cfg(test)]
pub(crate) use self::test_utils::CountingHandler;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
