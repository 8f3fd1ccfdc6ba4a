//! Error types for command dispatch.
//!
//! [`DispatchError`] covers failures detected before or around a handler
//! (unparseable lines, unknown keywords, transport problems).
//! [`CommandError`] covers failures inside a handler. Handlers report their
//! own failures to the client through their status line, so the dispatcher
//! only logs them.

use std::io;

use thiserror::Error;

use crate::controller::{ErrorCode, RegistryError};

/// Errors surfaced while reading and dispatching a command line.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The line carries no keyword.
    #[error("malformed command: {message}")]
    MalformedCommand {
        /// Why the line was rejected.
        message: String,
    },

    /// No handler is registered for the keyword.
    #[error("unknown command '{keyword}'")]
    UnknownCommand {
        /// Keyword the client sent.
        keyword: String,
    },

    /// The command line exceeds the maximum accepted size.
    #[error("command too large: more than {max_size} bytes")]
    RequestTooLarge {
        /// Maximum accepted line length in bytes.
        max_size: usize,
    },

    /// The handler ran and failed; the client already has its status line.
    #[error("command '{keyword}' failed: {source}")]
    Command {
        /// Keyword of the failing handler.
        keyword: String,
        /// Failure reported by the handler.
        #[source]
        source: CommandError,
    },

    /// Reading from or writing to the connection failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl DispatchError {
    /// Creates a malformed command error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedCommand {
            message: message.into(),
        }
    }

    /// Creates an unknown command error.
    pub fn unknown_command(keyword: impl Into<String>) -> Self {
        Self::UnknownCommand {
            keyword: keyword.into(),
        }
    }

    /// Line the dispatcher writes to the client for this error, if any.
    ///
    /// Handler failures and transport failures produce no dispatcher line.
    #[must_use]
    pub fn response_line(&self) -> Option<String> {
        match self {
            Self::MalformedCommand { .. } => Some("ERROR:MALFORMED_COMMAND".to_owned()),
            Self::UnknownCommand { keyword } => Some(format!("ERROR:UNKNOWN_COMMAND:{keyword}")),
            Self::RequestTooLarge { .. } => Some("ERROR:REQUEST_TOO_LARGE".to_owned()),
            Self::Command { .. } | Self::Io(_) => None,
        }
    }

    /// Returns `true` when the connection can no longer be used.
    #[must_use]
    pub fn is_connection_fatal(&self) -> bool {
        matches!(
            self,
            Self::Io(_)
                | Self::RequestTooLarge { .. }
                | Self::Command {
                    source: CommandError::Reply(_),
                    ..
                }
        )
    }
}

/// Failures reported by command handlers.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The argument string failed handler-local parsing.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Why the arguments were rejected.
        message: String,
    },

    /// The subsystem the handler drives is not registered.
    #[error(transparent)]
    ControllerNotFound(#[from] RegistryError),

    /// The controller lacks the capability the command needs.
    #[error("controller '{controller}' does not support {operation}")]
    Unsupported {
        /// Controller name.
        controller: &'static str,
        /// Operation that was requested.
        operation: &'static str,
    },

    /// The controller operation itself failed.
    #[error("controller '{controller}' failed with code {code}")]
    OperationFailed {
        /// Controller name.
        controller: &'static str,
        /// Code reported by the controller.
        code: ErrorCode,
    },

    /// Writing a response line failed.
    #[error("failed to write response: {0}")]
    Reply(#[from] io::Error),
}

impl CommandError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Status code written to the client for this failure.
    ///
    /// Controller failures pass their own code through untouched.
    #[must_use]
    pub fn status_code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument { .. } => ErrorCode::INVALID_ARGUMENT,
            Self::ControllerNotFound(_) => ErrorCode::NO_DEVICE,
            Self::Unsupported { .. } => ErrorCode::NOT_SUPPORTED,
            Self::OperationFailed { code, .. } => *code,
            Self::Reply(error) => error
                .raw_os_error()
                .and_then(ErrorCode::new)
                .unwrap_or(ErrorCode::IO_FAILURE),
        }
    }
}
