//! Keyword routing for command dispatch.
//!
//! The dispatcher owns a fixed keyword → handler table built at construction.
//! It answers dispatch-level failures itself (`ERROR:...` lines) and leaves
//! handler failures to the handler's own status line.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::controller::ControllerRegistry;

use super::commands::builtin_handlers;
use super::errors::{CommandError, DispatchError};
use super::request::CommandLine;
use super::response::ReplySink;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// A unit of dispatch logic bound to one command keyword.
pub trait CommandHandler: Send + Sync {
    /// Keyword that selects this handler.
    fn keyword(&self) -> &'static str;

    /// Runs the command and writes its response lines to `reply`.
    ///
    /// Implementations report every failure to the client through `reply`
    /// before returning it.
    ///
    /// # Errors
    ///
    /// Returns the failure already reported to the client.
    fn run(
        &self,
        registry: &ControllerRegistry,
        arguments: &str,
        reply: &mut dyn ReplySink,
    ) -> Result<(), CommandError>;
}

/// Routes command lines to their handlers.
pub struct CommandDispatcher {
    registry: Arc<ControllerRegistry>,
    handlers: HashMap<&'static str, Box<dyn CommandHandler>>,
}

impl CommandDispatcher {
    /// Creates a dispatcher serving the built-in WIFI and VPN commands.
    pub fn new(registry: Arc<ControllerRegistry>) -> Self {
        Self::with_handlers(registry, builtin_handlers())
    }

    /// Creates a dispatcher serving `handlers`.
    ///
    /// Keywords are unique; when two handlers claim the same keyword the
    /// first one wins and the other is dropped with a warning.
    pub fn with_handlers(
        registry: Arc<ControllerRegistry>,
        handlers: impl IntoIterator<Item = Box<dyn CommandHandler>>,
    ) -> Self {
        let mut table: HashMap<&'static str, Box<dyn CommandHandler>> = HashMap::new();
        for handler in handlers {
            let keyword = handler.keyword();
            if table.contains_key(keyword) {
                warn!(target: DISPATCH_TARGET, keyword, "ignoring duplicate command handler");
                continue;
            }
            table.insert(keyword, handler);
        }
        Self {
            registry,
            handlers: table,
        }
    }

    /// Keywords served by this dispatcher, sorted.
    pub fn keywords(&self) -> Vec<&'static str> {
        let mut keywords: Vec<&'static str> = self.handlers.keys().copied().collect();
        keywords.sort_unstable();
        keywords
    }

    /// Registry the handlers operate on.
    pub fn registry(&self) -> &ControllerRegistry {
        &self.registry
    }

    /// Dispatches one command line, writing every response line to `reply`.
    ///
    /// # Errors
    ///
    /// Returns the dispatch or handler failure after it has been reported to
    /// the client. `DispatchError::Io` means the client could not be told.
    pub fn dispatch(&self, line: &str, reply: &mut dyn ReplySink) -> Result<(), DispatchError> {
        let command = match CommandLine::parse(line) {
            Ok(command) => command,
            Err(error) => return Self::reject(error, reply),
        };

        let Some(handler) = self.handlers.get(command.keyword()) else {
            return Self::reject(DispatchError::unknown_command(command.keyword()), reply);
        };

        debug!(
            target: DISPATCH_TARGET,
            keyword = command.keyword(),
            arguments = command.arguments(),
            "dispatching command"
        );

        handler
            .run(&self.registry, command.arguments(), reply)
            .map_err(|source| {
                warn!(
                    target: DISPATCH_TARGET,
                    keyword = command.keyword(),
                    error = %source,
                    "command failed"
                );
                DispatchError::Command {
                    keyword: command.keyword().to_owned(),
                    source,
                }
            })
    }

    fn reject(error: DispatchError, reply: &mut dyn ReplySink) -> Result<(), DispatchError> {
        warn!(target: DISPATCH_TARGET, %error, "rejected command line");
        if let Some(line) = error.response_line() {
            reply.send(&line)?;
        }
        Err(error)
    }
}

impl fmt::Debug for CommandDispatcher {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CommandDispatcher")
            .field("registry", &self.registry)
            .field("keywords", &self.keywords())
            .finish()
    }
}
