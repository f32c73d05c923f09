//! Command sink port — the outbound link to the PKONE controller.

use std::future::Future;

use pkone_domain::command::Command;
use pkone_domain::error::PkoneError;

/// Delivers rendered commands to the controller.
///
/// Implementations must write each command whole; the wire has no framing
/// beyond the terminator.
pub trait CommandSink {
    /// Send one command.
    fn send(&self, command: &Command) -> impl Future<Output = Result<(), PkoneError>> + Send;
}

impl<T: CommandSink + Send + Sync> CommandSink for std::sync::Arc<T> {
    fn send(&self, command: &Command) -> impl Future<Output = Result<(), PkoneError>> + Send {
        (**self).send(command)
    }
}
