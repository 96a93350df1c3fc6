use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::ExecutorError;
use crate::record::{ResponseRecord, TrapRecord};

/// One reply sentence of a running command.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// `!re`: a data row.
    Row(ResponseRecord),
    /// `!trap`: an error row in place of a data row.
    Trap(TrapRecord),
    /// `!done`: the command finished, nothing follows.
    Done,
}

/// Producer side of a command stream.
pub type EventSender = mpsc::UnboundedSender<StreamEvent>;

/// Consumer side of a command stream.
pub type EventReceiver = mpsc::UnboundedReceiver<StreamEvent>;

/// Create a connected sender/receiver pair.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// A prepared command bound to a connection.
///
/// The wire protocol, session and command construction live behind this
/// trait. The engine only consumes the rows it yields.
pub trait CommandExecutor: Send + Sync {
    /// Command text, e.g. `/interface/print`. Used as error context.
    fn command(&self) -> &str;

    /// Run the command to completion and return every data row.
    ///
    /// A trap fails the call.
    fn execute_list(&self) -> Result<Vec<ResponseRecord>, ExecutorError>;

    /// Collect rows for about `duration`, then cancel the command on the
    /// device and return what arrived. The deadline is soft: cancellation
    /// is requested at or after it.
    fn execute_list_with_duration(
        &self,
        duration: Duration,
    ) -> Result<Vec<ResponseRecord>, ExecutorError>;

    /// Start the command in the background and return immediately.
    ///
    /// The executor owns the reading side: it pushes every reply onto
    /// `events` in arrival order and finishes with exactly one
    /// [`StreamEvent::Done`]. Once `token` is cancelled it must stop
    /// producing and cancel the command on the device.
    fn execute_async(&self, events: EventSender, token: CancellationToken)
    -> Result<(), ExecutorError>;
}
