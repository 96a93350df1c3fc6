use std::fmt;

use crate::record::TrapRecord;

/// Error kind for executor errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport failure (socket closed, read error).
    Io,
    /// Malformed or unexpected response from the device.
    Protocol,
    /// The device answered with a trap row.
    Trap,
}

/// Error returned by all `CommandExecutor` methods.
#[derive(Debug)]
pub struct ExecutorError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ExecutorError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Io, message: msg.into() }
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Protocol, message: msg.into() }
    }

    /// Build a trap error from a trap row, keeping the device message.
    pub fn trap(trap: &TrapRecord) -> Self {
        Self { kind: ErrorKind::Trap, message: trap.message().to_string() }
    }

    /// Add context to the error, preserving the original ErrorKind.
    ///
    /// Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ExecutorError {}

impl From<std::io::Error> for ExecutorError {
    fn from(e: std::io::Error) -> Self {
        Self::io(e.to_string())
    }
}

/// Failed lookup of a mandatory key in a `ResponseRecord`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing mandatory field '{field}' in response to '{command}'")]
pub struct FieldError {
    pub field: String,
    pub command: String,
}

/// A trap row reported by the device, wrapped with the command that caused it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("trap in response to '{command}': {message}")]
pub struct TrapError {
    pub command: String,
    pub category: Option<String>,
    pub message: String,
    /// Raw trap content as received.
    pub record: TrapRecord,
}

impl From<TrapRecord> for TrapError {
    fn from(record: TrapRecord) -> Self {
        Self {
            command: record.command().to_string(),
            category: record.category().map(str::to_string),
            message: record.message().to_string(),
            record,
        }
    }
}
