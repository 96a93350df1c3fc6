use tikmap_api::error::{ExecutorError, FieldError, TrapError};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A required argument was missing or out of range. Raised before any I/O.
    #[error("invalid argument: {0}")]
    Argument(String),

    #[error("missing mandatory field '{field}' in response to '{command}'")]
    MissingField { field: String, command: String },

    #[error("invalid value '{value}' for field '{field}' in response to '{command}': {reason}")]
    InvalidValue {
        field: String,
        command: String,
        value: String,
        reason: String,
    },

    #[error("expected {expected} row from '{command}', got {actual}")]
    Cardinality {
        command: String,
        expected: &'static str,
        actual: usize,
    },

    /// Device trap delivered on the streaming path.
    #[error(transparent)]
    Trap(#[from] TrapError),

    #[error("stream of '{command}' closed before completion")]
    Disconnected { command: String },

    #[error("executor error: {0}")]
    Executor(#[from] ExecutorError),
}

impl From<FieldError> for LoadError {
    fn from(e: FieldError) -> Self {
        LoadError::MissingField {
            field: e.field,
            command: e.command,
        }
    }
}

impl LoadError {
    pub(crate) fn argument(msg: impl Into<String>) -> Self {
        LoadError::Argument(msg.into())
    }

    /// Add context to the error.
    ///
    /// For `Executor` variant, context is added to the inner `ExecutorError`.
    /// For `Argument`, context is prepended to the message.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            LoadError::Executor(e) => LoadError::Executor(e.with_context(ctx)),
            LoadError::Argument(msg) => LoadError::Argument(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}
