use std::fmt;

pub mod testing;

/// Main error type for the txbatch scheduler
#[derive(Debug, Clone, PartialEq)]
pub enum TxBatchError {
    /// Caller passed an argument that fails validation (empty parameter
    /// name, blank identity string)
    InvalidArgument {
        what: String,
        reason: String,
    },

    /// Mutation or re-submission attempted after the collector transitioned
    /// to `Processed`. Signals a caller/ordering bug, never retried.
    AlreadyProcessed {
        operation: &'static str,
    },

    /// The external queue rejected the built workpackage
    QueueSubmissionFailed {
        use_case: String,
        reason: String,
    },

    /// The external transaction manager refused the commit-hook registration
    HookRegistrationFailed {
        transaction: String,
        reason: String,
    },

    /// Snapshot serialization/deserialization failed
    Serialization {
        message: String,
    },

    /// Internal error (bug in this crate)
    Internal {
        message: String,
        file: &'static str,
        line: u32,
    },
}

impl TxBatchError {
    /// Stable machine-readable code for this error, for log correlation
    /// and host-side dispatch.
    pub fn code(&self) -> &'static str {
        use TxBatchError::*;
        match self {
            InvalidArgument { .. } => "TXB_INVALID_ARGUMENT",
            AlreadyProcessed { .. } => "TXB_ALREADY_PROCESSED",
            QueueSubmissionFailed { .. } => "TXB_QUEUE_SUBMISSION_FAILED",
            HookRegistrationFailed { .. } => "TXB_HOOK_REGISTRATION_FAILED",
            Serialization { .. } => "TXB_SERIALIZATION",
            Internal { .. } => "TXB_INTERNAL",
        }
    }

    /// Create internal error with file/line info
    pub fn internal(message: String, file: &'static str, line: u32) -> Self {
        TxBatchError::Internal {
            message,
            file,
            line,
        }
    }

    /// Create an `InvalidArgument` error for a named argument
    pub fn invalid_argument(what: impl Into<String>, reason: impl Into<String>) -> Self {
        TxBatchError::InvalidArgument {
            what: what.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for TxBatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TxBatchError::*;
        match self {
            InvalidArgument { what, reason } => {
                write!(f, "Invalid argument '{what}': {reason}")
            }
            AlreadyProcessed { operation } => {
                write!(
                    f,
                    "Collector already processed: '{operation}' is not allowed after workpackage submission"
                )
            }
            QueueSubmissionFailed { use_case, reason } => {
                write!(f, "Workpackage submission failed for '{use_case}': {reason}")
            }
            HookRegistrationFailed {
                transaction,
                reason,
            } => {
                write!(
                    f,
                    "Commit-hook registration failed for transaction '{transaction}': {reason}"
                )
            }
            Serialization { message } => {
                write!(f, "Serialization error: {message}")
            }
            Internal {
                message,
                file,
                line,
            } => {
                write!(
                    f,
                    "Internal error at {file}:{line}: {message}\nPlease report this bug."
                )
            }
        }
    }
}

impl std::error::Error for TxBatchError {}

/// Result type for txbatch operations
pub type TxBatchResult<T> = Result<T, TxBatchError>;

/// Convert serde_json::Error to TxBatchError
impl From<serde_json::Error> for TxBatchError {
    fn from(e: serde_json::Error) -> Self {
        TxBatchError::Serialization {
            message: format!("JSON serialization error: {e}"),
        }
    }
}

/// Convert bincode::Error to TxBatchError
impl From<bincode::Error> for TxBatchError {
    fn from(e: bincode::Error) -> Self {
        TxBatchError::Serialization {
            message: format!("Binary serialization error: {e}"),
        }
    }
}

/// Convert std::io::Error to TxBatchError
impl From<std::io::Error> for TxBatchError {
    fn from(e: std::io::Error) -> Self {
        TxBatchError::Serialization {
            message: format!("I/O error: {e}"),
        }
    }
}

/// Helper macro for creating internal errors with automatic file/line
#[macro_export]
macro_rules! internal_error {
    ($msg:expr) => {
        $crate::TxBatchError::internal($msg.to_string(), file!(), line!())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::TxBatchError::internal(format!($fmt, $($arg)*), file!(), line!())
    };
}
