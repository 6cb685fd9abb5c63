use alloc::string::String;
use core::{error, fmt};

/// Errors raised whilst running neurosig.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Argument passed into a function was invalid.
    InvalidArg {
        /// The invalid arg
        arg: String,
        /// Explaining why arg is invalid, including the offending value.
        reason: String,
    },
    /// Two or more arguments passed into a function conflict.
    ConflictArg {
        /// Explaining what arg is invalid.
        reason: String,
    },
    /// A filter design could not be realised as a stable, finite transfer function.
    DesignFailure {
        /// Why the design was rejected.
        reason: String,
    },
    /// The convolution back-end failed.
    Conv {
        /// Message reported by the back-end.
        reason: String,
    },
    /// Execution was attempted with a violated kernel invariant.
    ExecInvariantViolation {
        /// Why execution could not proceed.
        reason: String,
    },
}

impl Error {
    /// Shorthand for [`Error::InvalidArg`].
    pub fn invalid_arg(arg: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidArg {
            arg: arg.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::DesignFailure`].
    pub fn design_failure(reason: impl Into<String>) -> Self {
        Error::DesignFailure {
            reason: reason.into(),
        }
    }

    /// `true` for errors caused by malformed or out-of-domain inputs.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::InvalidArg { .. } | Error::ConflictArg { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArg { arg, reason } => {
                write!(f, "Invalid argument `{arg}`: {reason}")
            }
            Error::ConflictArg { reason } => write!(f, "Conflicting arguments: {reason}"),
            Error::DesignFailure { reason } => write!(f, "Filter design failure: {reason}"),
            Error::Conv { reason } => write!(f, "Convolution failure: {reason}"),
            Error::ExecInvariantViolation { reason } => {
                write!(f, "Execution invariant violation: {reason}")
            }
        }
    }
}

impl error::Error for Error {}
