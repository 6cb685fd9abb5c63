use alloc::string::{String, ToString};
use core::fmt;
use neurosig_core::Error;

/// Validation errors raised at kernel construction or adapter binding time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required input or configuration field is empty.
    EmptyInput {
        /// Name of the argument that is empty.
        arg: &'static str,
    },
    /// A configuration argument value is invalid.
    InvalidArgument {
        /// Name of the argument.
        arg: &'static str,
        /// Human readable reason, quoting the rejected value.
        reason: String,
    },
    /// A contiguous 1D slice view could not be obtained.
    NonContiguous {
        /// Name of the argument that is non-contiguous.
        arg: &'static str,
    },
    /// Output/input lengths did not match required shape.
    LengthMismatch {
        /// Name of the argument.
        arg: &'static str,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
}

impl ConfigError {
    pub(crate) fn invalid(arg: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyInput { arg } => write!(f, "Input `{arg}` was empty."),
            ConfigError::InvalidArgument { arg, reason } => {
                write!(f, "Invalid argument `{arg}`: {reason}")
            }
            ConfigError::NonContiguous { arg } => {
                write!(f, "Argument `{arg}` is not contiguous in memory.")
            }
            ConfigError::LengthMismatch { arg, expected, got } => {
                write!(
                    f,
                    "Length mismatch on `{arg}`. Expected {expected}, got {got}."
                )
            }
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(value: ConfigError) -> Self {
        match value {
            ConfigError::EmptyInput { arg } => Error::invalid_arg(arg, "input was empty"),
            ConfigError::InvalidArgument { arg, reason } => Error::invalid_arg(arg, reason),
            ConfigError::NonContiguous { arg } => {
                Error::invalid_arg(arg, "array is not contiguous in memory")
            }
            ConfigError::LengthMismatch { arg, expected, got } => Error::invalid_arg(
                arg,
                alloc::format!("expected length {expected}, got {got}"),
            ),
        }
    }
}

/// Runtime execution invariant violations for checked kernel entrypoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecInvariantViolation {
    /// An execution precondition was violated.
    InvalidState {
        /// Human readable reason.
        reason: &'static str,
    },
    /// Output length mismatched the expected runtime shape.
    LengthMismatch {
        /// Name of the argument.
        arg: &'static str,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
    /// Adapter binding/configuration failure.
    Config(ConfigError),
    /// The underlying numeric routine failed.
    Numeric(Error),
}

impl From<ConfigError> for ExecInvariantViolation {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<Error> for ExecInvariantViolation {
    fn from(value: Error) -> Self {
        Self::Numeric(value)
    }
}

impl From<ExecInvariantViolation> for Error {
    fn from(value: ExecInvariantViolation) -> Self {
        match value {
            ExecInvariantViolation::Config(err) => err.into(),
            ExecInvariantViolation::Numeric(err) => err,
            other => Error::ExecInvariantViolation {
                reason: other.to_string(),
            },
        }
    }
}

impl fmt::Display for ExecInvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecInvariantViolation::InvalidState { reason } => {
                write!(f, "Execution invariant violation: {reason}")
            }
            ExecInvariantViolation::LengthMismatch { arg, expected, got } => {
                write!(
                    f,
                    "Execution length mismatch on `{arg}`. Expected {expected}, got {got}."
                )
            }
            ExecInvariantViolation::Config(err) => write!(f, "{err}"),
            ExecInvariantViolation::Numeric(err) => write!(f, "{err}"),
        }
    }
}

impl core::error::Error for ExecInvariantViolation {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_keep_their_argument_name() {
        let err: Error = ConfigError::invalid("order", "must be >= 1, got 0").into();
        assert_eq!(err, Error::invalid_arg("order", "must be >= 1, got 0"));

        let err: Error =
            ExecInvariantViolation::Config(ConfigError::EmptyInput { arg: "x" }).into();
        assert!(matches!(err, Error::InvalidArg { ref arg, .. } if arg == "x"));
    }

    #[test]
    fn numeric_errors_pass_through() {
        let inner = Error::design_failure("pole outside the unit circle");
        let err: Error = ExecInvariantViolation::from(inner.clone()).into();
        assert_eq!(err, inner);
    }

    #[test]
    fn runtime_violations_become_exec_errors() {
        let err: Error = ExecInvariantViolation::LengthMismatch {
            arg: "out",
            expected: 4,
            got: 3,
        }
        .into();
        assert!(matches!(err, Error::ExecInvariantViolation { .. }));
    }
}
