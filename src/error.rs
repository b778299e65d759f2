use crate::{mode::Mode, TypeDescriptor};

/// Reason an argument list was rejected before aggregation started.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// No argument columns were given.
    EmptyArguments,

    /// Argument at `index` is not an `int`, `float` or `double`.
    NonPrimitiveType {
        /// Position of the offending argument
        index: usize,

        /// Declared type of the offending argument
        actual: TypeDescriptor,
    },

    /// Argument at `index` has a different type than the argument before it.
    TypeMismatch {
        /// Position of the offending argument
        index: usize,

        /// Type of the preceding argument
        expected: TypeDescriptor,

        /// Declared type of the offending argument
        actual: TypeDescriptor,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyArguments => write!(f, "at least one argument is required"),
            Self::NonPrimitiveType { index, actual } => write!(
                f,
                "argument {index} must be double, float or int, but {actual} was passed"
            ),
            Self::TypeMismatch {
                index,
                expected,
                actual,
            } => write!(
                f,
                "argument {index} type {actual:?} is different from preceding arguments, previous type was {expected:?}",
                actual = actual.to_string(),
                expected = expected.to_string(),
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Caller-contract violation on an accumulator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AggregationError {
    /// The accumulator was used before `reset`.
    Uninitialized,

    /// A row or partial state does not have the accumulator's column count.
    ShapeMismatch {
        /// Column count of the accumulator
        expected: usize,

        /// Column count of the input
        actual: usize,
    },

    /// A flat wire buffer could not be read as a partial state.
    MalformedPartial,

    /// The row count would exceed the largest count a partial state can carry.
    CountOverflow,
}

impl std::fmt::Display for AggregationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "accumulator is not initialized"),
            Self::ShapeMismatch { expected, actual } => {
                write!(f, "expected {expected} columns, got {actual}")
            }
            Self::MalformedPartial => write!(f, "MalformedPartial"),
            Self::CountOverflow => write!(f, "row count overflow"),
        }
    }
}

impl std::error::Error for AggregationError {}

/// Error type
#[derive(Debug)]
pub enum Error {
    /// An IO error while encoding or decoding a partial state.
    Io(std::io::Error),

    /// Argument types were rejected.
    Validation(ValidationError),

    /// An accumulator was driven incorrectly.
    Aggregation(AggregationError),

    /// A type name could not be parsed.
    InvalidTypeName(String),

    /// The evaluator's mode does not allow this operation.
    UnsupportedOperation {
        /// Mode of the evaluator
        mode: Mode,

        /// Name of the rejected operation
        operation: &'static str,
    },
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ValidationError> for Error {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<AggregationError> for Error {
    fn from(value: AggregationError) -> Self {
        Self::Aggregation(value)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => {
                write!(f, "{e}",)
            }
            Self::Validation(e) => {
                write!(f, "{e}",)
            }
            Self::Aggregation(e) => {
                write!(f, "{e}",)
            }
            Self::InvalidTypeName(name) => {
                write!(f, "InvalidTypeName({name:?})",)
            }
            Self::UnsupportedOperation { mode, operation } => {
                write!(f, "{operation} is not supported in {mode:?} mode",)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Validation(e) => Some(e),
            Self::Aggregation(e) => Some(e),
            Self::InvalidTypeName(_) | Self::UnsupportedOperation { .. } => None,
        }
    }
}

/// Result helper type
pub type Result<T> = std::result::Result<T, Error>;
