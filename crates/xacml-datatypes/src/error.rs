//! Conversion errors.

use thiserror::Error;
use xacml_types::ValueError;

/// Broad classification of a failure, independent of the datatype involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The text does not match the datatype's grammar.
    Malformed,
    /// A field is syntactically valid but outside its domain.
    OutOfRange,
    /// A zoned and a floating instant are too close to order.
    AmbiguousComparison,
    /// The source cannot feed this datatype at all.
    UnsupportedSource,
}

impl ErrorKind {
    /// Classifies a value-level failure.
    pub fn of(err: &ValueError) -> Self {
        match err {
            ValueError::Malformed { .. } => Self::Malformed,
            ValueError::OutOfRange { .. } => Self::OutOfRange,
            ValueError::AmbiguousComparison { .. } => Self::AmbiguousComparison,
        }
    }
}

/// Error type for datatype conversion.
#[derive(Debug, Error)]
pub enum DataTypeError {
    /// The source was turned into text but the text did not parse.
    #[error("cannot convert {source_type} '{source_text}' to {data_type}: {cause}")]
    Conversion {
        data_type: String,
        source_type: &'static str,
        source_text: String,
        #[source]
        cause: ValueError,
    },

    /// The source has no textual form this datatype accepts.
    #[error("{data_type} cannot be built from a {source_type} source")]
    UnsupportedSource {
        data_type: String,
        source_type: &'static str,
    },

    /// A typed value was handed to a datatype of another type.
    #[error("{value_type} value does not belong to {data_type}")]
    ValueMismatch {
        data_type: String,
        value_type: &'static str,
    },

    /// Two values of an ordered datatype could not be ordered.
    #[error("cannot order {data_type} values: {cause}")]
    Comparison {
        data_type: String,
        #[source]
        cause: ValueError,
    },

    /// No datatype is registered under the identifier.
    #[error("unknown data type: {0}")]
    UnknownDataType(String),
}

impl DataTypeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Conversion { cause, .. } | Self::Comparison { cause, .. } => ErrorKind::of(cause),
            Self::UnsupportedSource { .. }
            | Self::ValueMismatch { .. }
            | Self::UnknownDataType(_) => ErrorKind::UnsupportedSource,
        }
    }

    /// The underlying value error, for conversion and comparison failures.
    pub fn cause(&self) -> Option<&ValueError> {
        match self {
            Self::Conversion { cause, .. } | Self::Comparison { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

/// Result type for datatype operations.
pub type Result<T> = std::result::Result<T, DataTypeError>;
