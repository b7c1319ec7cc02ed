//! Value construction and comparison errors.

use thiserror::Error;

/// Error raised while parsing, constructing, or comparing a typed value.
///
/// Every variant carries enough context (type name, offending input, offset)
/// for the caller to render a precise diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The input does not match the type's grammar.
    #[error("malformed {type_name} '{input}' at offset {offset}: {reason}")]
    Malformed {
        type_name: &'static str,
        input: String,
        offset: usize,
        reason: String,
    },

    /// A syntactically valid field lies outside its legal domain.
    #[error("{type_name} out of range: {reason}")]
    OutOfRange {
        type_name: &'static str,
        reason: String,
    },

    /// A zoned and a floating instant are too close to be ordered.
    #[error("cannot order zoned {zoned} against floating {floating}: within the 14 hour band")]
    AmbiguousComparison { zoned: String, floating: String },
}

impl ValueError {
    /// Builds a malformed-input error pointing at `offset` within `input`.
    pub fn malformed(
        type_name: &'static str,
        input: &str,
        offset: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::Malformed {
            type_name,
            input: input.to_string(),
            offset,
            reason: reason.into(),
        }
    }

    pub fn out_of_range(type_name: &'static str, reason: impl Into<String>) -> Self {
        Self::OutOfRange {
            type_name,
            reason: reason.into(),
        }
    }

    /// Returns the character offset of a malformed-input failure.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Malformed { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

/// Result type for value operations.
pub type Result<T> = std::result::Result<T, ValueError>;
