//! Error types for construction, encoding and decoding.

use thiserror::Error;

/// Errors returned by [`Pulid`](crate::Pulid) operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PulidError {
    /// The prefix is not exactly two bytes long.
    #[error("bad prefix length: expected 2 bytes, got {len}")]
    PrefixLength { len: usize },

    /// The timestamp does not fit in 48 bits.
    #[error("timestamp {ms} exceeds the 48-bit maximum")]
    TimestampOverflow { ms: u64 },

    /// A date-time before the Unix epoch was given as a timestamp.
    #[error("timestamp {millis} ms is before the Unix epoch")]
    TimestampBeforeEpoch { millis: i64 },

    /// Input to a fixed-size decode or copy has the wrong length.
    #[error("bad data size: expected {expected} bytes, got {actual}")]
    DataSize { expected: usize, actual: usize },

    /// Output buffer has the wrong length.
    #[error("bad buffer size: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    /// Strict decoding met a byte outside the base-32 alphabet.
    #[error("invalid character {byte:#04x} at position {position}")]
    InvalidCharacter { position: usize, byte: u8 },

    /// Strict decoding of a value larger than 128 bits.
    #[error("encoded value overflows 128 bits")]
    Overflow,

    /// The entropy source failed.
    #[error("entropy source: {0}")]
    EntropySource(#[from] EntropyError),

    /// A scan received a value type it cannot convert.
    #[error("cannot scan {kind} into a pulid")]
    UnrecognizedScanInput { kind: &'static str },

    /// A typed identifier was given a different prefix.
    #[error("prefix mismatch: expected '{expected}', got '{actual}'")]
    PrefixMismatch {
        expected: &'static str,
        actual: String,
    },
}

impl PulidError {
    /// Returns true for input or output length mismatches.
    pub fn is_size_error(&self) -> bool {
        matches!(
            self,
            PulidError::DataSize { .. } | PulidError::BufferSize { .. }
        )
    }

    /// Returns true if this error concerns the prefix.
    pub fn is_prefix_error(&self) -> bool {
        matches!(
            self,
            PulidError::PrefixLength { .. } | PulidError::PrefixMismatch { .. }
        )
    }
}

/// Errors produced by an [`EntropySource`](crate::EntropySource).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntropyError {
    /// The monotonic counter cannot be incremented within this millisecond.
    #[error("monotonic entropy overflow")]
    MonotonicOverflow,

    /// The underlying random source reported a failure.
    #[error("random source failed: {message}")]
    Source { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_errors() {
        assert!(PulidError::DataSize {
            expected: 18,
            actual: 3
        }
        .is_size_error());
        assert!(PulidError::BufferSize {
            expected: 28,
            actual: 26
        }
        .is_size_error());
        assert!(!PulidError::Overflow.is_size_error());
    }

    #[test]
    fn test_entropy_error_passes_through() {
        let err: PulidError = EntropyError::MonotonicOverflow.into();
        assert_eq!(
            err,
            PulidError::EntropySource(EntropyError::MonotonicOverflow)
        );
        assert_eq!(
            err.to_string(),
            "entropy source: monotonic entropy overflow"
        );
    }

    #[test]
    fn test_prefix_errors() {
        assert!(PulidError::PrefixLength { len: 3 }.is_prefix_error());
        assert!(PulidError::PrefixMismatch {
            expected: "US",
            actual: "OR".to_string()
        }
        .is_prefix_error());
        assert!(!PulidError::TimestampOverflow { ms: 0 }.is_prefix_error());
    }
}
