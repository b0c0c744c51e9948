//! Tree parsing error types.

use crate::ObjectKind;
use thiserror::Error;

/// Errors that can occur while parsing a tree object.
///
/// Offsets are byte positions in the buffer handed to the parser; `entry`
/// is the 1-based index of the entry being read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The buffer ended while reading mode digits.
    #[error("entry {entry}: buffer ends inside mode starting at offset {offset}")]
    TruncatedMode { entry: usize, offset: usize },

    /// An entry did not start with an octal digit.
    #[error("entry {entry}: expected octal mode digit at offset {offset}, found {found:#04x}")]
    MissingModeDigits {
        entry: usize,
        offset: usize,
        found: u8,
    },

    /// The mode does not fit in 32 bits.
    #[error("entry {entry}: mode starting at offset {offset} overflows")]
    ModeOverflow { entry: usize, offset: usize },

    /// The mode was not followed by a single space.
    #[error("entry {entry}: expected space after mode at offset {offset}, found {found:#04x}")]
    MissingSeparator {
        entry: usize,
        offset: usize,
        found: u8,
    },

    /// No NUL byte terminates the path.
    #[error("entry {entry}: path {path:?} at offset {offset} is not NUL-terminated")]
    UnterminatedPath {
        entry: usize,
        offset: usize,
        path: String,
    },

    /// Fewer than 20 bytes follow the path.
    #[error("entry {entry}: reference for {path:?} at offset {offset} has {remaining} of 20 bytes")]
    TruncatedRef {
        entry: usize,
        offset: usize,
        path: String,
        remaining: usize,
    },

    /// The object has no NUL-terminated header.
    #[error("object header is not NUL-terminated")]
    MissingHeaderTerminator,

    /// The object header is not `<kind> <size>`.
    #[error("malformed object header: {0}")]
    MalformedHeader(String),

    /// The declared object size disagrees with the body.
    #[error("object header declares {declared} bytes, body has {actual}")]
    SizeMismatch { declared: usize, actual: usize },

    /// The object is not of the expected kind.
    #[error("expected {expected} object, found {found}")]
    UnexpectedKind {
        expected: ObjectKind,
        found: ObjectKind,
    },
}

impl TreeError {
    /// Returns true if the error means the buffer ended too early.
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            Self::TruncatedMode { .. } | Self::UnterminatedPath { .. } | Self::TruncatedRef { .. }
        )
    }
}
