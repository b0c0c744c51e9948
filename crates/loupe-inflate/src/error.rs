//! Inflate error types.

use thiserror::Error;

/// Errors that can occur while inflating a stored object.
///
/// Every variant is terminal: the session is torn down and no partial
/// output is returned.
#[derive(Debug, Error)]
pub enum InflateError {
    /// The decompressor context could not be set up.
    #[error("inflate init error: {0}")]
    Init(String),

    /// The source could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source ended before the stream signalled completion.
    #[error("truncated stream: source exhausted after {consumed} compressed bytes")]
    Truncated {
        /// Compressed bytes consumed before the source ran dry.
        consumed: u64,
    },

    /// The stream requires a preset dictionary.
    #[error("inflate error: need dictionary (adler32 {adler:#010x})")]
    NeedDictionary {
        /// Checksum of the dictionary the stream asks for.
        adler: u32,
    },

    /// The stream is not valid zlib/deflate data.
    #[error("inflate error: data error at compressed offset {offset}: {message}")]
    DataCorruption {
        /// Compressed bytes consumed when the fault was reported.
        offset: u64,
        /// Message reported by the decompressor.
        message: String,
    },

    /// The output sink could not grow.
    #[error("inflate error: memory error: {0}")]
    Memory(String),

    /// The decompressed object grew past the configured limit.
    #[error("inflated output exceeds limit of {limit} bytes")]
    OutputLimit {
        /// Configured maximum output size.
        limit: usize,
    },
}

impl InflateError {
    /// Returns true if the error was raised by the stream contents rather
    /// than by the source or the environment.
    pub fn is_stream_fault(&self) -> bool {
        matches!(
            self,
            Self::Truncated { .. } | Self::NeedDictionary { .. } | Self::DataCorruption { .. }
        )
    }
}
