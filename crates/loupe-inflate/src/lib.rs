//! Bounded-memory inflate for stored objects.
//!
//! This crate recovers the raw bytes of one stored object from its
//! zlib-compressed on-disk representation. Input is consumed in fixed-size
//! chunks and drained through a fixed-size output buffer, so only the
//! returned sink grows with the object.

mod config;
mod error;
mod inflate;

pub use config::{InflateConfig, DEFAULT_CHUNK_SIZE};
pub use error::InflateError;
pub use inflate::{inflate_path, inflate_path_with, inflate_reader, inflate_reader_with, Inflater};

/// Result type for inflate operations.
pub type Result<T> = std::result::Result<T, InflateError>;
