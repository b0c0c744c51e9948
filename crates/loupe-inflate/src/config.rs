//! Inflater configuration.

use crate::{InflateError, Result};
use serde::{Deserialize, Serialize};

/// Default size of the input and output staging buffers.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Configuration for an inflate session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct InflateConfig {
    /// Size of the input staging buffer.
    pub input_chunk: usize,
    /// Size of the output staging buffer.
    pub output_chunk: usize,
    /// Maximum size of the inflated object, if any.
    pub max_output: Option<usize>,
}

impl Default for InflateConfig {
    fn default() -> Self {
        Self {
            input_chunk: DEFAULT_CHUNK_SIZE,
            output_chunk: DEFAULT_CHUNK_SIZE,
            max_output: None,
        }
    }
}

impl InflateConfig {
    /// Uses `size` for both staging buffers.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.input_chunk = size;
        self.output_chunk = size;
        self
    }

    /// Caps the inflated output at `limit` bytes.
    pub fn with_max_output(mut self, limit: usize) -> Self {
        self.max_output = Some(limit);
        self
    }

    /// Checks that the staging buffers are usable.
    pub fn validate(&self) -> Result<()> {
        if self.input_chunk == 0 {
            return Err(InflateError::Init("input chunk size must be non-zero".to_string()));
        }
        if self.output_chunk == 0 {
            return Err(InflateError::Init(
                "output chunk size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
