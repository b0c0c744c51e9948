//! Fuzz target for zlib inflate.
//!
//! Tests that the inflater handles arbitrary compressed input without
//! panicking, with small staging buffers and a bounded output.

#![no_main]

use libfuzzer_sys::fuzz_target;
use loupe_inflate::{inflate_reader_with, InflateConfig};
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    let config = InflateConfig::default()
        .with_chunk_size(64)
        .with_max_output(1 << 20);

    // Cap output to keep iterations fast on highly compressible input.
    let _ = inflate_reader_with(Cursor::new(data), &config);
});
