//! Fuzz target for loose-object header splitting.
//!
//! Tests that header parsing handles arbitrary input without panicking.

#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok((header, body)) = loupe_tree::ObjectHeader::split(Bytes::copy_from_slice(data)) {
        assert_eq!(header.size, body.len());
    }

    let _ = loupe_tree::parse_tree_object(data.to_vec());
});
