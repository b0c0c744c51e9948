//! Fuzz target for tree body parsing.
//!
//! Tests that the tree parser handles arbitrary input without panicking and
//! that every accepted entry is well-formed.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(entries) = loupe_tree::parse_tree(data.to_vec()) {
        for entry in &entries {
            assert!(!entry.path.contains(&0));
            assert_eq!(entry.id.to_hex().len(), 40);
        }
    }
});
