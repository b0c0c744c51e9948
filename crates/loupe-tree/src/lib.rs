//! Tree object parsing for loupe.
//!
//! This crate turns the inflated bytes of a stored tree object into an
//! ordered list of entries (mode, path, content reference). It performs
//! no I/O; pair it with `loupe-inflate` to read objects from disk.

mod entry;
mod error;
mod object;
mod parser;

pub use entry::{EntryKind, EntryMode, TreeEntry};
pub use error::TreeError;
pub use object::{ObjectHeader, ObjectId, ObjectKind, OBJECT_ID_LEN};
pub use parser::{parse_tree, parse_tree_object, TreeParser};

/// Result type for tree parsing.
pub type Result<T> = std::result::Result<T, TreeError>;
