//! Tree entries and their modes.

use crate::ObjectId;
use bytes::Bytes;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// The mode of a tree entry, exactly as accumulated from its octal digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EntryMode(u32);

impl EntryMode {
    pub const TREE: Self = Self(0o040000);
    pub const BLOB: Self = Self(0o100644);
    pub const BLOB_EXECUTABLE: Self = Self(0o100755);
    pub const SYMLINK: Self = Self(0o120000);
    pub const SUBMODULE: Self = Self(0o160000);

    /// Wraps a raw mode value.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw mode value.
    pub fn raw(&self) -> u32 {
        self.0
    }

    /// Classifies the mode by the usual object store convention.
    pub fn kind(&self) -> EntryKind {
        match *self {
            Self::TREE => EntryKind::Tree,
            Self::BLOB => EntryKind::Blob,
            Self::BLOB_EXECUTABLE => EntryKind::Executable,
            Self::SYMLINK => EntryKind::Symlink,
            Self::SUBMODULE => EntryKind::Submodule,
            _ => EntryKind::Unknown,
        }
    }
}

impl fmt::Display for EntryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06o}", self.0)
    }
}

/// What a tree entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Subdirectory.
    Tree,
    /// Regular file.
    Blob,
    /// Executable file.
    Executable,
    /// Symbolic link.
    Symlink,
    /// Submodule commit.
    Submodule,
    /// Any other mode.
    Unknown,
}

impl EntryKind {
    /// Returns the object kind name shown in listings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Blob | Self::Executable | Self::Symlink => "blob",
            Self::Submodule => "commit",
            Self::Unknown => "unknown",
        }
    }
}

/// One directory entry of a tree object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Entry mode.
    pub mode: EntryMode,
    /// Entry name, without the terminating NUL. Not necessarily UTF-8.
    pub path: Bytes,
    /// Content reference.
    pub id: ObjectId,
}

impl TreeEntry {
    /// Returns the path, replacing invalid UTF-8.
    pub fn path_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.path)
    }
}
