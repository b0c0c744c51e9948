//! Object identifiers, kinds and the loose-object header.

use crate::{Result, TreeError};
use bytes::Bytes;
use serde::{Serialize, Serializer};
use std::fmt;

/// Length of a binary object identifier.
pub const OBJECT_ID_LEN: usize = 20;

/// Longest header accepted before the terminating NUL.
const MAX_HEADER_LEN: usize = 32;

/// A 20-byte object identifier, rendered as 40 lowercase hex digits.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl Serialize for ObjectId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl ObjectId {
    /// Creates an ObjectId from raw bytes.
    pub fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; OBJECT_ID_LEN] {
        &self.0
    }

    /// Returns the lowercase hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Stored object kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// File content.
    Blob,
    /// Directory listing.
    Tree,
    /// Commit object.
    Commit,
    /// Annotated tag.
    Tag,
}

impl ObjectKind {
    /// Returns the name used in object headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
            Self::Tag => "tag",
        }
    }

    /// Parses an object kind from its header name.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "blob" => Ok(Self::Blob),
            "tree" => Ok(Self::Tree),
            "commit" => Ok(Self::Commit),
            "tag" => Ok(Self::Tag),
            _ => Err(TreeError::MalformedHeader(format!(
                "unknown object kind: {:?}",
                s
            ))),
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `<kind> <size>\0` prefix of an inflated loose object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectHeader {
    /// Declared kind.
    pub kind: ObjectKind,
    /// Declared body length in bytes.
    pub size: usize,
}

impl ObjectHeader {
    /// Splits an inflated object into its header and body.
    ///
    /// The body is a zero-copy slice of `data` and must be exactly as long
    /// as the header declares.
    pub fn split(data: Bytes) -> Result<(Self, Bytes)> {
        let nul = data
            .iter()
            .take(MAX_HEADER_LEN + 1)
            .position(|&b| b == 0)
            .ok_or(TreeError::MissingHeaderTerminator)?;

        let header = std::str::from_utf8(&data[..nul])
            .map_err(|_| TreeError::MalformedHeader("header is not ASCII".to_string()))?;
        let (kind, size) = header
            .split_once(' ')
            .ok_or_else(|| TreeError::MalformedHeader(format!("no space in {:?}", header)))?;

        let kind = ObjectKind::parse(kind)?;
        if size.is_empty() || !size.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TreeError::MalformedHeader(format!("bad size {:?}", size)));
        }
        let size: usize = size
            .parse()
            .map_err(|_| TreeError::MalformedHeader(format!("size out of range: {}", size)))?;

        let body = data.slice(nul + 1..);
        if body.len() != size {
            return Err(TreeError::SizeMismatch {
                declared: size,
                actual: body.len(),
            });
        }

        Ok((Self { kind, size }, body))
    }
}
