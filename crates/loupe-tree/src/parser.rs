//! Tree object parser.
//!
//! A tree body is a concatenation of entries, each laid out as
//!
//! ```text
//! <octal mode> SP <path> NUL <20-byte id>
//! ```
//!
//! with no separator between entries. Parsing is all-or-nothing: either
//! every byte is consumed into entries, or the first malformed field is
//! reported and nothing else is returned.

use crate::{
    EntryMode, ObjectHeader, ObjectId, ObjectKind, Result, TreeEntry, TreeError, OBJECT_ID_LEN,
};
use bytes::Bytes;

/// Parses a tree body into its entries, in on-disk order.
pub struct TreeParser {
    data: Bytes,
    pos: usize,
    entry: usize,
}

impl TreeParser {
    /// Creates a parser over an inflated tree body.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
            entry: 0,
        }
    }

    /// Parses every entry in the buffer.
    pub fn parse(mut self) -> Result<Vec<TreeEntry>> {
        let mut entries = Vec::new();
        while self.pos < self.data.len() {
            self.entry += 1;
            entries.push(self.parse_entry()?);
        }
        tracing::trace!(entries = entries.len(), bytes = self.data.len(), "parsed tree");
        Ok(entries)
    }

    fn parse_entry(&mut self) -> Result<TreeEntry> {
        let mode = self.read_mode()?;
        self.expect_separator()?;
        let path = self.read_path()?;
        let id = self.read_id(&path)?;
        Ok(TreeEntry { mode, path, id })
    }

    /// Reads one or more octal digits.
    ///
    /// The whole digit run is scanned before overflow is reported, so a
    /// buffer that ends inside the mode is always a truncation.
    fn read_mode(&mut self) -> Result<EntryMode> {
        let start = self.pos;
        let mut mode: Option<u32> = Some(0);

        while let Some(&byte) = self.data.get(self.pos) {
            if !(b'0'..=b'7').contains(&byte) {
                break;
            }
            mode = mode
                .and_then(|m| m.checked_mul(8))
                .map(|m| m | u32::from(byte - b'0'));
            self.pos += 1;
        }

        if self.pos == self.data.len() {
            return Err(TreeError::TruncatedMode {
                entry: self.entry,
                offset: start,
            });
        }
        if self.pos == start {
            return Err(TreeError::MissingModeDigits {
                entry: self.entry,
                offset: start,
                found: self.data[start],
            });
        }

        mode.map(EntryMode::from_raw).ok_or(TreeError::ModeOverflow {
            entry: self.entry,
            offset: start,
        })
    }

    fn expect_separator(&mut self) -> Result<()> {
        // read_mode guarantees a byte at the cursor.
        let found = self.data[self.pos];
        if found != b' ' {
            return Err(TreeError::MissingSeparator {
                entry: self.entry,
                offset: self.pos,
                found,
            });
        }
        self.pos += 1;
        Ok(())
    }

    /// Reads the path up to its NUL and steps past the NUL.
    fn read_path(&mut self) -> Result<Bytes> {
        let start = self.pos;
        let rest = &self.data[start..];
        let len = rest.iter().position(|&b| b == 0).ok_or_else(|| {
            TreeError::UnterminatedPath {
                entry: self.entry,
                offset: start,
                path: String::from_utf8_lossy(rest).into_owned(),
            }
        })?;

        self.pos = start + len + 1;
        Ok(self.data.slice(start..start + len))
    }

    fn read_id(&mut self, path: &Bytes) -> Result<ObjectId> {
        let remaining = self.data.len() - self.pos;
        if remaining < OBJECT_ID_LEN {
            return Err(TreeError::TruncatedRef {
                entry: self.entry,
                offset: self.pos,
                path: String::from_utf8_lossy(path).into_owned(),
                remaining,
            });
        }

        let mut bytes = [0u8; OBJECT_ID_LEN];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + OBJECT_ID_LEN]);
        self.pos += OBJECT_ID_LEN;
        Ok(ObjectId::from_bytes(bytes))
    }
}

/// Parses an inflated tree body.
pub fn parse_tree(data: impl Into<Bytes>) -> Result<Vec<TreeEntry>> {
    TreeParser::new(data).parse()
}

/// Parses an inflated loose object that must be a tree.
pub fn parse_tree_object(data: impl Into<Bytes>) -> Result<Vec<TreeEntry>> {
    let (header, body) = ObjectHeader::split(data.into())?;
    if header.kind != ObjectKind::Tree {
        return Err(TreeError::UnexpectedKind {
            expected: ObjectKind::Tree,
            found: header.kind,
        });
    }
    parse_tree(body)
}
