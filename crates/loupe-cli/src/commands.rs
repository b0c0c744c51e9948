//! CLI command implementations.

use loupe_inflate::{inflate_path_with, InflateConfig, InflateError};
use loupe_tree::{parse_tree, parse_tree_object, EntryKind, ObjectId, TreeEntry, TreeError};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// CLI errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Inflate(#[from] InflateError),

    #[error("{0}")]
    Tree(#[from] TreeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;

/// How tree listings are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ListFormat {
    /// `<mode> <kind> <id>\t<path>` per line.
    Text,
    /// A JSON array of entries.
    Json,
}

/// JSON view of a tree entry.
#[derive(Debug, Serialize)]
struct EntryView {
    mode: String,
    kind: EntryKind,
    id: ObjectId,
    path: String,
}

impl From<&TreeEntry> for EntryView {
    fn from(entry: &TreeEntry) -> Self {
        Self {
            mode: entry.mode.to_string(),
            kind: entry.mode.kind(),
            id: entry.id,
            path: entry.path_lossy().into_owned(),
        }
    }
}

/// Inflate one stored object and write its raw bytes to `out`.
pub fn inflate(path: &Path, config: &InflateConfig, out: &mut impl Write) -> Result<()> {
    tracing::info!(path = %path.display(), "Inflating object");

    let data = inflate_path_with(path, config)?;
    out.write_all(&data)?;
    out.flush()?;

    tracing::debug!(bytes = data.len(), "Object written");
    Ok(())
}

/// Inflate one stored object into the file at `output`.
///
/// The file is only created once the object has inflated successfully.
pub fn inflate_to_file(path: &Path, config: &InflateConfig, output: &Path) -> Result<()> {
    tracing::info!(path = %path.display(), output = %output.display(), "Inflating object");

    let data = inflate_path_with(path, config)?;
    std::fs::write(output, &data)?;

    tracing::debug!(bytes = data.len(), "Object written");
    Ok(())
}

/// List the entries of a stored tree object.
///
/// With `raw`, the inflated bytes are treated as a bare tree body with no
/// object header.
pub fn ls_tree(
    path: &Path,
    raw: bool,
    format: ListFormat,
    config: &InflateConfig,
    out: &mut impl Write,
) -> Result<()> {
    tracing::info!(path = %path.display(), raw, "Listing tree object");

    let data = inflate_path_with(path, config)?;
    let entries = if raw {
        parse_tree(data)?
    } else {
        parse_tree_object(data)?
    };

    print_entries(&entries, format, out)
}

/// List the entries of an already inflated tree body.
pub fn parse_tree_file(path: &Path, format: ListFormat, out: &mut impl Write) -> Result<()> {
    tracing::info!(path = %path.display(), "Parsing tree body");

    let data = std::fs::read(path)?;
    let entries = parse_tree(data)?;

    print_entries(&entries, format, out)
}

fn print_entries(entries: &[TreeEntry], format: ListFormat, out: &mut impl Write) -> Result<()> {
    match format {
        ListFormat::Text => {
            for entry in entries {
                writeln!(
                    out,
                    "{} {} {}\t{}",
                    entry.mode,
                    entry.mode.kind().as_str(),
                    entry.id,
                    entry.path_lossy()
                )?;
            }
        }
        ListFormat::Json => {
            let views: Vec<EntryView> = entries.iter().map(EntryView::from).collect();
            serde_json::to_writer_pretty(&mut *out, &views)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}
