#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::expect_used, clippy::unwrap_used))]

pub mod columns;
pub mod fs;
pub mod normalize;
pub mod parse;
pub mod schema;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use columns::{Column, ColumnResolver, HeaderLayout};
pub use fs::ManifestFile;
pub use normalize::{normalize, parse_published, to_thumbnail_name};
pub use parse::{parse, parse_rows, split_line, RawRow};
pub use schema::ManifestSchema;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest header is missing required column(s): {missing}")]
    MalformedHeader { missing: String },
    #[error("unknown manifest schema {0:?} (expected: catalog|thumbnails)")]
    UnknownSchema(String),
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Replaces `path` with `bytes` via a sibling temp file and a rename.
///
/// Readers observe either the old content or the new content, never a prefix.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), std::io::Error> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "bad filename"))?;
    let suffix = format!(
        "tmp.{}.{}",
        std::process::id(),
        gallery_observe::time::unix_time_ms()
    );
    let tmp = parent.join(format!(".{file_name}.{suffix}"));

    let written = write_new_file(&tmp, bytes).and_then(|()| std::fs::rename(&tmp, path));
    if written.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    written
}

fn write_new_file(path: &Path, bytes: &[u8]) -> Result<(), std::io::Error> {
    use std::io::Write;

    let mut f = std::fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(path)?;
    f.write_all(bytes)?;
    f.sync_all()
}
