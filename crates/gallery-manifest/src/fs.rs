use std::path::{Path, PathBuf};

use gallery_core::ManifestRow;
use tracing::debug;

use crate::parse::parse_rows;
use crate::schema::ManifestSchema;
use crate::{write_atomic, ManifestError};

/// The manifest CSV on local disk. Every save rewrites the whole file.
#[derive(Debug, Clone)]
pub struct ManifestFile {
    path: PathBuf,
}

impl ManifestFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current file content, or `None` when the file does not exist.
    pub fn read_text(&self) -> Result<Option<String>, ManifestError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ManifestError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Loads and normalizes every usable row. A missing or blank file is an empty manifest.
    pub fn load(&self) -> Result<Vec<ManifestRow>, ManifestError> {
        let Some(text) = self.read_text()? else {
            debug!(manifest = %self.path.display(), "manifest not found; starting empty");
            return Ok(Vec::new());
        };
        Ok(parse_rows(&text))
    }

    /// Serializes `rows` with `schema` and atomically replaces the file. Returns bytes written.
    pub fn save(&self, rows: &[ManifestRow], schema: ManifestSchema) -> Result<usize, ManifestError> {
        let text = schema.serialize(rows);
        write_atomic(&self.path, text.as_bytes()).map_err(|source| ManifestError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(
            manifest = %self.path.display(),
            rows = rows.len() as u64,
            bytes = text.len() as u64,
            schema = schema.as_str(),
            "manifest saved"
        );
        Ok(text.len())
    }
}
