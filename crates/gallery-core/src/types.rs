use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A single image in the gallery catalog.
///
/// The second and third columns carry different historical names depending on
/// the manifest schema (`moment`/`category`, `file`/`filename`, `tag`/`tags`);
/// they are one concept here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestRow {
    pub venue: String,
    pub moment: String,
    /// Path below `<venue>/<moment>/`, may contain nested segments.
    pub file: String,
    pub tag: String,
    pub published: bool,
    /// Manual ordering key within a venue+moment group. Empty sorts last.
    pub sort: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ManifestRowError {
    #[error("venue must be non-empty")]
    EmptyVenue,
    #[error("moment must be non-empty")]
    EmptyMoment,
    #[error("file must be non-empty")]
    EmptyFile,
}

impl ManifestRow {
    /// Row for an object found in remote storage but not yet catalogued.
    ///
    /// Discovered rows start unpublished with no tag and no manual sort.
    pub fn discovered(venue: &str, moment: &str, file: &str) -> Self {
        Self {
            venue: venue.trim().to_string(),
            moment: moment.trim().to_string(),
            file: file.trim().to_string(),
            tag: String::new(),
            published: false,
            sort: String::new(),
        }
    }

    pub fn identity(&self) -> IdentityKey {
        IdentityKey::new(&self.venue, &self.moment, &self.file)
    }

    /// Primary ordering key of the catalog: `venue||moment`.
    pub fn group_key(&self) -> String {
        format!("{}||{}", self.venue, self.moment)
    }

    /// Numeric value of `sort`; empty or non-numeric values rank after everything.
    pub fn sort_rank(&self) -> f64 {
        self.sort
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| !v.is_nan())
            .unwrap_or(f64::INFINITY)
    }

    pub fn validate(&self) -> Result<(), ManifestRowError> {
        if self.venue.trim().is_empty() {
            return Err(ManifestRowError::EmptyVenue);
        }
        if self.moment.trim().is_empty() {
            return Err(ManifestRowError::EmptyMoment);
        }
        if self.file.trim().is_empty() {
            return Err(ManifestRowError::EmptyFile);
        }
        Ok(())
    }
}

/// Case-insensitive `(venue, moment, file)` identity of a row.
///
/// Two rows with equal keys describe the same image. The canonical text form
/// is `venue|moment|file`; order keys by that string (see `as_key_string`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    venue: String,
    moment: String,
    file: String,
}

impl IdentityKey {
    pub fn new(venue: &str, moment: &str, file: &str) -> Self {
        Self {
            venue: venue.trim().to_lowercase(),
            moment: moment.trim().to_lowercase(),
            file: file.trim().to_lowercase(),
        }
    }

    pub fn as_key_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.venue, self.moment, self.file)
    }
}

/// Why a manifest row or remote key was excluded.
///
/// Skips are recovered locally by dropping the input; they are not errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("invalid row: {0}")]
    InvalidRow(#[from] ManifestRowError),
    #[error("expected at least 3 path segments, found {segments}")]
    TooFewSegments { segments: usize },
    #[error("key contains {ch:?}, which the manifest cannot store")]
    UnrepresentableKey { ch: char },
    #[error("extension not allowed: {ext:?}")]
    UnsupportedExtension { ext: Option<String> },
}

/// Outcome of validating a single input. Fatal conditions travel in an outer `Result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validated<T> {
    Keep(T),
    Skip(SkipReason),
}

impl<T> Validated<T> {
    pub fn keep(self) -> Option<T> {
        match self {
            Validated::Keep(v) => Some(v),
            Validated::Skip(_) => None,
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, Validated::Keep(_))
    }
}
