#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod dedup;
pub mod lister;
pub mod reconcile;
#[cfg(feature = "s3")]
pub mod s3;

use gallery_manifest::ManifestError;
use thiserror::Error;

pub use config::StorageConfig;
pub use dedup::{dedup_rows, normalize_dedup, NormalizeReport};
pub use lister::{key_to_row, list_all_keys, ListPage, ObjectLister, IMAGE_EXTENSIONS};
pub use reconcile::{merge_new_rows, sort_catalog, MergeOutcome, ReconcileReport, Reconciler};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("missing required storage setting(s): {0}")]
    MissingConfig(String),
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),
    #[error("object listing failed: {0:#}")]
    Listing(anyhow::Error),
}
