use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use gallery_core::ManifestRow;
use gallery_manifest::{to_thumbnail_name, ManifestFile, ManifestSchema};
use serde::Serialize;
use tracing::info;

use crate::SyncError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub rows_before: u64,
    pub rows_after: u64,
}

impl NormalizeReport {
    pub fn summary(&self) -> String {
        format!("Rows: {} -> {}", self.rows_before, self.rows_after)
    }
}

/// Rewrites filenames to thumbnails, drops duplicate identities and sorts by the
/// `venue|moment|file` identity string.
///
/// On collision the first row is kept, except that a tagged row replaces an
/// untagged one.
pub fn dedup_rows(rows: Vec<ManifestRow>) -> Vec<ManifestRow> {
    let mut by_key: BTreeMap<String, ManifestRow> = BTreeMap::new();
    for mut row in rows {
        row.file = to_thumbnail_name(&row.file);
        match by_key.entry(row.identity().as_key_string()) {
            Entry::Vacant(slot) => {
                slot.insert(row);
            }
            Entry::Occupied(mut slot) => {
                if slot.get().tag.is_empty() && !row.tag.is_empty() {
                    slot.insert(row);
                }
            }
        }
    }
    by_key.into_values().collect()
}

/// Cleans up `manifest` in place. The file is always rewritten.
pub fn normalize_dedup(
    manifest: &ManifestFile,
    schema: ManifestSchema,
) -> Result<NormalizeReport, SyncError> {
    let rows = manifest.load()?;
    let rows_before = rows.len() as u64;

    let rows = dedup_rows(rows);
    let bytes = manifest.save(&rows, schema)?;

    let report = NormalizeReport {
        rows_before,
        rows_after: rows.len() as u64,
    };
    info!(
        target: "gallery_sync",
        event = "normalize_complete",
        manifest = %manifest.path().display(),
        schema = schema.as_str(),
        rows_before = report.rows_before,
        rows_after = report.rows_after,
        bytes = bytes as u64,
        "manifest normalized"
    );
    Ok(report)
}
