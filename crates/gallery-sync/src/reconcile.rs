use std::collections::HashSet;

use gallery_core::{ManifestRow, Validated};
use gallery_manifest::{ManifestFile, ManifestSchema};
use serde::Serialize;
use tracing::{debug, info};

use crate::lister::{key_to_row, list_all_keys, ObjectLister};
use crate::SyncError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub existing_rows: u64,
    pub listed_keys: u64,
    pub skipped_keys: u64,
    pub added_rows: u64,
    pub total_rows: u64,
    pub written: bool,
    pub dry_run: bool,
}

impl ReconcileReport {
    pub fn summary(&self) -> String {
        if self.added_rows == 0 {
            return format!(
                "No new images found ({} existing row(s))",
                self.existing_rows
            );
        }
        if self.dry_run {
            return format!(
                "Would add {} new row(s) (total {}, dry run)",
                self.added_rows, self.total_rows
            );
        }
        format!(
            "Added {} new row(s) (total {})",
            self.added_rows, self.total_rows
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Existing rows, untouched and in their original order, followed by new rows.
    pub rows: Vec<ManifestRow>,
    pub added: usize,
    pub skipped: usize,
}

/// Appends a row for every listed key whose identity is not in the manifest yet.
///
/// Existing rows are authoritative and never modified. Repeated keys in the
/// listing collapse to the first occurrence.
pub fn merge_new_rows(existing: Vec<ManifestRow>, keys: &[String]) -> MergeOutcome {
    let mut seen: HashSet<_> = existing.iter().map(ManifestRow::identity).collect();
    let mut rows = existing;
    let mut added = 0usize;
    let mut skipped = 0usize;

    for key in keys {
        let row = match key_to_row(key) {
            Validated::Keep(row) => row,
            Validated::Skip(reason) => {
                debug!(key = key.as_str(), %reason, "skipping remote key");
                skipped += 1;
                continue;
            }
        };
        if seen.insert(row.identity()) {
            rows.push(row);
            added += 1;
        }
    }

    MergeOutcome {
        rows,
        added,
        skipped,
    }
}

/// Orders by `venue||moment`, then numeric `sort` (empty last), then `file`.
pub fn sort_catalog(rows: &mut [ManifestRow]) {
    rows.sort_by(|a, b| {
        a.group_key()
            .cmp(&b.group_key())
            .then_with(|| a.sort_rank().total_cmp(&b.sort_rank()))
            .then_with(|| a.file.cmp(&b.file))
    });
}

/// Appends manifest rows for bucket objects that are not catalogued yet.
pub struct Reconciler<L> {
    lister: L,
    bucket: String,
    manifest: ManifestFile,
    dry_run: bool,
}

impl<L: ObjectLister> Reconciler<L> {
    pub fn new(lister: L, bucket: impl Into<String>, manifest: ManifestFile) -> Self {
        Self {
            lister,
            bucket: bucket.into(),
            manifest,
            dry_run: false,
        }
    }

    /// Report what would be added without writing the manifest.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Loads, lists, merges and saves. Nothing is written unless every step succeeds
    /// and at least one row was added.
    pub async fn run(&self) -> Result<ReconcileReport, SyncError> {
        let manifest_path = self.manifest.path().display().to_string();
        let existing = self.manifest.load()?;
        let existing_rows = existing.len() as u64;

        info!(
            target: "gallery_sync",
            event = "reconcile_start",
            manifest = manifest_path.as_str(),
            bucket = self.bucket.as_str(),
            existing_rows,
            dry_run = self.dry_run,
            "reconcile starting"
        );

        let keys = list_all_keys(&self.lister, &self.bucket)
            .await
            .map_err(SyncError::Listing)?;
        let listed_keys = keys.len() as u64;

        let MergeOutcome {
            mut rows,
            added,
            skipped,
        } = merge_new_rows(existing, &keys);

        let mut report = ReconcileReport {
            existing_rows,
            listed_keys,
            skipped_keys: skipped as u64,
            added_rows: added as u64,
            total_rows: rows.len() as u64,
            written: false,
            dry_run: self.dry_run,
        };

        if added == 0 {
            info!(
                target: "gallery_sync",
                event = "reconcile_noop",
                manifest = manifest_path.as_str(),
                listed_keys,
                "no new images found"
            );
            return Ok(report);
        }

        if self.dry_run {
            info!(
                target: "gallery_sync",
                event = "reconcile_dry_run",
                manifest = manifest_path.as_str(),
                added_rows = report.added_rows,
                "dry run; manifest not written"
            );
            return Ok(report);
        }

        sort_catalog(&mut rows);
        let bytes = self.manifest.save(&rows, ManifestSchema::Catalog)?;
        report.written = true;

        info!(
            target: "gallery_sync",
            event = "reconcile_complete",
            manifest = manifest_path.as_str(),
            added_rows = report.added_rows,
            skipped_keys = report.skipped_keys,
            total_rows = report.total_rows,
            bytes = bytes as u64,
            "manifest updated"
        );
        Ok(report)
    }
}
