use gallery_core::{ManifestRow, SkipReason, Validated};

use crate::parse::RawRow;

/// Trims every field and applies defaults.
///
/// A row read from a manifest with no `published` column is treated as already
/// public. Freshly discovered rows go the other way (see `ManifestRow::discovered`).
pub fn normalize(raw: RawRow) -> Validated<ManifestRow> {
    let row = ManifestRow {
        venue: raw.venue.trim().to_string(),
        moment: raw.moment.trim().to_string(),
        file: raw.file.trim().to_string(),
        tag: raw.tag.trim().to_string(),
        published: parse_published(raw.published.as_deref()),
        sort: raw.sort.trim().to_string(),
    };
    match row.validate() {
        Ok(()) => Validated::Keep(row),
        Err(e) => Validated::Skip(SkipReason::InvalidRow(e)),
    }
}

/// Missing column or blank cell reads as published; otherwise only true-ish values do.
pub fn parse_published(cell: Option<&str>) -> bool {
    let Some(cell) = cell else {
        return true;
    };
    let s = cell.trim().to_ascii_lowercase();
    matches!(s.as_str(), "" | "true" | "1" | "yes" | "y")
}

/// Maps a full-size name `<stem>_2000.<ext>` to its thumbnail `<stem>_500.<ext>`.
///
/// Names that do not end in `_2000.<ext>` are returned unchanged.
pub fn to_thumbnail_name(name: &str) -> String {
    let Some((stem, ext)) = name.rsplit_once('.') else {
        return name.to_string();
    };
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return name.to_string();
    }
    match stem.strip_suffix("_2000") {
        Some(base) => format!("{base}_500.{ext}"),
        None => name.to_string(),
    }
}
