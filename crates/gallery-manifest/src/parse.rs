use gallery_core::{ManifestRow, Validated};
use tracing::{debug, warn};

use crate::columns::{ColumnResolver, HeaderLayout};
use crate::normalize::normalize;

/// One data line of a manifest, with cells mapped to logical columns but not yet trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRow {
    pub venue: String,
    pub moment: String,
    pub file: String,
    pub tag: String,
    /// `None` when the manifest has no `published` column.
    pub published: Option<String>,
    pub sort: String,
}

impl RawRow {
    fn from_cells(cols: &ColumnResolver, cells: &[String]) -> Self {
        Self {
            venue: cols.venue(cells).to_string(),
            moment: cols.moment(cells).to_string(),
            file: cols.file(cells).to_string(),
            tag: cols.tag(cells).to_string(),
            published: cols.published(cells).map(str::to_string),
            sort: cols.sort(cells).to_string(),
        }
    }
}

/// Splits one line into cells.
///
/// A `"` toggles quoted mode and is not kept; a comma inside quotes does not split.
/// Doubled quotes are not an escape: `"a""b"` reads as `ab`.
pub fn split_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => cells.push(std::mem::take(&mut cur)),
            _ => cur.push(ch),
        }
    }
    cells.push(cur);
    cells
}

/// Parses manifest text into raw rows.
///
/// Blank text yields no rows. A header that names some columns but not the
/// required ones yields no rows (logged, not an error).
pub fn parse(text: &str) -> Vec<RawRow> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let Some(first) = lines.next() else {
        return Vec::new();
    };
    let first_cells = split_line(first);

    let (cols, first_is_data) = match ColumnResolver::from_header(&first_cells) {
        Ok(HeaderLayout::Named(cols)) => (cols, false),
        Ok(HeaderLayout::Positional(cols)) => (cols, true),
        Err(err) => {
            warn!(error = %err, "unusable manifest header; treating manifest as empty");
            return Vec::new();
        }
    };

    let mut rows = Vec::new();
    if first_is_data {
        rows.push(RawRow::from_cells(&cols, &first_cells));
    }
    for line in lines {
        rows.push(RawRow::from_cells(&cols, &split_line(line)));
    }
    rows
}

/// Parses and normalizes manifest text, dropping rows without venue, moment or file.
pub fn parse_rows(text: &str) -> Vec<ManifestRow> {
    let mut out = Vec::new();
    for (i, raw) in parse(text).into_iter().enumerate() {
        match normalize(raw) {
            Validated::Keep(row) => out.push(row),
            Validated::Skip(reason) => debug!(row = i, %reason, "skipping manifest row"),
        }
    }
    out
}
