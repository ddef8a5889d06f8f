use std::str::FromStr;

use gallery_core::ManifestRow;

use crate::ManifestError;

/// Column layout written on save. The header is always rewritten in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManifestSchema {
    /// `venue,moment,file,tag,published,sort`
    #[default]
    Catalog,
    /// `venue,category,filename,tags`
    Thumbnails,
}

const CATALOG_HEADER: &[&str] = &["venue", "moment", "file", "tag", "published", "sort"];
const THUMBNAILS_HEADER: &[&str] = &["venue", "category", "filename", "tags"];

impl ManifestSchema {
    pub fn header(self) -> &'static [&'static str] {
        match self {
            ManifestSchema::Catalog => CATALOG_HEADER,
            ManifestSchema::Thumbnails => THUMBNAILS_HEADER,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ManifestSchema::Catalog => "catalog",
            ManifestSchema::Thumbnails => "thumbnails",
        }
    }

    fn cells(self, row: &ManifestRow) -> Vec<&str> {
        match self {
            ManifestSchema::Catalog => vec![
                row.venue.as_str(),
                row.moment.as_str(),
                row.file.as_str(),
                row.tag.as_str(),
                if row.published { "true" } else { "false" },
                row.sort.as_str(),
            ],
            ManifestSchema::Thumbnails => vec![
                row.venue.as_str(),
                row.moment.as_str(),
                row.file.as_str(),
                row.tag.as_str(),
            ],
        }
    }

    /// Canonical manifest text: header line, then one line per row, `\n` terminated.
    pub fn serialize(self, rows: &[ManifestRow]) -> String {
        let mut out = String::with_capacity((rows.len() + 1) * 64);
        out.push_str(&self.header().join(","));
        out.push('\n');
        for row in rows {
            let cells = self.cells(row);
            for (i, cell) in cells.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                push_field(&mut out, cell);
            }
            out.push('\n');
        }
        out
    }
}

impl FromStr for ManifestSchema {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "catalog" => Ok(ManifestSchema::Catalog),
            "thumbnails" | "thumbnail" => Ok(ManifestSchema::Thumbnails),
            _ => Err(ManifestError::UnknownSchema(s.to_string())),
        }
    }
}

fn push_field(out: &mut String, value: &str) {
    let needs_quotes = value.contains([',', '"', '\n', '\r']);
    if !needs_quotes {
        out.push_str(value);
        return;
    }
    out.push('"');
    out.push_str(&value.replace('"', "\"\""));
    out.push('"');
}
