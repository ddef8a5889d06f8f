use crate::ManifestError;

/// Logical manifest columns. Each accepts every historical header name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Venue,
    Moment,
    File,
    Tag,
    Published,
    Sort,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Venue,
        Column::Moment,
        Column::File,
        Column::Tag,
        Column::Published,
        Column::Sort,
    ];

    pub const REQUIRED: [Column; 3] = [Column::Venue, Column::Moment, Column::File];

    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Venue => &["venue"],
            Column::Moment => &["moment", "category"],
            Column::File => &["file", "filename"],
            Column::Tag => &["tag", "tags"],
            Column::Published => &["published"],
            Column::Sort => &["sort"],
        }
    }

    pub fn name(self) -> &'static str {
        self.aliases()[0]
    }

    /// Case-insensitive match of a header cell against every alias.
    pub fn from_header_name(name: &str) -> Option<Column> {
        let name = name.trim().to_ascii_lowercase();
        Column::ALL
            .into_iter()
            .find(|c| c.aliases().iter().any(|a| *a == name))
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Resolves logical columns to cell positions for one manifest file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnResolver {
    indices: [Option<usize>; 6],
}

/// How the first line of a manifest was interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderLayout {
    /// The first line named the columns.
    Named(ColumnResolver),
    /// No known column names: the first line is data, columns are venue, moment, file.
    Positional(ColumnResolver),
}

impl ColumnResolver {
    /// Fixed `venue, moment, file` layout used when no header is recognizable.
    pub fn positional() -> Self {
        let mut indices = [None; 6];
        indices[Column::Venue.slot()] = Some(0);
        indices[Column::Moment.slot()] = Some(1);
        indices[Column::File.slot()] = Some(2);
        Self { indices }
    }

    /// Resolves column positions from a header row.
    ///
    /// A header that recognizes some columns but misses a required one is malformed.
    /// The first occurrence of a column wins when a header repeats it.
    pub fn from_header(cells: &[String]) -> Result<HeaderLayout, ManifestError> {
        let mut indices = [None; 6];
        let mut recognized = 0usize;
        for (i, cell) in cells.iter().enumerate() {
            let Some(col) = Column::from_header_name(cell) else {
                continue;
            };
            let slot = &mut indices[col.slot()];
            if slot.is_none() {
                *slot = Some(i);
                recognized += 1;
            }
        }

        if recognized == 0 {
            return Ok(HeaderLayout::Positional(Self::positional()));
        }

        let missing: Vec<&str> = Column::REQUIRED
            .into_iter()
            .filter(|c| indices[c.slot()].is_none())
            .map(Column::name)
            .collect();
        if !missing.is_empty() {
            return Err(ManifestError::MalformedHeader {
                missing: missing.join(", "),
            });
        }

        Ok(HeaderLayout::Named(Self { indices }))
    }

    pub fn has(&self, col: Column) -> bool {
        self.indices[col.slot()].is_some()
    }

    /// Cell for `col`, or `""` when the column is absent or the row is short.
    pub fn get<'a>(&self, col: Column, cells: &'a [String]) -> &'a str {
        self.indices[col.slot()]
            .and_then(|i| cells.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn venue<'a>(&self, cells: &'a [String]) -> &'a str {
        self.get(Column::Venue, cells)
    }

    pub fn moment<'a>(&self, cells: &'a [String]) -> &'a str {
        self.get(Column::Moment, cells)
    }

    pub fn file<'a>(&self, cells: &'a [String]) -> &'a str {
        self.get(Column::File, cells)
    }

    pub fn tag<'a>(&self, cells: &'a [String]) -> &'a str {
        self.get(Column::Tag, cells)
    }

    /// `None` when the manifest has no `published` column at all.
    pub fn published<'a>(&self, cells: &'a [String]) -> Option<&'a str> {
        self.has(Column::Published)
            .then(|| self.get(Column::Published, cells))
    }

    pub fn sort<'a>(&self, cells: &'a [String]) -> &'a str {
        self.get(Column::Sort, cells)
    }
}
