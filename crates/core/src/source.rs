//! Tabular input: a CSV file with a header row.
//!
//! Columns are chosen by header name or, when no header matches and the
//! selector is a number, by zero-based position.

use std::fmt;
use std::io::Read;
use std::ops::Range;
use std::path::PathBuf;

use crate::record::RawRecord;

/// Failure to read the input table or find its columns. Fatal to the run.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The file could not be read.
    #[error("cannot open {}: {source}", path.display())]
    Io {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The CSV data is malformed.
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The input has no header row.
    #[error("input has no header row")]
    MissingHeader,

    /// A column selector matches no header and no valid position.
    #[error("no column {selector} (available: {})", available.join(", "))]
    UnknownColumn {
        /// The selector as given.
        selector: String,
        /// Header names of the table.
        available: Vec<String>,
    },
}

/// How one column is picked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnSelector {
    /// Header name; falls back to a position if it parses as one and no
    /// header carries that name.
    Name(String),
    /// Zero-based position.
    Index(usize),
}

impl From<&str> for ColumnSelector {
    fn from(s: &str) -> Self {
        ColumnSelector::Name(s.to_string())
    }
}

impl From<String> for ColumnSelector {
    fn from(s: String) -> Self {
        ColumnSelector::Name(s)
    }
}

impl From<usize> for ColumnSelector {
    fn from(i: usize) -> Self {
        ColumnSelector::Index(i)
    }
}

impl fmt::Display for ColumnSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSelector::Name(name) => write!(f, "{name:?}"),
            ColumnSelector::Index(i) => write!(f, "#{i}"),
        }
    }
}

/// The three columns a sheet reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelection {
    /// Barcode / SKU column.
    pub code: ColumnSelector,
    /// Product name column.
    pub name: ColumnSelector,
    /// Price column.
    pub price: ColumnSelector,
}

impl ColumnSelection {
    /// Build a selection from anything convertible to a selector.
    pub fn new(
        code: impl Into<ColumnSelector>,
        name: impl Into<ColumnSelector>,
        price: impl Into<ColumnSelector>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            price: price.into(),
        }
    }
}

/// A fully read table. Every row has exactly `headers().len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    spans: Vec<Range<usize>>,
}

impl Table {
    /// Header names in column order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows, header excluded.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// `true` when there are no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Byte range of data row `row` in the input, line terminator included.
    pub fn row_span(&self, row: usize) -> Option<Range<usize>> {
        self.spans.get(row).cloned()
    }

    /// The first `n` data rows.
    pub fn preview(&self, n: usize) -> &[Vec<String>] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Position of the column `selector` names.
    pub fn resolve(&self, selector: &ColumnSelector) -> Result<usize, SourceError> {
        let found = match selector {
            ColumnSelector::Name(name) => self
                .headers
                .iter()
                .position(|h| h == name)
                .or_else(|| name.trim().parse::<usize>().ok())
                .filter(|&i| i < self.headers.len()),
            ColumnSelector::Index(i) => Some(*i).filter(|&i| i < self.headers.len()),
        };
        found.ok_or_else(|| SourceError::UnknownColumn {
            selector: selector.to_string(),
            available: self.headers.clone(),
        })
    }

    /// Extract one [`RawRecord`] per data row, in file order.
    pub fn records(&self, selection: &ColumnSelection) -> Result<Vec<RawRecord>, SourceError> {
        let code = self.resolve(&selection.code)?;
        let name = self.resolve(&selection.name)?;
        let price = self.resolve(&selection.price)?;
        Ok(self
            .rows
            .iter()
            .map(|row| RawRecord::new(row[code].clone(), row[name].clone(), row[price].clone()))
            .collect())
    }
}

/// Read a whole CSV table from `reader`.
///
/// A leading byte-order mark is ignored. Short rows are padded with empty
/// cells and extra cells are dropped.
pub fn read_table<R: Read>(mut reader: R) -> Result<Table, SourceError> {
    let mut input = Vec::new();
    reader
        .read_to_end(&mut input)
        .map_err(csv::Error::from)?;

    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input.as_slice());
    let mut starts = Vec::new();
    let mut rows = Vec::new();
    let headers = {
        let mut records = csv.records();
        let headers: Vec<String> = match records.next() {
            Some(first) => first?
                .iter()
                .enumerate()
                .map(|(i, h)| {
                    let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
                    h.trim().to_string()
                })
                .collect(),
            None => return Err(SourceError::MissingHeader),
        };
        if headers.iter().all(String::is_empty) {
            return Err(SourceError::MissingHeader);
        }

        for record in records {
            let record = record?;
            let position = record.position().map_or(0, |p| p.byte() as usize);
            starts.push(line_start(&input, position));
            let mut row: Vec<String> =
                record.iter().take(headers.len()).map(str::to_string).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }
        headers
    };

    let spans = starts
        .iter()
        .enumerate()
        .map(|(i, &start)| start..starts.get(i + 1).copied().unwrap_or(input.len()))
        .collect();
    tracing::debug!(columns = headers.len(), rows = rows.len(), "table read");
    Ok(Table {
        headers,
        rows,
        spans,
    })
}

/// First byte at or after `position` that is not part of a line terminator.
///
/// The reader reports a record as starting right after the `\r` of a CRLF
/// pair, so the `\n` has to be stepped over.
fn line_start(input: &[u8], position: usize) -> usize {
    let skipped = input
        .get(position..)
        .map_or(0, |rest| rest.iter().take_while(|&&b| b == b'\r' || b == b'\n').count());
    position + skipped
}
