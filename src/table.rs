//! Row-oriented CSV loading, streaming and writing.
//!
//! Every file this crate touches is a flat table of strings: Open Images
//! ships comma-separated files with a header row, YFCC100M ships
//! header-less tab-separated files with a fixed column layout. A [`Row`]
//! keeps its values in file order and shares its column names with every
//! other row of the same file through an `Arc<Schema>`.
//!
//! # Ragged records
//!
//! A record with fewer fields than the schema is padded with empty strings.
//! A record with more fields than the schema is an error, since there is no
//! column name to file the extra values under.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::OistatsError;

// ============================================================================
// Schema and rows
// ============================================================================

/// Ordered column names of one file, with a name lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Builds a schema. If a name repeats, lookups resolve to its last position.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { columns, index }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column, if present.
    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    /// Position of a column, or [`OistatsError::MissingColumn`] naming `path`.
    pub fn require(&self, column: &str, path: &Path) -> Result<usize, OistatsError> {
        self.position(column)
            .ok_or_else(|| OistatsError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            })
    }
}

/// One record: values in schema order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    schema: Arc<Schema>,
    values: Vec<String>,
}

impl Row {
    /// Creates a row, padding missing trailing values with empty strings.
    ///
    /// Returns `None` if there are more values than columns.
    pub fn new(schema: Arc<Schema>, mut values: Vec<String>) -> Option<Self> {
        if values.len() > schema.len() {
            return None;
        }
        values.resize(schema.len(), String::new());
        Some(Self { schema, values })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }

    /// Value of a named column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.schema
            .position(column)
            .map(|i| self.values[i].as_str())
    }

    /// `(column, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.schema
            .columns()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }
}

/// A fully loaded file.
#[derive(Clone, Debug)]
pub struct Table {
    pub schema: Arc<Schema>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// Reading
// ============================================================================

/// Where a file's column names come from.
#[derive(Clone, Copy, Debug)]
pub enum Header<'a> {
    /// The first record is the header row.
    FirstRow,
    /// The file has no header row; these are its columns.
    Given(&'a [&'a str]),
}

/// Dialect of a delimited file.
#[derive(Clone, Copy, Debug)]
pub struct CsvFormat<'a> {
    pub delimiter: u8,
    pub quoting: bool,
    pub header: Header<'a>,
}

impl CsvFormat<'static> {
    /// Comma-separated with a header row.
    pub const CSV: CsvFormat<'static> = CsvFormat {
        delimiter: b',',
        quoting: true,
        header: Header::FirstRow,
    };
}

impl<'a> CsvFormat<'a> {
    /// Comma-separated without a header row.
    pub fn headerless(columns: &'a [&'a str]) -> Self {
        CsvFormat {
            delimiter: b',',
            quoting: true,
            header: Header::Given(columns),
        }
    }

    /// Tab-separated, unquoted, without a header row.
    pub fn tsv(columns: &'a [&'a str]) -> Self {
        CsvFormat {
            delimiter: b'\t',
            quoting: false,
            header: Header::Given(columns),
        }
    }
}

/// Streams the rows of a delimited file one record at a time.
pub struct RowStream<R> {
    path: PathBuf,
    schema: Arc<Schema>,
    reader: csv::Reader<R>,
    record: csv::StringRecord,
}

impl<R: Read> RowStream<R> {
    fn new(reader: R, format: CsvFormat<'_>, path: &Path) -> Result<Self, OistatsError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(format.delimiter)
            .quoting(format.quoting)
            .has_headers(matches!(format.header, Header::FirstRow))
            .flexible(true)
            .from_reader(reader);

        let schema = match format.header {
            Header::FirstRow => {
                let headers = reader.headers().map_err(|source| OistatsError::CsvParse {
                    path: path.to_path_buf(),
                    source,
                })?;
                Schema::new(headers.iter())
            }
            Header::Given(columns) => Schema::new(columns.iter().copied()),
        };

        Ok(Self {
            path: path.to_path_buf(),
            schema: Arc::new(schema),
            reader,
            record: csv::StringRecord::new(),
        })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn next_row(&mut self) -> Result<Option<Row>, OistatsError> {
        let more = self
            .reader
            .read_record(&mut self.record)
            .map_err(|source| OistatsError::CsvParse {
                path: self.path.clone(),
                source,
            })?;
        if !more {
            return Ok(None);
        }

        let values: Vec<String> = self.record.iter().map(str::to_string).collect();
        let found = values.len();
        Row::new(Arc::clone(&self.schema), values)
            .map(Some)
            .ok_or_else(|| OistatsError::RowWidth {
                path: self.path.clone(),
                line: self.record.position().map_or(0, |p| p.line()),
                expected: self.schema.len(),
                found,
            })
    }

    /// Line number of the most recently read record.
    pub fn line(&self) -> u64 {
        self.record.position().map_or(0, |p| p.line())
    }
}

impl<R: Read> Iterator for RowStream<R> {
    type Item = Result<Row, OistatsError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}

/// Opens a file for streaming.
pub fn open_rows(
    path: &Path,
    format: CsvFormat<'_>,
) -> Result<RowStream<BufReader<File>>, OistatsError> {
    let file = File::open(path).map_err(|source| OistatsError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;
    RowStream::new(BufReader::new(file), format, path)
}

/// Streams rows from in-memory bytes.
///
/// Useful for testing and fuzzing without file I/O.
pub fn rows_from_slice<'b>(
    bytes: &'b [u8],
    format: CsvFormat<'_>,
) -> Result<RowStream<&'b [u8]>, OistatsError> {
    RowStream::new(bytes, format, Path::new("<bytes>"))
}

/// Loads a whole file into memory.
pub fn read_table(path: &Path, format: CsvFormat<'_>) -> Result<Table, OistatsError> {
    collect_table(open_rows(path, format)?)
}

/// Loads a table from a CSV string with a header row.
pub fn from_csv_str(csv_str: &str) -> Result<Table, OistatsError> {
    collect_table(rows_from_slice(csv_str.as_bytes(), CsvFormat::CSV)?)
}

fn collect_table<R: Read>(stream: RowStream<R>) -> Result<Table, OistatsError> {
    let schema = Arc::clone(stream.schema());
    let rows = stream.collect::<Result<Vec<_>, _>>()?;
    Ok(Table { schema, rows })
}

// ============================================================================
// Writing
// ============================================================================

/// Writes a comma-separated file: `columns` as the header, then `rows`.
pub fn write_csv<'r, I>(path: &Path, columns: &[String], rows: I) -> Result<(), OistatsError>
where
    I: IntoIterator<Item = &'r [String]>,
{
    let file = File::create(path).map_err(OistatsError::Io)?;
    let writer = BufWriter::new(file);
    let writer = write_records(writer, columns, rows, path)?;
    writer.into_inner().map_err(|e| OistatsError::Io(e.into_error()))?;
    Ok(())
}

/// Renders a comma-separated table as a string.
///
/// Useful for testing without file I/O.
pub fn to_csv_string<'r, I>(columns: &[String], rows: I) -> Result<String, OistatsError>
where
    I: IntoIterator<Item = &'r [String]>,
{
    let bytes = write_records(Vec::new(), columns, rows, Path::new("<string>"))?;
    String::from_utf8(bytes).map_err(|e| {
        OistatsError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

fn write_records<'r, W, I>(
    writer: W,
    columns: &[String],
    rows: I,
    path: &Path,
) -> Result<W, OistatsError>
where
    W: Write,
    I: IntoIterator<Item = &'r [String]>,
{
    let write_err = |source| OistatsError::CsvWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut csv_writer = csv::WriterBuilder::new().flexible(false).from_writer(writer);
    csv_writer.write_record(columns).map_err(write_err)?;
    for row in rows {
        csv_writer.write_record(row).map_err(write_err)?;
    }
    csv_writer.flush().map_err(OistatsError::Io)?;

    csv_writer
        .into_inner()
        .map_err(|e| OistatsError::Io(e.into_error()))
}

// ============================================================================
// Tests
// ============================================================================
