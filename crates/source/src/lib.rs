//! Record sources for the generator.
//!
//! This crate turns a data file into an ordered list of [`Record`]s and
//! provides the `DataSource` trait the generator pulls records through.
//!
//! ## Available Sources
//!
//! - Delimited text (`.csv` and any other extension): header row mandatory,
//!   configurable delimiter and encoding
//! - Structured records (`.json`): a top-level array of objects
//! - `VecDataSource`: an in-memory list of records
//!
//! ## Example
//!
//! ```ignore
//! use slagen_source::{load_records, DataSource, SourceOptions, VecDataSource};
//!
//! let set = load_records("cards.csv".as_ref(), &SourceOptions::default())?;
//! let mut source = VecDataSource::new(set.records);
//! while let Some(record) = source.next() {
//!     println!("{}", record);
//! }
//! ```

pub mod delimited;
pub mod encoding;
pub mod error;
pub mod json;
pub mod range;

pub use encoding::TextEncoding;
pub use error::SourceError;
pub use range::{RowRange, resolve_range};

use log::{debug, error};
use slagen_types::Record;
use std::path::Path;

/// A source of records, consumed in order.
pub trait DataSource: Send {
    /// Returns the next record, or `None` when the source is exhausted.
    fn next(&mut self) -> Option<Record>;
}

/// A data source backed by an in-memory vector.
pub struct VecDataSource {
    data: Vec<Record>,
    index: usize,
}

impl VecDataSource {
    pub fn new(data: Vec<Record>) -> Self {
        Self { data, index: 0 }
    }
}

impl DataSource for VecDataSource {
    fn next(&mut self) -> Option<Record> {
        let item = self.data.get(self.index).cloned()?;
        self.index += 1;
        Some(item)
    }
}

/// The header and the rows of one data file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    /// Field names in header order.
    pub fields: Vec<String>,
    pub records: Vec<Record>,
}

impl RecordSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keeps only the records selected by `range`.
    pub fn retain_range(&mut self, range: &RowRange) {
        if range.is_full(self.records.len()) {
            return;
        }
        self.records = self.records.drain(range.indices.clone()).collect();
    }
}

/// How a data file is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOptions {
    pub delimiter: char,
    pub encoding: String,
    /// Fail when the file holds no data rows.
    pub require_data_rows: bool,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            encoding: "utf-8".to_string(),
            require_data_rows: true,
        }
    }
}

/// Loads every record of the file at `path`.
///
/// Files ending in `.json` are read as structured records, anything else as
/// delimited text.
pub fn load_records(path: &Path, options: &SourceOptions) -> Result<RecordSet, SourceError> {
    if !path.exists() {
        error!("Data file not found: {}", path.display());
        return Err(SourceError::NotFound(path.to_path_buf()));
    }
    debug!("Parsing data file {}", path.display());

    let encoding: TextEncoding = options.encoding.parse()?;
    let bytes = std::fs::read(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = encoding.decode(&bytes)?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let set = if is_json {
        json::read_json(&text)?
    } else {
        delimited::read_delimited(&text, options.delimiter)?
    };

    if options.require_data_rows && set.records.is_empty() {
        error!(
            "Data file {} has only one line or is empty. Halting.",
            path.display()
        );
        return Err(SourceError::NotEnoughRows(path.to_path_buf()));
    }

    debug!(
        "Loaded {} records with fields {:?} from {}",
        set.records.len(),
        set.fields,
        path.display()
    );
    Ok(set)
}
