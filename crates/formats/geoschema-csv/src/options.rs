//! CSV reading options

use geoschema_core_common::{ConfigError, Result};

/// CSV format configuration options
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the CSV file has a header row (default: true)
    pub has_header: bool,
    /// The delimiter character (default: b',')
    pub delimiter: u8,
    /// Maximum number of rows to read for schema inference
    pub schema_infer_max_rec: Option<usize>,
    /// Batch size for reading (default: 8192)
    pub batch_size: usize,
    /// Column holding WKT geometries, if any
    pub geometry_column: Option<String>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            schema_infer_max_rec: Some(1000),
            batch_size: 8192,
            geometry_column: None,
        }
    }
}

impl CsvOptions {
    /// Create new CSV options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the CSV has a header row
    #[must_use]
    pub fn with_has_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Set the delimiter character
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the delimiter from a character, which must be a single ASCII character.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] for non-ASCII delimiters.
    pub fn with_delimiter_char(self, delimiter: char) -> Result<Self> {
        if !delimiter.is_ascii() {
            return Err(ConfigError::InvalidOption {
                option: "delimiter".to_string(),
                message: format!("'{delimiter}' is not a single ASCII character"),
            }
            .into());
        }
        Ok(self.with_delimiter(delimiter as u8))
    }

    /// Set maximum records for schema inference
    #[must_use]
    pub fn with_schema_infer_max_rec(mut self, max_rec: Option<usize>) -> Self {
        self.schema_infer_max_rec = max_rec;
        self
    }

    /// Set batch size for reading
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Designate the column holding WKT geometries
    #[must_use]
    pub fn with_geometry_column(mut self, column: impl Into<String>) -> Self {
        self.geometry_column = Some(column.into());
        self
    }
}
