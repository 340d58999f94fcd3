//! Custom error types for `GeoSchema` operations.
//!
//! Every failure is reported as a typed error instead of being logged and
//! swallowed, so callers can tell an empty result from a failed one.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for `GeoSchema` operations.
///
/// It uses `#[error(transparent)]` to delegate display formatting to the
/// underlying error variants.
#[derive(Debug, Error)]
pub enum GeoSchemaError {
    /// Dataset access errors (not found, missing field, unreadable rows)
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// I/O errors (file read/write, path issues, permissions)
    #[error(transparent)]
    Io(#[from] IoError),

    /// Format parsing and validation errors
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while locating or reading a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The dataset reference does not resolve to an existing dataset
    #[error("Dataset '{reference}' not found")]
    NotFound {
        /// The requested dataset reference
        reference: String,
    },

    /// The dataset exists but has no field with the requested name
    #[error("Field '{field}' not found in '{dataset}'")]
    FieldNotFound {
        /// The dataset reference
        dataset: String,
        /// The requested field name
        field: String,
    },

    /// Reading rows through a cursor failed
    #[error("Failed to read rows from '{dataset}': {source}")]
    RowRead {
        /// The dataset reference
        dataset: String,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A dataset with this reference already exists
    #[error("Dataset '{reference}' already exists")]
    AlreadyExists {
        /// The dataset reference
        reference: String,
    },

    /// No registered driver recognises the dataset
    #[error("No driver can open '{reference}'")]
    NoDriver {
        /// The dataset reference
        reference: String,
    },

    /// The driver does not support the requested operation
    #[error("Driver '{driver}' does not support {operation}")]
    Unsupported {
        /// The driver name
        driver: String,
        /// The operation that's not supported (e.g., "creating datasets")
        operation: String,
    },
}

/// I/O related errors.
#[derive(Debug, Error)]
pub enum IoError {
    /// Failed to read from a file
    #[error("Failed to read {format} file '{path}': {source}")]
    Read {
        /// The format being read (e.g., "CSV", "`GeoJSON`")
        format: String,
        /// The file path
        path: PathBuf,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to write to a file
    #[error("Failed to write {format} file '{path}': {source}")]
    Write {
        /// The format being written
        format: String,
        /// The file path
        path: PathBuf,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Path is invalid
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath {
        /// The invalid path
        path: PathBuf,
        /// Why the path is invalid
        reason: String,
    },

    /// File was not found
    #[error("File not found: '{path}'")]
    FileNotFound {
        /// The missing file path
        path: PathBuf,
    },

    /// Permission was denied
    #[error("Permission denied for '{path}'")]
    PermissionDenied {
        /// The path with permission issues
        path: PathBuf,
    },
}

/// A position within a source file, such as a CSV record.
///
/// All indices are 1-based where possible to align with human expectations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePosition {
    /// Line number in the source (1-based)
    pub line: Option<u64>,
    /// Logical record number reported by the parser
    pub record: Option<u64>,
    /// Field index reported by the parser (1-based)
    pub field: Option<u64>,
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [
            self.line.map(|line| format!("line {line}")),
            self.record.map(|record| format!("record {record}")),
            self.field.map(|field| format!("field {field}")),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            write!(f, "unknown position")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// Format parsing and validation errors.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Failed to parse a format
    #[error("Failed to parse {format}{}: {message}", position.as_ref().map(|p| format!(" at {p}")).unwrap_or_default())]
    Parse {
        /// The format being parsed
        format: String,
        /// Where parsing failed (if available)
        position: Option<SourcePosition>,
        /// Description of the parse error
        message: String,
    },

    /// Schema inference failed
    #[error("Schema inference failed for {format}: {reason}")]
    SchemaInference {
        /// The format
        format: String,
        /// Why schema inference failed
        reason: String,
    },

    /// A field type name or report token is not recognised
    #[error("Unknown field type '{token}'")]
    UnknownFieldType {
        /// The unrecognised token
        token: String,
    },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid option value
    #[error("Invalid {option} option: {message}")]
    InvalidOption {
        /// The option name
        option: String,
        /// Why it's invalid
        message: String,
    },
}

/// Type alias for Results using `GeoSchemaError`.
pub type Result<T> = std::result::Result<T, GeoSchemaError>;

impl GeoSchemaError {
    /// Get a user-friendly error message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Dataset(e) => e.user_message(),
            Self::Io(e) => e.user_message(),
            Self::Format(e) => e.to_string(),
            Self::Config(e) => format!("Configuration error: {e}"),
        }
    }

    /// Get recovery suggestions if available.
    #[must_use]
    pub fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::Dataset(e) => e.recovery_suggestion(),
            Self::Io(e) => e.recovery_suggestion(),
            Self::Format(FormatError::UnknownFieldType { .. }) => Some(
                "Schema reports must use the type tokens written by 'geoschema export'."
                    .to_string(),
            ),
            _ => None,
        }
    }

    /// Check if this error is potentially recoverable.
    ///
    /// Recoverable errors might be fixed by retrying with different parameters.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::Dataset(DatasetError::NotFound { .. } | DatasetError::FieldNotFound { .. })
        )
    }
}

impl DatasetError {
    fn user_message(&self) -> String {
        match self {
            Self::RowRead { dataset, .. } => format!("Failed to read rows from {dataset}"),
            _ => self.to_string(),
        }
    }

    fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::NotFound { .. } => Some(
                "Check the dataset path, or set --workspace for relative references.".to_string(),
            ),
            Self::FieldNotFound { .. } => {
                Some("Run 'geoschema fields <DATASET>' to list the available fields.".to_string())
            },
            Self::NoDriver { .. } | Self::Unsupported { .. } => {
                Some("Run 'geoschema drivers' to see supported formats.".to_string())
            },
            Self::RowRead { .. } | Self::AlreadyExists { .. } => None,
        }
    }
}

impl IoError {
    fn user_message(&self) -> String {
        match self {
            Self::Read { format, path, .. } => {
                format!("Failed to read {} file: {}", format, path.display())
            },
            Self::Write { format, path, .. } => {
                format!("Failed to write {} file: {}", format, path.display())
            },
            Self::FileNotFound { path } => {
                format!("File not found: {}", path.display())
            },
            _ => self.to_string(),
        }
    }

    fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::FileNotFound { .. } => {
                Some("Check that the file path is correct and the file exists.".to_string())
            },
            Self::PermissionDenied { .. } => {
                Some("Check file permissions and ensure you have access.".to_string())
            },
            Self::InvalidPath { .. } => {
                Some("Ensure the path is valid and properly formatted.".to_string())
            },
            _ => None,
        }
    }
}

/// Extension trait for adding I/O context to errors.
pub trait IoErrorExt<T> {
    /// Add read context to an error.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::FileNotFound`] or [`IoError::PermissionDenied`] when
    /// the failure comes from a missing or inaccessible file, and
    /// [`IoError::Read`] otherwise.
    fn with_read_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T>;

    /// Add write context to an error.
    ///
    /// # Errors
    ///
    /// Returns an [`IoError::Write`] if the underlying operation fails.
    fn with_write_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T, E> IoErrorExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_read_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| {
            let path = path.into();
            let error = match io_error_kind(&e) {
                Some(io::ErrorKind::NotFound) => IoError::FileNotFound { path },
                Some(io::ErrorKind::PermissionDenied) => IoError::PermissionDenied { path },
                _ => IoError::Read {
                    format: format.to_string(),
                    path,
                    source: Box::new(e),
                },
            };
            GeoSchemaError::Io(error)
        })
    }

    fn with_write_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| {
            GeoSchemaError::Io(IoError::Write {
                format: format.to_string(),
                path: path.into(),
                source: Box::new(e),
            })
        })
    }
}

/// Finds the first [`io::Error`] in an error's source chain.
fn io_error_kind(error: &(dyn std::error::Error + 'static)) -> Option<io::ErrorKind> {
    let mut current = Some(error);
    while let Some(err) = current {
        if let Some(io_error) = err.downcast_ref::<io::Error>() {
            return Some(io_error.kind());
        }
        current = err.source();
    }
    None
}

/// Wraps a cursor failure for `dataset` as [`DatasetError::RowRead`].
pub fn row_read_error<E>(dataset: &str, source: E) -> GeoSchemaError
where
    E: std::error::Error + Send + Sync + 'static,
{
    DatasetError::RowRead {
        dataset: dataset.to_string(),
        source: Box::new(source),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_with_position() {
        let error = FormatError::Parse {
            format: "CSV schema report".to_string(),
            position: Some(SourcePosition {
                line: Some(4),
                field: Some(2),
                ..SourcePosition::default()
            }),
            message: "expected True or False".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Failed to parse CSV schema report at line 4, field 2: expected True or False"
        );
    }

    #[test]
    fn test_parse_error_display_without_position() {
        let error = FormatError::Parse {
            format: "GeoJSON".to_string(),
            position: None,
            message: "No GeoJSON features found".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse GeoJSON: No GeoJSON features found"
        );
    }

    #[test]
    fn test_empty_position_display() {
        assert_eq!(SourcePosition::default().to_string(), "unknown position");
    }

    #[test]
    fn test_field_not_found_is_recoverable() {
        let error: GeoSchemaError = DatasetError::FieldNotFound {
            dataset: "parcels.csv".to_string(),
            field: "OWNER".to_string(),
        }
        .into();

        assert!(error.is_recoverable());
        assert_eq!(
            error.user_message(),
            "Field 'OWNER' not found in 'parcels.csv'"
        );
        assert!(error.recovery_suggestion().unwrap().contains("geoschema fields"));
    }

    #[test]
    fn test_unsupported_suggests_drivers() {
        let error: GeoSchemaError = DatasetError::Unsupported {
            driver: "CSV".to_string(),
            operation: "creating datasets".to_string(),
        }
        .into();

        assert!(!error.is_recoverable());
        assert_eq!(
            error.to_string(),
            "Driver 'CSV' does not support creating datasets"
        );
        assert!(error.recovery_suggestion().unwrap().contains("drivers"));
    }

    #[test]
    fn test_with_write_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        ));
        let err = result.with_write_context("CSV", "/tmp/report.csv").unwrap_err();

        assert!(matches!(err, GeoSchemaError::Io(IoError::Write { .. })));
        assert_eq!(
            err.user_message(),
            "Failed to write CSV file: /tmp/report.csv"
        );
    }

    #[test]
    fn test_read_context_maps_missing_file() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        let err = result.with_read_context("CSV", "/data/absent.csv").unwrap_err();

        assert!(matches!(err, GeoSchemaError::Io(IoError::FileNotFound { .. })));
        assert_eq!(err.user_message(), "File not found: /data/absent.csv");
        assert!(err.recovery_suggestion().unwrap().contains("file exists"));
    }

    #[test]
    fn test_read_context_maps_permission_denied() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "locked",
        ));
        let err = result.with_read_context("GeoJSON", "/data/roads.geojson").unwrap_err();

        assert!(matches!(err, GeoSchemaError::Io(IoError::PermissionDenied { .. })));
        assert!(err.recovery_suggestion().unwrap().contains("permissions"));
    }

    #[test]
    fn test_read_context_keeps_other_failures() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "bad bytes",
        ));
        let err = result.with_read_context("CSV", "/data/towns.csv").unwrap_err();
        assert!(matches!(err, GeoSchemaError::Io(IoError::Read { .. })));
    }

    #[test]
    fn test_row_read_error_keeps_source() {
        let err = row_read_error(
            "roads.geojson",
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated"),
        );
        assert_eq!(
            err.to_string(),
            "Failed to read rows from 'roads.geojson': truncated"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
