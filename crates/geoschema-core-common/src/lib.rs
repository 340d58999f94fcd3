//! Common types and traits shared across `GeoSchema` crates.
//!
//! This crate provides the host data-access contract ([`DataStore`]) and the
//! field, value and dataset types that flow through it. Format crates and
//! `geoschema-core` both depend on it, which prevents circular dependencies.

pub mod arrow;
pub mod drivers;
pub mod error;
pub mod io;
pub mod types;
pub mod workspace;

// Re-export commonly used types
pub use drivers::{Driver, DriverCapabilities, SupportStatus};
pub use error::{
    ConfigError, DatasetError, FormatError, GeoSchemaError, IoError, IoErrorExt, Result,
    SourcePosition, row_read_error,
};
pub use io::{DataStore, Row, RowCursor, resolve_field_indices};
pub use types::{
    DatasetDescription, DatasetKind, FieldDescriptor, FieldType, FieldValue, NULL_TOKEN,
    ShapeType,
};
pub use workspace::{Workspace, WorkspaceGuard};
