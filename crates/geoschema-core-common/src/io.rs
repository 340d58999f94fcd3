//! The host data-access contract.
//!
//! A [`DataStore`] is the only thing the inspection and reporting operations
//! talk to. It can describe a dataset, list its fields, and open a forward-only
//! cursor over one or more of its columns.

use crate::error::{DatasetError, Result};
use crate::types::{DatasetDescription, DatasetKind, FieldDescriptor, FieldValue};

/// One row of projected values, in the order the fields were requested.
pub type Row = Vec<FieldValue>;

/// A forward-only, column-projected row reader.
///
/// The cursor owns whatever handle it reads from; dropping it releases that
/// handle, whether the scan finished, stopped early or failed.
pub type RowCursor<'a> = Box<dyn Iterator<Item = Result<Row>> + 'a>;

/// Access to the datasets of one host platform.
pub trait DataStore {
    /// Short name used in log and error messages (e.g. `"Memory"`).
    fn name(&self) -> &str;

    /// Describes the dataset identified by `dataset`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::NotFound`] when the reference does not resolve,
    /// or a format error when the dataset cannot be read.
    fn describe(&self, dataset: &str) -> Result<DatasetDescription>;

    /// Lists the dataset's fields in their stored order.
    ///
    /// # Errors
    ///
    /// Same as [`DataStore::describe`].
    fn list_fields(&self, dataset: &str) -> Result<Vec<FieldDescriptor>>;

    /// Opens a cursor yielding the values of `fields` for every row.
    ///
    /// Field names match case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::FieldNotFound`] for unknown field names, plus the
    /// errors of [`DataStore::describe`]. Failures while iterating are yielded
    /// by the cursor as [`DatasetError::RowRead`].
    fn search_cursor(&self, dataset: &str, fields: &[&str]) -> Result<RowCursor<'_>>;

    /// Creates a new, empty dataset with the given fields.
    ///
    /// # Errors
    ///
    /// The default implementation rejects the request with
    /// [`DatasetError::Unsupported`].
    fn create_table(
        &mut self,
        dataset: &str,
        kind: DatasetKind,
        fields: &[FieldDescriptor],
    ) -> Result<DatasetDescription> {
        let _ = (dataset, kind, fields);
        Err(DatasetError::Unsupported {
            driver: self.name().to_string(),
            operation: "creating datasets".to_string(),
        }
        .into())
    }
}

/// Resolves requested field names to indices into `available`.
///
/// Names match case-insensitively, as field names do on the host platform.
///
/// # Errors
///
/// Returns [`DatasetError::FieldNotFound`] for the first name with no match.
///
/// # Examples
///
/// ```
/// use geoschema_core_common::{FieldDescriptor, FieldType, resolve_field_indices};
///
/// let fields = vec![
///     FieldDescriptor::object_id("OBJECTID"),
///     FieldDescriptor::new("Name", FieldType::String),
/// ];
/// assert_eq!(resolve_field_indices("t", &fields, &["name", "OBJECTID"]).unwrap(), vec![1, 0]);
/// assert!(resolve_field_indices("t", &fields, &["missing"]).is_err());
/// ```
pub fn resolve_field_indices(
    dataset: &str,
    available: &[FieldDescriptor],
    requested: &[&str],
) -> Result<Vec<usize>> {
    requested
        .iter()
        .map(|name| {
            available
                .iter()
                .position(|field| field.name.eq_ignore_ascii_case(name))
                .ok_or_else(|| {
                    DatasetError::FieldNotFound {
                        dataset: dataset.to_string(),
                        field: (*name).to_string(),
                    }
                    .into()
                })
        })
        .collect()
}
