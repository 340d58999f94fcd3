//! Field-by-field comparison of two dataset schemas.

use std::collections::BTreeSet;
use std::fmt;

use geoschema_core_common::{DataStore, FieldType, Result};
use log::info;

use crate::schema::{FieldDict, FieldDictOptions, KeyCase, make_field_dict};

/// Options for [`compare_schemas`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CompareOptions {
    /// Match field names regardless of case (keys are upper-cased)
    pub case_insensitive: bool,
}

impl CompareOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }
}

/// One of the two compared datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// The part of a field definition the comparison looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSignature {
    pub field_type: FieldType,
    pub length: u32,
}

/// Outcome for one field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldStatus {
    /// The field does not exist in the dataset on side `from`.
    Missing { from: Side },
    /// Type and length agree.
    Same,
    /// The field exists on both sides with different type or length.
    Mismatch {
        left: FieldSignature,
        right: FieldSignature,
    },
}

/// The comparison result for one field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonEntry {
    pub field: String,
    pub status: FieldStatus,
    message: String,
}

impl ComparisonEntry {
    /// Returns `true` unless the field is the same on both sides.
    #[must_use]
    pub fn is_difference(&self) -> bool {
        !matches!(self.status, FieldStatus::Same)
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ComparisonEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Entries for the sorted union of both datasets' field names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaComparison {
    pub left: String,
    pub right: String,
    pub entries: Vec<ComparisonEntry>,
}

impl SchemaComparison {
    /// The missing and mismatched entries, in field order.
    pub fn differences(&self) -> impl Iterator<Item = &ComparisonEntry> {
        self.entries.iter().filter(|entry| entry.is_difference())
    }

    /// Returns `true` if no field is missing or mismatched.
    #[must_use]
    pub fn is_identical(&self) -> bool {
        self.differences().next().is_none()
    }

    /// The rendered message of every entry.
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.entries.iter().map(ComparisonEntry::message).collect()
    }
}

/// Compares two field dictionaries on field type and length.
#[must_use]
pub fn compare_field_dicts(
    left_name: &str,
    left: &FieldDict,
    right_name: &str,
    right: &FieldDict,
) -> SchemaComparison {
    let names: BTreeSet<&String> = left.keys().chain(right.keys()).collect();

    let entries = names
        .into_iter()
        .map(|field| {
            let (status, message) = match (left.get(field), right.get(field)) {
                (None, _) => (
                    FieldStatus::Missing { from: Side::Left },
                    format!(" {field} not found in {left_name}"),
                ),
                (Some(_), None) => (
                    FieldStatus::Missing { from: Side::Right },
                    format!(" {field} not found in {right_name}"),
                ),
                (Some(l), Some(r)) => {
                    let l = FieldSignature {
                        field_type: l.field_type,
                        length: l.length,
                    };
                    let r = FieldSignature {
                        field_type: r.field_type,
                        length: r.length,
                    };
                    if l == r {
                        (FieldStatus::Same, format!(" {field} field same in both"))
                    } else {
                        (
                            FieldStatus::Mismatch { left: l, right: r },
                            format!(
                                " {left_name} {field} {} {} does not exactly match {right_name} {field} {} {}",
                                l.field_type, l.length, r.field_type, r.length
                            ),
                        )
                    }
                },
            };
            info!("{message}");
            ComparisonEntry {
                field: field.clone(),
                status,
                message,
            }
        })
        .collect();

    SchemaComparison {
        left: left_name.to_string(),
        right: right_name.to_string(),
        entries,
    }
}

/// Compares the schemas of two datasets of `store`.
///
/// # Errors
///
/// Returns the store's error if either dataset cannot be described, and
/// [`ConfigError::InvalidOption`](geoschema_core_common::ConfigError::InvalidOption)
/// if `case_insensitive` folds two fields of one dataset onto the same name.
///
/// # Examples
///
/// ```
/// use geoschema_core::compare::{CompareOptions, compare_schemas};
/// use geoschema_core::store::{MemoryStore, MemoryTable};
/// use geoschema_core_common::{DatasetKind, FieldDescriptor, FieldType};
///
/// let old = MemoryTable::new(
///     DatasetKind::Table,
///     vec![FieldDescriptor::new("NAME", FieldType::String).with_length(50)],
/// );
/// let new = MemoryTable::new(
///     DatasetKind::Table,
///     vec![
///         FieldDescriptor::new("NAME", FieldType::String).with_length(80),
///         FieldDescriptor::new("CODE", FieldType::Integer),
///     ],
/// );
/// let store = MemoryStore::new().with_table("old", old).with_table("new", new);
///
/// let comparison = compare_schemas(&store, "old", "new", &CompareOptions::default())?;
/// let differences: Vec<String> = comparison.differences().map(ToString::to_string).collect();
/// assert_eq!(
///     differences,
///     vec![
///         " CODE not found in old",
///         " old NAME String 50 does not exactly match new NAME String 80",
///     ]
/// );
/// # Ok::<(), geoschema_core_common::GeoSchemaError>(())
/// ```
pub fn compare_schemas(
    store: &dyn DataStore,
    left: &str,
    right: &str,
    options: &CompareOptions,
) -> Result<SchemaComparison> {
    let dict_options = FieldDictOptions::new().with_key_case(if options.case_insensitive {
        KeyCase::Upper
    } else {
        KeyCase::AsIs
    });
    let left_dict = make_field_dict(store, left, &dict_options)?;
    let right_dict = make_field_dict(store, right, &dict_options)?;
    Ok(compare_field_dicts(left, &left_dict, right, &right_dict))
}
