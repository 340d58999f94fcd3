//! Single-column scans: longest value and distinct values.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use geoschema_core_common::{ConfigError, DataStore, FieldValue, GeoSchemaError, Result};
use log::debug;

/// Character set applied to text values collected by [`get_field_value_set`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Charset {
    /// Drop every non-ASCII character.
    #[default]
    Ascii,
    /// Keep text unchanged.
    Unicode,
}

impl Charset {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Charset::Ascii => "ascii",
            Charset::Unicode => "utf-8",
        }
    }

    /// Applies the charset to one value. Only text values change.
    #[must_use]
    pub fn apply(self, value: FieldValue) -> FieldValue {
        match (self, value) {
            (Charset::Ascii, FieldValue::Text(text)) if !text.is_ascii() => {
                FieldValue::Text(text.chars().filter(char::is_ascii).collect())
            },
            (_, value) => value,
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Charset {
    type Err = GeoSchemaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ascii" => Ok(Charset::Ascii),
            "utf-8" | "utf8" | "unicode" => Ok(Charset::Unicode),
            other => Err(ConfigError::InvalidOption {
                option: "charset".to_string(),
                message: format!("'{other}' is not one of ascii, utf-8, utf8, unicode"),
            }
            .into()),
        }
    }
}

/// Returns the length, in characters, of the longest value in `field`.
///
/// Nulls are skipped and non-text values are measured by their rendered text.
/// An empty column yields `0`.
///
/// # Errors
///
/// Returns the store's error if the dataset or field does not exist or a row
/// cannot be read.
///
/// # Examples
///
/// ```
/// use geoschema_core::fields::get_max_field_value_length;
/// use geoschema_core::store::{MemoryStore, MemoryTable};
/// use geoschema_core_common::{DatasetKind, FieldDescriptor, FieldType, FieldValue};
///
/// let table = MemoryTable::new(
///     DatasetKind::Table,
///     vec![FieldDescriptor::new("NAME", FieldType::String)],
/// )
/// .with_row(["Rhône".into()])
/// .with_row([FieldValue::Null])
/// .with_row(["Loire".into()]);
/// let store = MemoryStore::new().with_table("rivers", table);
///
/// assert_eq!(get_max_field_value_length(&store, "rivers", "NAME")?, 5);
/// # Ok::<(), geoschema_core_common::GeoSchemaError>(())
/// ```
pub fn get_max_field_value_length(
    store: &dyn DataStore,
    dataset: &str,
    field: &str,
) -> Result<usize> {
    let mut length = 0;
    for row in store.search_cursor(dataset, &[field])? {
        if let Some(value_len) = row?.first().and_then(FieldValue::rendered_len) {
            length = length.max(value_len);
        }
    }
    debug!("Longest value of {dataset}.{field}: {length}");
    Ok(length)
}

/// Returns the distinct values of `field`.
///
/// Nulls collapse into a single [`FieldValue::Null`] member. Text values pass
/// through `charset` first, so values differing only in stripped characters
/// merge.
///
/// # Errors
///
/// Returns the store's error if the dataset or field does not exist or a row
/// cannot be read. An empty set always means an empty column.
pub fn get_field_value_set(
    store: &dyn DataStore,
    dataset: &str,
    field: &str,
    charset: Charset,
) -> Result<BTreeSet<FieldValue>> {
    let mut values = BTreeSet::new();
    for row in store.search_cursor(dataset, &[field])? {
        let value = row?.into_iter().next().unwrap_or(FieldValue::Null);
        values.insert(charset.apply(value));
    }
    debug!(
        "{} distinct value(s) in {dataset}.{field} ({charset})",
        values.len()
    );
    Ok(values)
}
