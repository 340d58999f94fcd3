//! A dataset handle with cached schema information.

use std::collections::BTreeSet;

use geoschema_core_common::{DataStore, DatasetKind, FieldValue, Result};

use crate::fields::{Charset, get_field_value_set, get_max_field_value_length};
use crate::schema::{FieldDict, FieldDictOptions, FieldSelection, build_field_dict};

/// Caches a dataset's kind, field names and field dictionary.
///
/// The cache is filled on construction and only updated by
/// [`TableObj::refresh`]; value scans always read the store.
pub struct TableObj<'a> {
    store: &'a dyn DataStore,
    path: String,
    kind: DatasetKind,
    fields: Vec<String>,
    non_required_fields: Vec<String>,
    field_dict: FieldDict,
}

impl<'a> TableObj<'a> {
    /// Opens `path` in `store` and caches its schema.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the dataset cannot be described.
    pub fn new(store: &'a dyn DataStore, path: impl Into<String>) -> Result<Self> {
        let mut table = Self {
            store,
            path: path.into(),
            kind: DatasetKind::Unknown,
            fields: Vec::new(),
            non_required_fields: Vec::new(),
            field_dict: FieldDict::new(),
        };
        table.refresh()?;
        Ok(table)
    }

    /// Re-reads the cached kind, field names and field dictionary.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the dataset cannot be described; the cache
    /// is left unchanged in that case.
    pub fn refresh(&mut self) -> Result<()> {
        let kind = self.store.describe(&self.path)?.kind;
        let fields = self.store.list_fields(&self.path)?;
        let field_dict = build_field_dict(&fields, &FieldDictOptions::default())?;

        self.kind = kind;
        self.field_dict = field_dict;
        self.fields = fields.iter().map(|f| f.name.clone()).collect();
        self.non_required_fields = fields
            .iter()
            .filter(|f| FieldSelection::NonRequiredOnly.includes(f))
            .map(|f| f.name.clone())
            .collect();
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    /// Every field name, in stored order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Names of the fields the platform does not require.
    #[must_use]
    pub fn non_required_fields(&self) -> &[String] {
        &self.non_required_fields
    }

    #[must_use]
    pub fn field_dict(&self) -> &FieldDict {
        &self.field_dict
    }

    /// See [`get_max_field_value_length`].
    ///
    /// # Errors
    ///
    /// Returns the store's error if the field cannot be read.
    pub fn get_max_field_value_length(&self, field: &str) -> Result<usize> {
        get_max_field_value_length(self.store, &self.path, field)
    }

    /// See [`get_field_value_set`].
    ///
    /// # Errors
    ///
    /// Returns the store's error if the field cannot be read.
    pub fn get_field_value_set(&self, field: &str, charset: Charset) -> Result<BTreeSet<FieldValue>> {
        get_field_value_set(self.store, &self.path, field, charset)
    }
}
