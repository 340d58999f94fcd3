//! [`DataStore`] implementations: files on disk and in-process tables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use geoschema_core_common::drivers::driver_for_path;
use geoschema_core_common::{
    DataStore, DatasetDescription, DatasetError, DatasetKind, Driver, FieldDescriptor, FieldType,
    FieldValue, IoErrorExt, Result, Row, RowCursor, Workspace, resolve_field_indices,
};
use geoschema_csv::{CsvDataset, CsvOptions};
use geoschema_geojson::{GeoJsonDataset, GeoJsonOptions};
use log::{debug, info};

/// Read-only access to CSV and `GeoJSON` files.
///
/// Relative references resolve against the store's [`Workspace`]. The backend
/// is chosen from the file extension through the driver registry.
#[derive(Debug, Clone)]
pub struct FileStore {
    workspace: Arc<Workspace>,
    csv_options: CsvOptions,
    geojson_options: GeoJsonOptions,
}

enum OpenDataset {
    Csv(CsvDataset),
    GeoJson(GeoJsonDataset),
}

impl OpenDataset {
    fn description(&self) -> DatasetDescription {
        match self {
            OpenDataset::Csv(dataset) => dataset.description(),
            OpenDataset::GeoJson(dataset) => dataset.description(),
        }
    }

    fn fields(&self) -> &[FieldDescriptor] {
        match self {
            OpenDataset::Csv(dataset) => dataset.fields(),
            OpenDataset::GeoJson(dataset) => dataset.fields(),
        }
    }

    fn into_cursor(self, fields: &[&str]) -> Result<RowCursor<'static>> {
        match self {
            OpenDataset::Csv(dataset) => dataset.into_cursor(fields),
            OpenDataset::GeoJson(dataset) => dataset.into_cursor(fields),
        }
    }
}

impl FileStore {
    /// Creates a store resolving relative references against `workspace`.
    #[must_use]
    pub fn new(workspace: Arc<Workspace>) -> Self {
        Self {
            workspace,
            csv_options: CsvOptions::default(),
            geojson_options: GeoJsonOptions::default(),
        }
    }

    #[must_use]
    pub fn with_csv_options(mut self, options: CsvOptions) -> Self {
        self.csv_options = options;
        self
    }

    #[must_use]
    pub fn with_geojson_options(mut self, options: GeoJsonOptions) -> Self {
        self.geojson_options = options;
        self
    }

    /// The workspace setting used for relative references.
    #[must_use]
    pub fn workspace(&self) -> &Arc<Workspace> {
        &self.workspace
    }

    /// Resolves `dataset` to a canonical path and the driver that reads it.
    fn locate(&self, dataset: &str) -> Result<(PathBuf, Driver)> {
        let resolved = self.workspace.resolve(dataset);
        if !resolved.is_file() {
            return Err(DatasetError::NotFound {
                reference: dataset.to_string(),
            }
            .into());
        }
        let path = resolved
            .canonicalize()
            .with_read_context("dataset", &resolved)?;

        let driver = driver_for_path(&path).ok_or_else(|| DatasetError::NoDriver {
            reference: dataset.to_string(),
        })?;
        if !driver.capabilities.read.is_supported() {
            return Err(DatasetError::Unsupported {
                driver: driver.short_name.to_string(),
                operation: "reading datasets".to_string(),
            }
            .into());
        }

        debug!(
            "Resolved '{dataset}' to {} (driver {})",
            path.display(),
            driver.short_name
        );
        Ok((path, driver))
    }

    fn open(&self, dataset: &str) -> Result<OpenDataset> {
        let (path, driver) = self.locate(dataset)?;
        match driver.short_name {
            "CSV" => {
                let options = csv_options_for(&path, &self.csv_options);
                Ok(OpenDataset::Csv(CsvDataset::open(path, &options)?))
            },
            "GeoJSON" => Ok(OpenDataset::GeoJson(GeoJsonDataset::open(
                path,
                &self.geojson_options,
            )?)),
            other => Err(DatasetError::Unsupported {
                driver: other.to_string(),
                operation: "reading datasets".to_string(),
            }
            .into()),
        }
    }
}

/// `.tsv` files are tab separated unless a delimiter was chosen explicitly.
fn csv_options_for(path: &Path, options: &CsvOptions) -> CsvOptions {
    let is_tsv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
    if is_tsv && options.delimiter == CsvOptions::default().delimiter {
        options.clone().with_delimiter(b'\t')
    } else {
        options.clone()
    }
}

impl DataStore for FileStore {
    fn name(&self) -> &str {
        "File"
    }

    fn describe(&self, dataset: &str) -> Result<DatasetDescription> {
        Ok(self.open(dataset)?.description())
    }

    fn list_fields(&self, dataset: &str) -> Result<Vec<FieldDescriptor>> {
        Ok(self.open(dataset)?.fields().to_vec())
    }

    fn search_cursor(&self, dataset: &str, fields: &[&str]) -> Result<RowCursor<'_>> {
        self.open(dataset)?.into_cursor(fields)
    }

    fn create_table(
        &mut self,
        dataset: &str,
        _kind: DatasetKind,
        _fields: &[FieldDescriptor],
    ) -> Result<DatasetDescription> {
        let path = self.workspace.resolve(dataset);
        let driver = driver_for_path(&path).map_or("File", |driver| driver.short_name);
        Err(DatasetError::Unsupported {
            driver: driver.to_string(),
            operation: "creating datasets".to_string(),
        }
        .into())
    }
}

/// An in-process table: a kind, a field list and rows in field order.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryTable {
    kind: DatasetKind,
    fields: Vec<FieldDescriptor>,
    rows: Vec<Row>,
}

impl MemoryTable {
    #[must_use]
    pub fn new(kind: DatasetKind, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            kind,
            fields,
            rows: Vec::new(),
        }
    }

    /// Appends a row; missing trailing values are stored as nulls.
    #[must_use]
    pub fn with_row(mut self, row: impl IntoIterator<Item = FieldValue>) -> Self {
        self.push_row(row);
        self
    }

    /// Appends a row; missing trailing values are stored as nulls and
    /// extra values are dropped.
    pub fn push_row(&mut self, row: impl IntoIterator<Item = FieldValue>) {
        let mut row: Row = row.into_iter().take(self.fields.len()).collect();
        row.resize(self.fields.len(), FieldValue::Null);
        self.rows.push(row);
    }

    #[must_use]
    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

/// A mutable store of named in-process tables.
///
/// Dataset references are table names and match exactly. Every description
/// reports `location` as the containing workspace.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    location: PathBuf,
    tables: BTreeMap<String, MemoryTable>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory reported as the tables' workspace.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = location.into();
        self
    }

    #[must_use]
    pub fn with_table(mut self, name: impl Into<String>, table: MemoryTable) -> Self {
        self.insert(name, table);
        self
    }

    /// Adds or replaces a table, returning the replaced one.
    pub fn insert(&mut self, name: impl Into<String>, table: MemoryTable) -> Option<MemoryTable> {
        self.tables.insert(name.into(), table)
    }

    #[must_use]
    pub fn table(&self, name: &str) -> Option<&MemoryTable> {
        self.tables.get(name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut MemoryTable> {
        self.tables.get_mut(name)
    }

    fn get(&self, dataset: &str) -> Result<&MemoryTable> {
        self.tables.get(dataset).ok_or_else(|| {
            DatasetError::NotFound {
                reference: dataset.to_string(),
            }
            .into()
        })
    }
}

impl DataStore for MemoryStore {
    fn name(&self) -> &str {
        "Memory"
    }

    fn describe(&self, dataset: &str) -> Result<DatasetDescription> {
        let table = self.get(dataset)?;
        Ok(DatasetDescription {
            catalog_path: PathBuf::from(dataset),
            path: self.location.clone(),
            base_name: dataset.to_string(),
            driver: self.name().to_string(),
            kind: table.kind,
        })
    }

    fn list_fields(&self, dataset: &str) -> Result<Vec<FieldDescriptor>> {
        Ok(self.get(dataset)?.fields.clone())
    }

    fn search_cursor(&self, dataset: &str, fields: &[&str]) -> Result<RowCursor<'_>> {
        let table = self.get(dataset)?;
        let indices = resolve_field_indices(dataset, &table.fields, fields)?;
        Ok(Box::new(table.rows.iter().map(move |row| {
            Ok(indices
                .iter()
                .map(|&idx| row.get(idx).cloned().unwrap_or(FieldValue::Null))
                .collect())
        })))
    }

    /// Creates an empty table.
    ///
    /// An `OBJECTID` field is added first unless `fields` has an `OID` field,
    /// and feature classes get a required `Shape` field unless `fields` has a
    /// geometry field.
    fn create_table(
        &mut self,
        dataset: &str,
        kind: DatasetKind,
        fields: &[FieldDescriptor],
    ) -> Result<DatasetDescription> {
        if self.tables.contains_key(dataset) {
            return Err(DatasetError::AlreadyExists {
                reference: dataset.to_string(),
            }
            .into());
        }

        let mut all_fields = Vec::with_capacity(fields.len() + 2);
        if !fields.iter().any(|f| f.field_type == FieldType::OID) {
            all_fields.push(FieldDescriptor::object_id("OBJECTID"));
        }
        if kind.shape_type().is_some() && !fields.iter().any(|f| f.field_type == FieldType::Geometry)
        {
            all_fields.push(FieldDescriptor::geometry("Shape"));
        }
        all_fields.extend_from_slice(fields);

        info!(
            "Created {kind} '{dataset}' with {} field(s)",
            all_fields.len()
        );
        self.tables
            .insert(dataset.to_string(), MemoryTable::new(kind, all_fields));
        self.describe(dataset)
    }
}
