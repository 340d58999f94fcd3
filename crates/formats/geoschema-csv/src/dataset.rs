//! CSV datasets: schema description and forward-only cursors.

use std::collections::VecDeque;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow_array::RecordBatch;
use arrow_csv::ReaderBuilder;
use arrow_csv::reader::Format;
use arrow_schema::{ArrowError, SchemaRef};
use geoschema_core_common::arrow::ArrowDataTypeExt;
use geoschema_core_common::{
    DatasetDescription, DatasetError, DatasetKind, FieldDescriptor, FieldType, FieldValue,
    FormatError, IoErrorExt, Result, Row, RowCursor, ShapeType, resolve_field_indices,
    row_read_error,
};
use log::{debug, info};

use crate::options::CsvOptions;
use crate::values::{column_values, exceeds_i32};

const FORMAT: &str = "CSV";
const OBJECT_ID: &str = "OBJECTID";

type BatchReader = Box<dyn Iterator<Item = std::result::Result<RecordBatch, ArrowError>>>;

/// Where the values of one reported field come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnSource {
    /// Synthetic object id: the 1-based row number
    RowNumber,
    /// A column of the CSV file
    Column(usize),
}

/// What a bounded pass over the first records revealed.
#[derive(Debug, Default)]
struct Sample {
    wide_columns: Vec<usize>,
    shape_type: Option<ShapeType>,
}

/// An opened CSV dataset with its inferred field list.
#[derive(Debug, Clone)]
pub struct CsvDataset {
    path: PathBuf,
    options: CsvOptions,
    schema: SchemaRef,
    fields: Vec<FieldDescriptor>,
    sources: Vec<ColumnSource>,
    kind: DatasetKind,
}

impl CsvDataset {
    /// Opens `path` and infers its fields.
    ///
    /// A required `OBJECTID` field is reported first unless the file already
    /// has a column of that name.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be opened, a schema inference
    /// error if it is not valid CSV, and [`DatasetError::FieldNotFound`] if the
    /// configured geometry column does not exist.
    pub fn open(path: impl Into<PathBuf>, options: &CsvOptions) -> Result<Self> {
        let path = path.into();
        let mut file = File::open(&path).with_read_context(FORMAT, &path)?;

        let (schema, records) = Format::default()
            .with_header(options.has_header)
            .with_delimiter(options.delimiter)
            .infer_schema(&mut file, options.schema_infer_max_rec)
            .map_err(|err| FormatError::SchemaInference {
                format: FORMAT.to_string(),
                reason: err.to_string(),
            })?;
        debug!(
            "Inferred {} column(s) from {records} record(s) of {}",
            schema.fields().len(),
            path.display()
        );
        let schema = Arc::new(schema);

        let geometry_index = match &options.geometry_column {
            Some(name) => Some(
                schema
                    .fields()
                    .iter()
                    .position(|field| field.name().eq_ignore_ascii_case(name))
                    .ok_or_else(|| DatasetError::FieldNotFound {
                        dataset: path.display().to_string(),
                        field: name.clone(),
                    })?,
            ),
            None => None,
        };

        let sample = sample_records(&path, &schema, options, geometry_index)?;

        let mut fields = Vec::with_capacity(schema.fields().len() + 1);
        let mut sources = Vec::with_capacity(schema.fields().len() + 1);
        if !schema
            .fields()
            .iter()
            .any(|field| field.name().eq_ignore_ascii_case(OBJECT_ID))
        {
            fields.push(FieldDescriptor::object_id(OBJECT_ID));
            sources.push(ColumnSource::RowNumber);
        }

        for (idx, field) in schema.fields().iter().enumerate() {
            let descriptor = if Some(idx) == geometry_index {
                FieldDescriptor::geometry(field.name())
            } else if field.name().eq_ignore_ascii_case(OBJECT_ID) {
                FieldDescriptor::object_id(field.name())
            } else {
                let field_type = if sample.wide_columns.contains(&idx) {
                    FieldType::BigInteger
                } else {
                    field.data_type().field_type()
                };
                FieldDescriptor::new(field.name(), field_type).with_nullable(field.is_nullable())
            };
            fields.push(descriptor);
            sources.push(ColumnSource::Column(idx));
        }

        let kind = match geometry_index {
            None => DatasetKind::Table,
            Some(_) => sample
                .shape_type
                .map_or(DatasetKind::Unknown, |shape_type| DatasetKind::FeatureClass {
                    shape_type,
                }),
        };

        info!("Opened {} as {kind} with {} field(s)", path.display(), fields.len());

        Ok(Self {
            path,
            options: options.clone(),
            schema,
            fields,
            sources,
            kind,
        })
    }

    /// Describes the dataset.
    #[must_use]
    pub fn description(&self) -> DatasetDescription {
        DatasetDescription {
            catalog_path: self.path.clone(),
            path: self.path.parent().map(Path::to_path_buf).unwrap_or_default(),
            base_name: self
                .path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
            driver: FORMAT.to_string(),
            kind: self.kind,
        }
    }

    /// The reported fields, in order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// The dataset classification.
    #[must_use]
    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    /// Consumes the dataset and opens a cursor over the named fields.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::FieldNotFound`] for unknown names and an I/O
    /// error if the file can no longer be opened.
    pub fn into_cursor(self, names: &[&str]) -> Result<RowCursor<'static>> {
        let dataset = self.path.display().to_string();
        let projection = resolve_field_indices(&dataset, &self.fields, names)?
            .into_iter()
            .map(|idx| {
                (
                    self.sources[idx],
                    self.fields[idx].field_type == FieldType::Geometry,
                )
            })
            .collect();
        let batches = open_batches(
            &self.path,
            &self.schema,
            &self.options,
            self.options.batch_size,
        )?;

        Ok(Box::new(CsvCursor {
            dataset,
            batches,
            projection,
            pending: VecDeque::new(),
            next_object_id: 1,
            done: false,
        }))
    }
}

fn open_batches(
    path: &Path,
    schema: &SchemaRef,
    options: &CsvOptions,
    batch_size: usize,
) -> Result<BatchReader> {
    let file = File::open(path).with_read_context(FORMAT, path)?;
    let reader = ReaderBuilder::new(schema.clone())
        .with_header(options.has_header)
        .with_delimiter(options.delimiter)
        .with_batch_size(batch_size)
        .build(file)
        .with_read_context(FORMAT, path)?;
    Ok(Box::new(reader))
}

/// Reads up to `schema_infer_max_rec` records to find 64-bit integer columns
/// and the shape type of the geometry column.
fn sample_records(
    path: &Path,
    schema: &SchemaRef,
    options: &CsvOptions,
    geometry_index: Option<usize>,
) -> Result<Sample> {
    let mut sample = Sample::default();
    let has_int64 = schema
        .fields()
        .iter()
        .any(|field| field.data_type() == &arrow_schema::DataType::Int64);
    if !has_int64 && geometry_index.is_none() {
        return Ok(sample);
    }

    let limit = options.schema_infer_max_rec.unwrap_or(usize::MAX);
    let mut seen = 0;
    // Batches no larger than the limit keep the pass within the inferred records
    let batch_size = options.batch_size.min(limit).max(1);
    for batch in open_batches(path, schema, options, batch_size)? {
        if seen >= limit {
            break;
        }
        let batch = batch.map_err(|err| FormatError::SchemaInference {
            format: FORMAT.to_string(),
            reason: err.to_string(),
        })?;
        let batch = batch.slice(0, batch.num_rows().min(limit - seen));
        seen += batch.num_rows();

        for (idx, column) in batch.columns().iter().enumerate() {
            if !sample.wide_columns.contains(&idx) && exceeds_i32(column) {
                sample.wide_columns.push(idx);
            }
        }

        if sample.shape_type.is_none()
            && let Some(idx) = geometry_index
        {
            let values = column_values(batch.column(idx), true).map_err(|err| {
                FormatError::SchemaInference {
                    format: FORMAT.to_string(),
                    reason: err.to_string(),
                }
            })?;
            sample.shape_type = values.iter().find_map(|value| match value {
                FieldValue::Geometry(wkt) => ShapeType::from_wkt(wkt),
                _ => None,
            });
        }
    }

    Ok(sample)
}

/// Streams rows out of record batches, one batch buffered at a time.
struct CsvCursor {
    dataset: String,
    batches: BatchReader,
    projection: Vec<(ColumnSource, bool)>,
    pending: VecDeque<Row>,
    next_object_id: i64,
    done: bool,
}

impl CsvCursor {
    fn buffer(&mut self, batch: &RecordBatch) -> std::result::Result<(), ArrowError> {
        let rows = batch.num_rows();
        let first_id = self.next_object_id;
        let columns = self
            .projection
            .iter()
            .map(|(source, as_geometry)| match source {
                ColumnSource::RowNumber => Ok((first_id..)
                    .take(rows)
                    .map(FieldValue::Integer)
                    .collect::<Vec<_>>()),
                ColumnSource::Column(idx) => column_values(batch.column(*idx), *as_geometry),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut columns: Vec<_> = columns.into_iter().map(Vec::into_iter).collect();
        for _ in 0..rows {
            let row = columns
                .iter_mut()
                .map(|column| column.next().unwrap_or(FieldValue::Null))
                .collect();
            self.pending.push_back(row);
        }
        self.next_object_id += i64::try_from(rows).unwrap_or(i64::MAX);
        Ok(())
    }
}

impl Iterator for CsvCursor {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.pending.pop_front() {
                return Some(Ok(row));
            }
            if self.done {
                return None;
            }
            match self.batches.next() {
                None => {
                    self.done = true;
                    return None;
                },
                Some(Err(err)) => {
                    self.done = true;
                    return Some(Err(row_read_error(&self.dataset, err)));
                },
                Some(Ok(batch)) => {
                    if let Err(err) = self.buffer(&batch) {
                        self.done = true;
                        return Some(Err(row_read_error(&self.dataset, err)));
                    }
                },
            }
        }
    }
}
