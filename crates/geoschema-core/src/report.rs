//! CSV schema reports: export a dataset's field definitions, read them back,
//! and create a new dataset from them.
//!
//! A report starts with a `Type,<kind>` line, followed by a header line and one
//! line per field:
//!
//! ```text
//! Type,Polygon
//! FieldName,FieldType,FieldPrecision,FieldScale,FieldLength,FieldAlias,isNullable,Required,FieldDomain,DefaultValue,Editable,BaseName
//! OBJECTID,OID,0,0,4,OBJECTID,False,True,,,False,OBJECTID
//! ```

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use geoschema_core_common::{
    DataStore, DatasetDescription, DatasetKind, FieldDescriptor, FieldType, FormatError, IoError,
    IoErrorExt, Result, SourcePosition, Workspace,
};
use log::{debug, info};

use crate::output::get_valid_output_path;
use crate::schema::{bool_token, is_shape_pseudo_field};

const REPORT_FORMAT: &str = "CSV schema report";

/// Column names of the field lines of a report.
pub const REPORT_HEADER: [&str; 12] = [
    "FieldName",
    "FieldType",
    "FieldPrecision",
    "FieldScale",
    "FieldLength",
    "FieldAlias",
    "isNullable",
    "Required",
    "FieldDomain",
    "DefaultValue",
    "Editable",
    "BaseName",
];

/// Options for [`export_schema_to_csv`].
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Directory to write the report to; must exist.
    /// When unset, the dataset's directory or a fallback is used.
    pub output_dir: Option<PathBuf>,
    /// Date stamped into the file name (default: today)
    pub report_date: Option<NaiveDate>,
}

impl ReportOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_report_date(mut self, date: NaiveDate) -> Self {
        self.report_date = Some(date);
        self
    }
}

/// Returns the report file name for a dataset: `<base>_Field_Report <YYYYMMDD>.csv`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use geoschema_core::report::report_file_name;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
/// assert_eq!(report_file_name("parcels", date), "parcels_Field_Report 20240309.csv");
/// ```
#[must_use]
pub fn report_file_name(base_name: &str, date: NaiveDate) -> String {
    format!("{base_name}_Field_Report {}.csv", date.format("%Y%m%d"))
}

/// Writes a CSV schema report of `dataset` and returns its path.
///
/// The workspace points at the dataset's directory while the report is
/// written and is restored afterwards, whether or not the export succeeds.
///
/// # Errors
///
/// Returns [`DatasetError::NotFound`](geoschema_core_common::DatasetError::NotFound)
/// if the dataset does not exist, [`IoError::InvalidPath`] if
/// `options.output_dir` is not an existing directory, and [`IoError::Write`]
/// if the report cannot be written.
pub fn export_schema_to_csv(
    store: &dyn DataStore,
    workspace: &Workspace,
    dataset: &str,
    options: &ReportOptions,
) -> Result<PathBuf> {
    info!("Processing: {dataset}");
    let description = store.describe(dataset)?;
    let _workspace = workspace.enter(&description.path);

    let report_dir = match &options.output_dir {
        Some(dir) if dir.is_dir() => dir.clone(),
        Some(dir) => {
            return Err(IoError::InvalidPath {
                path: dir.clone(),
                reason: "the report directory does not exist".to_string(),
            }
            .into());
        },
        None => get_valid_output_path(&description.path),
    };
    let date = options
        .report_date
        .unwrap_or_else(|| Local::now().date_naive());
    let report_path = report_dir.join(report_file_name(&description.base_name, date));
    info!("Report file: {}", report_path.display());

    let catalog_path = description.catalog_path.to_string_lossy();
    let fields = store.list_fields(&catalog_path)?;
    write_report(&report_path, &description, &fields)?;

    info!("Completed");
    Ok(report_path)
}

fn write_report(
    path: &Path,
    description: &DatasetDescription,
    fields: &[FieldDescriptor],
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_write_context("CSV", path)?;

    writer
        .write_record(["Type", description.kind.as_str()])
        .with_write_context("CSV", path)?;
    writer
        .write_record(REPORT_HEADER)
        .with_write_context("CSV", path)?;

    for field in fields {
        debug!("Writing {}", field.name);
        writer
            .write_record([
                field.name.clone(),
                field.field_type.report_token().to_string(),
                field.precision.to_string(),
                field.scale.to_string(),
                field.length.to_string(),
                field.alias.clone(),
                bool_token(field.is_nullable).to_string(),
                bool_token(field.required).to_string(),
                field.domain.clone(),
                field.default_value.clone().unwrap_or_default(),
                bool_token(field.editable).to_string(),
                field.base_name.clone(),
            ])
            .with_write_context("CSV", path)?;
    }

    writer.flush().with_write_context("CSV", path)
}

/// The contents of a CSV schema report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReport {
    pub kind: DatasetKind,
    pub fields: Vec<FieldDescriptor>,
}

/// Reads a report written by [`export_schema_to_csv`].
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read, and
/// [`FormatError::Parse`] or [`FormatError::UnknownFieldType`] for malformed
/// content.
pub fn read_schema_csv(path: &Path) -> Result<SchemaReport> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_read_context("CSV", path)?;
    let mut records = reader.records();

    let type_line = records
        .next()
        .transpose()
        .with_read_context("CSV", path)?
        .ok_or_else(|| parse_error(None, None, "the report is empty"))?;
    if type_line.len() != 2 || !type_line[0].eq_ignore_ascii_case("Type") {
        return Err(parse_error(Some(&type_line), None, "expected a 'Type,<kind>' line").into());
    }
    let kind = DatasetKind::from_token(&type_line[1]);

    let header = records
        .next()
        .transpose()
        .with_read_context("CSV", path)?
        .ok_or_else(|| parse_error(None, None, "the field header line is missing"))?;
    let header_matches = header.len() == REPORT_HEADER.len()
        && header
            .iter()
            .zip(REPORT_HEADER)
            .all(|(cell, expected)| cell.trim().eq_ignore_ascii_case(expected));
    if !header_matches {
        return Err(parse_error(Some(&header), None, "unexpected field header line").into());
    }

    let mut fields = Vec::new();
    for record in records {
        let record = record.with_read_context("CSV", path)?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        fields.push(parse_field(&record)?);
    }

    debug!(
        "Read {} field(s) of a {kind} from {}",
        fields.len(),
        path.display()
    );
    Ok(SchemaReport { kind, fields })
}

fn parse_field(record: &csv::StringRecord) -> Result<FieldDescriptor> {
    if record.len() != REPORT_HEADER.len() {
        return Err(parse_error(
            Some(record),
            None,
            &format!(
                "expected {} values, found {}",
                REPORT_HEADER.len(),
                record.len()
            ),
        )
        .into());
    }

    let field_type = FieldType::from_report_token(&record[1]).ok_or_else(|| {
        FormatError::UnknownFieldType {
            token: record[1].to_string(),
        }
    })?;

    let mut field = FieldDescriptor::new(&record[0], field_type)
        .with_precision(parse_number(record, 2)?, parse_number(record, 3)?)
        .with_length(parse_number(record, 4)?)
        .with_alias(&record[5])
        .with_nullable(parse_flag(record, 6)?)
        .with_required(parse_flag(record, 7)?)
        .with_domain(&record[8])
        .with_editable(parse_flag(record, 10)?);
    if !record[9].is_empty() {
        field = field.with_default_value(&record[9]);
    }
    if !record[11].is_empty() {
        field.base_name = record[11].to_string();
    }
    Ok(field)
}

fn parse_number(record: &csv::StringRecord, idx: usize) -> Result<u32> {
    let cell = record[idx].trim();
    if cell.is_empty() {
        return Ok(0);
    }
    cell.parse().map_err(|_| {
        parse_error(
            Some(record),
            Some(idx),
            &format!("expected a {} number, found '{cell}'", REPORT_HEADER[idx]),
        )
        .into()
    })
}

fn parse_flag(record: &csv::StringRecord, idx: usize) -> Result<bool> {
    match record[idx].trim() {
        flag if flag.eq_ignore_ascii_case("True") => Ok(true),
        flag if flag.eq_ignore_ascii_case("False") => Ok(false),
        other => Err(parse_error(
            Some(record),
            Some(idx),
            &format!("expected True or False for {}, found '{other}'", REPORT_HEADER[idx]),
        )
        .into()),
    }
}

fn parse_error(record: Option<&csv::StringRecord>, idx: Option<usize>, message: &str) -> FormatError {
    let position = record.and_then(csv::StringRecord::position).map(|pos| SourcePosition {
        line: Some(pos.line()),
        record: Some(pos.record() + 1),
        field: idx.and_then(|idx| u64::try_from(idx + 1).ok()),
    });
    FormatError::Parse {
        format: REPORT_FORMAT.to_string(),
        position,
        message: message.to_string(),
    }
}

/// Creates `target` in `store` from a CSV schema report.
///
/// Object id and shape bookkeeping fields listed in the report are skipped;
/// the store adds its own.
///
/// # Errors
///
/// Returns the errors of [`read_schema_csv`], and the store's error if it
/// cannot create datasets or `target` already exists.
pub fn import_schema_to_table(
    store: &mut dyn DataStore,
    csv_path: &Path,
    target: &str,
) -> Result<DatasetDescription> {
    info!("Importing schema {} into {target}", csv_path.display());
    let report = read_schema_csv(csv_path)?;
    let fields: Vec<FieldDescriptor> = report
        .fields
        .into_iter()
        .filter(|field| {
            let skip = is_shape_pseudo_field(&field.name);
            if skip {
                debug!("Skipping {}", field.name);
            }
            !skip
        })
        .collect();
    store.create_table(target, report.kind, &fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("report.csv");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_read_schema_csv() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "Type,Point\n\
             FieldName,FieldType,FieldPrecision,FieldScale,FieldLength,FieldAlias,isNullable,Required,FieldDomain,DefaultValue,Editable,BaseName\n\
             OBJECTID,OID,0,0,4,OBJECTID,False,True,,,False,OBJECTID\n\
             \"NAME, FULL\",TEXT,0,0,120,Full name,True,False,Names,n/a,True,NAME_FULL\n",
        );

        let report = read_schema_csv(&path)?;
        assert_eq!(report.kind.as_str(), "Point");
        assert_eq!(report.fields.len(), 2);

        let name = &report.fields[1];
        assert_eq!(name.name, "NAME, FULL");
        assert_eq!(name.field_type, FieldType::String);
        assert_eq!(name.length, 120);
        assert_eq!(name.alias, "Full name");
        assert_eq!(name.domain, "Names");
        assert_eq!(name.default_value.as_deref(), Some("n/a"));
        assert_eq!(name.base_name, "NAME_FULL");
        assert!(report.fields[0].default_value.is_none());
        Ok(())
    }

    #[test]
    fn test_read_rejects_bad_flag_with_position() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "Type,Table\n\
             FieldName,FieldType,FieldPrecision,FieldScale,FieldLength,FieldAlias,isNullable,Required,FieldDomain,DefaultValue,Editable,BaseName\n\
             CODE,LONG,0,0,4,CODE,yes,False,,,True,CODE\n",
        );

        let err = read_schema_csv(&path).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("line 3"), "{message}");
        assert!(message.contains("field 7"), "{message}");
        assert!(message.contains("isNullable"), "{message}");
    }

    #[test]
    fn test_read_rejects_unknown_type_token() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "Type,Table\n\
             FieldName,FieldType,FieldPrecision,FieldScale,FieldLength,FieldAlias,isNullable,Required,FieldDomain,DefaultValue,Editable,BaseName\n\
             CODE,NUMBER,0,0,4,CODE,True,False,,,True,CODE\n",
        );

        let err = read_schema_csv(&path).unwrap_err();
        assert!(matches!(
            err,
            geoschema_core_common::GeoSchemaError::Format(FormatError::UnknownFieldType { .. })
        ));
    }

    #[test]
    fn test_read_rejects_missing_type_line() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "FieldName,FieldType\n");
        assert!(read_schema_csv(&path).is_err());
    }
}
