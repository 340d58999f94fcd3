use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use geoschema_core::report::{
    ReportOptions, export_schema_to_csv, import_schema_to_table, read_schema_csv,
};
use geoschema_core::store::{FileStore, MemoryStore, MemoryTable};
use geoschema_core_common::{
    DataStore, DatasetError, DatasetKind, FieldDescriptor, FieldType, GeoSchemaError, IoError,
    Result, ShapeType, Workspace,
};
use tempfile::TempDir;

fn report_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
}

fn parcels() -> MemoryTable {
    MemoryTable::new(
        DatasetKind::FeatureClass {
            shape_type: ShapeType::Polygon,
        },
        vec![
            FieldDescriptor::object_id("OBJECTID"),
            FieldDescriptor::geometry("Shape"),
            FieldDescriptor::new("OWNER", FieldType::String)
                .with_length(60)
                .with_alias("Owner, primary"),
            FieldDescriptor::new("ZONE", FieldType::SmallInteger).with_domain("ZoneCodes"),
            FieldDescriptor::new("RATIO", FieldType::Single).with_precision(6, 2),
            FieldDescriptor::new("VALUE", FieldType::BigInteger).with_default_value("0"),
            FieldDescriptor::new("UID", FieldType::GlobalID).with_editable(false),
            FieldDescriptor::new("Shape_Area", FieldType::Double).with_required(true),
        ],
    )
}

#[test]
fn test_export_writes_report_lines() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::new().with_table("parcels", parcels());
    let workspace = Workspace::default();
    let options = ReportOptions::new()
        .with_output_dir(dir.path())
        .with_report_date(report_date());

    let path = export_schema_to_csv(&store, &workspace, "parcels", &options)?;
    assert_eq!(
        path,
        dir.path().join("parcels_Field_Report 20240517.csv")
    );

    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "Type,Polygon");
    assert_eq!(
        lines[1],
        "FieldName,FieldType,FieldPrecision,FieldScale,FieldLength,FieldAlias,isNullable,Required,FieldDomain,DefaultValue,Editable,BaseName"
    );
    assert_eq!(lines[2], "OBJECTID,OID,0,0,4,OBJECTID,False,True,,,False,OBJECTID");
    assert_eq!(
        lines[4],
        "OWNER,TEXT,0,0,60,\"Owner, primary\",True,False,,,True,OWNER"
    );
    assert_eq!(lines.len(), 10);
    Ok(())
}

#[test]
fn test_export_then_read_keeps_names_and_types() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::new().with_table("parcels", parcels());
    let options = ReportOptions::new()
        .with_output_dir(dir.path())
        .with_report_date(report_date());

    let path = export_schema_to_csv(&store, &Workspace::default(), "parcels", &options)?;
    let report = read_schema_csv(&path)?;

    assert_eq!(report.kind, store.describe("parcels")?.kind);
    assert_eq!(report.fields, store.list_fields("parcels")?);
    Ok(())
}

#[test]
fn test_import_into_memory_store() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let mut store = MemoryStore::new().with_table("parcels", parcels());
    let options = ReportOptions::new().with_output_dir(dir.path());
    let path = export_schema_to_csv(&store, &Workspace::default(), "parcels", &options)?;

    let description = import_schema_to_table(&mut store, &path, "parcels_copy")?;
    assert_eq!(description.kind.as_str(), "Polygon");

    let names: Vec<String> = store
        .list_fields("parcels_copy")?
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(
        names,
        vec!["OBJECTID", "Shape", "OWNER", "ZONE", "RATIO", "VALUE", "UID"]
    );

    let err = import_schema_to_table(&mut store, &path, "parcels_copy").unwrap_err();
    assert!(matches!(
        err,
        GeoSchemaError::Dataset(DatasetError::AlreadyExists { .. })
    ));
    Ok(())
}

#[test]
fn test_import_into_file_store_is_unsupported() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let memory = MemoryStore::new().with_table("parcels", parcels());
    let options = ReportOptions::new().with_output_dir(dir.path());
    let path = export_schema_to_csv(&memory, &Workspace::default(), "parcels", &options)?;

    let mut files = FileStore::new(Arc::new(Workspace::new(Some(dir.path().to_path_buf()))));
    let err = import_schema_to_table(&mut files, &path, "copy.csv").unwrap_err();
    assert!(matches!(
        err,
        GeoSchemaError::Dataset(DatasetError::Unsupported { .. })
    ));
    Ok(())
}

#[test]
fn test_export_from_file_store_next_to_dataset() -> Result<()> {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("towns.csv"), "name,pop\nArles,52000\n").unwrap();

    let workspace = Arc::new(Workspace::new(Some(dir.path().to_path_buf())));
    let store = FileStore::new(workspace.clone());
    let options = ReportOptions::new().with_report_date(report_date());

    let path = export_schema_to_csv(&store, &workspace, "towns.csv", &options)?;
    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("towns_Field_Report 20240517.csv")
    );
    assert_eq!(
        path.parent().map(|p| p.canonicalize().unwrap()),
        Some(dir.path().canonicalize().unwrap())
    );

    let report = read_schema_csv(&path)?;
    assert_eq!(report.kind, DatasetKind::Table);
    let names: Vec<&str> = report.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["OBJECTID", "name", "pop"]);
    Ok(())
}

#[test]
fn test_workspace_restored_after_success_and_failure() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let before = Some(PathBuf::from("/data/before"));
    let workspace = Workspace::new(before.clone());
    let store = MemoryStore::new()
        .with_location(dir.path())
        .with_table("parcels", parcels());

    export_schema_to_csv(&store, &workspace, "parcels", &ReportOptions::default())?;
    assert_eq!(workspace.current(), before);

    let bad_dir = ReportOptions::new().with_output_dir(dir.path().join("missing"));
    let err = export_schema_to_csv(&store, &workspace, "parcels", &bad_dir).unwrap_err();
    assert!(matches!(
        err,
        GeoSchemaError::Io(IoError::InvalidPath { .. })
    ));
    assert_eq!(workspace.current(), before);

    let err = export_schema_to_csv(&store, &workspace, "absent", &ReportOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        GeoSchemaError::Dataset(DatasetError::NotFound { .. })
    ));
    assert_eq!(workspace.current(), before);
    Ok(())
}

#[test]
fn test_write_failure_aborts_export_and_restores_workspace() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("parcels_Field_Report 20240517.csv")).unwrap();

    let before = Some(PathBuf::from("/data/before"));
    let workspace = Workspace::new(before.clone());
    let store = MemoryStore::new()
        .with_location(dir.path())
        .with_table("parcels", parcels());
    let options = ReportOptions::new()
        .with_output_dir(dir.path())
        .with_report_date(report_date());

    let err = export_schema_to_csv(&store, &workspace, "parcels", &options).unwrap_err();
    assert!(matches!(err, GeoSchemaError::Io(IoError::Write { .. })));
    assert_eq!(workspace.current(), before);
}

#[test]
fn test_read_missing_report_is_file_not_found() {
    let dir = TempDir::new().unwrap();
    let err = read_schema_csv(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(
        err,
        GeoSchemaError::Io(IoError::FileNotFound { .. })
    ));
}
