use std::io::Write;

use geoschema_core_common::{
    DatasetError, DatasetKind, FieldType, FieldValue, GeoSchemaError, Result, ShapeType,
};
use geoschema_csv::{CsvDataset, CsvOptions};
use tempfile::NamedTempFile;

fn write_csv(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("create temp csv");
    file.write_all(contents.as_bytes()).expect("write csv");
    file.flush().expect("flush csv");
    file
}

fn collect(dataset: CsvDataset, fields: &[&str]) -> Result<Vec<Vec<FieldValue>>> {
    dataset.into_cursor(fields)?.collect()
}

/// A plain table gets a synthetic object id followed by the file's columns
#[test]
fn test_table_fields() -> Result<()> {
    let file = write_csv("name,population,area\nLyon,513275,47.87\nNice,342669,71.92\n");
    let dataset = CsvDataset::open(file.path(), &CsvOptions::default())?;

    assert_eq!(dataset.kind(), DatasetKind::Table);
    let fields = dataset.fields();
    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["OBJECTID", "name", "population", "area"]);
    assert_eq!(fields[0].field_type, FieldType::OID);
    assert!(fields[0].required);
    assert_eq!(fields[1].field_type, FieldType::String);
    assert_eq!(fields[2].field_type, FieldType::Integer);
    assert_eq!(fields[3].field_type, FieldType::Double);

    let description = dataset.description();
    assert_eq!(description.driver, "CSV");
    assert_eq!(description.catalog_path, file.path());
    assert_eq!(Some(description.path.as_path()), file.path().parent());
    Ok(())
}

#[test]
fn test_cursor_projects_requested_fields() -> Result<()> {
    let file = write_csv("name,population\nLyon,513275\nNice,\n");
    let dataset = CsvDataset::open(file.path(), &CsvOptions::default())?;

    let rows = collect(dataset, &["POPULATION", "objectid"])?;
    assert_eq!(
        rows,
        vec![
            vec![FieldValue::Integer(513_275), FieldValue::Integer(1)],
            vec![FieldValue::Null, FieldValue::Integer(2)],
        ]
    );
    Ok(())
}

/// Object ids keep counting across record batches
#[test]
fn test_object_ids_span_batches() -> Result<()> {
    let file = write_csv("code\na\nb\nc\nd\ne\n");
    let options = CsvOptions::default().with_batch_size(2);
    let dataset = CsvDataset::open(file.path(), &options)?;

    let ids: Vec<FieldValue> = collect(dataset, &["OBJECTID"])?
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(ids, (1..=5).map(FieldValue::Integer).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn test_existing_objectid_column_is_used() -> Result<()> {
    let file = write_csv("ObjectID,name\n10,a\n20,b\n");
    let dataset = CsvDataset::open(file.path(), &CsvOptions::default())?;

    assert_eq!(dataset.fields().len(), 2);
    assert_eq!(dataset.fields()[0].field_type, FieldType::OID);

    let rows = collect(dataset, &["OBJECTID"])?;
    assert_eq!(
        rows,
        vec![vec![FieldValue::Integer(10)], vec![FieldValue::Integer(20)]]
    );
    Ok(())
}

#[test]
fn test_large_integers_are_big_integer() -> Result<()> {
    let file = write_csv("small,large\n1,1\n2,9000000000\n");
    let dataset = CsvDataset::open(file.path(), &CsvOptions::default())?;

    assert_eq!(dataset.fields()[1].field_type, FieldType::Integer);
    assert_eq!(dataset.fields()[2].field_type, FieldType::BigInteger);
    Ok(())
}

#[test]
fn test_wkt_geometry_column_makes_feature_class() -> Result<()> {
    let file = write_csv(
        "name;WKT\nriver;LINESTRING (0 0, 1 1)\ncanal;MULTILINESTRING ((0 0, 1 0))\n",
    );
    let options = CsvOptions::default()
        .with_delimiter(b';')
        .with_geometry_column("wkt");
    let dataset = CsvDataset::open(file.path(), &options)?;

    assert_eq!(
        dataset.kind(),
        DatasetKind::FeatureClass {
            shape_type: ShapeType::Polyline
        }
    );
    let geometry = &dataset.fields()[2];
    assert_eq!(geometry.field_type, FieldType::Geometry);
    assert!(geometry.required);

    let rows = collect(dataset, &["WKT"])?;
    assert_eq!(
        rows[0],
        vec![FieldValue::Geometry("LINESTRING (0 0, 1 1)".into())]
    );
    Ok(())
}

#[test]
fn test_missing_geometry_column() {
    let file = write_csv("name\na\n");
    let options = CsvOptions::default().with_geometry_column("geom");
    let err = CsvDataset::open(file.path(), &options).unwrap_err();

    assert!(matches!(
        err,
        GeoSchemaError::Dataset(DatasetError::FieldNotFound { ref field, .. }) if field == "geom"
    ));
}

#[test]
fn test_unknown_cursor_field() -> Result<()> {
    let file = write_csv("name\na\n");
    let dataset = CsvDataset::open(file.path(), &CsvOptions::default())?;

    let err = dataset.into_cursor(&["nope"]).err().expect("unknown field");
    assert!(matches!(
        err,
        GeoSchemaError::Dataset(DatasetError::FieldNotFound { .. })
    ));
    Ok(())
}

#[test]
fn test_ragged_rows_fail_the_cursor() -> Result<()> {
    let file = write_csv("a,b\n1,2\n3,4,5\n");
    let options = CsvOptions::default().with_schema_infer_max_rec(Some(1));
    let dataset = CsvDataset::open(file.path(), &options)?;

    let result = collect(dataset, &["a"]);
    assert!(matches!(
        result,
        Err(GeoSchemaError::Dataset(DatasetError::RowRead { .. }))
    ));
    Ok(())
}

#[test]
fn test_missing_file() {
    let err = CsvDataset::open("/nonexistent/parcels.csv", &CsvOptions::default()).unwrap_err();
    assert!(matches!(err, GeoSchemaError::Io(_)));
}
