use std::io::Write;

use geoschema_core_common::{
    DatasetError, DatasetKind, FieldType, FieldValue, GeoSchemaError, Result, ShapeType,
};
use geoschema_geojson::{GeoJsonDataset, GeoJsonOptions};
use tempfile::NamedTempFile;

const ROADS: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type":"Feature","geometry":{"type":"LineString","coordinates":[[0,0],[1,1]]},"properties":{"name":"A1","lanes":2,"toll":false}},
    {"type":"Feature","geometry":{"type":"MultiLineString","coordinates":[[[0,0],[1,0]]]},"properties":{"name":"N7","lanes":null,"toll":true}},
    {"type":"Feature","geometry":null,"properties":{"name":"D3","lanes":1}}
  ]
}"#;

fn write_geojson(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp geojson");
    file.write_all(contents.as_bytes()).expect("write geojson");
    file.flush().expect("flush geojson");
    file
}

#[test]
fn test_feature_collection_fields() -> Result<()> {
    let file = write_geojson(ROADS, ".geojson");
    let dataset = GeoJsonDataset::open(file.path(), &GeoJsonOptions::default())?;

    assert_eq!(
        dataset.kind(),
        DatasetKind::FeatureClass {
            shape_type: ShapeType::Polyline
        }
    );
    assert_eq!(dataset.feature_count(), 3);

    let fields = dataset.fields();
    assert_eq!(fields.len(), 5);
    assert_eq!(fields[0].name, "OBJECTID");
    assert_eq!(fields[0].field_type, FieldType::OID);
    assert_eq!(fields[1].name, "Shape");
    assert_eq!(fields[1].field_type, FieldType::Geometry);
    assert!(fields[1].required);

    let type_of = |name: &str| {
        fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.field_type)
    };
    assert_eq!(type_of("lanes"), Some(FieldType::Integer));
    assert_eq!(type_of("name"), Some(FieldType::String));
    assert_eq!(type_of("toll"), Some(FieldType::SmallInteger));

    assert_eq!(dataset.description().driver, "GeoJSON");
    Ok(())
}

#[test]
fn test_cursor_values() -> Result<()> {
    let file = write_geojson(ROADS, ".geojson");
    let dataset = GeoJsonDataset::open(file.path(), &GeoJsonOptions::default())?;

    let rows: Vec<_> = dataset
        .into_cursor(&["objectid", "LANES", "toll"])?
        .collect::<Result<_>>()?;
    assert_eq!(
        rows,
        vec![
            vec![
                FieldValue::Integer(1),
                FieldValue::Integer(2),
                FieldValue::Integer(0)
            ],
            vec![FieldValue::Integer(2), FieldValue::Null, FieldValue::Integer(1)],
            vec![FieldValue::Integer(3), FieldValue::Integer(1), FieldValue::Null],
        ]
    );
    Ok(())
}

#[test]
fn test_geometries_are_geojson_text() -> Result<()> {
    let file = write_geojson(ROADS, ".geojson");
    let dataset = GeoJsonDataset::open(file.path(), &GeoJsonOptions::default())?;

    let rows: Vec<_> = dataset.into_cursor(&["Shape"])?.collect::<Result<_>>()?;
    match &rows[0][0] {
        FieldValue::Geometry(text) => assert!(text.contains("LineString")),
        other => panic!("expected a geometry, got {other:?}"),
    }
    assert_eq!(rows[2][0], FieldValue::Null);
    Ok(())
}

#[test]
fn test_sequence_without_geometry_is_unknown() -> Result<()> {
    let file = write_geojson(
        "{\"type\":\"Feature\",\"geometry\":null,\"properties\":{\"id\":1}}\n\
         {\"type\":\"Feature\",\"geometry\":null,\"properties\":{\"id\":2}}\n",
        ".geojsonl",
    );
    let dataset = GeoJsonDataset::open(file.path(), &GeoJsonOptions::default())?;

    assert_eq!(dataset.kind(), DatasetKind::Unknown);
    assert_eq!(dataset.feature_count(), 2);
    Ok(())
}

#[test]
fn test_custom_geometry_field_name() -> Result<()> {
    let file = write_geojson(ROADS, ".geojson");
    let options = GeoJsonOptions::new().with_geometry_field_name("geom");
    let dataset = GeoJsonDataset::open(file.path(), &options)?;

    assert_eq!(dataset.fields()[1].name, "geom");
    Ok(())
}

#[test]
fn test_unknown_cursor_field() -> Result<()> {
    let file = write_geojson(ROADS, ".geojson");
    let dataset = GeoJsonDataset::open(file.path(), &GeoJsonOptions::default())?;

    let err = dataset.into_cursor(&["speed"]).err().expect("unknown field");
    assert!(matches!(
        err,
        GeoSchemaError::Dataset(DatasetError::FieldNotFound { .. })
    ));
    Ok(())
}

#[test]
fn test_invalid_file_is_parse_error() {
    let file = write_geojson("this is not geojson", ".geojson");
    let err = GeoJsonDataset::open(file.path(), &GeoJsonOptions::default()).unwrap_err();
    assert!(matches!(err, GeoSchemaError::Format(_)));
}
