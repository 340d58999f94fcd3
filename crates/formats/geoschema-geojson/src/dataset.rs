//! `GeoJSON` datasets: property type inference and in-memory cursors.

use std::path::{Path, PathBuf};

use geojson::{Geometry, JsonValue, Value};
use geoschema_core_common::{
    DatasetDescription, DatasetKind, FieldDescriptor, FieldType, FieldValue, IoErrorExt, Result,
    Row, RowCursor, ShapeType, resolve_field_indices, row_read_error,
};
use log::{debug, info};

use crate::options::GeoJsonOptions;
use crate::parser::{FeatureRecord, parse_geojson_bytes};

const FORMAT: &str = "GeoJSON";
const OBJECT_ID: &str = "OBJECTID";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InferredScalarType {
    Null,
    Boolean,
    Integer { wide: bool },
    Double,
    Text,
}

impl InferredScalarType {
    fn update(self, value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => self,
            JsonValue::Bool(_) => match self {
                Self::Null | Self::Boolean => Self::Boolean,
                _ => Self::Text,
            },
            JsonValue::Number(n) => {
                let integer = n.as_i64();
                match self {
                    Self::Null | Self::Integer { .. } => match integer {
                        Some(v) => Self::Integer {
                            wide: i32::try_from(v).is_err()
                                || matches!(self, Self::Integer { wide: true }),
                        },
                        None => Self::Double,
                    },
                    Self::Double => Self::Double,
                    Self::Boolean | Self::Text => Self::Text,
                }
            },
            JsonValue::String(_) | JsonValue::Array(_) | JsonValue::Object(_) => Self::Text,
        }
    }

    fn field_type(self) -> FieldType {
        match self {
            Self::Null | Self::Text => FieldType::String,
            Self::Boolean => FieldType::SmallInteger,
            Self::Integer { wide: false } => FieldType::Integer,
            Self::Integer { wide: true } => FieldType::BigInteger,
            Self::Double => FieldType::Double,
        }
    }
}

/// Where the values of one reported field come from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldSource {
    RowNumber,
    Geometry,
    Property(String),
}

/// A parsed `GeoJSON` dataset.
#[derive(Debug, Clone)]
pub struct GeoJsonDataset {
    path: PathBuf,
    records: Vec<FeatureRecord>,
    fields: Vec<FieldDescriptor>,
    sources: Vec<FieldSource>,
    kind: DatasetKind,
}

impl GeoJsonDataset {
    /// Reads and parses `path`, then infers its fields.
    ///
    /// Fields are reported as `OBJECTID`, the geometry field, then the
    /// properties in first-seen order. A property named `OBJECTID` replaces
    /// the synthetic one.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read and a parse error if it
    /// is neither a `GeoJSON` document nor a `GeoJSON` sequence.
    pub fn open(path: impl Into<PathBuf>, options: &GeoJsonOptions) -> Result<Self> {
        let path = path.into();
        let bytes = std::fs::read(&path).with_read_context(FORMAT, &path)?;
        let records = parse_geojson_bytes(&bytes, &path.display().to_string())?;
        if let Some(first) = records.first() {
            debug!("First record of {}: {first}", path.display());
        }

        let sample_len = options
            .schema_infer_max_features
            .map_or(records.len(), |max| max.min(records.len()));
        let properties = infer_properties(&records[..sample_len]);

        let mut fields = Vec::with_capacity(properties.len() + 2);
        let mut sources = Vec::with_capacity(properties.len() + 2);
        if !properties
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(OBJECT_ID))
        {
            fields.push(FieldDescriptor::object_id(OBJECT_ID));
            sources.push(FieldSource::RowNumber);
        }
        fields.push(FieldDescriptor::geometry(&options.geometry_field_name));
        sources.push(FieldSource::Geometry);

        for (name, inferred) in properties {
            if name.eq_ignore_ascii_case(&options.geometry_field_name) {
                debug!("Property '{name}' is shadowed by the geometry field");
                continue;
            }
            let descriptor = if name.eq_ignore_ascii_case(OBJECT_ID) {
                FieldDescriptor::object_id(&name)
            } else {
                FieldDescriptor::new(&name, inferred.field_type())
            };
            fields.push(descriptor);
            sources.push(FieldSource::Property(name));
        }

        let kind = records
            .iter()
            .find_map(|record| record.geometry.as_ref())
            .and_then(shape_type)
            .map_or(DatasetKind::Unknown, |shape_type| DatasetKind::FeatureClass {
                shape_type,
            });

        info!(
            "Opened {} as {kind} with {} feature(s) and {} field(s)",
            path.display(),
            records.len(),
            fields.len()
        );

        Ok(Self {
            path,
            records,
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

    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[must_use]
    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.records.len()
    }

    /// Consumes the dataset and returns a cursor over the named fields.
    ///
    /// Geometries are yielded as `GeoJSON` text.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::FieldNotFound`](geoschema_core_common::DatasetError::FieldNotFound)
    /// for unknown names.
    pub fn into_cursor(self, names: &[&str]) -> Result<RowCursor<'static>> {
        let dataset = self.path.display().to_string();
        let projection: Vec<(FieldSource, FieldType)> =
            resolve_field_indices(&dataset, &self.fields, names)?
                .into_iter()
                .map(|idx| (self.sources[idx].clone(), self.fields[idx].field_type))
                .collect();

        Ok(Box::new(self.records.into_iter().zip(1_i64..).map(
            move |(record, object_id)| {
                projection
                    .iter()
                    .map(|(source, field_type)| match source {
                        FieldSource::RowNumber => Ok(FieldValue::Integer(object_id)),
                        FieldSource::Geometry => record.geometry.as_ref().map_or(
                            Ok(FieldValue::Null),
                            |geometry| {
                                serde_json::to_string(geometry)
                                    .map(FieldValue::Geometry)
                                    .map_err(|err| row_read_error(&dataset, err))
                            },
                        ),
                        FieldSource::Property(name) => Ok(record
                            .properties
                            .get(name)
                            .map_or(FieldValue::Null, |value| json_value(value, *field_type))),
                    })
                    .collect::<Result<Row>>()
            },
        )))
    }
}

/// Infers property types, keeping keys in first-seen order.
fn infer_properties(records: &[FeatureRecord]) -> Vec<(String, InferredScalarType)> {
    let mut inferred: Vec<(String, InferredScalarType)> = Vec::new();
    for record in records {
        for (key, value) in &record.properties {
            match inferred.iter_mut().find(|(name, _)| name == key) {
                Some((_, ty)) => *ty = ty.update(value),
                None => inferred.push((key.clone(), InferredScalarType::Null.update(value))),
            }
        }
    }
    inferred
}

fn shape_type(geometry: &Geometry) -> Option<ShapeType> {
    match &geometry.value {
        Value::Point(_) => Some(ShapeType::Point),
        Value::MultiPoint(_) => Some(ShapeType::Multipoint),
        Value::LineString(_) | Value::MultiLineString(_) => Some(ShapeType::Polyline),
        Value::Polygon(_) | Value::MultiPolygon(_) => Some(ShapeType::Polygon),
        Value::GeometryCollection(_) => None,
    }
}

/// Converts a property value to the representation of its field's type.
fn json_value(value: &JsonValue, field_type: FieldType) -> FieldValue {
    match (value, field_type) {
        (JsonValue::Null, _) => FieldValue::Null,
        (JsonValue::String(text), _) => FieldValue::Text(text.clone()),
        (JsonValue::Bool(flag), FieldType::SmallInteger) => FieldValue::Integer(i64::from(*flag)),
        (JsonValue::Number(n), FieldType::Double) => {
            n.as_f64().map_or(FieldValue::Null, FieldValue::Double)
        },
        (JsonValue::Number(n), FieldType::Integer | FieldType::BigInteger | FieldType::OID) => n
            .as_i64()
            .map(FieldValue::Integer)
            .or_else(|| n.as_f64().map(FieldValue::Double))
            .unwrap_or(FieldValue::Null),
        (other, _) => FieldValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::JsonObject;
    use serde_json::json;

    fn record(properties: JsonValue) -> FeatureRecord {
        let properties: JsonObject = match properties {
            JsonValue::Object(map) => map,
            _ => JsonObject::new(),
        };
        FeatureRecord {
            properties,
            geometry: None,
        }
    }

    #[test]
    fn infer_properties_in_first_seen_order() {
        let records = vec![
            record(json!({"name": "A", "value": 1})),
            record(json!({"active": true, "value": 1.5, "name": "B"})),
            record(json!({"empty": null})),
        ];

        let inferred = infer_properties(&records);
        let names: Vec<&str> = inferred.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["name", "value", "active", "empty"]);
        assert_eq!(inferred[0].1.field_type(), FieldType::String);
        assert_eq!(inferred[1].1.field_type(), FieldType::Double);
        assert_eq!(inferred[2].1.field_type(), FieldType::SmallInteger);
        assert_eq!(inferred[3].1.field_type(), FieldType::String);
    }

    #[test]
    fn wide_integers_stay_wide() {
        let records = vec![
            record(json!({"id": 9_000_000_000_i64})),
            record(json!({"id": 1})),
        ];
        let inferred = infer_properties(&records);
        assert_eq!(inferred[0].1.field_type(), FieldType::BigInteger);
    }

    #[test]
    fn mixed_kinds_widen_to_text() {
        let records = vec![record(json!({"code": 1})), record(json!({"code": "A1"}))];
        assert_eq!(infer_properties(&records)[0].1.field_type(), FieldType::String);
    }

    #[test]
    fn json_value_conversion() {
        assert_eq!(
            json_value(&json!(true), FieldType::SmallInteger),
            FieldValue::Integer(1)
        );
        assert_eq!(
            json_value(&json!(2), FieldType::Double),
            FieldValue::Double(2.0)
        );
        assert_eq!(
            json_value(&json!(7), FieldType::String),
            FieldValue::Text("7".into())
        );
        assert_eq!(
            json_value(&json!([1, 2]), FieldType::String),
            FieldValue::Text("[1,2]".into())
        );
        assert_eq!(json_value(&json!(null), FieldType::Integer), FieldValue::Null);
    }
}
