//! `GeoJSON` parsing helpers.

use std::fmt;

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject};
use geoschema_core_common::{FormatError, Result, SourcePosition};

/// Parsed `GeoJSON` feature with materialized properties and geometry.
#[derive(Debug, Clone)]
pub struct FeatureRecord {
    pub properties: JsonObject,
    pub geometry: Option<Geometry>,
}

/// Parse raw bytes into a vector of `FeatureRecord`s.
///
/// The bytes are read as a single `GeoJSON` document first and as a newline
/// delimited sequence if that fails. `context` names the source in errors.
///
/// # Errors
///
/// Returns [`FormatError::Parse`] when neither reading succeeds.
pub fn parse_geojson_bytes(bytes: &[u8], context: &str) -> Result<Vec<FeatureRecord>> {
    match serde_json::from_slice::<GeoJson>(bytes) {
        Ok(geojson) => Ok(geojson_to_records(geojson)),
        Err(primary_err) => Ok(parse_geojson_sequence(bytes, context).map_err(|sequence_err| {
            parse_error(
                context,
                None,
                format!(
                    "not a GeoJSON document ({primary_err}); \
                     also failed to parse as GeoJSON sequence: {sequence_err}"
                ),
            )
        })?),
    }
}

fn geojson_to_records(geojson: GeoJson) -> Vec<FeatureRecord> {
    match geojson {
        GeoJson::FeatureCollection(collection) => feature_collection_to_records(collection),
        GeoJson::Feature(feature) => vec![feature_to_record(feature)],
        GeoJson::Geometry(geometry) => vec![FeatureRecord {
            properties: JsonObject::new(),
            geometry: Some(geometry),
        }],
    }
}

fn feature_collection_to_records(collection: FeatureCollection) -> Vec<FeatureRecord> {
    collection
        .features
        .into_iter()
        .map(feature_to_record)
        .collect()
}

fn feature_to_record(feature: Feature) -> FeatureRecord {
    FeatureRecord {
        properties: feature.properties.unwrap_or_default(),
        geometry: feature.geometry,
    }
}

fn parse_geojson_sequence(
    bytes: &[u8],
    context: &str,
) -> std::result::Result<Vec<FeatureRecord>, FormatError> {
    let mut records = Vec::new();
    for (line_idx, raw_line) in bytes.split(|b| *b == b'\n').enumerate() {
        let position = Some(SourcePosition {
            line: u64::try_from(line_idx + 1).ok(),
            ..SourcePosition::default()
        });
        let line = match std::str::from_utf8(raw_line) {
            Ok(line) => line.trim(),
            Err(err) => {
                return Err(parse_error(
                    context,
                    position,
                    format!("line is not valid UTF-8: {err}"),
                ));
            },
        };

        if line.is_empty() {
            continue;
        }

        let geojson = line.parse::<GeoJson>().map_err(|err| {
            parse_error(context, position, format!("invalid GeoJSON feature: {err}"))
        })?;
        records.append(&mut geojson_to_records(geojson));
    }

    if records.is_empty() {
        Err(parse_error(context, None, "no GeoJSON features found".to_string()))
    } else {
        Ok(records)
    }
}

fn parse_error(context: &str, position: Option<SourcePosition>, message: String) -> FormatError {
    FormatError::Parse {
        format: format!("GeoJSON '{context}'"),
        position,
        message,
    }
}

impl fmt::Display for FeatureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let geom = if self.geometry.is_some() {
            "Some(Geometry)"
        } else {
            "None"
        };
        write!(
            f,
            "FeatureRecord(properties={} keys, geometry={geom})",
            self.properties.len()
        )
    }
}
