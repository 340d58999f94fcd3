//! `GeoJSON` dataset backend for `GeoSchema`.
//!
//! Reads FeatureCollections, single Features or Geometries, and newline
//! delimited `GeoJSON` sequences. Property types are inferred from a sample of
//! features; every dataset reports a synthetic `OBJECTID` and a geometry field.

pub mod dataset;
pub mod options;
pub mod parser;

pub use dataset::GeoJsonDataset;
pub use options::GeoJsonOptions;
