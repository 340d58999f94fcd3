//! CSV dataset backend for `GeoSchema`.
//!
//! Schemas are inferred with `arrow-csv` and rows are streamed batch by batch
//! through its reader, so a cursor never holds more than one record batch.
//! A column holding WKT geometries can be designated to turn the table into a
//! feature class.

pub mod dataset;
pub mod options;
mod values;

pub use dataset::CsvDataset;
pub use options::CsvOptions;
