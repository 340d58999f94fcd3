//! `geoschema-core` is the core library for the `GeoSchema` project: schema
//! inspection, comparison and CSV schema reports for tables and feature classes.
//!
//! This crate includes:
//! - **Stores**: [`store::FileStore`] for CSV and `GeoJSON` files and
//!   [`store::MemoryStore`] for in-process tables.
//! - **Field inspection**: longest value and distinct values of one field.
//! - **Schema reporting**: field listings, field dictionaries, aligned and
//!   separated text reports, and the schema comparator.
//! - **CSV schema reports**: export, read back and import.
//!
//! Every operation talks to a [`DataStore`](geoschema_core_common::DataStore),
//! so the same code runs against any backend.

pub mod compare;
pub mod fields;
pub mod output;
pub mod report;
pub mod schema;
pub mod store;
pub mod table;

pub use geoschema_core_common::drivers;
