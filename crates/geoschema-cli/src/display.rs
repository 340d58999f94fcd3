//! Display utilities for formatting CLI output.
//!
//! Table row structures and the functions that print dataset descriptions,
//! field listings and the driver registry.

use tabled::{Table, Tabled};

use geoschema_core_common::{DatasetDescription, Driver, FieldDescriptor};

/// Table row representation for displaying field information.
#[derive(Tabled)]
pub struct FieldRow {
    #[tabled(rename = "Field")]
    pub name: String,
    #[tabled(rename = "Alias")]
    pub alias: String,
    #[tabled(rename = "Type")]
    pub field_type: String,
    #[tabled(rename = "Length")]
    pub length: u32,
    #[tabled(rename = "Precision")]
    pub precision: u32,
    #[tabled(rename = "Scale")]
    pub scale: u32,
    #[tabled(rename = "Nullable")]
    pub nullable: String,
    #[tabled(rename = "Required")]
    pub required: String,
    #[tabled(rename = "Domain")]
    pub domain: String,
}

impl From<&FieldDescriptor> for FieldRow {
    fn from(field: &FieldDescriptor) -> Self {
        Self {
            name: field.name.clone(),
            alias: field.alias.clone(),
            field_type: field.field_type.to_string(),
            length: field.length,
            precision: field.precision,
            scale: field.scale,
            nullable: yes_no(field.is_nullable),
            required: yes_no(field.required),
            domain: field.domain.clone(),
        }
    }
}

/// Table row representation for displaying driver information.
#[derive(Tabled)]
pub struct DriverRow {
    /// Short identifier for the driver (e.g., `GeoJSON`, `CSV`).
    #[tabled(rename = "Short Name")]
    pub short_name: String,
    /// Full descriptive name of the driver format.
    #[tabled(rename = "Long Name")]
    pub long_name: String,
    /// Support status for describing datasets and listing fields.
    #[tabled(rename = "Describe")]
    pub describe: String,
    /// Support status for reading rows.
    #[tabled(rename = "Read")]
    pub read: String,
    /// Support status for creating datasets from a schema report.
    #[tabled(rename = "Create")]
    pub create: String,
}

impl From<&Driver> for DriverRow {
    fn from(driver: &Driver) -> Self {
        Self {
            short_name: driver.short_name.to_string(),
            long_name: driver.long_name.to_string(),
            describe: driver.capabilities.describe.as_str().to_string(),
            read: driver.capabilities.read.as_str().to_string(),
            create: driver.capabilities.create.as_str().to_string(),
        }
    }
}

fn yes_no(flag: bool) -> String {
    if flag { "Yes" } else { "No" }.to_string()
}

/// Renders fields as a table.
#[must_use]
pub fn fields_table(fields: &[FieldDescriptor]) -> String {
    Table::new(fields.iter().map(FieldRow::from)).to_string()
}

/// Display a dataset description followed by its field table.
pub fn display_description(description: &DatasetDescription, fields: &[FieldDescriptor]) {
    println!("\nDataset: {}", description.catalog_path.display());
    println!("Driver: {}", description.driver);
    println!("Kind: {}", description.kind);
    println!("Workspace: {}", description.path.display());

    if !fields.is_empty() {
        println!("\n=== Fields ===");
        println!("{}", fields_table(fields));
    }
}

/// Display the driver registry.
pub fn display_drivers(drivers: &[Driver]) {
    println!("\nAvailable Drivers ({} total):\n", drivers.len());
    println!("{}", Table::new(drivers.iter().map(DriverRow::from)));
}
