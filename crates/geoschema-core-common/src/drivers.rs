//! Driver registry for dataset format support and capabilities.
//!
//! Each driver describes one dataset format the file store can open, together
//! with its current support status for describing datasets, reading rows and
//! creating new datasets.
//!
//! # Examples
//!
//! ```
//! use geoschema_core_common::drivers::{driver_for_path, find_driver};
//!
//! let geojson = find_driver("GeoJSON").expect("GeoJSON driver should exist");
//! assert!(geojson.capabilities.read.is_supported());
//!
//! let csv = driver_for_path(std::path::Path::new("parcels.CSV")).expect("csv driver");
//! assert_eq!(csv.short_name, "CSV");
//! ```

use std::path::Path;

/// Support status for a specific driver operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportStatus {
    /// The feature is fully supported and implemented.
    Supported,
    /// The feature is not supported by the driver.
    NotSupported,
    /// The feature is planned for future implementation.
    Planned,
}

impl SupportStatus {
    /// Returns `true` if the operation is fully supported and implemented.
    ///
    /// # Examples
    ///
    /// ```
    /// use geoschema_core_common::drivers::SupportStatus;
    ///
    /// assert!(SupportStatus::Supported.is_supported());
    /// assert!(!SupportStatus::Planned.is_supported());
    /// ```
    #[must_use]
    pub fn is_supported(&self) -> bool {
        matches!(self, SupportStatus::Supported)
    }

    /// Returns `true` if the operation is supported or planned.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self, SupportStatus::NotSupported)
    }

    /// Returns the string representation of this support status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            SupportStatus::Supported => "Supported",
            SupportStatus::NotSupported => "Not Supported",
            SupportStatus::Planned => "Planned",
        }
    }
}

/// Operations a driver can perform on its datasets.
#[derive(Debug, Clone, Copy)]
pub struct DriverCapabilities {
    /// Describing a dataset and listing its fields.
    pub describe: SupportStatus,
    /// Reading rows through a cursor.
    pub read: SupportStatus,
    /// Creating a new dataset from a field list.
    pub create: SupportStatus,
}

impl DriverCapabilities {
    /// Returns `true` if at least one operation is fully supported and implemented.
    #[must_use]
    pub fn has_supported_operation(&self) -> bool {
        self.describe.is_supported() || self.read.is_supported() || self.create.is_supported()
    }
}

/// Dataset format driver definition.
#[derive(Debug, Clone)]
pub struct Driver {
    /// Short name used in the CLI and for driver identification (e.g., `"GeoJSON"`).
    pub short_name: &'static str,
    /// Long descriptive name for display purposes.
    pub long_name: &'static str,
    /// Lower-case file extensions handled by the driver, without the dot.
    pub extensions: &'static [&'static str],
    /// Operations supported by this driver.
    pub capabilities: DriverCapabilities,
}

impl Driver {
    /// Creates a new driver definition with specified capabilities.
    #[must_use]
    pub const fn new(
        short_name: &'static str,
        long_name: &'static str,
        extensions: &'static [&'static str],
        describe: SupportStatus,
        read: SupportStatus,
        create: SupportStatus,
    ) -> Self {
        Self {
            short_name,
            long_name,
            extensions,
            capabilities: DriverCapabilities {
                describe,
                read,
                create,
            },
        }
    }

    /// Returns `true` if `extension` (without the dot) belongs to this driver.
    #[must_use]
    pub fn handles_extension(&self, extension: &str) -> bool {
        self.extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}

/// Returns the complete registry of known drivers, regardless of support status.
#[must_use]
pub fn get_drivers() -> Vec<Driver> {
    use SupportStatus::{NotSupported, Planned, Supported};

    vec![
        Driver::new(
            "CSV",
            "Comma Separated Value (.csv)",
            &["csv", "tsv"],
            Supported,
            Supported,
            NotSupported,
        ),
        Driver::new(
            "GeoJSON",
            "GeoJSON",
            &["geojson", "json", "geojsonl", "geojsons"],
            Supported,
            Supported,
            NotSupported,
        ),
        Driver::new(
            "Memory",
            "In-process tables",
            &[],
            Supported,
            Supported,
            Supported,
        ),
        Driver::new(
            "ESRI Shapefile",
            "ESRI Shapefile / DBF",
            &["shp", "dbf"],
            Planned,
            Planned,
            Planned,
        ),
        Driver::new(
            "GPKG",
            "GeoPackage vector",
            &["gpkg"],
            Planned,
            Planned,
            Planned,
        ),
        Driver::new(
            "OpenFileGDB",
            "ESRI File Geodatabase vector (OpenFileGDB)",
            &["gdb"],
            Planned,
            Planned,
            NotSupported,
        ),
        Driver::new(
            "PGeo",
            "ESRI Personal Geodatabase",
            &["mdb"],
            NotSupported,
            NotSupported,
            NotSupported,
        ),
    ]
}

/// Returns drivers with at least one fully supported operation.
#[must_use]
pub fn get_available_drivers() -> Vec<Driver> {
    get_drivers()
        .into_iter()
        .filter(|driver| driver.capabilities.has_supported_operation())
        .collect()
}

/// Finds a driver by short name, case-insensitively.
#[must_use]
pub fn find_driver(name: &str) -> Option<Driver> {
    get_drivers()
        .into_iter()
        .find(|driver| driver.short_name.eq_ignore_ascii_case(name))
}

/// Finds the driver that handles `path`'s extension.
#[must_use]
pub fn driver_for_path(path: &Path) -> Option<Driver> {
    let extension = path.extension()?.to_str()?;
    get_drivers()
        .into_iter()
        .find(|driver| driver.handles_extension(extension))
}

/// Returns the short names of every registered driver.
#[must_use]
pub fn get_driver_names() -> Vec<&'static str> {
    get_drivers()
        .iter()
        .map(|driver| driver.short_name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_driver_case_insensitive() {
        let driver = find_driver("geojson").unwrap();
        assert_eq!(driver.short_name, "GeoJSON");
        assert!(find_driver("NotADriver").is_none());
    }

    #[test]
    fn test_driver_for_path() {
        assert_eq!(
            driver_for_path(Path::new("/data/roads.GeoJSON")).unwrap().short_name,
            "GeoJSON"
        );
        assert_eq!(
            driver_for_path(Path::new("parcels.tsv")).unwrap().short_name,
            "CSV"
        );
        assert_eq!(
            driver_for_path(Path::new("lakes.shp")).unwrap().short_name,
            "ESRI Shapefile"
        );
        assert!(driver_for_path(Path::new("README")).is_none());
        assert!(driver_for_path(Path::new("image.png")).is_none());
    }

    #[test]
    fn test_file_drivers_cannot_create() {
        for name in ["CSV", "GeoJSON"] {
            let driver = find_driver(name).unwrap();
            assert!(driver.capabilities.describe.is_supported());
            assert!(driver.capabilities.read.is_supported());
            assert!(!driver.capabilities.create.is_supported());
        }
        assert!(find_driver("Memory").unwrap().capabilities.create.is_supported());
    }

    #[test]
    fn test_available_drivers_exclude_planned_only() {
        let names: Vec<&str> = get_available_drivers()
            .iter()
            .map(|driver| driver.short_name)
            .collect();
        assert_eq!(names, vec!["CSV", "GeoJSON", "Memory"]);
    }

    #[test]
    fn test_driver_names_unique() {
        let mut names = get_driver_names();
        let count = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), count);
    }

    #[test]
    fn test_support_status_strings() {
        assert_eq!(SupportStatus::Supported.as_str(), "Supported");
        assert_eq!(SupportStatus::NotSupported.as_str(), "Not Supported");
        assert!(SupportStatus::Planned.is_available());
        assert!(!SupportStatus::NotSupported.is_available());
    }
}
