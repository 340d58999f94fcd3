//! `GeoJSON` reading options

/// Options controlling `GeoJSON` reading behaviour.
#[derive(Debug, Clone)]
pub struct GeoJsonOptions {
    /// Maximum number of features to sample for property type inference.
    pub schema_infer_max_features: Option<usize>,
    /// Name of the reported geometry field.
    pub geometry_field_name: String,
}

impl Default for GeoJsonOptions {
    fn default() -> Self {
        Self {
            schema_infer_max_features: Some(1024),
            geometry_field_name: "Shape".to_string(),
        }
    }
}

impl GeoJsonOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_schema_infer_max_features(mut self, limit: Option<usize>) -> Self {
        self.schema_infer_max_features = limit;
        self
    }

    #[must_use]
    pub fn with_geometry_field_name(mut self, name: impl Into<String>) -> Self {
        self.geometry_field_name = name.into();
        self
    }
}
