//! Data types describing datasets, their fields and the values stored in them.
//!
//! These types are the vocabulary of the [`DataStore`](crate::io::DataStore)
//! contract: every backend reports its metadata as [`DatasetDescription`] and
//! [`FieldDescriptor`] values and yields rows of [`FieldValue`]s.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::FormatError;

/// Display token used for null values.
pub const NULL_TOKEN: &str = "<Null>";

/// Geometry type of a feature class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeType {
    /// Single points.
    Point,
    /// Collections of points.
    Multipoint,
    /// Line strings and multi line strings.
    Polyline,
    /// Polygons and multi polygons.
    Polygon,
}

impl ShapeType {
    /// Returns the platform name of this shape type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeType::Point => "Point",
            ShapeType::Multipoint => "Multipoint",
            ShapeType::Polyline => "Polyline",
            ShapeType::Polygon => "Polygon",
        }
    }

    /// Maps a WKT or `GeoJSON` geometry keyword (e.g. `"MultiPolygon"`) to a shape type.
    ///
    /// Geometry collections and unknown keywords have no shape type.
    ///
    /// # Examples
    ///
    /// ```
    /// use geoschema_core_common::ShapeType;
    ///
    /// assert_eq!(ShapeType::from_geometry_keyword("LINESTRING"), Some(ShapeType::Polyline));
    /// assert_eq!(ShapeType::from_geometry_keyword("MultiPolygon"), Some(ShapeType::Polygon));
    /// assert_eq!(ShapeType::from_geometry_keyword("GeometryCollection"), None);
    /// ```
    #[must_use]
    pub fn from_geometry_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "POINT" => Some(ShapeType::Point),
            "MULTIPOINT" => Some(ShapeType::Multipoint),
            "LINESTRING" | "MULTILINESTRING" => Some(ShapeType::Polyline),
            "POLYGON" | "MULTIPOLYGON" => Some(ShapeType::Polygon),
            _ => None,
        }
    }

    /// Detects the shape type of a WKT string from its leading keyword.
    #[must_use]
    pub fn from_wkt(wkt: &str) -> Option<Self> {
        let keyword: String = wkt
            .trim_start()
            .chars()
            .take_while(char::is_ascii_alphabetic)
            .collect();
        Self::from_geometry_keyword(&keyword)
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of dataset a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    /// A dataset of geometrically typed records.
    FeatureClass {
        /// Geometry type shared by every record.
        shape_type: ShapeType,
    },
    /// A plain attribute table.
    Table,
    /// The backend could not classify the dataset.
    Unknown,
}

impl DatasetKind {
    /// Returns the kind token: the shape type for feature classes, `Table` or `Unknown`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::FeatureClass { shape_type } => shape_type.as_str(),
            DatasetKind::Table => "Table",
            DatasetKind::Unknown => "Unknown",
        }
    }

    /// Returns the shape type if this is a feature class.
    #[must_use]
    pub fn shape_type(&self) -> Option<ShapeType> {
        match self {
            DatasetKind::FeatureClass { shape_type } => Some(*shape_type),
            DatasetKind::Table | DatasetKind::Unknown => None,
        }
    }

    /// Parses a kind token written by [`DatasetKind::as_str`].
    ///
    /// Unrecognised tokens map to [`DatasetKind::Unknown`].
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        if token.eq_ignore_ascii_case("Table") {
            return DatasetKind::Table;
        }
        [
            ShapeType::Point,
            ShapeType::Multipoint,
            ShapeType::Polyline,
            ShapeType::Polygon,
        ]
        .into_iter()
        .find(|shape| shape.as_str().eq_ignore_ascii_case(token))
        .map_or(DatasetKind::Unknown, |shape_type| DatasetKind::FeatureClass {
            shape_type,
        })
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata returned by [`DataStore::describe`](crate::io::DataStore::describe).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetDescription {
    /// Full reference to the dataset inside its store
    pub catalog_path: PathBuf,
    /// Workspace (directory) containing the dataset
    pub path: PathBuf,
    /// Dataset name without extension
    pub base_name: String,
    /// Short name of the driver that opened the dataset
    pub driver: String,
    /// Dataset classification
    pub kind: DatasetKind,
}

/// Field types reported by the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(clippy::upper_case_acronyms)]
pub enum FieldType {
    /// Object identifier maintained by the platform
    OID,
    /// 16-bit integer
    SmallInteger,
    /// 32-bit integer
    Integer,
    /// 64-bit integer
    BigInteger,
    /// Single precision float
    Single,
    /// Double precision float
    Double,
    /// Text
    String,
    /// Date or timestamp
    Date,
    /// Geometry column
    Geometry,
    /// Binary data
    Blob,
    /// Raster data
    Raster,
    /// Globally unique identifier
    GUID,
    /// Platform-maintained globally unique identifier
    GlobalID,
}

impl FieldType {
    const ALL: [FieldType; 13] = [
        FieldType::OID,
        FieldType::SmallInteger,
        FieldType::Integer,
        FieldType::BigInteger,
        FieldType::Single,
        FieldType::Double,
        FieldType::String,
        FieldType::Date,
        FieldType::Geometry,
        FieldType::Blob,
        FieldType::Raster,
        FieldType::GUID,
        FieldType::GlobalID,
    ];

    /// Returns the platform name of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::OID => "OID",
            FieldType::SmallInteger => "SmallInteger",
            FieldType::Integer => "Integer",
            FieldType::BigInteger => "BigInteger",
            FieldType::Single => "Single",
            FieldType::Double => "Double",
            FieldType::String => "String",
            FieldType::Date => "Date",
            FieldType::Geometry => "Geometry",
            FieldType::Blob => "Blob",
            FieldType::Raster => "Raster",
            FieldType::GUID => "GUID",
            FieldType::GlobalID => "GlobalID",
        }
    }

    /// Returns the token accepted by an add-field tool, as written to schema reports.
    ///
    /// # Examples
    ///
    /// ```
    /// use geoschema_core_common::FieldType;
    ///
    /// assert_eq!(FieldType::String.report_token(), "TEXT");
    /// assert_eq!(FieldType::SmallInteger.report_token(), "SHORT");
    /// assert_eq!(FieldType::Integer.report_token(), "LONG");
    /// ```
    #[must_use]
    pub fn report_token(&self) -> &'static str {
        match self {
            FieldType::OID => "OID",
            FieldType::SmallInteger => "SHORT",
            FieldType::Integer => "LONG",
            FieldType::BigInteger => "BIGINTEGER",
            FieldType::Single => "FLOAT",
            FieldType::Double => "DOUBLE",
            FieldType::String => "TEXT",
            FieldType::Date => "DATE",
            FieldType::Geometry => "GEOMETRY",
            FieldType::Blob => "BLOB",
            FieldType::Raster => "RASTER",
            FieldType::GUID => "GUID",
            FieldType::GlobalID => "GLOBALID",
        }
    }

    /// Reverses [`FieldType::report_token`].
    #[must_use]
    pub fn from_report_token(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL
            .into_iter()
            .find(|ty| ty.report_token().eq_ignore_ascii_case(token))
    }

    /// Default length the platform reports for a field of this type.
    #[must_use]
    pub fn default_length(&self) -> u32 {
        match self {
            FieldType::SmallInteger => 2,
            FieldType::OID | FieldType::Integer | FieldType::Single => 4,
            FieldType::BigInteger | FieldType::Double | FieldType::Date => 8,
            FieldType::String => 255,
            FieldType::GUID | FieldType::GlobalID => 38,
            FieldType::Geometry | FieldType::Blob | FieldType::Raster => 0,
        }
    }

    /// Returns `true` for types whose values are text.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            FieldType::String | FieldType::GUID | FieldType::GlobalID
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = FormatError;

    /// Parses a platform type name case-insensitively; `Float` is accepted for `Single`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.eq_ignore_ascii_case("Float") {
            return Ok(FieldType::Single);
        }
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| FormatError::UnknownFieldType {
                token: s.to_string(),
            })
    }
}

/// Metadata for one field, as reported by the host platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name
    pub name: String,
    /// Display alias
    pub alias: String,
    /// Field type
    pub field_type: FieldType,
    /// Declared length
    pub length: u32,
    /// Numeric precision
    pub precision: u32,
    /// Numeric scale
    pub scale: u32,
    /// Whether the field accepts nulls
    pub is_nullable: bool,
    /// Whether the platform requires the field (it cannot be deleted)
    pub required: bool,
    /// Attribute domain name, empty when none
    pub domain: String,
    /// Default value, if any
    pub default_value: Option<String>,
    /// Whether the field is editable
    pub editable: bool,
    /// Unqualified field name
    pub base_name: String,
}

impl FieldDescriptor {
    /// Creates a nullable, editable, non-required field with the type's default length.
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        Self {
            alias: name.clone(),
            base_name: name.clone(),
            name,
            field_type,
            length: field_type.default_length(),
            precision: 0,
            scale: 0,
            is_nullable: true,
            required: false,
            domain: String::new(),
            default_value: None,
            editable: true,
        }
    }

    /// Creates the platform-maintained object identifier field.
    #[must_use]
    pub fn object_id(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::OID)
            .with_nullable(false)
            .with_required(true)
            .with_editable(false)
    }

    /// Creates the required geometry field of a feature class.
    #[must_use]
    pub fn geometry(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Geometry).with_required(true)
    }

    /// Set the alias
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    /// Set the declared length
    #[must_use]
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }

    /// Set precision and scale
    #[must_use]
    pub fn with_precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }

    /// Set nullability
    #[must_use]
    pub fn with_nullable(mut self, is_nullable: bool) -> Self {
        self.is_nullable = is_nullable;
        self
    }

    /// Set the required flag
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Set the domain name
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the default value
    #[must_use]
    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Set the editable flag
    #[must_use]
    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }
}

/// A scalar read from one column of one row.
///
/// Values are totally ordered and hashable so they can be collected into sets.
/// Doubles compare with [`f64::total_cmp`]. Values of different variants order
/// by variant: null first, then numbers, text, dates, geometries and blobs.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// Missing value
    Null,
    /// Integer of any width
    Integer(i64),
    /// Floating point number
    Double(f64),
    /// Text
    Text(String),
    /// Date or timestamp rendered as ISO 8601 text
    Date(String),
    /// Serialized geometry (WKT or `GeoJSON`)
    Geometry(String),
    /// Binary payload
    Blob(Vec<u8>),
}

impl FieldValue {
    fn rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Integer(_) => 1,
            FieldValue::Double(_) => 2,
            FieldValue::Text(_) => 3,
            FieldValue::Date(_) => 4,
            FieldValue::Geometry(_) => 5,
            FieldValue::Blob(_) => 6,
        }
    }

    /// Returns `true` for [`FieldValue::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Returns the text if this is a [`FieldValue::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Number of characters in the rendered value, `None` for nulls.
    ///
    /// # Examples
    ///
    /// ```
    /// use geoschema_core_common::FieldValue;
    ///
    /// assert_eq!(FieldValue::Text("héllo".into()).rendered_len(), Some(5));
    /// assert_eq!(FieldValue::Integer(-120).rendered_len(), Some(4));
    /// assert_eq!(FieldValue::Null.rendered_len(), None);
    /// ```
    #[must_use]
    pub fn rendered_len(&self) -> Option<usize> {
        match self {
            FieldValue::Null => None,
            FieldValue::Text(text) | FieldValue::Date(text) | FieldValue::Geometry(text) => {
                Some(text.chars().count())
            },
            FieldValue::Blob(bytes) => Some(bytes.len()),
            FieldValue::Integer(_) | FieldValue::Double(_) => Some(self.to_string().chars().count()),
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FieldValue {}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a.cmp(b),
            (FieldValue::Double(a), FieldValue::Double(b)) => a.total_cmp(b),
            (FieldValue::Text(a), FieldValue::Text(b))
            | (FieldValue::Date(a), FieldValue::Date(b))
            | (FieldValue::Geometry(a), FieldValue::Geometry(b)) => a.cmp(b),
            (FieldValue::Blob(a), FieldValue::Blob(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            FieldValue::Null => {},
            FieldValue::Integer(value) => value.hash(state),
            FieldValue::Double(value) => value.to_bits().hash(state),
            FieldValue::Text(text) | FieldValue::Date(text) | FieldValue::Geometry(text) => {
                text.hash(state);
            },
            FieldValue::Blob(bytes) => bytes.hash(state),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str(NULL_TOKEN),
            FieldValue::Integer(value) => write!(f, "{value}"),
            FieldValue::Double(value) => write!(f, "{value}"),
            FieldValue::Text(text) | FieldValue::Date(text) | FieldValue::Geometry(text) => {
                f.write_str(text)
            },
            FieldValue::Blob(bytes) => write!(f, "<Blob {} bytes>", bytes.len()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Double(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}
