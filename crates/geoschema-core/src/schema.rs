//! Field listings, field dictionaries and text reports of a dataset's schema.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use geoschema_core_common::{ConfigError, DataStore, FieldDescriptor, FieldType, Result};

/// Names the host platform uses for object id and shape bookkeeping fields.
pub const SHAPE_PSEUDO_FIELDS: [&str; 9] = [
    "OBJECTID",
    "FID",
    "SHAPE",
    "SHAPE_AREA",
    "SHAPE.AREA",
    "SHAPE.STAREA()",
    "SHAPE_LENGTH",
    "SHAPE.LEN",
    "SHAPE.STLENGTH()",
];

/// Returns `true` if `name` is one of [`SHAPE_PSEUDO_FIELDS`], ignoring case.
#[must_use]
pub fn is_shape_pseudo_field(name: &str) -> bool {
    SHAPE_PSEUDO_FIELDS
        .iter()
        .any(|pseudo| pseudo.eq_ignore_ascii_case(name))
}

/// Renders a flag the way the host platform prints booleans.
pub(crate) fn bool_token(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// Which fields [`list_field_names`] returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldSelection {
    #[default]
    All,
    RequiredOnly,
    NonRequiredOnly,
}

impl FieldSelection {
    #[must_use]
    pub fn includes(self, field: &FieldDescriptor) -> bool {
        match self {
            FieldSelection::All => true,
            FieldSelection::RequiredOnly => field.required,
            FieldSelection::NonRequiredOnly => !field.required,
        }
    }
}

/// Returns the names of the selected fields, in stored order.
///
/// # Errors
///
/// Returns the store's error if the dataset cannot be described.
pub fn list_field_names(
    store: &dyn DataStore,
    dataset: &str,
    selection: FieldSelection,
) -> Result<Vec<String>> {
    Ok(store
        .list_fields(dataset)?
        .into_iter()
        .filter(|field| selection.includes(field))
        .map(|field| field.name)
        .collect())
}

/// The reduced descriptor stored in a [`FieldDict`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSummary {
    pub name: String,
    pub alias: String,
    pub field_type: FieldType,
    pub length: u32,
    pub required: bool,
}

impl From<&FieldDescriptor> for FieldSummary {
    fn from(field: &FieldDescriptor) -> Self {
        Self {
            name: field.name.clone(),
            alias: field.alias.clone(),
            field_type: field.field_type,
            length: field.length,
            required: field.required,
        }
    }
}

/// Field summaries keyed by field name, sorted by key.
pub type FieldDict = BTreeMap<String, FieldSummary>;

/// How [`FieldDict`] keys are spelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyCase {
    /// Keys are the field names as stored.
    #[default]
    AsIs,
    /// Keys are upper-cased field names.
    Upper,
}

/// Options for [`make_field_dict`].
#[derive(Debug, Clone, Default)]
pub struct FieldDictOptions {
    /// Field names to leave out, matched case-sensitively
    pub ignore_fields: Vec<String>,
    /// Leave out fields the platform requires
    pub skip_required: bool,
    /// Spelling of the keys
    pub key_case: KeyCase,
    /// Leave out [`SHAPE_PSEUDO_FIELDS`]
    pub skip_shape_fields: bool,
}

impl FieldDictOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_ignore_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_skip_required(mut self, skip_required: bool) -> Self {
        self.skip_required = skip_required;
        self
    }

    #[must_use]
    pub fn with_key_case(mut self, key_case: KeyCase) -> Self {
        self.key_case = key_case;
        self
    }

    #[must_use]
    pub fn with_skip_shape_fields(mut self, skip_shape_fields: bool) -> Self {
        self.skip_shape_fields = skip_shape_fields;
        self
    }

    fn keeps(&self, field: &FieldDescriptor) -> bool {
        !(self.ignore_fields.iter().any(|name| *name == field.name)
            || (self.skip_required && field.required)
            || (self.skip_shape_fields && is_shape_pseudo_field(&field.name)))
    }
}

/// Builds a [`FieldDict`] from an already listed set of fields.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidOption`] if two kept fields map to the same
/// key, such as `Name` and `NAME` under [`KeyCase::Upper`].
pub fn build_field_dict(
    fields: &[FieldDescriptor],
    options: &FieldDictOptions,
) -> Result<FieldDict> {
    let mut dict = FieldDict::new();
    for field in fields.iter().filter(|field| options.keeps(field)) {
        let key = match options.key_case {
            KeyCase::AsIs => field.name.clone(),
            KeyCase::Upper => field.name.to_uppercase(),
        };
        match dict.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(FieldSummary::from(field));
            },
            Entry::Occupied(entry) => {
                return Err(ConfigError::InvalidOption {
                    option: "key_case".to_string(),
                    message: format!(
                        "fields '{}' and '{}' share the key '{}'",
                        entry.get().name,
                        field.name,
                        entry.key()
                    ),
                }
                .into());
            },
        }
    }
    Ok(dict)
}

/// Returns a sorted dictionary of the dataset's fields.
///
/// # Errors
///
/// Returns the store's error if the dataset cannot be described, and the
/// errors of [`build_field_dict`].
pub fn make_field_dict(
    store: &dyn DataStore,
    dataset: &str,
    options: &FieldDictOptions,
) -> Result<FieldDict> {
    build_field_dict(&store.list_fields(dataset)?, options)
}

const ALIGNED_ATTRIBUTES: [&str; 11] = [
    "name",
    "aliasName",
    "type",
    "baseName",
    "domain",
    "editable",
    "isNullable",
    "length",
    "precision",
    "required",
    "scale",
];

const SEPARATED_ATTRIBUTES: [&str; 12] = [
    "name",
    "baseName",
    "aliasName",
    "type",
    "length",
    "precision",
    "scale",
    "domain",
    "defaultValue",
    "editable",
    "isNullable",
    "required",
];

/// Renders one attribute of a field descriptor.
fn attribute(field: &FieldDescriptor, name: &str) -> String {
    match name {
        "name" => field.name.clone(),
        "aliasName" => field.alias.clone(),
        "type" => field.field_type.to_string(),
        "baseName" => field.base_name.clone(),
        "domain" => field.domain.clone(),
        "defaultValue" => field
            .default_value
            .clone()
            .unwrap_or_else(|| "None".to_string()),
        "editable" => bool_token(field.editable).to_string(),
        "isNullable" => bool_token(field.is_nullable).to_string(),
        "required" => bool_token(field.required).to_string(),
        "length" => field.length.to_string(),
        "precision" => field.precision.to_string(),
        "scale" => field.scale.to_string(),
        _ => String::new(),
    }
}

fn aligned_line<I, S>(cells: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut line: String = cells
        .into_iter()
        .map(|cell| format!("{:>12}", cell.as_ref()))
        .collect();
    line.push('\n');
    line
}

/// Returns the field table as column-aligned text.
///
/// A header line is followed by one line per field; every cell is right
/// aligned in 12 characters. Longer values are not truncated.
///
/// # Errors
///
/// Returns the store's error if the dataset cannot be described.
pub fn pprint_fields(store: &dyn DataStore, dataset: &str) -> Result<String> {
    let fields = store.list_fields(dataset)?;
    let mut output = aligned_line(ALIGNED_ATTRIBUTES);
    for field in &fields {
        output.push_str(&aligned_line(
            ALIGNED_ATTRIBUTES.iter().map(|name| attribute(field, name)),
        ));
    }
    Ok(output)
}

/// Returns the field table as `sep`-separated text, one line per field after
/// a header line. Every line ends with a newline.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidOption`] for an empty separator, or the
/// store's error if the dataset cannot be described.
///
/// # Examples
///
/// ```
/// use geoschema_core::schema::get_field_info_as_text;
/// use geoschema_core::store::{MemoryStore, MemoryTable};
/// use geoschema_core_common::{DatasetKind, FieldDescriptor};
///
/// let store = MemoryStore::new().with_table(
///     "t",
///     MemoryTable::new(DatasetKind::Table, vec![FieldDescriptor::object_id("OBJECTID")]),
/// );
/// let text = get_field_info_as_text(&store, "t", ",")?;
/// let mut lines = text.lines();
/// assert_eq!(
///     lines.next(),
///     Some("name,baseName,aliasName,type,length,precision,scale,domain,defaultValue,editable,isNullable,required")
/// );
/// assert_eq!(
///     lines.next(),
///     Some("OBJECTID,OBJECTID,OBJECTID,OID,4,0,0,,None,False,False,True")
/// );
/// # Ok::<(), geoschema_core_common::GeoSchemaError>(())
/// ```
pub fn get_field_info_as_text(store: &dyn DataStore, dataset: &str, sep: &str) -> Result<String> {
    if sep.is_empty() {
        return Err(ConfigError::InvalidOption {
            option: "separator".to_string(),
            message: "the separator must not be empty".to_string(),
        }
        .into());
    }

    let fields = store.list_fields(dataset)?;
    let mut output = SEPARATED_ATTRIBUTES.join(sep);
    output.push('\n');
    for field in &fields {
        let cells: Vec<String> = SEPARATED_ATTRIBUTES
            .iter()
            .map(|name| attribute(field, name))
            .collect();
        output.push_str(&cells.join(sep));
        output.push('\n');
    }
    Ok(output)
}
