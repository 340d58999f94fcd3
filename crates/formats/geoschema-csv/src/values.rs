//! Conversion of Arrow columns into [`FieldValue`]s.

use arrow_array::cast::AsArray;
use arrow_array::types::{Float64Type, Int64Type};
use arrow_array::{Array, ArrayRef};
use arrow_cast::cast;
use arrow_cast::display::{ArrayFormatter, FormatOptions};
use arrow_schema::{ArrowError, DataType};
use geoschema_core_common::FieldValue;

/// Converts every slot of `array` into a [`FieldValue`].
///
/// Integers and booleans become [`FieldValue::Integer`], floats
/// [`FieldValue::Double`], temporal values ISO text in [`FieldValue::Date`].
/// Text becomes [`FieldValue::Geometry`] when `as_geometry` is set.
pub(crate) fn column_values(
    array: &ArrayRef,
    as_geometry: bool,
) -> Result<Vec<FieldValue>, ArrowError> {
    let data_type = array.data_type();

    if data_type.is_integer() || *data_type == DataType::Boolean {
        let ints = cast(array.as_ref(), &DataType::Int64)?;
        return Ok(ints
            .as_primitive::<Int64Type>()
            .iter()
            .map(|v| v.map_or(FieldValue::Null, FieldValue::Integer))
            .collect());
    }

    if data_type.is_floating() {
        let floats = cast(array.as_ref(), &DataType::Float64)?;
        return Ok(floats
            .as_primitive::<Float64Type>()
            .iter()
            .map(|v| v.map_or(FieldValue::Null, FieldValue::Double))
            .collect());
    }

    match data_type {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View | DataType::Null => {
            let strings = cast(array.as_ref(), &DataType::Utf8)?;
            Ok(strings
                .as_string::<i32>()
                .iter()
                .map(|v| match v {
                    None => FieldValue::Null,
                    Some(text) if as_geometry => FieldValue::Geometry(text.to_string()),
                    Some(text) => FieldValue::Text(text.to_string()),
                })
                .collect())
        },
        DataType::Binary | DataType::LargeBinary => {
            let bytes = cast(array.as_ref(), &DataType::Binary)?;
            Ok(bytes
                .as_binary::<i32>()
                .iter()
                .map(|v| v.map_or(FieldValue::Null, |b| FieldValue::Blob(b.to_vec())))
                .collect())
        },
        other => {
            let temporal = other.is_temporal();
            let formatter = ArrayFormatter::try_new(array.as_ref(), &FormatOptions::default())?;
            Ok((0..array.len())
                .map(|row| {
                    if array.is_null(row) {
                        FieldValue::Null
                    } else if temporal {
                        FieldValue::Date(formatter.value(row).to_string())
                    } else {
                        FieldValue::Text(formatter.value(row).to_string())
                    }
                })
                .collect())
        },
    }
}

/// Returns `true` if an `Int64` column holds a value outside the 32-bit range.
pub(crate) fn exceeds_i32(array: &ArrayRef) -> bool {
    array.data_type() == &DataType::Int64
        && array
            .as_primitive::<Int64Type>()
            .iter()
            .flatten()
            .any(|value| i32::try_from(value).is_err())
}
