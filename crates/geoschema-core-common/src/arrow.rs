//! Mapping from Arrow data types to platform field types.

use arrow_schema::DataType;

use crate::types::FieldType;

/// Extension trait mapping an Arrow [`DataType`] onto the platform's [`FieldType`].
///
/// # Examples
///
/// ```
/// use arrow_schema::DataType;
/// use geoschema_core_common::FieldType;
/// use geoschema_core_common::arrow::ArrowDataTypeExt;
///
/// assert_eq!(DataType::Int16.field_type(), FieldType::SmallInteger);
/// assert_eq!(DataType::Utf8.field_type(), FieldType::String);
/// ```
pub trait ArrowDataTypeExt {
    /// The platform field type used to report a column of this Arrow type.
    ///
    /// `Int64` maps to [`FieldType::Integer`]; backends widen it to
    /// [`FieldType::BigInteger`] once they see a value outside the 32-bit range.
    fn field_type(&self) -> FieldType;
}

impl ArrowDataTypeExt for DataType {
    fn field_type(&self) -> FieldType {
        match self {
            DataType::Boolean | DataType::Int8 | DataType::Int16 | DataType::UInt8 => {
                FieldType::SmallInteger
            },
            DataType::Int32 | DataType::Int64 | DataType::UInt16 | DataType::UInt32 => {
                FieldType::Integer
            },
            DataType::UInt64 => FieldType::BigInteger,
            DataType::Float16 | DataType::Float32 => FieldType::Single,
            DataType::Float64 | DataType::Decimal128(_, _) | DataType::Decimal256(_, _) => {
                FieldType::Double
            },
            DataType::Date32
            | DataType::Date64
            | DataType::Timestamp(_, _)
            | DataType::Time32(_)
            | DataType::Time64(_) => FieldType::Date,
            DataType::Binary | DataType::LargeBinary | DataType::FixedSizeBinary(_) => {
                FieldType::Blob
            },
            _ => FieldType::String,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_schema::TimeUnit;

    #[test]
    fn test_integer_types() {
        assert_eq!(DataType::Boolean.field_type(), FieldType::SmallInteger);
        assert_eq!(DataType::Int8.field_type(), FieldType::SmallInteger);
        assert_eq!(DataType::Int32.field_type(), FieldType::Integer);
        assert_eq!(DataType::Int64.field_type(), FieldType::Integer);
        assert_eq!(DataType::UInt64.field_type(), FieldType::BigInteger);
    }

    #[test]
    fn test_float_types() {
        assert_eq!(DataType::Float32.field_type(), FieldType::Single);
        assert_eq!(DataType::Float64.field_type(), FieldType::Double);
    }

    #[test]
    fn test_temporal_types() {
        assert_eq!(DataType::Date32.field_type(), FieldType::Date);
        assert_eq!(
            DataType::Timestamp(TimeUnit::Second, Some("UTC".into())).field_type(),
            FieldType::Date
        );
    }

    #[test]
    fn test_fallback_is_text() {
        assert_eq!(DataType::Utf8.field_type(), FieldType::String);
        assert_eq!(DataType::LargeUtf8.field_type(), FieldType::String);
        assert_eq!(DataType::Null.field_type(), FieldType::String);
        assert_eq!(DataType::Binary.field_type(), FieldType::Blob);
    }
}
