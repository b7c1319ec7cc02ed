//! The datatype conversion framework.
//!
//! A datatype turns a [`Source`] into a typed value and renders values back
//! to canonical text. [`DataType`] is the statically typed view used when the
//! target type is known at compile time; [`DynDataType`] is the type-erased
//! view the registry hands out.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use tracing::{debug, trace};
use xacml_types::ValueError;

use crate::attribute::AttributeValue;
use crate::error::{DataTypeError, Result};
use crate::identifiers::Identifier;
use crate::source::Source;
use crate::value::Value;

// ============================================================================
// Value traits
// ============================================================================

/// A value with a canonical lexical form.
pub trait Canonical: Clone + fmt::Debug + Send + Sync + 'static {
    fn to_canonical(&self) -> String;

    fn into_value(self) -> Value;

    /// XACML JSON profile rendering.
    fn to_json(&self) -> serde_json::Value {
        self.clone().into_value().to_json()
    }
}

/// A Rust type that exactly one built-in datatype converts into.
pub trait ValueType: Canonical {
    /// Short XML Schema / XACML name, e.g. `dateTime`.
    const TYPE_NAME: &'static str;

    /// Whether values of this type have an order.
    const ORDERED: bool;

    /// Parses the lexical form.
    fn parse_text(text: &str) -> std::result::Result<Self, ValueError>;

    /// Borrows the value out of a type-erased value of the same type.
    fn from_value(value: &Value) -> Option<&Self>;

    /// Accepts non-text sources that already carry this type, such as a
    /// boolean for `boolean` or raw bytes for the binary types.
    fn from_typed_source(_source: &Source) -> Option<Self> {
        None
    }

    /// Orders two values; `Ok(None)` when the type or the pair is unordered.
    fn compare(&self, _other: &Self) -> std::result::Result<Option<Ordering>, ValueError> {
        Ok(None)
    }
}

impl Canonical for Value {
    fn to_canonical(&self) -> String {
        self.to_string()
    }

    fn into_value(self) -> Value {
        self
    }

    fn to_json(&self) -> serde_json::Value {
        Value::to_json(self)
    }
}

// ============================================================================
// DataType
// ============================================================================

/// A datatype with a statically known value type.
pub trait DataType: Send + Sync {
    type Value: ValueType;

    fn id(&self) -> &Identifier;

    /// Converts a source to a value.
    ///
    /// A source that already holds a value of this type is returned as is.
    /// Anything else is read as text and parsed; single-element sequences
    /// stand for their element.
    fn convert(&self, source: &Source) -> Result<Self::Value>;

    /// Converts an optional source; absence stays absence.
    fn convert_optional(&self, source: Option<&Source>) -> Result<Option<Self::Value>> {
        source.map(|source| self.convert(source)).transpose()
    }

    fn to_string_value(&self, value: &Self::Value) -> String {
        value.to_canonical()
    }

    /// Converts the source and tags it with this datatype and, for node
    /// sources, the node's category.
    fn create_attribute_value(&self, source: &Source) -> Result<AttributeValue<Self::Value>> {
        self.create_attribute_value_with_category(source, source.category().cloned())
    }

    fn create_attribute_value_with_category(
        &self,
        source: &Source,
        category: Option<Identifier>,
    ) -> Result<AttributeValue<Self::Value>> {
        let value = self.convert(source)?;
        Ok(AttributeValue::new(self.id().clone(), value, category))
    }
}

/// The one [`DataType`] implementation used by every built-in datatype: an
/// identifier bound to a [`ValueType`].
pub struct DataTypeBase<T> {
    id: Identifier,
    _marker: PhantomData<fn() -> T>,
}

impl<T> DataTypeBase<T> {
    pub const fn new(id: Identifier) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }
}

impl<T: ValueType> fmt::Debug for DataTypeBase<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataTypeBase")
            .field("type", &T::TYPE_NAME)
            .field("id", &self.id.as_str())
            .finish()
    }
}

impl<T: ValueType> DataType for DataTypeBase<T> {
    type Value = T;

    fn id(&self) -> &Identifier {
        &self.id
    }

    fn convert(&self, source: &Source) -> Result<T> {
        let source = source.flatten();

        if let Source::Value(value) = source {
            if let Some(typed) = T::from_value(value) {
                return Ok(typed.clone());
            }
        }
        if let Some(typed) = T::from_typed_source(source) {
            return Ok(typed);
        }

        let Some(text) = source.to_text() else {
            debug!(
                data_type = T::TYPE_NAME,
                source_type = source.kind_name(),
                "Source has no textual form"
            );
            return Err(DataTypeError::UnsupportedSource {
                data_type: self.id.to_string(),
                source_type: source.kind_name(),
            });
        };

        T::parse_text(&text).map_err(|cause| {
            debug!(
                data_type = T::TYPE_NAME,
                source_type = source.kind_name(),
                error = %cause,
                "Conversion failed"
            );
            DataTypeError::Conversion {
                data_type: self.id.to_string(),
                source_type: source.kind_name(),
                source_text: text.into_owned(),
                cause,
            }
        })
    }
}

// ============================================================================
// DynDataType
// ============================================================================

/// Type-erased datatype, as stored in the registry.
pub trait DynDataType: Send + Sync + fmt::Debug {
    fn data_type_id(&self) -> &Identifier;

    fn type_name(&self) -> &'static str;

    fn is_ordered(&self) -> bool;

    fn convert_value(&self, source: &Source) -> Result<Value>;

    fn create_value(
        &self,
        source: &Source,
        category: Option<Identifier>,
    ) -> Result<AttributeValue<Value>>;

    /// Renders a value of this datatype; values of other types are rejected.
    fn render_value(&self, value: &Value) -> Result<String>;

    /// Orders two values of this datatype. `Ok(None)` for unordered types.
    fn compare_values(&self, left: &Value, right: &Value) -> Result<Option<Ordering>>;
}

impl<T: ValueType> DataTypeBase<T> {
    fn downcast<'v>(&self, value: &'v Value) -> Result<&'v T> {
        T::from_value(value).ok_or_else(|| DataTypeError::ValueMismatch {
            data_type: self.id.to_string(),
            value_type: value.type_name(),
        })
    }
}

impl<T: ValueType> DynDataType for DataTypeBase<T> {
    fn data_type_id(&self) -> &Identifier {
        &self.id
    }

    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn is_ordered(&self) -> bool {
        T::ORDERED
    }

    fn convert_value(&self, source: &Source) -> Result<Value> {
        self.convert(source).map(Canonical::into_value)
    }

    fn create_value(
        &self,
        source: &Source,
        category: Option<Identifier>,
    ) -> Result<AttributeValue<Value>> {
        self.create_attribute_value_with_category(source, category)
            .map(AttributeValue::into_dynamic)
    }

    fn render_value(&self, value: &Value) -> Result<String> {
        self.downcast(value).map(Canonical::to_canonical)
    }

    fn compare_values(&self, left: &Value, right: &Value) -> Result<Option<Ordering>> {
        let (left, right) = (self.downcast(left)?, self.downcast(right)?);
        left.compare(right).map_err(|cause| {
            trace!(data_type = T::TYPE_NAME, error = %cause, "Values cannot be ordered");
            DataTypeError::Comparison {
                data_type: self.id.to_string(),
                cause,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{BOOLEAN, DATE, DATE_TIME, HEX_BINARY, INTEGER, STRING};
    use crate::error::ErrorKind;
    use crate::source::TextNode;

    #[test]
    fn typed_value_source_is_returned_unchanged() {
        let date: xacml_types::Date = "2014-02-28Z".parse().unwrap();
        let converted = DATE.convert(&Source::Value(Value::Date(date))).unwrap();
        assert_eq!(converted, date);
    }

    #[test]
    fn other_typed_values_are_read_as_text() {
        let converted = STRING.convert(&Source::Value(Value::Integer(12))).unwrap();
        assert_eq!(converted, "12");
        let integer = INTEGER.convert(&Source::Value(Value::String("-3".into()))).unwrap();
        assert_eq!(integer, -3);
    }

    #[test]
    fn absent_source_stays_absent() {
        assert_eq!(DATE.convert_optional(None).unwrap(), None);
        assert!(DATE.convert_optional(Some(&Source::from("2014-02-28"))).unwrap().is_some());
    }

    #[test]
    fn conversion_failure_carries_context() {
        let err = DATE.convert(&Source::from("2014-02-30")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        match err {
            DataTypeError::Conversion {
                data_type,
                source_type,
                source_text,
                ..
            } => {
                assert_eq!(data_type, "http://www.w3.org/2001/XMLSchema#date");
                assert_eq!(source_type, "text");
                assert_eq!(source_text, "2014-02-30");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let malformed = DATE_TIME.convert(&Source::from("2014-02-28")).unwrap_err();
        assert_eq!(malformed.kind(), ErrorKind::Malformed);
        assert_eq!(malformed.cause().and_then(ValueError::offset), Some(10));
    }

    #[test]
    fn bytes_only_feed_binary_types() {
        let bytes = Source::Bytes(vec![0xca, 0xfe]);
        assert_eq!(HEX_BINARY.convert(&bytes).unwrap().to_string(), "cafe");
        let err = DATE.convert(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedSource);
    }

    #[test]
    fn sequences_concatenate() {
        let source = Source::Sequence(vec![
            Source::Node(TextNode::new("tr")),
            Source::Node(TextNode::new("ue")),
        ]);
        assert!(BOOLEAN.convert(&source).unwrap());
    }

    #[test]
    fn to_string_value_inverts_convert() {
        let value = DATE_TIME.convert(&Source::from("2014-02-28T13:45:07.250-05:00")).unwrap();
        assert_eq!(DATE_TIME.to_string_value(&value), "2014-02-28T13:45:07.250-05:00");
    }

    #[test]
    fn dyn_view_rejects_foreign_values() {
        let dyn_type: &dyn DynDataType = &DATE;
        let err = dyn_type.render_value(&Value::Integer(3)).unwrap_err();
        assert!(matches!(err, DataTypeError::ValueMismatch { value_type: "integer", .. }));
    }

    #[test]
    fn dyn_compare_reports_ambiguity() {
        let dyn_type: &dyn DynDataType = &DATE_TIME;
        assert!(dyn_type.is_ordered());
        let zoned = dyn_type.convert_value(&Source::from("2014-01-01T00:00:00Z")).unwrap();
        let floating = dyn_type.convert_value(&Source::from("2014-01-01T10:00:00")).unwrap();
        let later = dyn_type.convert_value(&Source::from("2014-01-02T00:00:00.001")).unwrap();

        let err = dyn_type.compare_values(&zoned, &floating).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AmbiguousComparison);
        assert_eq!(dyn_type.compare_values(&zoned, &later).unwrap(), Some(Ordering::Less));
    }
}
