//! Attribute values: a typed value tagged with its datatype.

use std::fmt::{self, Display};

use serde::de::Error as _;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::datatype::Canonical;
use crate::identifiers::Identifier;
use crate::registry::default_factory;
use crate::value::Value;

/// A converted value together with the datatype that produced it and the
/// category of the node it was read from.
///
/// Built only by a datatype's `create_attribute_value*` methods, so the
/// identifier always matches the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeValue<T> {
    data_type: Identifier,
    value: T,
    category: Option<Identifier>,
}

impl<T> AttributeValue<T> {
    pub(crate) fn new(data_type: Identifier, value: T, category: Option<Identifier>) -> Self {
        Self {
            data_type,
            value,
            category,
        }
    }

    pub fn data_type(&self) -> &Identifier {
        &self.data_type
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn category(&self) -> Option<&Identifier> {
        self.category.as_ref()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T: Canonical> AttributeValue<T> {
    /// Erases the static type.
    pub fn into_dynamic(self) -> AttributeValue<Value> {
        AttributeValue {
            data_type: self.data_type,
            value: self.value.into_value(),
            category: self.category,
        }
    }
}

impl<T: Canonical> Display for AttributeValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value.to_canonical())
    }
}

/// XACML JSON profile form: `{"DataType": ..., "Value": ...}` plus an
/// optional `"Category"`.
impl<T: Canonical> Serialize for AttributeValue<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.category.is_some() { 3 } else { 2 };
        let mut state = serializer.serialize_struct("AttributeValue", fields)?;
        state.serialize_field("DataType", &self.data_type)?;
        state.serialize_field("Value", &self.value.to_json())?;
        if let Some(category) = &self.category {
            state.serialize_field("Category", category)?;
        }
        state.end()
    }
}

#[derive(Deserialize)]
struct RawAttributeValue {
    #[serde(rename = "DataType")]
    data_type: String,
    #[serde(rename = "Value")]
    value: serde_json::Value,
    #[serde(rename = "Category", default)]
    category: Option<Identifier>,
}

/// Deserializes through the default registry.
impl<'de> Deserialize<'de> for AttributeValue<Value> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawAttributeValue::deserialize(deserializer)?;
        let factory = default_factory();
        let data_type = factory.require(&raw.data_type).map_err(D::Error::custom)?;
        let value = Value::from_json(&raw.value, &raw.data_type, factory).map_err(D::Error::custom)?;
        Ok(AttributeValue::new(data_type.data_type_id().clone(), value, raw.category))
    }
}
