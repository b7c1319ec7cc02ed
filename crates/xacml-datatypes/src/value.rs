//! Type-erased attribute values.

#![allow(clippy::match_same_arms)]

use std::cmp::Ordering;
use std::fmt::{self, Display};

use serde::{Serialize, Serializer};
use xacml_types::{
    AnyUri, Base64Binary, Date, DateTime, DayTimeDuration, DnsName, HexBinary, IpAddress,
    Rfc822Name, Time, ValueError, YearMonthDuration,
};

use crate::builtin::render_double;
use crate::error::{DataTypeError, Result};
use crate::identifiers::{self, Identifier};
use crate::registry::DataTypeFactory;
use crate::source::Source;

/// A typed attribute value of any built-in datatype.
///
/// Used where the datatype is only known at runtime: registry lookups,
/// JSON requests, and heterogeneous bags.
#[derive(Debug, Clone)]
pub enum Value {
    // ===== Scalar Types =====
    String(String),
    Boolean(bool),
    Integer(i64),
    /// IEEE 754 double; `INF`, `-INF` and `NaN` are legal.
    Double(f64),
    AnyUri(AnyUri),

    // ===== Binary Types =====
    HexBinary(HexBinary),
    Base64Binary(Base64Binary),

    // ===== Temporal Types =====
    Date(Date),
    Time(Time),
    DateTime(DateTime),
    DayTimeDuration(DayTimeDuration),
    YearMonthDuration(YearMonthDuration),

    // ===== Name and Network Types =====
    Rfc822Name(Rfc822Name),
    DnsName(DnsName),
    IpAddress(IpAddress),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            // Bitwise, so NaN equals itself and the value can be hashed.
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::AnyUri(a), Value::AnyUri(b)) => a == b,
            (Value::HexBinary(a), Value::HexBinary(b)) => a == b,
            (Value::Base64Binary(a), Value::Base64Binary(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::DayTimeDuration(a), Value::DayTimeDuration(b)) => a == b,
            (Value::YearMonthDuration(a), Value::YearMonthDuration(b)) => a == b,
            (Value::Rfc822Name(a), Value::Rfc822Name(b)) => a == b,
            (Value::DnsName(a), Value::DnsName(b)) => a == b,
            (Value::IpAddress(a), Value::IpAddress(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(v) => v.hash(state),
            Value::Boolean(v) => v.hash(state),
            Value::Integer(v) => v.hash(state),
            Value::Double(v) => v.to_bits().hash(state),
            Value::AnyUri(v) => v.hash(state),
            Value::HexBinary(v) => v.hash(state),
            Value::Base64Binary(v) => v.hash(state),
            Value::Date(v) => v.hash(state),
            Value::Time(v) => v.hash(state),
            Value::DateTime(v) => v.hash(state),
            Value::DayTimeDuration(v) => v.hash(state),
            Value::YearMonthDuration(v) => v.hash(state),
            Value::Rfc822Name(v) => v.hash(state),
            Value::DnsName(v) => v.hash(state),
            Value::IpAddress(v) => v.hash(state),
        }
    }
}

impl Value {
    /// Short XML Schema / XACML name of the value's datatype.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Double(_) => "double",
            Value::AnyUri(_) => "anyURI",
            Value::HexBinary(_) => "hexBinary",
            Value::Base64Binary(_) => "base64Binary",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "dateTime",
            Value::DayTimeDuration(_) => "dayTimeDuration",
            Value::YearMonthDuration(_) => "yearMonthDuration",
            Value::Rfc822Name(_) => "rfc822Name",
            Value::DnsName(_) => "dnsName",
            Value::IpAddress(_) => "ipAddress",
        }
    }

    /// The XACML 3.0 identifier of the value's datatype.
    pub fn data_type_id(&self) -> Identifier {
        match self {
            Value::String(_) => identifiers::STRING,
            Value::Boolean(_) => identifiers::BOOLEAN,
            Value::Integer(_) => identifiers::INTEGER,
            Value::Double(_) => identifiers::DOUBLE,
            Value::AnyUri(_) => identifiers::ANY_URI,
            Value::HexBinary(_) => identifiers::HEX_BINARY,
            Value::Base64Binary(_) => identifiers::BASE64_BINARY,
            Value::Date(_) => identifiers::DATE,
            Value::Time(_) => identifiers::TIME,
            Value::DateTime(_) => identifiers::DATE_TIME,
            Value::DayTimeDuration(_) => identifiers::DAY_TIME_DURATION,
            Value::YearMonthDuration(_) => identifiers::YEAR_MONTH_DURATION,
            Value::Rfc822Name(_) => identifiers::RFC822_NAME,
            Value::DnsName(_) => identifiers::DNS_NAME,
            Value::IpAddress(_) => identifiers::IP_ADDRESS,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<&DateTime> {
        match self {
            Value::DateTime(v) => Some(v),
            _ => None,
        }
    }

    /// Orders two values of the same datatype.
    ///
    /// Returns `Ok(None)` for values of different datatypes and for
    /// datatypes without an order (binary, names, addresses, booleans, and
    /// `NaN`). Mixed zoned/floating instants that are too close to order
    /// yield [`ValueError::AmbiguousComparison`].
    pub fn compare(&self, other: &Value) -> std::result::Result<Option<Ordering>, ValueError> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
            (Value::Integer(a), Value::Integer(b)) => Ok(Some(a.cmp(b))),
            (Value::Double(a), Value::Double(b)) => Ok(a.partial_cmp(b)),
            (Value::Date(a), Value::Date(b)) => a.try_cmp(b).map(Some),
            (Value::Time(a), Value::Time(b)) => a.try_cmp(b).map(Some),
            (Value::DateTime(a), Value::DateTime(b)) => a.try_cmp(b).map(Some),
            (Value::DayTimeDuration(a), Value::DayTimeDuration(b)) => Ok(Some(a.cmp(b))),
            (Value::YearMonthDuration(a), Value::YearMonthDuration(b)) => Ok(Some(a.cmp(b))),
            _ => Ok(None),
        }
    }

    /// Converts this value to its XACML JSON profile form.
    ///
    /// Booleans and integers are native JSON; finite doubles are numbers and
    /// the special doubles are the strings `INF`, `-INF` and `NaN`.
    /// Everything else is its canonical string.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(v) => serde_json::Value::Number((*v).into()),
            Value::Double(v) => serde_json::Number::from_f64(*v).map_or_else(
                || serde_json::Value::String(render_double(*v)),
                serde_json::Value::Number,
            ),
            other => serde_json::Value::String(other.to_string()),
        }
    }

    /// Converts a JSON value to a value of the given datatype.
    pub fn from_json(
        json: &serde_json::Value,
        data_type: &str,
        factory: &DataTypeFactory,
    ) -> Result<Self> {
        let source = match json {
            serde_json::Value::String(s) => Source::Text(s.clone()),
            serde_json::Value::Bool(b) => Source::Boolean(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(v) => Source::Integer(v),
                None => Source::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            other => {
                return Err(DataTypeError::UnsupportedSource {
                    data_type: data_type.to_string(),
                    source_type: json_kind(other),
                });
            }
        };
        factory.convert(data_type, &source)
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "JSON null",
        serde_json::Value::Bool(_) => "JSON boolean",
        serde_json::Value::Number(_) => "JSON number",
        serde_json::Value::String(_) => "JSON string",
        serde_json::Value::Array(_) => "JSON array",
        serde_json::Value::Object(_) => "JSON object",
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Renders the canonical lexical form.
impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(v) => f.write_str(v),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Double(v) => f.write_str(&render_double(*v)),
            Value::AnyUri(v) => write!(f, "{v}"),
            Value::HexBinary(v) => write!(f, "{v}"),
            Value::Base64Binary(v) => write!(f, "{v}"),
            Value::Date(v) => write!(f, "{v}"),
            Value::Time(v) => write!(f, "{v}"),
            Value::DateTime(v) => write!(f, "{v}"),
            Value::DayTimeDuration(v) => write!(f, "{v}"),
            Value::YearMonthDuration(v) => write!(f, "{v}"),
            Value::Rfc822Name(v) => write!(f, "{v}"),
            Value::DnsName(v) => write!(f, "{v}"),
            Value::IpAddress(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! value_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from!(
    String(String),
    Boolean(bool),
    Integer(i64),
    Double(f64),
    AnyUri(AnyUri),
    HexBinary(HexBinary),
    Base64Binary(Base64Binary),
    Date(Date),
    Time(Time),
    DateTime(DateTime),
    DayTimeDuration(DayTimeDuration),
    YearMonthDuration(YearMonthDuration),
    Rfc822Name(Rfc822Name),
    DnsName(DnsName),
    IpAddress(IpAddress),
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_equals_itself() {
        assert_eq!(Value::Double(f64::NAN), Value::Double(f64::NAN));
        assert_ne!(Value::Double(0.0), Value::Double(-0.0));
    }

    #[test]
    fn different_types_are_unequal_and_unordered() {
        assert_ne!(Value::Integer(1), Value::Double(1.0));
        assert_eq!(Value::Integer(1).compare(&Value::Double(1.0)), Ok(None));
    }

    #[test]
    fn temporal_compare_propagates_ambiguity() {
        let zoned = Value::DateTime("2014-01-01T00:00:00Z".parse().unwrap());
        let floating = Value::DateTime("2014-01-01T05:00:00".parse().unwrap());
        assert!(matches!(
            zoned.compare(&floating),
            Err(ValueError::AmbiguousComparison { .. })
        ));
    }

    #[test]
    fn json_forms() {
        assert_eq!(Value::Boolean(true).to_json(), serde_json::json!(true));
        assert_eq!(Value::Integer(-4).to_json(), serde_json::json!(-4));
        assert_eq!(Value::Double(2.5).to_json(), serde_json::json!(2.5));
        assert_eq!(Value::Double(f64::INFINITY).to_json(), serde_json::json!("INF"));
        let date = Value::Date("2014-02-28".parse().unwrap());
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"2014-02-28\"");
    }

    #[test]
    fn from_json_uses_the_factory() {
        let factory = DataTypeFactory::new();
        let value = Value::from_json(
            &serde_json::json!("PT36H"),
            identifiers::DAY_TIME_DURATION.as_str(),
            &factory,
        )
        .unwrap();
        assert_eq!(value.to_string(), "P1DT12H");

        let err = Value::from_json(&serde_json::json!([1]), identifiers::INTEGER.as_str(), &factory)
            .unwrap_err();
        assert!(matches!(err, DataTypeError::UnsupportedSource { .. }));
    }
}
