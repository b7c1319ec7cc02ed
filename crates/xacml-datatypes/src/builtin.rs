//! The built-in XACML datatypes.
//!
//! Each datatype is a stateless `static` singleton. The registry in
//! [`crate::registry`] indexes them by identifier.

use std::cmp::Ordering;

use xacml_types::{
    AnyUri, Base64Binary, Date, DateTime, DayTimeDuration, DnsName, HexBinary, IpAddress,
    Rfc822Name, Time, ValueError, YearMonthDuration,
};

use crate::datatype::{Canonical, DataTypeBase, ValueType};
use crate::identifiers;
use crate::source::Source;
use crate::value::Value;

type CompareResult = std::result::Result<Option<Ordering>, ValueError>;

// ============================================================================
// Singletons
// ============================================================================

pub static STRING: DataTypeBase<String> = DataTypeBase::new(identifiers::STRING);
pub static BOOLEAN: DataTypeBase<bool> = DataTypeBase::new(identifiers::BOOLEAN);
pub static INTEGER: DataTypeBase<i64> = DataTypeBase::new(identifiers::INTEGER);
pub static DOUBLE: DataTypeBase<f64> = DataTypeBase::new(identifiers::DOUBLE);
pub static ANY_URI: DataTypeBase<AnyUri> = DataTypeBase::new(identifiers::ANY_URI);
pub static HEX_BINARY: DataTypeBase<HexBinary> = DataTypeBase::new(identifiers::HEX_BINARY);
pub static BASE64_BINARY: DataTypeBase<Base64Binary> =
    DataTypeBase::new(identifiers::BASE64_BINARY);
pub static DATE: DataTypeBase<Date> = DataTypeBase::new(identifiers::DATE);
pub static TIME: DataTypeBase<Time> = DataTypeBase::new(identifiers::TIME);
pub static DATE_TIME: DataTypeBase<DateTime> = DataTypeBase::new(identifiers::DATE_TIME);
pub static DAY_TIME_DURATION: DataTypeBase<DayTimeDuration> =
    DataTypeBase::new(identifiers::DAY_TIME_DURATION);
pub static YEAR_MONTH_DURATION: DataTypeBase<YearMonthDuration> =
    DataTypeBase::new(identifiers::YEAR_MONTH_DURATION);
pub static RFC822_NAME: DataTypeBase<Rfc822Name> = DataTypeBase::new(identifiers::RFC822_NAME);
pub static DNS_NAME: DataTypeBase<DnsName> = DataTypeBase::new(identifiers::DNS_NAME);
pub static IP_ADDRESS: DataTypeBase<IpAddress> = DataTypeBase::new(identifiers::IP_ADDRESS);

// ============================================================================
// Value types with a FromStr / Display lexical form
// ============================================================================

fn unordered<T>(_: &T, _: &T) -> CompareResult {
    Ok(None)
}

fn total<T: Ord>(a: &T, b: &T) -> CompareResult {
    Ok(Some(a.cmp(b)))
}

macro_rules! lexical_value_type {
    ($ty:ty, $variant:ident, $name:literal, ordered = $ordered:literal, compare = $cmp:expr) => {
        impl Canonical for $ty {
            fn to_canonical(&self) -> String {
                self.to_string()
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }

        impl ValueType for $ty {
            const TYPE_NAME: &'static str = $name;
            const ORDERED: bool = $ordered;

            fn parse_text(text: &str) -> std::result::Result<Self, ValueError> {
                text.parse()
            }

            fn from_value(value: &Value) -> Option<&Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn compare(&self, other: &Self) -> CompareResult {
                ($cmp)(self, other)
            }
        }
    };
}

lexical_value_type!(AnyUri, AnyUri, "anyURI", ordered = false, compare = unordered);
lexical_value_type!(
    Date,
    Date,
    "date",
    ordered = true,
    compare = |a: &Date, b: &Date| a.try_cmp(b).map(Some)
);
lexical_value_type!(
    Time,
    Time,
    "time",
    ordered = true,
    compare = |a: &Time, b: &Time| a.try_cmp(b).map(Some)
);
lexical_value_type!(
    DateTime,
    DateTime,
    "dateTime",
    ordered = true,
    compare = |a: &DateTime, b: &DateTime| a.try_cmp(b).map(Some)
);
lexical_value_type!(
    DayTimeDuration,
    DayTimeDuration,
    "dayTimeDuration",
    ordered = true,
    compare = total
);
lexical_value_type!(
    YearMonthDuration,
    YearMonthDuration,
    "yearMonthDuration",
    ordered = true,
    compare = total
);
lexical_value_type!(Rfc822Name, Rfc822Name, "rfc822Name", ordered = false, compare = unordered);
lexical_value_type!(DnsName, DnsName, "dnsName", ordered = false, compare = unordered);
lexical_value_type!(IpAddress, IpAddress, "ipAddress", ordered = false, compare = unordered);

macro_rules! binary_value_type {
    ($ty:ident, $name:literal) => {
        impl Canonical for $ty {
            fn to_canonical(&self) -> String {
                self.to_string()
            }

            fn into_value(self) -> Value {
                Value::$ty(self)
            }
        }

        impl ValueType for $ty {
            const TYPE_NAME: &'static str = $name;
            const ORDERED: bool = false;

            fn parse_text(text: &str) -> std::result::Result<Self, ValueError> {
                text.parse()
            }

            fn from_value(value: &Value) -> Option<&Self> {
                match value {
                    Value::$ty(v) => Some(v),
                    _ => None,
                }
            }

            fn from_typed_source(source: &Source) -> Option<Self> {
                match source {
                    Source::Bytes(bytes) => Some($ty::new(bytes.clone())),
                    _ => None,
                }
            }
        }
    };
}

binary_value_type!(HexBinary, "hexBinary");
binary_value_type!(Base64Binary, "base64Binary");

// ============================================================================
// Scalars
// ============================================================================

impl Canonical for String {
    fn to_canonical(&self) -> String {
        self.clone()
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl ValueType for String {
    const TYPE_NAME: &'static str = "string";
    const ORDERED: bool = true;

    fn parse_text(text: &str) -> std::result::Result<Self, ValueError> {
        Ok(text.to_string())
    }

    fn from_value(value: &Value) -> Option<&Self> {
        match value {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    fn compare(&self, other: &Self) -> CompareResult {
        total(self, other)
    }
}

impl Canonical for bool {
    fn to_canonical(&self) -> String {
        self.to_string()
    }

    fn into_value(self) -> Value {
        Value::Boolean(self)
    }
}

impl ValueType for bool {
    const TYPE_NAME: &'static str = "boolean";
    const ORDERED: bool = false;

    /// `true`, `false`, `1` or `0`, case-sensitive.
    fn parse_text(text: &str) -> std::result::Result<Self, ValueError> {
        match text {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(ValueError::malformed(
                "boolean",
                text,
                0,
                "expected 'true', 'false', '1' or '0'",
            )),
        }
    }

    fn from_value(value: &Value) -> Option<&Self> {
        match value {
            Value::Boolean(v) => Some(v),
            _ => None,
        }
    }

    fn from_typed_source(source: &Source) -> Option<Self> {
        match source {
            Source::Boolean(v) => Some(*v),
            _ => None,
        }
    }
}

impl Canonical for i64 {
    fn to_canonical(&self) -> String {
        self.to_string()
    }

    fn into_value(self) -> Value {
        Value::Integer(self)
    }
}

impl ValueType for i64 {
    const TYPE_NAME: &'static str = "integer";
    const ORDERED: bool = true;

    fn parse_text(text: &str) -> std::result::Result<Self, ValueError> {
        let digits_start = usize::from(text.starts_with(['+', '-']));
        if let Some(bad) = text[digits_start..]
            .bytes()
            .position(|b| !b.is_ascii_digit())
        {
            return Err(ValueError::malformed(
                "integer",
                text,
                digits_start + bad,
                "expected a digit",
            ));
        }
        if text.len() == digits_start {
            return Err(ValueError::malformed("integer", text, digits_start, "expected a digit"));
        }
        text.parse().map_err(|_| {
            ValueError::out_of_range("integer", format!("{text} does not fit in 64 bits"))
        })
    }

    fn from_value(value: &Value) -> Option<&Self> {
        match value {
            Value::Integer(v) => Some(v),
            _ => None,
        }
    }

    fn from_typed_source(source: &Source) -> Option<Self> {
        match source {
            Source::Integer(v) => Some(*v),
            _ => None,
        }
    }

    fn compare(&self, other: &Self) -> CompareResult {
        total(self, other)
    }
}

impl Canonical for f64 {
    fn to_canonical(&self) -> String {
        render_double(*self)
    }

    fn into_value(self) -> Value {
        Value::Double(self)
    }
}

impl ValueType for f64 {
    const TYPE_NAME: &'static str = "double";
    const ORDERED: bool = true;

    fn parse_text(text: &str) -> std::result::Result<Self, ValueError> {
        parse_double(text)
    }

    fn from_value(value: &Value) -> Option<&Self> {
        match value {
            Value::Double(v) => Some(v),
            _ => None,
        }
    }

    fn from_typed_source(source: &Source) -> Option<Self> {
        match source {
            Source::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// `NaN` is unordered against everything.
    fn compare(&self, other: &Self) -> CompareResult {
        Ok(self.partial_cmp(other))
    }
}

/// XML Schema lexical form of a double: `INF`, `-INF`, `NaN`, or the
/// shortest decimal that reads back to the same value.
pub fn render_double(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() { "INF" } else { "-INF" }.to_string()
    } else {
        format!("{value:?}")
    }
}

/// Parses an XML Schema double. Only the exact spellings `INF`, `-INF` and
/// `NaN` denote the special values.
pub fn parse_double(text: &str) -> std::result::Result<f64, ValueError> {
    match text {
        "INF" | "+INF" => return Ok(f64::INFINITY),
        "-INF" => return Ok(f64::NEG_INFINITY),
        "NaN" => return Ok(f64::NAN),
        _ => {}
    }
    if let Some(bad) = text
        .bytes()
        .position(|b| !(b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E')))
    {
        return Err(ValueError::malformed("double", text, bad, "unexpected character"));
    }
    text.parse()
        .map_err(|_| ValueError::malformed("double", text, 0, "not a decimal or scientific number"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::DataType;
    use test_case::test_case;

    #[test_case("true" => true)]
    #[test_case("1" => true)]
    #[test_case("false" => false)]
    #[test_case("0" => false)]
    fn boolean_lexical(input: &str) -> bool {
        BOOLEAN.convert(&Source::from(input)).unwrap()
    }

    #[test_case("TRUE"; "upper case")]
    #[test_case("yes"; "word")]
    #[test_case(""; "empty")]
    fn boolean_rejects(input: &str) {
        assert!(BOOLEAN.convert(&Source::from(input)).is_err());
    }

    #[test_case("42" => 42)]
    #[test_case("+42" => 42)]
    #[test_case("-9223372036854775808" => i64::MIN)]
    #[test_case("007" => 7)]
    fn integer_lexical(input: &str) -> i64 {
        INTEGER.convert(&Source::from(input)).unwrap()
    }

    #[test]
    fn integer_errors() {
        let err = INTEGER.convert(&Source::from("12a")).unwrap_err();
        assert_eq!(err.cause().and_then(ValueError::offset), Some(2));
        assert!(INTEGER.convert(&Source::from("-")).is_err());
        assert!(matches!(
            INTEGER.convert(&Source::from("9223372036854775808")).unwrap_err().cause(),
            Some(ValueError::OutOfRange { .. })
        ));
    }

    #[test_case("1.5", "1.5")]
    #[test_case("1", "1.0")]
    #[test_case("-0.0", "-0.0")]
    #[test_case("1e300", "1e300")]
    #[test_case("INF", "INF")]
    #[test_case("-INF", "-INF")]
    #[test_case("NaN", "NaN")]
    fn double_lexical(input: &str, canonical: &str) {
        let value = DOUBLE.convert(&Source::from(input)).unwrap();
        assert_eq!(DOUBLE.to_string_value(&value), canonical);
    }

    #[test_case("inf"; "lower case inf")]
    #[test_case("nan"; "lower case nan")]
    #[test_case("infinity"; "spelled out")]
    #[test_case("1,5"; "comma")]
    fn double_rejects(input: &str) {
        assert!(DOUBLE.convert(&Source::from(input)).is_err());
    }

    #[test]
    fn typed_sources_skip_text() {
        assert_eq!(DOUBLE.convert(&Source::Double(0.25)).unwrap(), 0.25);
        assert!(BOOLEAN.convert(&Source::Boolean(true)).unwrap());
        assert_eq!(INTEGER.convert(&Source::Integer(-1)).unwrap(), -1);
        assert_eq!(STRING.convert(&Source::Integer(-1)).unwrap(), "-1");
    }

    #[test]
    fn ordering_flags() {
        use crate::datatype::DynDataType;
        assert!(DynDataType::is_ordered(&DATE));
        assert!(DynDataType::is_ordered(&YEAR_MONTH_DURATION));
        assert!(!DynDataType::is_ordered(&IP_ADDRESS));
        assert!(!DynDataType::is_ordered(&BOOLEAN));
    }
}
