//! XACML datatype identifiers.

use std::borrow::{Borrow, Cow};
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// A datatype or category URI.
///
/// Built-in identifiers are `'static` borrows; identifiers read from
/// configuration or JSON own their text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(Cow<'static, str>);

impl Identifier {
    pub const fn from_static(uri: &'static str) -> Self {
        Self(Cow::Borrowed(uri))
    }

    pub fn new(uri: impl Into<String>) -> Self {
        Self(Cow::Owned(uri.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// XACML 3.0 datatypes
// ============================================================================

pub const STRING: Identifier = Identifier::from_static("http://www.w3.org/2001/XMLSchema#string");
pub const BOOLEAN: Identifier = Identifier::from_static("http://www.w3.org/2001/XMLSchema#boolean");
pub const INTEGER: Identifier = Identifier::from_static("http://www.w3.org/2001/XMLSchema#integer");
pub const DOUBLE: Identifier = Identifier::from_static("http://www.w3.org/2001/XMLSchema#double");
pub const ANY_URI: Identifier = Identifier::from_static("http://www.w3.org/2001/XMLSchema#anyURI");
pub const HEX_BINARY: Identifier =
    Identifier::from_static("http://www.w3.org/2001/XMLSchema#hexBinary");
pub const BASE64_BINARY: Identifier =
    Identifier::from_static("http://www.w3.org/2001/XMLSchema#base64Binary");
pub const DATE: Identifier = Identifier::from_static("http://www.w3.org/2001/XMLSchema#date");
pub const TIME: Identifier = Identifier::from_static("http://www.w3.org/2001/XMLSchema#time");
pub const DATE_TIME: Identifier =
    Identifier::from_static("http://www.w3.org/2001/XMLSchema#dateTime");
pub const DAY_TIME_DURATION: Identifier =
    Identifier::from_static("http://www.w3.org/2001/XMLSchema#dayTimeDuration");
pub const YEAR_MONTH_DURATION: Identifier =
    Identifier::from_static("http://www.w3.org/2001/XMLSchema#yearMonthDuration");
pub const RFC822_NAME: Identifier =
    Identifier::from_static("urn:oasis:names:tc:xacml:1.0:data-type:rfc822Name");
pub const DNS_NAME: Identifier =
    Identifier::from_static("urn:oasis:names:tc:xacml:2.0:data-type:dnsName");
pub const IP_ADDRESS: Identifier =
    Identifier::from_static("urn:oasis:names:tc:xacml:2.0:data-type:ipAddress");

// ============================================================================
// Pre-3.0 duration identifiers
// ============================================================================

/// XACML 1.x name of `dayTimeDuration` (XQuery operators working draft).
pub const LEGACY_DAY_TIME_DURATION_WD: Identifier = Identifier::from_static(
    "http://www.w3.org/TR/2002/WD-xquery-operators-20020816#dayTimeDuration",
);
/// XACML 1.x name of `yearMonthDuration` (XQuery operators working draft).
pub const LEGACY_YEAR_MONTH_DURATION_WD: Identifier = Identifier::from_static(
    "http://www.w3.org/TR/2002/WD-xquery-operators-20020816#yearMonthDuration",
);
/// XACML 2.0 name of `dayTimeDuration`.
pub const LEGACY_DAY_TIME_DURATION: Identifier =
    Identifier::from_static("urn:oasis:names:tc:xacml:2.0:data-type:dayTimeDuration");
/// XACML 2.0 name of `yearMonthDuration`.
pub const LEGACY_YEAR_MONTH_DURATION: Identifier =
    Identifier::from_static("urn:oasis:names:tc:xacml:2.0:data-type:yearMonthDuration");

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn static_and_owned_compare_equal() {
        assert_eq!(STRING, Identifier::new("http://www.w3.org/2001/XMLSchema#string"));
    }

    #[test]
    fn lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(DATE.clone(), 1);
        assert_eq!(map.get("http://www.w3.org/2001/XMLSchema#date"), Some(&1));
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&IP_ADDRESS).unwrap();
        assert_eq!(json, "\"urn:oasis:names:tc:xacml:2.0:data-type:ipAddress\"");
        let back: Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, IP_ADDRESS);
    }
}
