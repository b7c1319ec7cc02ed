//! URI references.

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::error::{Result, ValueError};

const TYPE_NAME: &str = "anyURI";

/// A URI reference restricted to the RFC 3986 character set.
///
/// Only characters and percent-escapes are checked; the reference is not
/// resolved or normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnyUri(String);

impl AnyUri {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The scheme, if the reference is absolute.
    pub fn scheme(&self) -> Option<&str> {
        let (scheme, _) = self.0.split_once(':')?;
        let mut chars = scheme.chars();
        let first = chars.next()?;
        (first.is_ascii_alphabetic()
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')))
        .then_some(scheme)
    }
}

fn is_uri_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"-._~:/?#[]@!$&'()*+,;=".contains(&b)
}

impl FromStr for AnyUri {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'%' => {
                    let escape = bytes.get(i + 1..i + 3);
                    if !escape.is_some_and(|e| e.iter().all(u8::is_ascii_hexdigit)) {
                        return Err(ValueError::malformed(
                            TYPE_NAME,
                            s,
                            i,
                            "'%' must be followed by two hex digits",
                        ));
                    }
                    i += 3;
                }
                b if is_uri_char(b) => i += 1,
                _ => {
                    return Err(ValueError::malformed(
                        TYPE_NAME,
                        s,
                        i,
                        "character not allowed in a URI",
                    ));
                }
            }
        }
        Ok(Self(s.to_string()))
    }
}

impl Display for AnyUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AnyUri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("urn:oasis:names:tc:xacml:1.0:data-type:string")]
    #[test_case("http://example.com/a%20b?q=1#frag")]
    #[test_case("../relative/path")]
    #[test_case("")]
    fn accepts(input: &str) {
        assert_eq!(input.parse::<AnyUri>().unwrap().as_str(), input);
    }

    #[test_case("http://example.com/a b", 20; "space")]
    #[test_case("http://x/%2", 9; "short escape")]
    #[test_case("http://x/%zz", 9; "non hex escape")]
    #[test_case("http://x/\u{e9}", 9; "non ascii")]
    fn rejects(input: &str, offset: usize) {
        assert_eq!(input.parse::<AnyUri>().unwrap_err().offset(), Some(offset));
    }

    #[test]
    fn scheme() {
        let uri: AnyUri = "urn:example".parse().unwrap();
        assert_eq!(uri.scheme(), Some("urn"));
        let relative: AnyUri = "a/b:c".parse().unwrap();
        assert_eq!(relative.scheme(), None);
    }
}
