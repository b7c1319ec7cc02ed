//! Immutable binary values with hex and base64 lexical forms.

use std::fmt::{self, Display};
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Result, ValueError};

const HEX_BINARY: &str = "hexBinary";
const BASE64_BINARY: &str = "base64Binary";

/// Bytes rendered as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct HexBinary(Vec<u8>);

impl HexBinary {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl FromStr for HexBinary {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        hex::decode(s).map(Self).map_err(|err| {
            let offset = match &err {
                hex::FromHexError::InvalidHexCharacter { index, .. } => *index,
                hex::FromHexError::OddLength | hex::FromHexError::InvalidStringLength => s.len(),
            };
            ValueError::malformed(HEX_BINARY, s, offset, err.to_string())
        })
    }
}

impl Display for HexBinary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl AsRef<[u8]> for HexBinary {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for HexBinary {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

/// Bytes rendered as standard padded base64.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Base64Binary(Vec<u8>);

impl Base64Binary {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl FromStr for Base64Binary {
    type Err = ValueError;

    /// Whitespace between base64 characters is ignored, as in XML content.
    fn from_str(s: &str) -> Result<Self> {
        let compact: String = s.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD.decode(&compact).map(Self).map_err(|err| {
            let offset = match &err {
                base64::DecodeError::InvalidByte(index, _)
                | base64::DecodeError::InvalidLastSymbol(index, _) => *index,
                _ => compact.len(),
            };
            ValueError::malformed(BASE64_BINARY, s, offset, err.to_string())
        })
    }
}

impl Display for Base64Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&STANDARD.encode(&self.0))
    }
}

impl AsRef<[u8]> for Base64Binary {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Base64Binary {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_renders_lowercase() {
        let value: HexBinary = "DEADbeef".parse().unwrap();
        assert_eq!(value.as_bytes(), &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(value.to_string(), "deadbeef");
        assert_eq!(value, "deadbeef".parse().unwrap());
    }

    #[test]
    fn hex_errors_carry_offset() {
        let err = "abzz".parse::<HexBinary>().unwrap_err();
        assert_eq!(err.offset(), Some(2));
        assert!("abc".parse::<HexBinary>().is_err());
    }

    #[test]
    fn empty_values() {
        assert_eq!("".parse::<HexBinary>().unwrap(), HexBinary::default());
        assert_eq!("".parse::<Base64Binary>().unwrap().to_string(), "");
    }

    #[test]
    fn base64_ignores_whitespace() {
        let value: Base64Binary = "aGVs\n bG8=".parse().unwrap();
        assert_eq!(value.as_bytes(), b"hello");
        assert_eq!(value.to_string(), "aGVsbG8=");
    }

    #[test]
    fn base64_rejects_invalid() {
        assert!(matches!(
            "aGVs*G8=".parse::<Base64Binary>(),
            Err(ValueError::Malformed { offset: 4, .. })
        ));
        assert!("aGVsbG8".parse::<Base64Binary>().is_err());
    }
}
