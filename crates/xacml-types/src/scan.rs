//! Low-level scanners shared by the lexical parsers.
//!
//! All scanners work on byte offsets into ASCII grammars. They never panic on
//! short or non-ASCII input; a missing value is reported as `None` and the
//! caller decides which error to raise.

use crate::error::{Result, ValueError};

/// Reads exactly `width` ASCII digits starting at `offset`.
///
/// Returns `None` if fewer than `width` digit characters are present.
///
/// # Examples
///
/// ```
/// # use xacml_types::scan::scan_digits;
/// assert_eq!(scan_digits("2014-02-28", 0, 4), Some(2014));
/// assert_eq!(scan_digits("2014-02-28", 5, 2), Some(2));
/// assert_eq!(scan_digits("20a4", 0, 4), None);
/// ```
pub fn scan_digits(input: &str, offset: usize, width: usize) -> Option<u32> {
    let bytes = input.as_bytes().get(offset..offset.checked_add(width)?)?;
    bytes.iter().try_fold(0u32, |acc, b| {
        if b.is_ascii_digit() {
            acc.checked_mul(10)?.checked_add(u32::from(b - b'0'))
        } else {
            None
        }
    })
}

/// Reads an optionally `-`-prefixed run of digits starting at `offset`.
///
/// Returns the value and the offset immediately after the last digit, or
/// `None` when no digit follows the optional sign (or the value overflows).
///
/// # Examples
///
/// ```
/// # use xacml_types::scan::scan_signed_int;
/// assert_eq!(scan_signed_int("-0044-01", 0), Some((-44, 5)));
/// assert_eq!(scan_signed_int("12Y", 0), Some((12, 2)));
/// assert_eq!(scan_signed_int("-Y", 0), None);
/// ```
pub fn scan_signed_int(input: &str, offset: usize) -> Option<(i64, usize)> {
    let bytes = input.as_bytes();
    let negative = bytes.get(offset) == Some(&b'-');
    let start = if negative { offset + 1 } else { offset };

    let mut end = start;
    let mut value: i64 = 0;
    while let Some(b) = bytes.get(end).filter(|b| b.is_ascii_digit()) {
        value = value.checked_mul(10)?.checked_add(i64::from(b - b'0'))?;
        end += 1;
    }

    if end == start {
        return None;
    }
    Some((if negative { -value } else { value }, end))
}

/// Returns the offset of the first non-whitespace character at or after
/// `offset`, or `None` if the rest of the input is whitespace.
pub fn skip_whitespace(input: &str, offset: usize) -> Option<usize> {
    input
        .get(offset..)?
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(i, _)| offset + i)
}

/// Reads an unsigned decimal number (`digits ['.' digits]`) starting at
/// `offset`, returning the matched text and the offset after it.
pub fn scan_unsigned_decimal(input: &str, offset: usize) -> Option<(&str, usize)> {
    let bytes = input.as_bytes();
    let mut end = offset;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    if end == offset {
        return None;
    }
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if frac_end > frac_start {
            end = frac_end;
        }
    }
    Some((&input[offset..end], end))
}

/// A position-tracking reader used by the lexical parsers so every failure
/// carries the offending offset.
pub(crate) struct Cursor<'a> {
    input: &'a str,
    pos: usize,
    type_name: &'static str,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(input: &'a str, type_name: &'static str) -> Self {
        Self {
            input,
            pos: 0,
            type_name,
        }
    }

    pub(crate) fn input(&self) -> &'a str {
        self.input
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Advances past the current byte.
    pub(crate) fn bump(&mut self) {
        self.pos = (self.pos + 1).min(self.input.len());
    }

    /// Consumes `b` if it is the next byte.
    pub(crate) fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, b: u8, what: &str) -> Result<()> {
        if self.eat(b) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}' {what}", b as char)))
        }
    }

    /// Reads exactly `width` digits.
    pub(crate) fn digits(&mut self, width: usize, what: &str) -> Result<u32> {
        let value = scan_digits(self.input, self.pos, width)
            .ok_or_else(|| self.error(format!("expected {width} digit {what}")))?;
        self.pos += width;
        Ok(value)
    }

    /// Reads an optional `-` followed by at least `min_width` digits.
    pub(crate) fn signed_int(&mut self, min_width: usize, what: &str) -> Result<i64> {
        let (value, end) = scan_signed_int(self.input, self.pos)
            .ok_or_else(|| self.error(format!("expected {what}")))?;
        let digits = end - self.pos - usize::from(self.peek() == Some(b'-'));
        if digits < min_width {
            return Err(self.error(format!("{what} needs at least {min_width} digits")));
        }
        self.pos = end;
        Ok(value)
    }

    pub(crate) fn unsigned_decimal(&mut self, what: &str) -> Result<&'a str> {
        let (text, end) = scan_unsigned_decimal(self.input, self.pos)
            .ok_or_else(|| self.error(format!("expected {what}")))?;
        self.pos = end;
        Ok(text)
    }

    pub(crate) fn finish(&self) -> Result<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error("unexpected trailing characters"))
        }
    }

    pub(crate) fn error(&self, reason: impl Into<String>) -> ValueError {
        ValueError::malformed(self.type_name, self.input, self.pos, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("0123", 0, 4 => Some(123); "leading zero")]
    #[test_case("12", 0, 4 => None; "too short")]
    #[test_case("1a34", 0, 4 => None; "non digit")]
    #[test_case("xx59", 2, 2 => Some(59); "at offset")]
    #[test_case("5", 3, 1 => None; "offset past end")]
    fn fixed_width(input: &str, offset: usize, width: usize) -> Option<u32> {
        scan_digits(input, offset, width)
    }

    #[test]
    fn signed_int_reports_end_position() {
        assert_eq!(scan_signed_int("P12Y", 1), Some((12, 3)));
        assert_eq!(scan_signed_int("-7", 0), Some((-7, 2)));
        assert_eq!(scan_signed_int("-", 0), None);
        assert_eq!(scan_signed_int("", 0), None);
    }

    #[test]
    fn signed_int_overflow_is_no_value() {
        assert_eq!(scan_signed_int("99999999999999999999", 0), None);
    }

    #[test]
    fn whitespace_skip() {
        assert_eq!(skip_whitespace("  \t\nabc", 0), Some(4));
        assert_eq!(skip_whitespace("abc", 1), Some(1));
        assert_eq!(skip_whitespace("   ", 0), None);
        assert_eq!(skip_whitespace("", 0), None);
    }

    #[test]
    fn unsigned_decimal_accepts_optional_fraction() {
        assert_eq!(scan_unsigned_decimal("6.5S", 0), Some(("6.5", 3)));
        assert_eq!(scan_unsigned_decimal("6S", 0), Some(("6", 1)));
        // A dangling dot is not part of the number.
        assert_eq!(scan_unsigned_decimal("6.S", 0), Some(("6", 1)));
        assert_eq!(scan_unsigned_decimal(".5S", 0), None);
    }

    #[test]
    fn cursor_errors_carry_offset() {
        let mut cursor = Cursor::new("12:3x", "time");
        assert_eq!(cursor.digits(2, "hour").unwrap(), 12);
        cursor.expect(b':', "after hour").unwrap();
        let err = cursor.digits(2, "minute").unwrap_err();
        assert_eq!(err.offset(), Some(3));
    }
}
