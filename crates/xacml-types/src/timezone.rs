//! ISO 8601 time zone offsets.

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::error::{Result, ValueError};
use crate::scan::Cursor;

const TYPE_NAME: &str = "time zone";

/// Minutes in a day; offsets beyond this are rejected.
const MINUTES_PER_DAY: i32 = 1440;
const HALF_DAY: i32 = 720;

/// A signed offset from UTC in minutes.
///
/// Offsets are canonicalized into the half-open range `(-720, 720]`, so
/// `+13:00` and `-11:00` denote the same zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeZone {
    offset_minutes: i32,
}

impl TimeZone {
    pub const UTC: TimeZone = TimeZone { offset_minutes: 0 };

    /// Creates a zone from a signed minute offset.
    ///
    /// Fails with an out-of-range error when `|offset| > 1440`. A wrapped
    /// offset names a different clock; use [`TimeZone::canonicalize`] when
    /// local fields written against `offset_minutes` must keep their instant.
    pub fn new(offset_minutes: i32) -> Result<Self> {
        Self::canonicalize(offset_minutes).map(|(zone, _)| zone)
    }

    /// Canonicalizes a raw offset and returns the whole days local fields
    /// written against it must move to denote the same instant.
    ///
    /// `+14:00` becomes `-10:00` with a shift of `-1`: midnight at `+14:00`
    /// is 10:00 the previous day at `-10:00`.
    pub fn canonicalize(offset_minutes: i32) -> Result<(Self, i64)> {
        if offset_minutes.abs() > MINUTES_PER_DAY {
            return Err(ValueError::out_of_range(
                TYPE_NAME,
                format!("offset {offset_minutes} minutes exceeds 24 hours"),
            ));
        }
        let (offset, day_shift) = if offset_minutes > HALF_DAY {
            (offset_minutes - MINUTES_PER_DAY, -1)
        } else if offset_minutes <= -HALF_DAY {
            (offset_minutes + MINUTES_PER_DAY, 1)
        } else {
            (offset_minutes, 0)
        };
        Ok((
            Self {
                offset_minutes: offset,
            },
            day_shift,
        ))
    }

    /// Returns the canonical signed offset in minutes.
    pub fn offset_minutes(self) -> i32 {
        self.offset_minutes
    }

    pub fn is_utc(self) -> bool {
        self.offset_minutes == 0
    }

    /// Parses the zone suffix at the cursor (`Z` or `±HH:MM`) and returns
    /// the offset as written, in minutes.
    pub(crate) fn parse_raw_at(cursor: &mut Cursor<'_>) -> Result<i32> {
        if cursor.eat(b'Z') {
            return Ok(0);
        }
        let sign = if cursor.eat(b'+') {
            1
        } else if cursor.eat(b'-') {
            -1
        } else {
            return Err(cursor.error("expected 'Z', '+' or '-' to start a time zone"));
        };
        let hours = cursor.digits(2, "time zone hours")?;
        cursor.expect(b':', "between time zone hours and minutes")?;
        let minutes_pos = cursor.pos();
        let minutes = cursor.digits(2, "time zone minutes")?;
        if minutes > 59 {
            return Err(ValueError::malformed(
                TYPE_NAME,
                cursor.input(),
                minutes_pos,
                format!("time zone minutes {minutes} exceed 59"),
            ));
        }
        // Both fields are at most two digits, so this cannot overflow.
        Ok(sign * (hours * 60 + minutes) as i32)
    }
}

impl FromStr for TimeZone {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        let mut cursor = Cursor::new(s, TYPE_NAME);
        let offset = Self::parse_raw_at(&mut cursor)?;
        cursor.finish()?;
        Self::new(offset)
    }
}

impl Display for TimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset_minutes {
            0 => f.write_str("Z"),
            offset => {
                let sign = if offset < 0 { '-' } else { '+' };
                let abs = offset.abs();
                write!(f, "{sign}{:02}:{:02}", abs / 60, abs % 60)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0 => 0)]
    #[test_case(720 => 720; "upper bound kept")]
    #[test_case(-720 => 720; "lower bound wraps")]
    #[test_case(780 => -660; "plus thirteen wraps")]
    #[test_case(-1440 => 0)]
    #[test_case(1440 => 0)]
    #[test_case(-330 => -330)]
    fn canonicalizes_into_half_day(offset: i32) -> i32 {
        TimeZone::new(offset).unwrap().offset_minutes()
    }

    #[test_case(840 => (-600, -1); "plus fourteen moves back a day")]
    #[test_case(780 => (-660, -1); "plus thirteen moves back a day")]
    #[test_case(-720 => (720, 1); "minus twelve moves forward a day")]
    #[test_case(720 => (720, 0); "plus twelve stays")]
    #[test_case(-330 => (-330, 0))]
    fn canonicalize_reports_day_shift(offset: i32) -> (i32, i64) {
        let (zone, shift) = TimeZone::canonicalize(offset).unwrap();
        (zone.offset_minutes(), shift)
    }

    #[test]
    fn rejects_more_than_a_day() {
        assert!(matches!(
            TimeZone::new(1441),
            Err(ValueError::OutOfRange { .. })
        ));
        assert!(TimeZone::new(-1441).is_err());
    }

    #[test_case("Z", 0)]
    #[test_case("+05:30", 330)]
    #[test_case("-08:00", -480)]
    #[test_case("+00:00", 0)]
    fn parses(input: &str, expected: i32) {
        assert_eq!(input.parse::<TimeZone>().unwrap().offset_minutes(), expected);
    }

    #[test_case("05:30"; "missing sign")]
    #[test_case("+5:30"; "short hours")]
    #[test_case("+05:60"; "minutes too large")]
    #[test_case("+0530"; "missing colon")]
    #[test_case("Z "; "trailing space")]
    fn rejects(input: &str) {
        assert!(input.parse::<TimeZone>().is_err());
    }

    #[test]
    fn renders_canonical_form() {
        assert_eq!(TimeZone::UTC.to_string(), "Z");
        assert_eq!(TimeZone::new(330).unwrap().to_string(), "+05:30");
        assert_eq!(TimeZone::new(-480).unwrap().to_string(), "-08:00");
        assert_eq!("+00:00".parse::<TimeZone>().unwrap().to_string(), "Z");
    }
}
