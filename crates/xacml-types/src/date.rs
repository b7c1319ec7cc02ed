//! Calendar dates with an optional zone.

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::datetime::{
    DateTime, Era, Fields, parse_date_fragment, parse_zone_fragment, shift_days,
};
use crate::duration::{DayTimeDuration, Duration, YearMonthDuration};
use crate::error::{Result, ValueError};
use crate::scan::Cursor;
use crate::timezone::TimeZone;

const TYPE_NAME: &str = "date";

/// A date at midnight, zoned or floating.
///
/// Arithmetic and ordering delegate to [`DateTime`]; any time-of-day left
/// over after arithmetic is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Date {
    inner: DateTime,
}

impl Date {
    pub fn new(year: i32, month: u32, day: u32, zone: Option<TimeZone>) -> Result<Self> {
        let inner = DateTime::new(year, month, day, 0, 0, 0, 0, zone).map_err(retag)?;
        Ok(Self { inner })
    }

    /// Today's date in UTC.
    pub fn today() -> Self {
        Self::truncate(&DateTime::now())
    }

    fn truncate(value: &DateTime) -> Self {
        let midnight = value.naive().date().and_time(chrono::NaiveTime::MIN);
        Self {
            inner: DateTime::from_naive(midnight, value.time_zone()),
        }
    }

    pub fn year(&self) -> i32 {
        self.inner.year()
    }

    pub fn month(&self) -> u32 {
        self.inner.month()
    }

    pub fn day(&self) -> u32 {
        self.inner.day()
    }

    pub fn era(&self) -> Era {
        self.inner.era()
    }

    pub fn year_of_era(&self) -> u32 {
        self.inner.year_of_era()
    }

    pub fn has_time_zone(&self) -> bool {
        self.inner.has_time_zone()
    }

    pub fn time_zone(&self) -> Option<TimeZone> {
        self.inner.time_zone()
    }

    pub fn time_zone_string(&self) -> Option<String> {
        self.inner.time_zone_string()
    }

    /// The date as a date-time at midnight.
    pub fn to_date_time(&self) -> DateTime {
        self.inner
    }

    pub fn string_value_no_time_zone(&self) -> String {
        let mut out = self.inner.string_value_no_time_zone();
        out.truncate(out.len() - "T00:00:00".len());
        out
    }

    pub fn add(&self, duration: &Duration) -> Result<Self> {
        Ok(Self::truncate(&self.inner.add(duration)?))
    }

    pub fn sub(&self, duration: &Duration) -> Result<Self> {
        Ok(Self::truncate(&self.inner.sub(duration)?))
    }

    pub fn add_year_month(&self, duration: &YearMonthDuration) -> Result<Self> {
        self.add(duration.as_duration())
    }

    pub fn sub_year_month(&self, duration: &YearMonthDuration) -> Result<Self> {
        self.sub(duration.as_duration())
    }

    pub fn add_day_time(&self, duration: &DayTimeDuration) -> Result<Self> {
        self.add(duration.as_duration())
    }

    pub fn sub_day_time(&self, duration: &DayTimeDuration) -> Result<Self> {
        self.sub(duration.as_duration())
    }

    /// Orders two dates with the same zoned/floating rules as [`DateTime`].
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering> {
        self.inner.try_cmp(&other.inner)
    }
}

fn retag(err: ValueError) -> ValueError {
    match err {
        ValueError::OutOfRange { reason, .. } => ValueError::out_of_range(TYPE_NAME, reason),
        other => other,
    }
}

impl FromStr for Date {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        let mut cursor = Cursor::new(s, TYPE_NAME);
        let (year, month, day) = parse_date_fragment(&mut cursor)?;
        let (zone, day_shift) = parse_zone_fragment(&mut cursor)?;
        cursor.finish()?;

        let fields = Fields {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
            millis: 0,
        };
        Ok(Self {
            inner: DateTime::from_naive(
                shift_days(fields.to_naive(TYPE_NAME)?, day_shift, TYPE_NAME)?,
                zone,
            ),
        })
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string_value_no_time_zone())?;
        if let Some(zone) = self.time_zone() {
            write!(f, "{zone}")?;
        }
        Ok(())
    }
}

impl From<chrono::NaiveDate> for Date {
    fn from(value: chrono::NaiveDate) -> Self {
        Self {
            inner: DateTime::from_naive(value.and_time(chrono::NaiveTime::MIN), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    #[test_case("2014-02-28")]
    #[test_case("2014-02-28Z")]
    #[test_case("2014-02-28-05:00")]
    #[test_case("-0044-03-15")]
    fn canonical_round_trip(input: &str) {
        assert_eq!(date(input).to_string(), input);
    }

    #[test]
    fn wrapped_zone_keeps_the_instant() {
        let value = date("2014-01-01+14:00");
        assert_eq!(value.to_string(), "2013-12-31-10:00");
        assert_eq!(date(&value.to_string()), value);
        assert_eq!(
            value.to_date_time().try_cmp(&"2013-12-31T10:00:00Z".parse().unwrap()).unwrap(),
            Ordering::Equal
        );
    }

    #[test]
    fn invalid_day_is_out_of_range() {
        assert!(matches!(
            "2014-02-30".parse::<Date>(),
            Err(ValueError::OutOfRange { type_name: "date", .. })
        ));
        assert!(matches!(
            Date::new(2014, 2, 30, None),
            Err(ValueError::OutOfRange { type_name: "date", .. })
        ));
    }

    #[test_case("2014-02-28T00:00:00"; "date time")]
    #[test_case("2014-02"; "missing day")]
    #[test_case("2014-02-28+5:00"; "short zone")]
    fn malformed(input: &str) {
        assert!(matches!(
            input.parse::<Date>(),
            Err(ValueError::Malformed { .. })
        ));
    }

    #[test]
    fn arithmetic_drops_time_of_day() {
        let start = date("2014-02-28");
        let next = start.add(&"P1DT23H".parse().unwrap()).unwrap();
        assert_eq!(next.to_string(), "2014-03-01");
        let back = next.sub(&"P1M".parse().unwrap()).unwrap();
        assert_eq!(back.to_string(), "2014-02-01");
    }

    #[test]
    fn comparison_follows_date_time_rules() {
        assert_eq!(
            date("2014-01-01Z").try_cmp(&date("2014-01-02Z")).unwrap(),
            Ordering::Less
        );
        assert!(date("2014-01-01Z").try_cmp(&date("2014-01-01")).is_err());
        assert_eq!(
            date("2014-01-01Z").try_cmp(&date("2014-01-03")).unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn bc_era() {
        let d = date("0000-06-01");
        assert_eq!(d.era(), Era::Bc);
        assert_eq!(d.year_of_era(), 1);
    }
}
