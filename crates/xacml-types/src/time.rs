//! Times of day with an optional zone.

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::datetime::{DateTime, Fields, parse_time_fragment, parse_zone_fragment, push_millis};
use crate::duration::{DayTimeDuration, Duration};
use crate::error::{Result, ValueError};
use crate::scan::Cursor;
use crate::timezone::TimeZone;

const TYPE_NAME: &str = "time";

/// A time of day, pinned to 1970-01-01 for arithmetic and ordering.
///
/// Arithmetic wraps around midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Time {
    inner: DateTime,
}

fn pinned(time: NaiveTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .unwrap_or(NaiveDate::MIN)
        .and_time(time)
}

impl Time {
    pub fn new(
        hour: u32,
        minute: u32,
        second: u32,
        millis: u32,
        zone: Option<TimeZone>,
    ) -> Result<Self> {
        let fields = Fields {
            year: 1970,
            month: 1,
            day: 1,
            hour,
            minute,
            second,
            millis,
        };
        Ok(Self {
            inner: DateTime::from_naive(fields.to_naive(TYPE_NAME)?, zone),
        })
    }

    /// The current time of day in UTC.
    pub fn now() -> Self {
        Self::wrap(&DateTime::now())
    }

    fn wrap(value: &DateTime) -> Self {
        Self {
            inner: DateTime::from_naive(pinned(value.naive().time()), value.time_zone()),
        }
    }

    pub fn hour(&self) -> u32 {
        self.inner.hour()
    }

    pub fn minute(&self) -> u32 {
        self.inner.minute()
    }

    pub fn second(&self) -> u32 {
        self.inner.second()
    }

    pub fn millisecond(&self) -> u32 {
        self.inner.millisecond()
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

    pub fn string_value_no_time_zone(&self) -> String {
        let mut out = format!(
            "{:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second()
        );
        push_millis(&mut out, self.millisecond());
        out
    }

    /// Adds the time components of `duration`; calendar components roll the
    /// pinned date and are discarded.
    pub fn add(&self, duration: &Duration) -> Result<Self> {
        Ok(Self::wrap(&self.inner.add(duration)?))
    }

    pub fn sub(&self, duration: &Duration) -> Result<Self> {
        Ok(Self::wrap(&self.inner.sub(duration)?))
    }

    pub fn add_day_time(&self, duration: &DayTimeDuration) -> Result<Self> {
        self.add(duration.as_duration())
    }

    pub fn sub_day_time(&self, duration: &DayTimeDuration) -> Result<Self> {
        self.sub(duration.as_duration())
    }

    /// Orders two times on the pinned date with the [`DateTime`] rules.
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering> {
        self.inner.try_cmp(&other.inner)
    }
}

impl FromStr for Time {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        let mut cursor = Cursor::new(s, TYPE_NAME);
        let (hour, minute, second, millis) = parse_time_fragment(&mut cursor)?;
        // A whole-day shift leaves the time of day unchanged.
        let (zone, _) = parse_zone_fragment(&mut cursor)?;
        cursor.finish()?;
        Self::new(hour, minute, second, millis, zone)
    }
}

impl Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string_value_no_time_zone())?;
        if let Some(zone) = self.time_zone() {
            write!(f, "{zone}")?;
        }
        Ok(())
    }
}

impl From<NaiveTime> for Time {
    fn from(value: NaiveTime) -> Self {
        Self {
            inner: DateTime::from_naive(pinned(value), None),
        }
    }
}
