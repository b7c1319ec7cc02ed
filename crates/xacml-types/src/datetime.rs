//! ISO 8601 date-time instants, zoned or floating.
//!
//! A [`DateTime`] keeps its calendar fields exactly as written together with
//! an optional [`TimeZone`]. Zoned instants are anchored to UTC; floating
//! instants are not, which makes ordering against a zoned instant a partial
//! relation (see [`DateTime::try_cmp`]).
//!
//! Years use astronomical numbering on a proleptic Gregorian calendar: year
//! `0` is 1 BC, year `-1` is 2 BC.

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Utc};

use crate::duration::{DayTimeDuration, Duration, YearMonthDuration};
use crate::error::{Result, ValueError};
use crate::scan::Cursor;
use crate::timezone::TimeZone;

const TYPE_NAME: &str = "dateTime";

/// Largest real-world spread between two UTC offsets (`-14:00` .. `+14:00`).
pub const MAX_ZONE_SPREAD_MILLIS: i64 = 14 * 60 * 60 * 1000;

/// Historical era of a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Era {
    /// Before Christ: astronomical years `<= 0`.
    Bc,
    /// Anno Domini: astronomical years `>= 1`.
    Ad,
}

/// Validated calendar and clock fields shared by the three temporal types.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fields {
    pub(crate) year: i64,
    pub(crate) month: u32,
    pub(crate) day: u32,
    pub(crate) hour: u32,
    pub(crate) minute: u32,
    pub(crate) second: u32,
    pub(crate) millis: u32,
}

impl Fields {
    pub(crate) fn to_naive(self, type_name: &'static str) -> Result<NaiveDateTime> {
        let year = i32::try_from(self.year).map_err(|_| {
            ValueError::out_of_range(type_name, format!("year {} is not representable", self.year))
        })?;
        if !(1..=12).contains(&self.month) {
            return Err(ValueError::out_of_range(
                type_name,
                format!("month {} is not in 1..=12", self.month),
            ));
        }
        let date = NaiveDate::from_ymd_opt(year, self.month, self.day).ok_or_else(|| {
            ValueError::out_of_range(
                type_name,
                format!(
                    "day {} is not valid for {}-{:02}",
                    self.day,
                    format_year(year),
                    self.month
                ),
            )
        })?;
        if self.hour > 23 {
            return Err(ValueError::out_of_range(
                type_name,
                format!("hour {} is not in 0..=23", self.hour),
            ));
        }
        if self.minute > 59 {
            return Err(ValueError::out_of_range(
                type_name,
                format!("minute {} is not in 0..=59", self.minute),
            ));
        }
        if self.second > 59 {
            return Err(ValueError::out_of_range(
                type_name,
                format!("second {} is not in 0..=59", self.second),
            ));
        }
        if self.millis > 999 {
            return Err(ValueError::out_of_range(
                type_name,
                format!("millisecond {} is not in 0..=999", self.millis),
            ));
        }
        let time = NaiveTime::from_hms_milli_opt(self.hour, self.minute, self.second, self.millis)
            .ok_or_else(|| ValueError::out_of_range(type_name, "invalid time of day"))?;
        Ok(date.and_time(time))
    }
}

fn format_year(year: i32) -> String {
    if year < 0 {
        format!("-{:04}", year.unsigned_abs())
    } else {
        format!("{year:04}")
    }
}

// ============================================================================
// Lexical fragments
// ============================================================================

/// `[-]YYYY-MM-DD`, year of at least four digits.
pub(crate) fn parse_date_fragment(cursor: &mut Cursor<'_>) -> Result<(i64, u32, u32)> {
    let year = cursor.signed_int(4, "year")?;
    cursor.expect(b'-', "between year and month")?;
    let month = cursor.digits(2, "month")?;
    cursor.expect(b'-', "between month and day")?;
    let day = cursor.digits(2, "day")?;
    Ok((year, month, day))
}

/// `HH:MM:SS[.mmm]`, fraction of exactly three digits.
pub(crate) fn parse_time_fragment(cursor: &mut Cursor<'_>) -> Result<(u32, u32, u32, u32)> {
    let hour = cursor.digits(2, "hour")?;
    cursor.expect(b':', "between hour and minute")?;
    let minute = cursor.digits(2, "minute")?;
    cursor.expect(b':', "between minute and second")?;
    let second = cursor.digits(2, "second")?;
    let millis = if cursor.eat(b'.') {
        let millis = cursor.digits(3, "millisecond")?;
        if cursor.peek().is_some_and(|b| b.is_ascii_digit()) {
            return Err(cursor.error("fractional seconds take exactly 3 digits"));
        }
        millis
    } else {
        0
    };
    Ok((hour, minute, second, millis))
}

/// Optional trailing `Z` / `±HH:MM`, canonicalized. The second element is
/// the day shift that keeps local fields on the same instant (see
/// [`TimeZone::canonicalize`]).
pub(crate) fn parse_zone_fragment(cursor: &mut Cursor<'_>) -> Result<(Option<TimeZone>, i64)> {
    if cursor.at_end() {
        return Ok((None, 0));
    }
    let offset = TimeZone::parse_raw_at(cursor)?;
    let (zone, day_shift) = TimeZone::canonicalize(offset)?;
    Ok((Some(zone), day_shift))
}

/// Moves local fields by whole days after a zone was canonicalized.
pub(crate) fn shift_days(
    local: NaiveDateTime,
    days: i64,
    type_name: &'static str,
) -> Result<NaiveDateTime> {
    if days == 0 {
        return Ok(local);
    }
    TimeDelta::try_days(days)
        .and_then(|delta| local.checked_add_signed(delta))
        .ok_or_else(|| ValueError::out_of_range(type_name, "time zone shift leaves the calendar range"))
}

// ============================================================================
// DateTime
// ============================================================================

/// An ISO 8601 date-time with millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateTime {
    local: NaiveDateTime,
    zone: Option<TimeZone>,
}

impl DateTime {
    /// Creates a date-time from explicit fields.
    ///
    /// Fields are validated without normalization: April 31 or hour 24 are
    /// out-of-range errors, never rolled over.
    pub fn new(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        millis: u32,
        zone: Option<TimeZone>,
    ) -> Result<Self> {
        let fields = Fields {
            year: i64::from(year),
            month,
            day,
            hour,
            minute,
            second,
            millis,
        };
        Ok(Self {
            local: fields.to_naive(TYPE_NAME)?,
            zone,
        })
    }

    /// Wraps an already validated local date-time.
    pub fn from_naive(local: NaiveDateTime, zone: Option<TimeZone>) -> Self {
        Self {
            local: truncate_to_millis(local),
            zone,
        }
    }

    /// Creates a zoned date-time from a chrono date-time, keeping its offset.
    pub fn from_chrono<Tz: chrono::TimeZone>(value: &chrono::DateTime<Tz>) -> Result<Self> {
        let fixed = value.fixed_offset();
        let (zone, day_shift) = TimeZone::canonicalize(fixed.offset().local_minus_utc() / 60)?;
        let local = shift_days(fixed.naive_local(), day_shift, TYPE_NAME)?;
        Ok(Self::from_naive(local, Some(zone)))
    }

    /// The current instant in UTC.
    pub fn now() -> Self {
        Self::from_naive(Utc::now().naive_utc(), Some(TimeZone::UTC))
    }

    pub fn year(&self) -> i32 {
        self.local.year()
    }

    pub fn month(&self) -> u32 {
        self.local.month()
    }

    pub fn day(&self) -> u32 {
        self.local.day()
    }

    pub fn hour(&self) -> u32 {
        self.local.hour()
    }

    pub fn minute(&self) -> u32 {
        self.local.minute()
    }

    pub fn second(&self) -> u32 {
        self.local.second()
    }

    pub fn millisecond(&self) -> u32 {
        self.local.nanosecond() / 1_000_000
    }

    /// Era of the astronomical year: `year <= 0` is BC.
    pub fn era(&self) -> Era {
        if self.year() <= 0 { Era::Bc } else { Era::Ad }
    }

    /// Year within the era: BC magnitude is `|year| + 1`.
    pub fn year_of_era(&self) -> u32 {
        let year = self.year();
        if year <= 0 {
            year.unsigned_abs() + 1
        } else {
            year.unsigned_abs()
        }
    }

    pub fn has_time_zone(&self) -> bool {
        self.zone.is_some()
    }

    pub fn time_zone(&self) -> Option<TimeZone> {
        self.zone
    }

    /// The zone suffix (`Z` or `±HH:MM`), if zoned.
    pub fn time_zone_string(&self) -> Option<String> {
        self.zone.map(|zone| zone.to_string())
    }

    /// The local calendar fields without any zone.
    pub fn naive(&self) -> NaiveDateTime {
        self.local
    }

    /// Replaces the zone, keeping the local fields.
    #[must_use]
    pub fn with_time_zone(&self, zone: Option<TimeZone>) -> Self {
        Self {
            local: self.local,
            zone,
        }
    }

    /// Normalizes a zoned instant to `Z`. Floating instants are returned
    /// unchanged since they have no anchor.
    pub fn to_utc(&self) -> Result<Self> {
        match self.zone {
            Some(zone) if !zone.is_utc() => {
                let local = self
                    .local
                    .checked_sub_signed(TimeDelta::minutes(i64::from(zone.offset_minutes())))
                    .ok_or_else(|| {
                        ValueError::out_of_range(TYPE_NAME, "UTC normalization overflows")
                    })?;
                Ok(Self {
                    local,
                    zone: Some(TimeZone::UTC),
                })
            }
            _ => Ok(*self),
        }
    }

    /// Milliseconds since the Unix epoch. Floating instants are read as if
    /// they were UTC.
    pub fn epoch_millis(&self) -> i64 {
        let naive = self.local.and_utc().timestamp_millis();
        match self.zone {
            Some(zone) => naive - i64::from(zone.offset_minutes()) * 60_000,
            None => naive,
        }
    }

    /// Renders the canonical form, optionally without the zone suffix.
    pub fn string_value(&self, include_zone: bool) -> String {
        let mut out = format!(
            "{}-{:02}-{:02}T{:02}:{:02}:{:02}",
            format_year(self.year()),
            self.month(),
            self.day(),
            self.hour(),
            self.minute(),
            self.second()
        );
        push_millis(&mut out, self.millisecond());
        if include_zone {
            if let Some(zone) = self.zone {
                out.push_str(&zone.to_string());
            }
        }
        out
    }

    pub fn string_value_no_time_zone(&self) -> String {
        self.string_value(false)
    }

    /// Adds a duration, field by field from years down to milliseconds.
    pub fn add(&self, duration: &Duration) -> Result<Self> {
        self.apply(duration, 1)
    }

    /// Subtracts a duration, field by field from years down to milliseconds.
    pub fn sub(&self, duration: &Duration) -> Result<Self> {
        self.apply(duration, -1)
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

    fn apply(&self, duration: &Duration, operation_sign: i64) -> Result<Self> {
        let forward = duration.sign() * operation_sign > 0;
        let mut local = self.local;

        if duration.years() != 0 {
            let months = duration
                .years()
                .checked_mul(12)
                .ok_or_else(|| overflow("years"))?;
            local = add_months(local, months, forward)?;
        }
        if duration.months() != 0 {
            local = add_months(local, duration.months(), forward)?;
        }
        if duration.days() != 0 {
            local = add_delta(local, duration.days(), TimeDelta::try_days, forward, "days")?;
        }
        if duration.hours() != 0 {
            local = add_delta(local, duration.hours(), TimeDelta::try_hours, forward, "hours")?;
        }
        if duration.minutes() != 0 {
            local = add_delta(
                local,
                duration.minutes(),
                TimeDelta::try_minutes,
                forward,
                "minutes",
            )?;
        }
        if duration.seconds() != 0 {
            local = add_delta(
                local,
                duration.seconds(),
                TimeDelta::try_seconds,
                forward,
                "seconds",
            )?;
        }
        if duration.millis() != 0 {
            local = add_delta(
                local,
                u64::from(duration.millis()),
                TimeDelta::try_milliseconds,
                forward,
                "milliseconds",
            )?;
        }

        Ok(Self {
            local,
            zone: self.zone,
        })
    }

    /// Orders two instants.
    ///
    /// - both zoned: absolute instants are compared
    /// - both floating: local fields are compared
    /// - one of each: the floating instant may lie anywhere within 14 hours
    ///   of its UTC reading, so only instants more than 14 hours apart are
    ///   ordered. Anything within the closed 14 hour band is an
    ///   [`ValueError::AmbiguousComparison`].
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering> {
        match (self.zone, other.zone) {
            (Some(_), Some(_)) | (None, None) => Ok(self.epoch_millis().cmp(&other.epoch_millis())),
            (Some(_), None) => Self::cmp_mixed(self, other),
            (None, Some(_)) => Self::cmp_mixed(other, self).map(Ordering::reverse),
        }
    }

    fn cmp_mixed(zoned: &Self, floating: &Self) -> Result<Ordering> {
        let delta = zoned.epoch_millis() - floating.epoch_millis();
        if delta.abs() > MAX_ZONE_SPREAD_MILLIS {
            Ok(delta.cmp(&0))
        } else {
            Err(ValueError::AmbiguousComparison {
                zoned: zoned.to_string(),
                floating: floating.to_string(),
            })
        }
    }
}

fn overflow(field: &str) -> ValueError {
    ValueError::out_of_range(TYPE_NAME, format!("adding {field} leaves the calendar range"))
}

fn add_months(local: NaiveDateTime, months: u64, forward: bool) -> Result<NaiveDateTime> {
    let months = Months::new(u32::try_from(months).map_err(|_| overflow("months"))?);
    let result = if forward {
        local.checked_add_months(months)
    } else {
        local.checked_sub_months(months)
    };
    result.ok_or_else(|| overflow("months"))
}

fn add_delta(
    local: NaiveDateTime,
    amount: u64,
    unit: fn(i64) -> Option<TimeDelta>,
    forward: bool,
    field: &str,
) -> Result<NaiveDateTime> {
    let amount = i64::try_from(amount).map_err(|_| overflow(field))?;
    let delta = unit(if forward { amount } else { -amount }).ok_or_else(|| overflow(field))?;
    local
        .checked_add_signed(delta)
        .ok_or_else(|| overflow(field))
}

fn truncate_to_millis(local: NaiveDateTime) -> NaiveDateTime {
    let millis = local.nanosecond() / 1_000_000;
    local.with_nanosecond(millis * 1_000_000).unwrap_or(local)
}

pub(crate) fn push_millis(out: &mut String, millis: u32) {
    if millis != 0 {
        out.push_str(&format!(".{millis:03}"));
    }
}

impl FromStr for DateTime {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        let mut cursor = Cursor::new(s, TYPE_NAME);
        let (year, month, day) = parse_date_fragment(&mut cursor)?;
        cursor.expect(b'T', "between date and time")?;
        let (hour, minute, second, millis) = parse_time_fragment(&mut cursor)?;
        let (zone, day_shift) = parse_zone_fragment(&mut cursor)?;
        cursor.finish()?;

        let fields = Fields {
            year,
            month,
            day,
            hour,
            minute,
            second,
            millis,
        };
        Ok(Self {
            local: shift_days(fields.to_naive(TYPE_NAME)?, day_shift, TYPE_NAME)?,
            zone,
        })
    }
}

impl Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string_value(true))
    }
}

impl From<chrono::DateTime<Utc>> for DateTime {
    fn from(value: chrono::DateTime<Utc>) -> Self {
        Self::from_naive(value.naive_utc(), Some(TimeZone::UTC))
    }
}
