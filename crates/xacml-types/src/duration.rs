//! ISO 8601 durations and the two XPath duration subtypes.
//!
//! - [`Duration`]: full `[-]PnYnMnDTnHnMnS` duration
//! - [`YearMonthDuration`]: years and months only, ordered by total months
//! - [`DayTimeDuration`]: days through seconds only, ordered by total seconds
//!
//! Magnitudes are stored unsigned with a separate sign. Only the seconds
//! component may carry a fraction; it is kept as an exact decimal so that
//! canonical forms round-trip without floating point drift.

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{Result, ValueError};
use crate::scan::Cursor;

const TYPE_NAME: &str = "duration";

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_DAY: u64 = 86_400;

/// Component positions in canonical order. Parsing requires them to appear
/// in strictly increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Component {
    Years,
    Months,
    Days,
    Hours,
    Minutes,
    Seconds,
}

// ============================================================================
// Duration
// ============================================================================

/// A signed ISO 8601 duration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Duration {
    negative: bool,
    years: u64,
    months: u64,
    days: u64,
    hours: u64,
    minutes: u64,
    seconds: Decimal,
}

impl Duration {
    /// The zero-length duration, rendered `PT0S`.
    pub const ZERO: Duration = Duration {
        negative: false,
        years: 0,
        months: 0,
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: Decimal::ZERO,
    };

    /// Creates a duration from unsigned magnitudes and a sign.
    ///
    /// `seconds` must be non-negative. A zero-length duration is always
    /// positive.
    pub fn new(
        negative: bool,
        years: u64,
        months: u64,
        days: u64,
        hours: u64,
        minutes: u64,
        seconds: Decimal,
    ) -> Result<Self> {
        if seconds.is_sign_negative() && !seconds.is_zero() {
            return Err(ValueError::out_of_range(
                TYPE_NAME,
                format!("seconds magnitude {seconds} is negative"),
            ));
        }
        let mut duration = Self {
            negative,
            years,
            months,
            days,
            hours,
            minutes,
            seconds: seconds.abs().normalize(),
        };
        if duration.is_zero() {
            duration.negative = false;
        }
        Ok(duration)
    }

    /// Creates a duration from whole seconds and milliseconds.
    pub fn from_seconds_millis(negative: bool, seconds: u64, millis: u32) -> Result<Self> {
        let fractional = Decimal::from(seconds) + Decimal::new(i64::from(millis), 3);
        Self::new(negative, 0, 0, 0, 0, 0, fractional)
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Returns `-1` for negative durations, `1` otherwise.
    pub fn sign(&self) -> i64 {
        if self.negative { -1 } else { 1 }
    }

    pub fn years(&self) -> u64 {
        self.years
    }

    pub fn months(&self) -> u64 {
        self.months
    }

    pub fn days(&self) -> u64 {
        self.days
    }

    pub fn hours(&self) -> u64 {
        self.hours
    }

    pub fn minutes(&self) -> u64 {
        self.minutes
    }

    /// Whole seconds (the fraction truncated).
    pub fn seconds(&self) -> u64 {
        self.seconds.trunc().to_u64().unwrap_or(u64::MAX)
    }

    /// Milliseconds of the fractional seconds (sub-millisecond digits are
    /// truncated).
    pub fn millis(&self) -> u32 {
        let fraction = self.seconds.fract() * Decimal::ONE_THOUSAND;
        fraction.trunc().to_u32().unwrap_or(0)
    }

    /// The exact seconds magnitude, fraction included.
    pub fn fractional_seconds(&self) -> Decimal {
        self.seconds
    }

    pub fn is_zero(&self) -> bool {
        self.years == 0
            && self.months == 0
            && self.days == 0
            && self.hours == 0
            && self.minutes == 0
            && self.seconds.is_zero()
    }

    /// Returns the same magnitudes with the opposite sign.
    #[must_use]
    pub fn negate(&self) -> Self {
        let mut negated = self.clone();
        negated.negative = !self.negative && !self.is_zero();
        negated
    }

    fn has_time_part(&self) -> bool {
        self.hours != 0 || self.minutes != 0 || !self.seconds.is_zero()
    }

    /// Signed total months of the year/month components.
    fn total_months(&self) -> Result<i64> {
        let total = i128::from(self.years) * 12 + i128::from(self.months);
        let total = i64::try_from(total).map_err(|_| {
            ValueError::out_of_range(TYPE_NAME, "total months exceed the 64-bit range")
        })?;
        Ok(total * self.sign())
    }

    /// Signed total seconds of the day/time components.
    fn total_seconds(&self) -> Result<Decimal> {
        let overflow = || ValueError::out_of_range(TYPE_NAME, "total seconds overflow");
        let whole = Decimal::from(self.days)
            .checked_mul(Decimal::from(SECONDS_PER_DAY))
            .and_then(|d| d.checked_add(Decimal::from(self.hours) * Decimal::from(SECONDS_PER_HOUR)))
            .and_then(|d| {
                d.checked_add(Decimal::from(self.minutes) * Decimal::from(SECONDS_PER_MINUTE))
            })
            .and_then(|d| d.checked_add(self.seconds))
            .ok_or_else(overflow)?;
        Ok(if self.negative { -whole } else { whole })
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::ZERO
    }
}

impl FromStr for Duration {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        let mut cursor = Cursor::new(s, TYPE_NAME);
        let negative = cursor.eat(b'-');
        cursor.expect(b'P', "to start a duration")?;

        let mut duration = Duration::ZERO;
        let mut last: Option<Component> = None;
        let mut in_time = false;
        let mut time_components = 0usize;

        while !cursor.at_end() {
            if cursor.peek() == Some(b'T') {
                if in_time {
                    return Err(cursor.error("duplicate 'T' separator"));
                }
                cursor.bump();
                in_time = true;
                continue;
            }

            let number_pos = cursor.pos();
            let number = cursor.unsigned_decimal("a component value")?;
            let designator = cursor
                .peek()
                .ok_or_else(|| cursor.error("missing component designator"))?;
            let component = match (designator, in_time) {
                (b'Y', false) => Component::Years,
                (b'M', false) => Component::Months,
                (b'D', false) => Component::Days,
                (b'H', true) => Component::Hours,
                (b'M', true) => Component::Minutes,
                (b'S', true) => Component::Seconds,
                _ => {
                    return Err(cursor.error(format!(
                        "unexpected designator '{}'",
                        designator as char
                    )));
                }
            };
            if last.is_some_and(|previous| component <= previous) {
                return Err(cursor.error("components out of order or repeated"));
            }
            cursor.bump();

            if component == Component::Seconds {
                duration.seconds = parse_exact_seconds(number)?;
            } else {
                if number.contains('.') {
                    return Err(ValueError::malformed(
                        TYPE_NAME,
                        s,
                        number_pos,
                        "only the seconds component may be fractional",
                    ));
                }
                let value: u64 = number.parse().map_err(|_| {
                    ValueError::out_of_range(TYPE_NAME, format!("component {number} too large"))
                })?;
                match component {
                    Component::Years => duration.years = value,
                    Component::Months => duration.months = value,
                    Component::Days => duration.days = value,
                    Component::Hours => duration.hours = value,
                    Component::Minutes => duration.minutes = value,
                    Component::Seconds => unreachable!("seconds handled above"),
                }
            }
            if in_time {
                time_components += 1;
            }
            last = Some(component);
        }

        if last.is_none() {
            return Err(cursor.error("a duration needs at least one component"));
        }
        if in_time && time_components == 0 {
            return Err(cursor.error("'T' must be followed by a time component"));
        }

        duration.negative = negative && !duration.is_zero();
        Ok(duration)
    }
}

/// Parses the seconds component without rounding: a value `Decimal` cannot
/// hold exactly is out of range.
fn parse_exact_seconds(number: &str) -> Result<Decimal> {
    let too_precise =
        || ValueError::out_of_range(TYPE_NAME, format!("seconds {number} exceed decimal precision"));
    let value = Decimal::from_str(number).map_err(|_| too_precise())?.normalize();

    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    let whole = whole.trim_start_matches('0');
    let fraction = fraction.trim_end_matches('0');
    let written = match (whole.is_empty(), fraction.is_empty()) {
        (true, true) => "0".to_string(),
        (true, false) => format!("0.{fraction}"),
        (false, true) => whole.to_string(),
        (false, false) => format!("{whole}.{fraction}"),
    };
    if value.to_string() == written {
        Ok(value)
    } else {
        Err(too_precise())
    }
}

impl Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("PT0S");
        }
        if self.negative {
            f.write_str("-")?;
        }
        f.write_str("P")?;
        if self.years != 0 {
            write!(f, "{}Y", self.years)?;
        }
        if self.months != 0 {
            write!(f, "{}M", self.months)?;
        }
        if self.days != 0 {
            write!(f, "{}D", self.days)?;
        }
        if self.has_time_part() {
            f.write_str("T")?;
            if self.hours != 0 {
                write!(f, "{}H", self.hours)?;
            }
            if self.minutes != 0 {
                write!(f, "{}M", self.minutes)?;
            }
            if !self.seconds.is_zero() {
                write!(f, "{}S", self.seconds.normalize())?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// YearMonthDuration
// ============================================================================

/// A duration restricted to years and months.
///
/// Equality, hashing and ordering use the signed total number of months, so
/// `P14M` and `P1Y2M` are the same value. Rendering always uses the
/// canonical folded form.
#[derive(Debug, Clone)]
pub struct YearMonthDuration {
    duration: Duration,
    total_months: i64,
}

impl YearMonthDuration {
    pub fn new(negative: bool, years: u64, months: u64) -> Result<Self> {
        Self::try_from(Duration::new(negative, years, months, 0, 0, 0, Decimal::ZERO)?)
    }

    /// Builds the canonical duration for a signed month count.
    pub fn from_total_months(total_months: i64) -> Self {
        let magnitude = total_months.unsigned_abs();
        let duration = Duration {
            negative: total_months < 0,
            years: magnitude / 12,
            months: magnitude % 12,
            ..Duration::ZERO
        };
        Self {
            duration,
            total_months,
        }
    }

    pub fn total_months(&self) -> i64 {
        self.total_months
    }

    /// Returns the duration with excess months folded into years.
    #[must_use]
    pub fn canonical(&self) -> Self {
        Self::from_total_months(self.total_months)
    }

    /// The underlying duration, as parsed (not folded).
    pub fn as_duration(&self) -> &Duration {
        &self.duration
    }

    #[must_use]
    pub fn negate(&self) -> Self {
        Self::from_total_months(-self.total_months)
    }
}

impl TryFrom<Duration> for YearMonthDuration {
    type Error = ValueError;

    fn try_from(duration: Duration) -> Result<Self> {
        if duration.days != 0 || duration.has_time_part() {
            return Err(ValueError::malformed(
                "yearMonthDuration",
                &duration.to_string(),
                0,
                "only year and month components are allowed",
            ));
        }
        let total_months = duration.total_months()?;
        Ok(Self {
            duration,
            total_months,
        })
    }
}

impl FromStr for YearMonthDuration {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        let duration: Duration = s.parse()?;
        if duration.days != 0 || duration.has_time_part() {
            let offset = s.find(['D', 'T']).unwrap_or(0);
            return Err(ValueError::malformed(
                "yearMonthDuration",
                s,
                offset,
                "only year and month components are allowed",
            ));
        }
        Self::try_from(duration)
    }
}

impl Display for YearMonthDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.canonical().duration.fmt(f)
    }
}

impl PartialEq for YearMonthDuration {
    fn eq(&self, other: &Self) -> bool {
        self.total_months == other.total_months
    }
}

impl Eq for YearMonthDuration {}

impl Hash for YearMonthDuration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.total_months.hash(state);
    }
}

impl PartialOrd for YearMonthDuration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for YearMonthDuration {
    fn cmp(&self, other: &Self) -> Ordering {
        self.total_months.cmp(&other.total_months)
    }
}

// ============================================================================
// DayTimeDuration
// ============================================================================

/// A duration restricted to days, hours, minutes and seconds.
///
/// Equality, hashing and ordering use the signed total number of seconds.
#[derive(Debug, Clone)]
pub struct DayTimeDuration {
    duration: Duration,
    total_seconds: Decimal,
}

impl DayTimeDuration {
    pub fn new(
        negative: bool,
        days: u64,
        hours: u64,
        minutes: u64,
        seconds: Decimal,
    ) -> Result<Self> {
        Self::try_from(Duration::new(negative, 0, 0, days, hours, minutes, seconds)?)
    }

    /// Builds the canonical duration for a signed number of seconds.
    pub fn from_total_seconds(total_seconds: Decimal) -> Result<Self> {
        let magnitude = total_seconds.abs();
        let whole = magnitude
            .trunc()
            .to_u64()
            .ok_or_else(|| ValueError::out_of_range("dayTimeDuration", "too many seconds"))?;
        let fraction = magnitude.fract();
        let duration = Duration::new(
            total_seconds.is_sign_negative(),
            0,
            0,
            whole / SECONDS_PER_DAY,
            (whole % SECONDS_PER_DAY) / SECONDS_PER_HOUR,
            (whole % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE,
            Decimal::from(whole % SECONDS_PER_MINUTE) + fraction,
        )?;
        Ok(Self {
            duration,
            total_seconds: total_seconds.normalize(),
        })
    }

    /// Signed total seconds, fraction included.
    pub fn total_seconds(&self) -> Decimal {
        self.total_seconds
    }

    /// Signed total milliseconds (sub-millisecond digits truncated).
    pub fn total_millis(&self) -> Option<i64> {
        (self.total_seconds * Decimal::ONE_THOUSAND).trunc().to_i64()
    }

    /// Returns the duration with seconds, minutes and hours folded upward.
    pub fn canonical(&self) -> Result<Self> {
        Self::from_total_seconds(self.total_seconds)
    }

    pub fn as_duration(&self) -> &Duration {
        &self.duration
    }

    #[must_use]
    pub fn negate(&self) -> Self {
        Self {
            duration: self.duration.negate(),
            total_seconds: -self.total_seconds,
        }
    }
}

impl TryFrom<Duration> for DayTimeDuration {
    type Error = ValueError;

    fn try_from(duration: Duration) -> Result<Self> {
        if duration.years != 0 || duration.months != 0 {
            return Err(ValueError::malformed(
                "dayTimeDuration",
                &duration.to_string(),
                0,
                "year and month components are not allowed",
            ));
        }
        let total_seconds = duration.total_seconds()?.normalize();
        Ok(Self {
            duration,
            total_seconds,
        })
    }
}

impl FromStr for DayTimeDuration {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        let duration: Duration = s.parse()?;
        if duration.years != 0 || duration.months != 0 {
            let end = s.find(['D', 'T']).unwrap_or(s.len());
            let offset = s[..end].find(['Y', 'M']).unwrap_or(0);
            return Err(ValueError::malformed(
                "dayTimeDuration",
                s,
                offset,
                "year and month components are not allowed",
            ));
        }
        Self::try_from(duration)
    }
}

impl Display for DayTimeDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.canonical() {
            Ok(canonical) => canonical.duration.fmt(f),
            Err(_) => self.duration.fmt(f),
        }
    }
}

impl PartialEq for DayTimeDuration {
    fn eq(&self, other: &Self) -> bool {
        self.total_seconds == other.total_seconds
    }
}

impl Eq for DayTimeDuration {}

impl Hash for DayTimeDuration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.total_seconds.hash(state);
    }
}

impl PartialOrd for DayTimeDuration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DayTimeDuration {
    fn cmp(&self, other: &Self) -> Ordering {
        self.total_seconds.cmp(&other.total_seconds)
    }
}

impl From<YearMonthDuration> for Duration {
    fn from(value: YearMonthDuration) -> Self {
        value.duration
    }
}

impl From<DayTimeDuration> for Duration {
    fn from(value: DayTimeDuration) -> Self {
        value.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn parses_every_component() {
        let d: Duration = "P1Y2M3DT4H5M6.5S".parse().unwrap();
        assert_eq!(d.years(), 1);
        assert_eq!(d.months(), 2);
        assert_eq!(d.days(), 3);
        assert_eq!(d.hours(), 4);
        assert_eq!(d.minutes(), 5);
        assert_eq!(d.seconds(), 6);
        assert_eq!(d.millis(), 500);
        assert!(!d.is_negative());
    }

    #[test_case("P1M1Y"; "out of order")]
    #[test_case("P"; "empty")]
    #[test_case("PT"; "empty time")]
    #[test_case("P1Y1.5M"; "fractional months")]
    #[test_case("P1YT"; "dangling T")]
    #[test_case("P1D1D"; "duplicate")]
    #[test_case("PT1H1H"; "duplicate time")]
    #[test_case("P1S"; "seconds without T")]
    #[test_case("PT1Y"; "years after T")]
    #[test_case("1Y"; "missing P")]
    #[test_case("P-1Y"; "inner sign")]
    #[test_case("P1"; "missing designator")]
    #[test_case("PTT1S"; "double T")]
    #[test_case("P1.5D"; "fractional days")]
    fn rejects(input: &str) {
        assert!(input.parse::<Duration>().is_err(), "{input} should fail");
    }

    #[test_case("PT0.00000000000000000000000000000001S"; "below decimal scale")]
    #[test_case("PT79228162514264337593543950336S"; "above decimal range")]
    #[test_case("PT10.0000000000000000000000000001S"; "too many significant digits")]
    fn seconds_are_never_rounded(input: &str) {
        assert!(matches!(
            input.parse::<Duration>(),
            Err(ValueError::OutOfRange { .. })
        ));
    }

    #[test_case("PT0.0000000000000000000000000001S" => "PT0.0000000000000000000000000001S"; "smallest step")]
    #[test_case("PT0006.5000S" => "PT6.5S"; "padding zeros")]
    #[test_case("PT0.000S" => "PT0S"; "zero fraction")]
    fn exact_seconds_are_kept(input: &str) -> String {
        input.parse::<Duration>().unwrap().to_string()
    }

    #[test]
    fn fractional_component_error_points_at_number() {
        let err = "P1Y1.5M".parse::<Duration>().unwrap_err();
        assert_eq!(err.offset(), Some(3));
    }

    #[test_case("P1Y2M3DT4H5M6.5S")]
    #[test_case("-P1D")]
    #[test_case("PT0.001S")]
    #[test_case("P10Y")]
    #[test_case("PT36H")]
    #[test_case("-PT1M")]
    fn canonical_round_trip(input: &str) {
        assert_eq!(input.parse::<Duration>().unwrap().to_string(), input);
    }

    #[test_case("PT0S" => "PT0S")]
    #[test_case("-P0D" => "PT0S")]
    #[test_case("P0Y0M" => "PT0S")]
    #[test_case("PT6.500S" => "PT6.5S")]
    #[test_case("P0Y1M" => "P1M")]
    fn renders_canonical(input: &str) -> String {
        input.parse::<Duration>().unwrap().to_string()
    }

    #[test]
    fn negative_zero_is_positive() {
        let d: Duration = "-PT0S".parse().unwrap();
        assert!(!d.is_negative());
        assert_eq!(d, Duration::ZERO);
    }

    #[test]
    fn year_month_total_and_fold() {
        let ym: YearMonthDuration = "-P1Y14M".parse().unwrap();
        assert_eq!(ym.total_months(), -26);
        assert_eq!(ym.canonical().as_duration().years(), 2);
        assert_eq!(ym.canonical().as_duration().months(), 2);
        assert_eq!(ym.to_string(), "-P2Y2M");
        assert_eq!(ym, "-P26M".parse().unwrap());
    }

    #[test]
    fn year_month_rejects_day_time() {
        assert!("P1Y2D".parse::<YearMonthDuration>().is_err());
        assert!("P1YT1H".parse::<YearMonthDuration>().is_err());
    }

    #[test]
    fn day_time_total_and_fold() {
        let dt: DayTimeDuration = "PT90061.25S".parse().unwrap();
        assert_eq!(dt.total_seconds(), Decimal::new(9006125, 2));
        assert_eq!(dt.to_string(), "P1DT1H1M1.25S");
        assert_eq!(dt, "P1DT1H1M1.25S".parse().unwrap());
        assert_eq!(dt.total_millis(), Some(90_061_250));
    }

    #[test]
    fn day_time_rejects_year_month() {
        assert!("P1MT1H".parse::<DayTimeDuration>().is_err());
    }

    #[test]
    fn day_time_ordering() {
        let short: DayTimeDuration = "PT23H".parse().unwrap();
        let long: DayTimeDuration = "P1D".parse().unwrap();
        let negative: DayTimeDuration = "-P2D".parse().unwrap();
        assert!(short < long);
        assert!(negative < short);
    }

    #[test]
    fn millis_truncate_sub_millisecond_digits() {
        let d: Duration = "PT1.2345S".parse().unwrap();
        assert_eq!(d.seconds(), 1);
        assert_eq!(d.millis(), 234);
        assert_eq!(d.to_string(), "PT1.2345S");
    }
}
