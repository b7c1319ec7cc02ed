//! # xacml-types: Value types behind the XACML datatypes
//!
//! This crate contains the strongly-typed values that XACML attribute values
//! are converted into:
//! - Temporal types ([`DateTime`], [`Date`], [`Time`], [`TimeZone`])
//! - Durations ([`Duration`], [`YearMonthDuration`], [`DayTimeDuration`])
//! - Network types ([`IpAddress`], [`Ipv4Address`], [`Ipv6Address`], [`PortRange`])
//! - Names ([`Rfc822Name`], [`DnsName`])
//! - Binary types ([`HexBinary`], [`Base64Binary`])
//! - URI references ([`AnyUri`])
//!
//! Every type parses from its lexical form with [`FromStr`](std::str::FromStr),
//! renders its canonical form with [`Display`](std::fmt::Display), and is
//! immutable once built. Failures are reported as [`ValueError`].

pub mod any_uri;
pub mod binary;
pub mod date;
pub mod datetime;
pub mod duration;
pub mod error;
pub mod names;
pub mod net;
pub mod scan;
pub mod time;
pub mod timezone;

pub use any_uri::AnyUri;
pub use binary::{Base64Binary, HexBinary};
pub use date::Date;
pub use datetime::{DateTime, Era, MAX_ZONE_SPREAD_MILLIS};
pub use duration::{DayTimeDuration, Duration, YearMonthDuration};
pub use error::{Result, ValueError};
pub use names::{DnsName, Rfc822Name};
pub use net::{IpAddress, Ipv4Address, Ipv6Address, PortRange};
pub use time::Time;
pub use timezone::TimeZone;

// ============================================================================
// Serde - every value travels as its canonical string
// ============================================================================

macro_rules! serde_via_string {
    ($($ty:ty),* $(,)?) => {
        $(
            impl serde::Serialize for $ty {
                fn serialize<S: serde::Serializer>(
                    &self,
                    serializer: S,
                ) -> std::result::Result<S::Ok, S::Error> {
                    serializer.collect_str(self)
                }
            }

            impl<'de> serde::Deserialize<'de> for $ty {
                fn deserialize<D: serde::Deserializer<'de>>(
                    deserializer: D,
                ) -> std::result::Result<Self, D::Error> {
                    let text = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
                    text.parse().map_err(serde::de::Error::custom)
                }
            }
        )*
    };
}

serde_via_string!(
    AnyUri,
    Base64Binary,
    Date,
    DateTime,
    DayTimeDuration,
    DnsName,
    Duration,
    HexBinary,
    IpAddress,
    Ipv4Address,
    Ipv6Address,
    PortRange,
    Rfc822Name,
    Time,
    TimeZone,
    YearMonthDuration,
);
