//! Network addresses and port ranges.
//!
//! Lexical forms:
//!
//! - port range: `n`, `lo-hi`, `-hi` or `lo-`
//! - IPv4: `a.b.c.d[/mask][:portrange]`, mask in dotted-quad form
//! - IPv6: `[addr][/[mask]][:portrange]`
//!
//! [`IpAddress`] dispatches on the leading `[` to pick the family.

use std::fmt::{self, Display};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::error::{Result, ValueError};

const PORT_RANGE: &str = "port range";
const IP_ADDRESS: &str = "ipAddress";

// ============================================================================
// PortRange
// ============================================================================

/// An inclusive range of ports; either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRange {
    low: Option<u16>,
    high: Option<u16>,
}

impl PortRange {
    /// A range admitting every port.
    pub const ANY: PortRange = PortRange {
        low: None,
        high: None,
    };

    pub fn new(low: Option<u16>, high: Option<u16>) -> Result<Self> {
        if let (Some(lo), Some(hi)) = (low, high) {
            if lo > hi {
                return Err(ValueError::out_of_range(
                    PORT_RANGE,
                    format!("lower bound {lo} exceeds upper bound {hi}"),
                ));
            }
        }
        Ok(Self { low, high })
    }

    pub fn single(port: u16) -> Self {
        Self {
            low: Some(port),
            high: Some(port),
        }
    }

    pub fn low(&self) -> Option<u16> {
        self.low
    }

    pub fn high(&self) -> Option<u16> {
        self.high
    }

    pub fn is_unbounded(&self) -> bool {
        self.low.is_none() && self.high.is_none()
    }

    pub fn contains(&self, port: u16) -> bool {
        self.low.is_none_or(|lo| port >= lo) && self.high.is_none_or(|hi| port <= hi)
    }

    /// Parses a port range embedded at `base` within `input`, so offsets are
    /// reported against the enclosing value.
    fn parse_within(
        type_name: &'static str,
        input: &str,
        base: usize,
        text: &str,
    ) -> Result<Self> {
        let port = |s: &str, at: usize| -> Result<u16> {
            if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ValueError::malformed(
                    type_name,
                    input,
                    base + at,
                    "expected a port number",
                ));
            }
            s.parse::<u16>().map_err(|_| {
                ValueError::out_of_range(PORT_RANGE, format!("port {s} exceeds 65535"))
            })
        };

        match text.split_once('-') {
            None => port(text, 0).map(Self::single),
            Some(("", "")) => Ok(Self::ANY),
            Some(("", hi)) => Self::new(None, Some(port(hi, 1)?)),
            Some((lo, "")) => Self::new(Some(port(lo, 0)?), None),
            Some((lo, hi)) => Self::new(Some(port(lo, 0)?), Some(port(hi, lo.len() + 1)?)),
        }
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self::ANY
    }
}

impl FromStr for PortRange {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_within(PORT_RANGE, s, 0, s)
    }
}

impl Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.low, self.high) {
            (Some(lo), Some(hi)) if lo == hi => write!(f, "{lo}"),
            (Some(lo), Some(hi)) => write!(f, "{lo}-{hi}"),
            (Some(lo), None) => write!(f, "{lo}-"),
            (None, Some(hi)) => write!(f, "-{hi}"),
            (None, None) => f.write_str("-"),
        }
    }
}

/// Splits an optional `:portrange` suffix starting at `at`.
fn parse_port_suffix(input: &str, at: usize) -> Result<Option<PortRange>> {
    match input.get(at..) {
        None | Some("") => Ok(None),
        Some(rest) => match rest.strip_prefix(':') {
            Some(ports) => PortRange::parse_within(IP_ADDRESS, input, at + 1, ports).map(Some),
            None => Err(ValueError::malformed(
                IP_ADDRESS,
                input,
                at,
                "expected ':' before port range",
            )),
        },
    }
}

fn render_ports(f: &mut fmt::Formatter<'_>, ports: Option<&PortRange>) -> fmt::Result {
    match ports {
        Some(ports) => write!(f, ":{ports}"),
        None => Ok(()),
    }
}

// ============================================================================
// IPv4
// ============================================================================

/// An IPv4 address with optional network mask and port range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Address {
    address: Ipv4Addr,
    mask: Option<Ipv4Addr>,
    ports: Option<PortRange>,
}

impl Ipv4Address {
    pub fn new(address: Ipv4Addr, mask: Option<Ipv4Addr>, ports: Option<PortRange>) -> Self {
        Self {
            address,
            mask,
            ports,
        }
    }

    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    pub fn mask(&self) -> Option<Ipv4Addr> {
        self.mask
    }

    pub fn ports(&self) -> Option<PortRange> {
        self.ports
    }

    /// Network membership under the mask, or equality without one.
    pub fn contains(&self, candidate: Ipv4Addr) -> bool {
        let mask = self.mask.map_or(u32::MAX, u32::from);
        u32::from(candidate) & mask == u32::from(self.address) & mask
    }
}

impl FromStr for Ipv4Address {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        let address_end = s.find(['/', ':']).unwrap_or(s.len());
        let address = parse_v4(s, 0, &s[..address_end])?;

        let mut pos = address_end;
        let mask = if s[pos..].starts_with('/') {
            let start = pos + 1;
            let end = s[start..].find(':').map_or(s.len(), |i| start + i);
            pos = end;
            Some(parse_v4(s, start, &s[start..end])?)
        } else {
            None
        };

        Ok(Self {
            address,
            mask,
            ports: parse_port_suffix(s, pos)?,
        })
    }
}

fn parse_v4(input: &str, at: usize, text: &str) -> Result<Ipv4Addr> {
    text.parse()
        .map_err(|_| ValueError::malformed(IP_ADDRESS, input, at, "invalid IPv4 address"))
}

impl Display for Ipv4Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)?;
        if let Some(mask) = self.mask {
            write!(f, "/{mask}")?;
        }
        render_ports(f, self.ports.as_ref())
    }
}

// ============================================================================
// IPv6
// ============================================================================

/// An IPv6 address with optional network mask and port range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv6Address {
    address: Ipv6Addr,
    mask: Option<Ipv6Addr>,
    ports: Option<PortRange>,
}

impl Ipv6Address {
    pub fn new(address: Ipv6Addr, mask: Option<Ipv6Addr>, ports: Option<PortRange>) -> Self {
        Self {
            address,
            mask,
            ports,
        }
    }

    pub fn address(&self) -> Ipv6Addr {
        self.address
    }

    pub fn mask(&self) -> Option<Ipv6Addr> {
        self.mask
    }

    pub fn ports(&self) -> Option<PortRange> {
        self.ports
    }

    pub fn contains(&self, candidate: Ipv6Addr) -> bool {
        let mask = self.mask.map_or(u128::MAX, u128::from);
        u128::from(candidate) & mask == u128::from(self.address) & mask
    }
}

/// Reads a bracketed IPv6 address at `at`, returning it and the offset after `]`.
fn parse_bracketed_v6(input: &str, at: usize) -> Result<(Ipv6Addr, usize)> {
    if !input[at..].starts_with('[') {
        return Err(ValueError::malformed(IP_ADDRESS, input, at, "expected '['"));
    }
    let close = input[at..]
        .find(']')
        .map(|i| at + i)
        .ok_or_else(|| ValueError::malformed(IP_ADDRESS, input, input.len(), "expected ']'"))?;
    let address = input[at + 1..close].parse().map_err(|_| {
        ValueError::malformed(IP_ADDRESS, input, at + 1, "invalid IPv6 address")
    })?;
    Ok((address, close + 1))
}

impl FromStr for Ipv6Address {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        let (address, mut pos) = parse_bracketed_v6(s, 0)?;
        let mask = if s[pos..].starts_with('/') {
            let (mask, end) = parse_bracketed_v6(s, pos + 1)?;
            pos = end;
            Some(mask)
        } else {
            None
        };
        Ok(Self {
            address,
            mask,
            ports: parse_port_suffix(s, pos)?,
        })
    }
}

impl Display for Ipv6Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.address)?;
        if let Some(mask) = self.mask {
            write!(f, "/[{mask}]")?;
        }
        render_ports(f, self.ports.as_ref())
    }
}

// ============================================================================
// IpAddress
// ============================================================================

/// An IPv4 or IPv6 address value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpAddress {
    V4(Ipv4Address),
    V6(Ipv6Address),
}

impl IpAddress {
    pub fn ports(&self) -> Option<PortRange> {
        match self {
            Self::V4(v4) => v4.ports(),
            Self::V6(v6) => v6.ports(),
        }
    }

    /// Network membership; addresses of the other family never match.
    pub fn contains(&self, candidate: IpAddr) -> bool {
        match (self, candidate) {
            (Self::V4(v4), IpAddr::V4(addr)) => v4.contains(addr),
            (Self::V6(v6), IpAddr::V6(addr)) => v6.contains(addr),
            _ => false,
        }
    }
}

impl FromStr for IpAddress {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        if s.starts_with('[') {
            s.parse().map(Self::V6)
        } else {
            s.parse().map(Self::V4)
        }
    }
}

impl Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4(v4) => v4.fmt(f),
            Self::V6(v6) => v6.fmt(f),
        }
    }
}

impl From<Ipv4Address> for IpAddress {
    fn from(value: Ipv4Address) -> Self {
        Self::V4(value)
    }
}

impl From<Ipv6Address> for IpAddress {
    fn from(value: Ipv6Address) -> Self {
        Self::V6(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("80", Some(80), Some(80))]
    #[test_case("1024-2048", Some(1024), Some(2048))]
    #[test_case("-1023", None, Some(1023))]
    #[test_case("1024-", Some(1024), None)]
    fn port_range_forms(input: &str, low: Option<u16>, high: Option<u16>) {
        let range: PortRange = input.parse().unwrap();
        assert_eq!((range.low(), range.high()), (low, high));
        assert_eq!(range.to_string(), input);
    }

    #[test_case("a-b"; "letters")]
    #[test_case("80-90-100"; "two dashes")]
    #[test_case(""; "empty")]
    fn port_range_malformed(input: &str) {
        assert!(matches!(
            input.parse::<PortRange>(),
            Err(ValueError::Malformed { .. })
        ));
    }

    #[test]
    fn port_range_out_of_range() {
        assert!(matches!(
            "70000".parse::<PortRange>(),
            Err(ValueError::OutOfRange { .. })
        ));
        assert!(matches!(
            "90-80".parse::<PortRange>(),
            Err(ValueError::OutOfRange { .. })
        ));
    }

    #[test]
    fn port_range_contains() {
        let range: PortRange = "1024-".parse().unwrap();
        assert!(range.contains(1024));
        assert!(range.contains(u16::MAX));
        assert!(!range.contains(80));
        assert!(PortRange::ANY.contains(0));
    }

    #[test]
    fn unbounded_port_range_round_trips() {
        assert_eq!(PortRange::ANY.to_string(), "-");
        assert_eq!("-".parse::<PortRange>().unwrap(), PortRange::ANY);

        let address = Ipv4Address::new(Ipv4Addr::new(10, 0, 0, 1), None, Some(PortRange::ANY));
        let text = address.to_string();
        assert_eq!(text, "10.0.0.1:-");
        assert_eq!(text.parse::<Ipv4Address>().unwrap(), address);

        let address = Ipv6Address::new(Ipv6Addr::LOCALHOST, None, Some(PortRange::ANY));
        assert_eq!(address.to_string().parse::<Ipv6Address>().unwrap(), address);
    }

    #[test_case("10.0.0.1")]
    #[test_case("10.0.0.0/255.0.0.0")]
    #[test_case("10.0.0.1:8080")]
    #[test_case("192.168.1.0/255.255.255.0:80-443")]
    #[test_case("[::1]")]
    #[test_case("[2001:db8::]/[ffff:ffff::]")]
    #[test_case("[2001:db8::1]:443")]
    #[test_case("[2001:db8::]/[ffff:ffff::]:-1023")]
    fn ip_round_trip(input: &str) {
        assert_eq!(input.parse::<IpAddress>().unwrap().to_string(), input);
    }

    #[test]
    fn dispatch_picks_family() {
        assert!(matches!("10.0.0.1".parse::<IpAddress>(), Ok(IpAddress::V4(_))));
        assert!(matches!("[::1]".parse::<IpAddress>(), Ok(IpAddress::V6(_))));
    }

    #[test_case("10.0.0"; "short ipv4")]
    #[test_case("10.0.0.1/"; "empty mask")]
    #[test_case("10.0.0.1:"; "empty ports")]
    #[test_case("::1"; "unbracketed ipv6")]
    #[test_case("[::1"; "unclosed bracket")]
    #[test_case("[::1]x"; "junk after address")]
    fn ip_malformed(input: &str) {
        assert!(matches!(
            input.parse::<IpAddress>(),
            Err(ValueError::Malformed { .. })
        ));
    }

    #[test]
    fn malformed_port_offset_is_absolute() {
        let err = "10.0.0.1:8x".parse::<IpAddress>().unwrap_err();
        assert_eq!(err.offset(), Some(9));
    }

    #[test]
    fn network_membership() {
        let net: IpAddress = "192.168.1.0/255.255.255.0".parse().unwrap();
        assert!(net.contains("192.168.1.77".parse().unwrap()));
        assert!(!net.contains("192.168.2.1".parse().unwrap()));
        assert!(!net.contains("::1".parse().unwrap()));

        let host: IpAddress = "10.0.0.1".parse().unwrap();
        assert!(host.contains("10.0.0.1".parse().unwrap()));
        assert!(!host.contains("10.0.0.2".parse().unwrap()));

        let v6: IpAddress = "[2001:db8::]/[ffff:ffff::]".parse().unwrap();
        assert!(v6.contains("2001:db8:1::5".parse().unwrap()));
        assert!(!v6.contains("2001:db9::5".parse().unwrap()));
    }
}
