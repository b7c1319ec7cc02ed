//! RFC 822 mailbox names and RFC 2396 DNS host names.

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::error::{Result, ValueError};
use crate::net::PortRange;

const RFC822: &str = "rfc822Name";
const DNS_NAME: &str = "dnsName";

// ============================================================================
// Rfc822Name
// ============================================================================

/// An e-mail style name, `local@domain`.
///
/// The local part is case-sensitive; the domain is not and is stored
/// lower-cased, which is also the canonical rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rfc822Name {
    local_part: String,
    domain: String,
}

impl Rfc822Name {
    pub fn new(local_part: &str, domain: &str) -> Result<Self> {
        format!("{local_part}@{domain}").parse()
    }

    pub fn local_part(&self) -> &str {
        &self.local_part
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Matches this name against an `rfc822Name-match` pattern.
    ///
    /// - `local@domain`: exact mailbox; local part case-sensitive
    /// - `.example.com`: any mailbox in a subdomain of `example.com`
    /// - `example.com`: any mailbox at exactly that host
    pub fn matches(&self, pattern: &str) -> bool {
        if let Some((local, domain)) = pattern.split_once('@') {
            return local == self.local_part && domain.eq_ignore_ascii_case(&self.domain);
        }
        if pattern.starts_with('.') {
            let domain = self.domain.as_bytes();
            return domain.len() > pattern.len()
                && domain[domain.len() - pattern.len()..].eq_ignore_ascii_case(pattern.as_bytes());
        }
        self.domain.eq_ignore_ascii_case(pattern)
    }
}

impl FromStr for Rfc822Name {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        let at = s
            .find('@')
            .ok_or_else(|| ValueError::malformed(RFC822, s, s.len(), "expected '@'"))?;
        let (local, domain) = (&s[..at], &s[at + 1..]);

        if local.is_empty() {
            return Err(ValueError::malformed(RFC822, s, 0, "empty local part"));
        }
        if domain.is_empty() {
            return Err(ValueError::malformed(RFC822, s, at + 1, "empty domain"));
        }
        if let Some(i) = s.find(|c: char| c.is_whitespace() || c.is_control()) {
            return Err(ValueError::malformed(RFC822, s, i, "whitespace in name"));
        }
        if let Some(i) = domain.find('@') {
            return Err(ValueError::malformed(RFC822, s, at + 1 + i, "second '@'"));
        }

        Ok(Self {
            local_part: local.to_string(),
            domain: domain.to_ascii_lowercase(),
        })
    }
}

impl Display for Rfc822Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.local_part, self.domain)
    }
}

// ============================================================================
// DnsName
// ============================================================================

/// A DNS host name with an optional port range, `host[:portrange]`.
///
/// The host may start with a `*.` wildcard label and may end with a dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DnsName {
    host: String,
    ports: Option<PortRange>,
}

impl DnsName {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn ports(&self) -> Option<PortRange> {
        self.ports
    }

    pub fn is_wildcard(&self) -> bool {
        self.host.starts_with("*.")
    }

    /// Whether `host` is named by this value. A wildcard matches any host
    /// with at least one extra leading label.
    pub fn matches(&self, host: &str) -> bool {
        let own = self.host.trim_end_matches('.');
        let host = host.trim_end_matches('.');
        match own.strip_prefix('*') {
            Some(suffix) => {
                host.len() > suffix.len()
                    && host.as_bytes()[host.len() - suffix.len()..]
                        .eq_ignore_ascii_case(suffix.as_bytes())
                    && !host[..host.len() - suffix.len()].ends_with('.')
            }
            None => own.eq_ignore_ascii_case(host),
        }
    }

    fn validate_host(input: &str, host: &str) -> Result<()> {
        let malformed = |at: usize, reason: &str| ValueError::malformed(DNS_NAME, input, at, reason);

        let (body, mut offset) = match host.strip_prefix("*.") {
            Some(rest) => (rest, 2),
            None => (host, 0),
        };
        let body = body.strip_suffix('.').unwrap_or(body);
        if body.is_empty() {
            return Err(malformed(offset, "empty host name"));
        }

        let labels: Vec<&str> = body.split('.').collect();
        for (i, label) in labels.iter().enumerate() {
            let bytes = label.as_bytes();
            if bytes.is_empty() {
                return Err(malformed(offset, "empty label"));
            }
            if let Some(bad) = bytes
                .iter()
                .position(|b| !(b.is_ascii_alphanumeric() || *b == b'-'))
            {
                return Err(malformed(offset + bad, "invalid character in label"));
            }
            if bytes[0] == b'-' {
                return Err(malformed(offset, "label starts with '-'"));
            }
            if bytes[bytes.len() - 1] == b'-' {
                return Err(malformed(offset + bytes.len() - 1, "label ends with '-'"));
            }
            if i == labels.len() - 1 && bytes[0].is_ascii_digit() {
                return Err(malformed(offset, "top-level label starts with a digit"));
            }
            offset += bytes.len() + 1;
        }
        Ok(())
    }
}

impl FromStr for DnsName {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        let (host, ports) = match s.split_once(':') {
            Some((host, ports)) => {
                let ports = ports.parse::<PortRange>().map_err(|err| match err {
                    ValueError::Malformed { offset, reason, .. } => ValueError::malformed(
                        DNS_NAME,
                        s,
                        host.len() + 1 + offset,
                        reason,
                    ),
                    other => other,
                })?;
                (host, Some(ports))
            }
            None => (s, None),
        };
        Self::validate_host(s, host)?;
        Ok(Self {
            host: host.to_string(),
            ports,
        })
    }
}

impl Display for DnsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.host)?;
        if let Some(ports) = self.ports {
            write!(f, ":{ports}")?;
        }
        Ok(())
    }
}
