//! # Port Range Model
//!
//! A closed interval of UDP/TCP ports the allocator may hand out.
//!
//! `0-0` is the sentinel for "no restriction": binds use the requested port, or let the
//! operating system pick an ephemeral one.

use std::fmt;
use std::str::FromStr;

use crate::error::NetworkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRange {
    minimum: u16,
    maximum: u16,
}

impl PortRange {
    pub const UNRESTRICTED: PortRange = PortRange {
        minimum: 0,
        maximum: 0,
    };

    pub fn new(minimum: u16, maximum: u16) -> Result<Self, NetworkError> {
        if minimum > maximum {
            return Err(NetworkError::InvalidPortRange(format!(
                "minimum {minimum} is greater than maximum {maximum}"
            )));
        }
        Ok(Self { minimum, maximum })
    }

    pub fn minimum(&self) -> u16 {
        self.minimum
    }

    pub fn maximum(&self) -> u16 {
        self.maximum
    }

    pub fn is_unrestricted(&self) -> bool {
        self.minimum == 0 && self.maximum == 0
    }

    /// Number of ports in the range, `maximum - minimum + 1`.
    pub fn span(&self) -> u32 {
        u32::from(self.maximum - self.minimum) + 1
    }

    pub fn contains(&self, port: u16) -> bool {
        (self.minimum..=self.maximum).contains(&port)
    }

    pub fn ports(&self) -> impl Iterator<Item = u16> {
        self.minimum..=self.maximum
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self::UNRESTRICTED
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.minimum, self.maximum)
    }
}

impl FromStr for PortRange {
    type Err = NetworkError;

    /// Parses `<min>-<max>`, both sides plain decimal digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NetworkError::InvalidPortRange(format!("expected <min>-<max>, got {s:?}"));

        let (min_str, max_str) = s.split_once('-').ok_or_else(invalid)?;
        let minimum = parse_port(min_str).ok_or_else(invalid)?;
        let maximum = parse_port(max_str).ok_or_else(invalid)?;

        PortRange::new(minimum, maximum)
    }
}

fn parse_port(s: &str) -> Option<u16> {
    // u16::from_str also accepts a leading '+'
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
