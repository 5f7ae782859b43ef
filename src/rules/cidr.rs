//! IPv4 CIDR parsing and membership.

use std::net::Ipv4Addr;

/// A parsed `a.b.c.d/n` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CidrRange {
    base: u32,
    mask: u32,
}

impl CidrRange {
    /// Parse an `a.b.c.d/n` string. Returns `None` for anything else,
    /// including IPv6 ranges and out-of-range prefix lengths.
    pub fn parse(cidr: &str) -> Option<Self> {
        let (range, bits) = cidr.split_once('/')?;
        let base: Ipv4Addr = range.parse().ok()?;
        let bits: u32 = bits.parse().ok()?;
        if bits > 32 {
            return None;
        }
        let mask = if bits == 0 { 0 } else { u32::MAX << (32 - bits) };
        Some(Self {
            base: u32::from(base),
            mask,
        })
    }

    /// Whether `addr` falls inside this range.
    pub fn contains(&self, addr: u32) -> bool {
        (addr & self.mask) == (self.base & self.mask)
    }
}

/// Parse a dotted-quad literal into its 32-bit form.
///
/// IPv6 input (anything containing ':') and non-address literals return
/// `None` and therefore never match any range.
pub fn parse_ipv4(ip: &str) -> Option<u32> {
    if ip.contains(':') {
        return None;
    }
    ip.parse::<Ipv4Addr>().ok().map(u32::from)
}
