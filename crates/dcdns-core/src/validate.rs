//! Address validation
//!
//! Discovery services return untrusted text. Everything that crosses from
//! "raw response body" to "typed address" goes through these parsers, so a
//! misbehaving service can never push garbage into state or onto the wire.

use std::net::{Ipv4Addr, Ipv6Addr};

use crate::traits::AddressFamily;

/// Parse a raw string as an IPv4 address
///
/// Strict: no surrounding whitespace, no CIDR suffix, no hostname lookup.
/// Returns `None` for anything that is not a literal dotted-quad.
pub fn parse_ipv4(raw: &str) -> Option<Ipv4Addr> {
    raw.parse().ok()
}

/// Parse a raw string as an IPv6 address
///
/// Strict: no surrounding whitespace, no zone suffix handling beyond what
/// the standard parser accepts.
pub fn parse_ipv6(raw: &str) -> Option<Ipv6Addr> {
    raw.parse().ok()
}

/// Check whether a raw string is a valid literal for the given family
///
/// An IPv6 literal is not valid for the V4 family and vice versa.
pub fn is_valid_address(raw: &str, family: AddressFamily) -> bool {
    match family {
        AddressFamily::V4 => parse_ipv4(raw).is_some(),
        AddressFamily::V6 => parse_ipv6(raw).is_some(),
    }
}
