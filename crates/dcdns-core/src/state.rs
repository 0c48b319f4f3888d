//! Address state and change-set types
//!
//! The agent keeps its notion of "current public address" entirely in
//! memory. A [`ChangeSet`] is the delta between a discovery cycle's
//! findings and the stored [`AddressState`]; it doubles as the payload
//! handed to the update endpoint.

use std::net::{Ipv4Addr, Ipv6Addr};

/// Last-known public addresses, one slot per family
///
/// `None` means "never discovered" for that family. State is process-local
/// and starts empty on every launch, so the first successful discovery
/// after startup always looks like a change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressState {
    /// Last-known public IPv4 address
    pub ipv4: Option<Ipv4Addr>,

    /// Last-known public IPv6 address
    pub ipv6: Option<Ipv6Addr>,
}

impl AddressState {
    /// Create an empty state (no address known for either family)
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the state that results from applying a change-set
    ///
    /// Families absent from the change-set keep their stored value.
    pub fn apply(&self, changes: &ChangeSet) -> Self {
        Self {
            ipv4: changes.ipv4.or(self.ipv4),
            ipv6: changes.ipv6.or(self.ipv6),
        }
    }
}

/// Per-cycle delta between discovered and stored addresses
///
/// A family appears here only when discovery produced a valid address
/// that differs from the stored one. An empty change-set means the cycle
/// has nothing to submit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// New IPv4 address, if it changed this cycle
    pub ipv4: Option<Ipv4Addr>,

    /// New IPv6 address, if it changed this cycle
    pub ipv6: Option<Ipv6Addr>,
}

impl ChangeSet {
    /// True when no family changed this cycle
    pub fn is_empty(&self) -> bool {
        self.ipv4.is_none() && self.ipv6.is_none()
    }
}
