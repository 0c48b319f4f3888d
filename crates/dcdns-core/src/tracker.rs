//! Change detection
//!
//! The tracker compares one cycle's fetch outcomes against the stored
//! [`AddressState`] and produces the [`ChangeSet`] to submit. It is pure:
//! no network, no clock, no side effects beyond log lines, which keeps the
//! decision logic trivially testable.

use tracing::{debug, warn};

use crate::state::{AddressState, ChangeSet};
use crate::traits::{AddressFamily, FetchOutcome};
use crate::validate;

/// Decides, per cycle, which families changed
///
/// One instance per engine; the tracker itself is stateless, state is
/// threaded through [`decide`](ChangeTracker::decide) by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeTracker;

impl ChangeTracker {
    /// Create a new tracker
    pub fn new() -> Self {
        Self
    }

    /// Compare fetch outcomes against stored state
    ///
    /// `None` for a family means it was not queried this cycle (disabled in
    /// configuration). Failed fetches contribute nothing: the stored value
    /// stays authoritative until a valid replacement shows up.
    ///
    /// Returns the change-set to submit and the state the cycle should
    /// carry forward. The returned state already has the change-set
    /// applied, so a later submission failure does not trigger a resubmit
    /// of the same addresses.
    pub fn decide(
        &self,
        state: &AddressState,
        ipv4: Option<&FetchOutcome>,
        ipv6: Option<&FetchOutcome>,
    ) -> (ChangeSet, AddressState) {
        let mut changes = ChangeSet::default();

        if let Some(candidate) = Self::candidate(ipv4, AddressFamily::V4) {
            if let Some(addr) = validate::parse_ipv4(&candidate) {
                if state.ipv4 != Some(addr) {
                    changes.ipv4 = Some(addr);
                }
            } else {
                warn!(
                    family = %AddressFamily::V4,
                    raw = %candidate,
                    "discovery returned an invalid address, ignoring"
                );
            }
        }

        if let Some(candidate) = Self::candidate(ipv6, AddressFamily::V6) {
            if let Some(addr) = validate::parse_ipv6(&candidate) {
                if state.ipv6 != Some(addr) {
                    changes.ipv6 = Some(addr);
                }
            } else {
                warn!(
                    family = %AddressFamily::V6,
                    raw = %candidate,
                    "discovery returned an invalid address, ignoring"
                );
            }
        }

        let next = state.apply(&changes);
        (changes, next)
    }

    /// Extract the raw candidate string from a fetch outcome, if any
    fn candidate(outcome: Option<&FetchOutcome>, family: AddressFamily) -> Option<String> {
        match outcome {
            Some(FetchOutcome::Success(raw)) => Some(raw.clone()),
            Some(FetchOutcome::TransientFailure) => {
                debug!(%family, "no discovery data this cycle (transient failure)");
                None
            }
            Some(FetchOutcome::PermanentFailure(detail)) => {
                debug!(%family, %detail, "no discovery data this cycle (rejected)");
                None
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn success(raw: &str) -> FetchOutcome {
        FetchOutcome::Success(raw.to_string())
    }

    #[test]
    fn test_first_discovery_is_a_change() {
        let tracker = ChangeTracker::new();
        let state = AddressState::new();

        let (changes, next) =
            tracker.decide(&state, Some(&success("203.0.113.7")), Some(&success("2001:db8::1")));

        assert_eq!(changes.ipv4, Some(Ipv4Addr::new(203, 0, 113, 7)));
        assert_eq!(changes.ipv6, Some("2001:db8::1".parse::<Ipv6Addr>().unwrap()));
        assert_eq!(next.ipv4, changes.ipv4);
        assert_eq!(next.ipv6, changes.ipv6);
    }

    #[test]
    fn test_unchanged_address_produces_empty_changeset() {
        let tracker = ChangeTracker::new();
        let state = AddressState {
            ipv4: Some(Ipv4Addr::new(203, 0, 113, 7)),
            ipv6: None,
        };

        let (changes, next) = tracker.decide(&state, Some(&success("203.0.113.7")), None);

        assert!(changes.is_empty());
        assert_eq!(next, state);
    }

    #[test]
    fn test_changed_address_is_detected() {
        let tracker = ChangeTracker::new();
        let state = AddressState {
            ipv4: Some(Ipv4Addr::new(203, 0, 113, 7)),
            ipv6: None,
        };

        let (changes, next) = tracker.decide(&state, Some(&success("198.51.100.9")), None);

        assert_eq!(changes.ipv4, Some(Ipv4Addr::new(198, 51, 100, 9)));
        assert_eq!(changes.ipv6, None);
        assert_eq!(next.ipv4, Some(Ipv4Addr::new(198, 51, 100, 9)));
    }

    #[test]
    fn test_failed_fetch_keeps_stored_value() {
        let tracker = ChangeTracker::new();
        let state = AddressState {
            ipv4: Some(Ipv4Addr::new(203, 0, 113, 7)),
            ipv6: None,
        };

        let (changes, next) =
            tracker.decide(&state, Some(&FetchOutcome::TransientFailure), None);
        assert!(changes.is_empty());
        assert_eq!(next, state);

        let (changes, next) = tracker.decide(
            &state,
            Some(&FetchOutcome::PermanentFailure("HTTP 503".to_string())),
            None,
        );
        assert!(changes.is_empty());
        assert_eq!(next, state);
    }

    #[test]
    fn test_invalid_candidate_is_ignored() {
        let tracker = ChangeTracker::new();
        let state = AddressState::new();

        let (changes, next) = tracker.decide(&state, Some(&success("not an ip")), None);

        assert!(changes.is_empty());
        assert_eq!(next, state);
    }

    #[test]
    fn test_wrong_family_literal_is_ignored() {
        let tracker = ChangeTracker::new();
        let state = AddressState::new();

        // An IPv6 literal handed back by the IPv4 discovery service.
        let (changes, _) = tracker.decide(&state, Some(&success("2001:db8::1")), None);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_disabled_family_contributes_nothing() {
        let tracker = ChangeTracker::new();
        let state = AddressState::new();

        let (changes, next) = tracker.decide(&state, None, Some(&success("2001:db8::1")));

        assert_eq!(changes.ipv4, None);
        assert_eq!(changes.ipv6, Some("2001:db8::1".parse::<Ipv6Addr>().unwrap()));
        assert_eq!(next.ipv4, None);
    }

    #[test]
    fn test_mixed_outcome_only_includes_changed_family() {
        let tracker = ChangeTracker::new();
        let state = AddressState {
            ipv4: Some(Ipv4Addr::new(203, 0, 113, 7)),
            ipv6: Some("2001:db8::1".parse().unwrap()),
        };

        let (changes, _) = tracker.decide(
            &state,
            Some(&success("203.0.113.7")),
            Some(&success("2001:db8::2")),
        );

        assert_eq!(changes.ipv4, None);
        assert_eq!(changes.ipv6, Some("2001:db8::2".parse::<Ipv6Addr>().unwrap()));
    }
}
