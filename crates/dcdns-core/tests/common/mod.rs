//! Test doubles and common utilities for architecture contract tests
//!
//! This module provides minimal test doubles that verify architectural
//! constraints without touching the network.

use dcdns_core::error::{Error, Result};
use dcdns_core::state::ChangeSet;
use dcdns_core::traits::{AddressFamily, AddressSource, FetchOutcome, UpdateEndpoint};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An AddressSource that replays a per-family script of outcomes
///
/// Each fetch pops the next scripted outcome for the queried family; once a
/// script is down to its last entry, that entry repeats forever.
pub struct ScriptedAddressSource {
    scripts: Arc<Mutex<HashMap<AddressFamily, VecDeque<FetchOutcome>>>>,
    fetch_call_count: Arc<AtomicUsize>,
}

impl ScriptedAddressSource {
    pub fn new() -> Self {
        Self {
            scripts: Arc::new(Mutex::new(HashMap::new())),
            fetch_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Append an outcome to a family's script
    pub fn push(&self, family: AddressFamily, outcome: FetchOutcome) {
        self.scripts
            .lock()
            .unwrap()
            .entry(family)
            .or_default()
            .push_back(outcome);
    }

    /// Convenience: script a successful fetch of a raw value
    pub fn push_success(&self, family: AddressFamily, raw: &str) {
        self.push(family, FetchOutcome::Success(raw.to_string()));
    }

    /// Get the number of times fetch() was called, across both families
    pub fn fetch_call_count(&self) -> usize {
        self.fetch_call_count.load(Ordering::SeqCst)
    }

    /// Create a new ScriptedAddressSource that shares scripts and counters
    /// with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            scripts: Arc::clone(&other.scripts),
            fetch_call_count: Arc::clone(&other.fetch_call_count),
        }
    }
}

#[async_trait::async_trait]
impl AddressSource for ScriptedAddressSource {
    async fn fetch(&self, family: AddressFamily) -> FetchOutcome {
        self.fetch_call_count.fetch_add(1, Ordering::SeqCst);

        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(&family) {
            Some(script) if script.len() > 1 => script.pop_front().unwrap(),
            Some(script) => script
                .front()
                .cloned()
                .unwrap_or(FetchOutcome::TransientFailure),
            None => FetchOutcome::TransientFailure,
        }
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// An UpdateEndpoint that records submissions
///
/// Honors the submission contract: an empty change-set is reported as
/// `NothingToUpdate` before anything is recorded. Non-empty submissions are
/// always recorded, even when the endpoint is configured to reject them.
pub struct RecordingEndpoint {
    submissions: Arc<Mutex<Vec<ChangeSet>>>,
    /// When set, every non-empty submission fails with this HTTP status
    fail_with_status: Option<u16>,
}

impl RecordingEndpoint {
    pub fn new() -> Self {
        Self {
            submissions: Arc::new(Mutex::new(Vec::new())),
            fail_with_status: None,
        }
    }

    /// Create an endpoint that rejects every non-empty submission
    pub fn rejecting(status: u16) -> Self {
        Self {
            submissions: Arc::new(Mutex::new(Vec::new())),
            fail_with_status: Some(status),
        }
    }

    /// Get the recorded non-empty submissions, in order
    pub fn submissions(&self) -> Vec<ChangeSet> {
        self.submissions.lock().unwrap().clone()
    }

    /// Get the number of non-empty submissions
    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    /// Create a new RecordingEndpoint that shares its record with an
    /// existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            submissions: Arc::clone(&other.submissions),
            fail_with_status: other.fail_with_status,
        }
    }
}

#[async_trait::async_trait]
impl UpdateEndpoint for RecordingEndpoint {
    async fn submit(&self, changes: &ChangeSet) -> Result<()> {
        if changes.is_empty() {
            return Err(Error::NothingToUpdate);
        }

        self.submissions.lock().unwrap().push(*changes);

        match self.fail_with_status {
            Some(status) => Err(Error::rejected(status, "rejected by test endpoint")),
            None => Ok(()),
        }
    }

    fn endpoint_name(&self) -> &'static str {
        "recording"
    }
}

/// Helper to create a minimal DcdnsConfig for testing
pub fn minimal_config() -> dcdns_core::config::DcdnsConfig {
    dcdns_core::config::DcdnsConfig {
        families: dcdns_core::config::FamilyConfig {
            ipv4: true,
            ipv6: true,
        },
        discovery: dcdns_core::config::DiscoveryConfig::default(),
        update: dcdns_core::config::UpdateConfig {
            url: "https://dns.example.com/update".to_string(),
            token: "test-token".to_string(),
            host: "home.example.com".to_string(),
            zone: None,
            timeout_secs: 10,
        },
        engine: dcdns_core::config::EngineConfig {
            poll_interval_secs: 1,
            event_channel_capacity: 100,
        },
    }
}
