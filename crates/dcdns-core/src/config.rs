//! Configuration types for the dcdns agent
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Main dcdns configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcdnsConfig {
    /// Which address families to track
    #[serde(default)]
    pub families: FamilyConfig,

    /// Address discovery settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Update endpoint settings
    pub update: UpdateConfig,

    /// Engine loop settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DcdnsConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if !self.families.ipv4 && !self.families.ipv6 {
            return Err(crate::Error::config(
                "at least one address family must be enabled",
            ));
        }

        self.discovery.validate()?;
        self.update.validate()?;
        self.engine.validate()?;

        Ok(())
    }
}

/// Address family toggles
///
/// IPv4 tracking is on by default; IPv6 is opt-in because many networks
/// still lack usable IPv6 connectivity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FamilyConfig {
    /// Track the public IPv4 address
    #[serde(default = "default_ipv4_enabled")]
    pub ipv4: bool,

    /// Track the public IPv6 address
    #[serde(default = "default_ipv6_enabled")]
    pub ipv6: bool,
}

impl Default for FamilyConfig {
    fn default() -> Self {
        Self {
            ipv4: default_ipv4_enabled(),
            ipv6: default_ipv6_enabled(),
        }
    }
}

fn default_ipv4_enabled() -> bool {
    true
}

fn default_ipv6_enabled() -> bool {
    false
}

/// Address discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// URL of the IPv4 discovery service
    #[serde(default = "default_ipv4_url")]
    pub ipv4_url: String,

    /// URL of the IPv6 discovery service
    #[serde(default = "default_ipv6_url")]
    pub ipv6_url: String,

    /// Per-request timeout (in seconds)
    #[serde(default = "default_discovery_timeout_secs")]
    pub timeout_secs: u64,

    /// Total fetch attempts per cycle, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff before the first retry (in seconds); doubles per retry
    #[serde(default = "default_initial_backoff_secs")]
    pub initial_backoff_secs: u64,
}

impl DiscoveryConfig {
    /// Validate the discovery configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.ipv4_url.is_empty() {
            return Err(crate::Error::config("IPv4 discovery URL cannot be empty"));
        }
        if self.ipv6_url.is_empty() {
            return Err(crate::Error::config("IPv6 discovery URL cannot be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("discovery timeout must be > 0"));
        }
        if self.max_attempts == 0 {
            return Err(crate::Error::config("discovery max_attempts must be > 0"));
        }
        Ok(())
    }

    /// Per-request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Initial retry backoff as a [`Duration`]
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_secs(self.initial_backoff_secs)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            ipv4_url: default_ipv4_url(),
            ipv6_url: default_ipv6_url(),
            timeout_secs: default_discovery_timeout_secs(),
            max_attempts: default_max_attempts(),
            initial_backoff_secs: default_initial_backoff_secs(),
        }
    }
}

fn default_ipv4_url() -> String {
    "https://api.ipify.org?format=json".to_string()
}

fn default_ipv6_url() -> String {
    "https://api6.ipify.org?format=json".to_string()
}

fn default_discovery_timeout_secs() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    5
}

fn default_initial_backoff_secs() -> u64 {
    1
}

/// Update endpoint configuration
///
/// Carries the shared-secret token, so `Debug` is implemented by hand to
/// keep the token out of logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// URL of the update endpoint
    pub url: String,

    /// Shared-secret token authenticating the agent
    pub token: String,

    /// Hostname whose records the endpoint should update
    pub host: String,

    /// DNS zone, when the endpoint cannot derive it from the host
    #[serde(default)]
    pub zone: Option<String>,

    /// Per-request timeout (in seconds)
    #[serde(default = "default_update_timeout_secs")]
    pub timeout_secs: u64,
}

impl UpdateConfig {
    /// Validate the update configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.url.is_empty() {
            return Err(crate::Error::config("update endpoint URL cannot be empty"));
        }
        if self.token.is_empty() {
            return Err(crate::Error::config("update token cannot be empty"));
        }
        if self.host.is_empty() {
            return Err(crate::Error::config("update host cannot be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("update timeout must be > 0"));
        }
        Ok(())
    }

    /// Per-request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for UpdateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateConfig")
            .field("url", &self.url)
            .field("token", &"<REDACTED>")
            .field("host", &self.host)
            .field("zone", &self.zone)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_update_timeout_secs() -> u64 {
    10
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seconds between discovery cycles
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Capacity of the internal event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.poll_interval_secs == 0 {
            return Err(crate::Error::config("poll interval must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("event channel capacity must be > 0"));
        }
        Ok(())
    }

    /// Poll interval as a [`Duration`]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    300
}

fn default_event_channel_capacity() -> usize {
    64
}
