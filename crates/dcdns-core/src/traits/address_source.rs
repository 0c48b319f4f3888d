// # Address Source Trait
//
// Defines the interface for discovering the caller's public address.
//
// ## Implementations
//
// - HTTP-based (ipify-style discovery services): `dcdns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use dcdns_core::traits::{AddressFamily, AddressSource, FetchOutcome};
//
// #[tokio::main]
// async fn main() {
//     let source = /* AddressSource implementation */;
//
//     match source.fetch(AddressFamily::V4).await {
//         FetchOutcome::Success(raw) => println!("discovered: {raw}"),
//         FetchOutcome::TransientFailure => println!("no data this cycle"),
//         FetchOutcome::PermanentFailure(detail) => println!("rejected: {detail}"),
//     }
// }
// ```

use async_trait::async_trait;
use std::fmt;

/// Address family a discovery query targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    /// Lowercase name, matching the update endpoint's form field names
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressFamily::V4 => "ipv4",
            AddressFamily::V6 => "ipv6",
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one discovery fetch for one address family
///
/// Failures are data, not errors: the cycle treats both failure variants as
/// "no new data for this family" and keeps running. The two variants exist
/// so logs can tell network flakiness apart from a remote rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The discovery service answered. The value is the raw string from the
    /// response body and has NOT been validated yet.
    Success(String),

    /// Connection-level failure (timeout, refused, unreachable) that
    /// persisted through every retry attempt.
    TransientFailure,

    /// The service was reachable but the exchange failed in a way retrying
    /// cannot fix: a non-2xx status or an unreadable body.
    PermanentFailure(String),
}

/// Trait for address discovery implementations
///
/// Implementations own their retry policy: `fetch` returns once per cycle,
/// after any internal retries have run their course. Implementations must be
/// thread-safe and usable across async tasks.
#[async_trait]
pub trait AddressSource: Send + Sync {
    /// Discover the current public address for one family
    ///
    /// Never returns an `Err`: every failure mode is a [`FetchOutcome`]
    /// variant the caller pattern-matches on.
    async fn fetch(&self, family: AddressFamily) -> FetchOutcome;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
