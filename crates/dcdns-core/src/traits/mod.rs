//! Core traits for the dcdns agent
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`AddressSource`]: Discover the caller's public address, one family at a time
//! - [`UpdateEndpoint`]: Submit a change-set to the remote DNS-update endpoint

pub mod address_source;
pub mod update_endpoint;

pub use address_source::{AddressFamily, AddressSource, FetchOutcome};
pub use update_endpoint::UpdateEndpoint;
