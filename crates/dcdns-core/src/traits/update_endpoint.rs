// # Update Endpoint Trait
//
// Defines the interface for submitting a change-set to the remote
// DNS-update endpoint.
//
// ## Implementations
//
// - Form-encoded HTTP POST: `dcdns-endpoint-http` crate

use async_trait::async_trait;

use crate::error::Result;
use crate::state::ChangeSet;

/// Trait for update submission implementations
///
/// One submission attempt per cycle, no retry: by the time `submit` runs the
/// tracker has already advanced its notion of "current", so a failed attempt
/// is simply logged and the next change triggers a fresh submission.
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait UpdateEndpoint: Send + Sync {
    /// Submit a change-set to the remote endpoint
    ///
    /// Contract: when `changes` is empty, implementations return
    /// [`Error::NothingToUpdate`](crate::Error::NothingToUpdate) before any
    /// network activity. Callers treat that variant as benign.
    ///
    /// A non-2xx answer surfaces as
    /// [`Error::UpdateRejected`](crate::Error::UpdateRejected) and is not
    /// retried here.
    async fn submit(&self, changes: &ChangeSet) -> Result<()>;

    /// Get the endpoint name (for logging/debugging)
    fn endpoint_name(&self) -> &'static str;
}
