// # HTTP Update Endpoint
//
// This crate provides a form-encoded HTTP update endpoint implementation
// for the dcdns agent.
//
// ## Wire Format
//
// One POST per submission, `application/x-www-form-urlencoded`:
//
// - `token`: shared-secret token (always)
// - `host`:  hostname to update (always)
// - `zone`:  DNS zone (only when configured)
// - `ipv4`:  new IPv4 address (only when it changed this cycle)
// - `ipv6`:  new IPv6 address (only when it changed this cycle)
//
// A family that did not change is absent from the body, not sent empty.
//
// ## Architectural Constraints
//
// - NO retry logic (submission is at-most-once; the engine never replays
//   a change-set)
// - NO state access (owned by the engine)
// - NO background tasks
//
// ## Security Requirements
//
// - The token NEVER appears in logs
// - Fail fast if the token is empty (config validation)

use async_trait::async_trait;
use tracing::{debug, info};

use dcdns_core::config::UpdateConfig;
use dcdns_core::state::ChangeSet;
use dcdns_core::traits::UpdateEndpoint;
use dcdns_core::{Error, Result};

/// Form-encoded HTTP update endpoint
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the token.
pub struct HttpUpdateEndpoint {
    /// URL of the update endpoint
    url: String,

    /// Shared-secret token
    /// NEVER log this value
    token: String,

    /// Hostname to update
    host: String,

    /// DNS zone, when the endpoint needs it spelled out
    zone: Option<String>,

    /// HTTP client for submissions
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpUpdateEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpUpdateEndpoint")
            .field("url", &self.url)
            .field("token", &"<REDACTED>")
            .field("host", &self.host)
            .field("zone", &self.zone)
            .finish()
    }
}

impl HttpUpdateEndpoint {
    /// Create a new HTTP update endpoint from update configuration
    pub fn new(config: &UpdateConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: config.url.clone(),
            token: config.token.clone(),
            host: config.host.clone(),
            zone: config.zone.clone(),
            client,
        })
    }

    /// Build the form fields for a change-set
    ///
    /// Field order matches the documented wire format. Unchanged families
    /// are omitted entirely.
    fn form_fields(&self, changes: &ChangeSet) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("token", self.token.clone()),
            ("host", self.host.clone()),
        ];

        if let Some(zone) = &self.zone {
            fields.push(("zone", zone.clone()));
        }
        if let Some(addr) = changes.ipv4 {
            fields.push(("ipv4", addr.to_string()));
        }
        if let Some(addr) = changes.ipv6 {
            fields.push(("ipv6", addr.to_string()));
        }

        fields
    }
}

#[async_trait]
impl UpdateEndpoint for HttpUpdateEndpoint {
    async fn submit(&self, changes: &ChangeSet) -> Result<()> {
        if changes.is_empty() {
            return Err(Error::NothingToUpdate);
        }

        let fields = self.form_fields(changes);
        debug!(host = %self.host, "submitting address update");

        let response = self
            .client
            .post(&self.url)
            .form(&fields)
            .send()
            .await
            .map_err(|e| Error::http(format!("update request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::rejected(status.as_u16(), body));
        }

        info!(
            host = %self.host,
            ipv4 = ?changes.ipv4,
            ipv6 = ?changes.ipv6,
            "addresses updated"
        );
        Ok(())
    }

    fn endpoint_name(&self) -> &'static str {
        "http-form"
    }
}
