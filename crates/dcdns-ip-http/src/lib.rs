// # HTTP Address Source
//
// This crate provides an HTTP-based address source for the dcdns agent.
//
// ## Architecture
//
// Queries an ipify-style discovery service once per engine cycle, one
// request per enabled address family. The service answers with a JSON
// body of the form `{"ip": "<address>"}`.
//
// ## Failure Classification
//
// - Timeouts and connection failures are **transient** and retried under
//   the configured policy (exponential backoff).
// - Non-2xx statuses and unreadable bodies are **permanent** for the
//   cycle: retrying the same request cannot fix them, so the source gives
//   up immediately and reports the detail.
//
// Both classifications surface as `FetchOutcome` variants, never as
// errors: the engine treats a failed fetch as "no data this cycle".

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use dcdns_core::config::DiscoveryConfig;
use dcdns_core::retry::RetryPolicy;
use dcdns_core::traits::{AddressFamily, AddressSource, FetchOutcome};
use dcdns_core::{Error, Result};

/// Discovery service response body
#[derive(Debug, Deserialize)]
struct DiscoveryBody {
    ip: String,
}

/// One failed fetch attempt, classified for the retry policy
#[derive(Debug, Clone, PartialEq, Eq)]
enum AttemptError {
    /// Timeout or connection failure; worth retrying
    Transient(String),

    /// Non-2xx status or unreadable body; retrying cannot help
    Permanent(String),
}

impl AttemptError {
    fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// HTTP-based address source
///
/// One instance serves both families; the per-family URLs come from
/// [`DiscoveryConfig`].
#[derive(Debug)]
pub struct HttpAddressSource {
    /// URL of the IPv4 discovery service
    ipv4_url: String,

    /// URL of the IPv6 discovery service
    ipv6_url: String,

    /// Retry policy for transient failures
    retry: RetryPolicy,

    /// HTTP client (carries the per-request timeout)
    client: reqwest::Client,
}

impl HttpAddressSource {
    /// Create a new HTTP address source from discovery configuration
    pub fn new(config: &DiscoveryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            ipv4_url: config.ipv4_url.clone(),
            ipv6_url: config.ipv6_url.clone(),
            retry: RetryPolicy::new(config.max_attempts, config.initial_backoff()),
            client,
        })
    }

    fn url_for(&self, family: AddressFamily) -> &str {
        match family {
            AddressFamily::V4 => &self.ipv4_url,
            AddressFamily::V6 => &self.ipv6_url,
        }
    }

    /// Perform one fetch attempt for one family
    async fn attempt(&self, family: AddressFamily) -> std::result::Result<String, AttemptError> {
        let url = self.url_for(family);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                AttemptError::Transient(format!("request failed: {}", e))
            } else {
                AttemptError::Permanent(format!("request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Permanent(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AttemptError::Permanent(format!("failed to read response: {}", e)))?;

        parse_discovery_body(&body).map_err(AttemptError::Permanent)
    }
}

/// Extract the raw address string from a discovery response body
///
/// The value is passed along as-is; validation happens downstream in the
/// change tracker.
fn parse_discovery_body(body: &str) -> std::result::Result<String, String> {
    let parsed: DiscoveryBody = serde_json::from_str(body)
        .map_err(|e| format!("unreadable discovery body: {}", e))?;
    Ok(parsed.ip)
}

#[async_trait]
impl AddressSource for HttpAddressSource {
    async fn fetch(&self, family: AddressFamily) -> FetchOutcome {
        let result = self
            .retry
            .run(|| self.attempt(family), AttemptError::is_transient)
            .await;

        match result {
            Ok(raw) => {
                debug!(%family, raw = %raw, "discovery answered");
                FetchOutcome::Success(raw)
            }
            Err(AttemptError::Transient(detail)) => {
                warn!(%family, %detail, "discovery unreachable after all attempts");
                FetchOutcome::TransientFailure
            }
            Err(AttemptError::Permanent(detail)) => {
                warn!(%family, %detail, "discovery request rejected");
                FetchOutcome::PermanentFailure(detail)
            }
        }
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_parse_discovery_body() {
        assert_eq!(
            parse_discovery_body(r#"{"ip": "203.0.113.7"}"#),
            Ok("203.0.113.7".to_string())
        );
    }

    #[test]
    fn test_parse_discovery_body_keeps_raw_value() {
        // Validation is not this crate's job.
        assert_eq!(
            parse_discovery_body(r#"{"ip": "not an ip"}"#),
            Ok("not an ip".to_string())
        );
    }

    #[test]
    fn test_parse_discovery_body_rejects_non_json() {
        assert!(parse_discovery_body("203.0.113.7").is_err());
        assert!(parse_discovery_body("").is_err());
        assert!(parse_discovery_body("<html>busy</html>").is_err());
    }

    #[test]
    fn test_parse_discovery_body_rejects_missing_field() {
        assert!(parse_discovery_body(r#"{"address": "203.0.113.7"}"#).is_err());
    }

    #[test]
    fn test_attempt_error_classification() {
        assert!(AttemptError::Transient("timeout".to_string()).is_transient());
        assert!(!AttemptError::Permanent("HTTP 503".to_string()).is_transient());
    }

    #[test]
    fn test_source_uses_configured_urls() {
        let config = DiscoveryConfig {
            ipv4_url: "http://v4.test/".to_string(),
            ipv6_url: "http://v6.test/".to_string(),
            ..DiscoveryConfig::default()
        };
        let source = HttpAddressSource::new(&config).unwrap();

        assert_eq!(source.url_for(AddressFamily::V4), "http://v4.test/");
        assert_eq!(source.url_for(AddressFamily::V6), "http://v6.test/");
    }

    #[test]
    fn test_retry_policy_comes_from_config() {
        let config = DiscoveryConfig {
            max_attempts: 3,
            initial_backoff_secs: 2,
            ..DiscoveryConfig::default()
        };
        let source = HttpAddressSource::new(&config).unwrap();

        assert_eq!(source.retry.max_attempts, 3);
        assert_eq!(source.retry.initial_delay, Duration::from_secs(2));
    }

    /// Serve one canned HTTP response on a local listener, then close
    async fn serve_once(response: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                use tokio::io::{AsyncReadExt, AsyncWriteExt};
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                let _ = stream.write_all(response.as_bytes()).await;
            }
        });

        format!("http://{}/", addr)
    }

    fn source_for(url: String, max_attempts: u32) -> HttpAddressSource {
        let config = DiscoveryConfig {
            ipv4_url: url.clone(),
            ipv6_url: url,
            timeout_secs: 5,
            max_attempts,
            initial_backoff_secs: 1,
        };
        HttpAddressSource::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success_returns_raw_body_value() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 21\r\nconnection: close\r\n\r\n{\"ip\": \"203.0.113.7\"}",
        )
        .await;
        let source = source_for(url, 1);

        let outcome = source.fetch(AddressFamily::V4).await;
        assert_eq!(outcome, FetchOutcome::Success("203.0.113.7".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_non_2xx_is_permanent_without_retry() {
        // A single canned response: a retry would hang on a dead socket,
        // so the test passing quickly proves no second request was made.
        let url = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;
        let source = source_for(url, 5);

        let outcome = source.fetch(AddressFamily::V4).await;
        assert_eq!(
            outcome,
            FetchOutcome::PermanentFailure("HTTP 503 Service Unavailable".to_string())
        );
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_transient() {
        // Bind then drop to reserve a port nothing is listening on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = source_for(format!("http://{}/", addr), 2);

        let outcome = source.fetch(AddressFamily::V4).await;
        assert_eq!(outcome, FetchOutcome::TransientFailure);
    }

    #[tokio::test]
    async fn test_fetch_unreadable_body_is_permanent() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: 16\r\nconnection: close\r\n\r\n<html>busy</html",
        )
        .await;
        let source = source_for(url, 1);

        match source.fetch(AddressFamily::V4).await {
            FetchOutcome::PermanentFailure(detail) => {
                assert!(detail.contains("unreadable discovery body"));
            }
            other => panic!("expected permanent failure, got {:?}", other),
        }
    }
}
