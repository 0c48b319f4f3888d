// # dcdnsd - dcdns Daemon
//
// Thin integration layer only:
// - Reads configuration from environment variables
// - Initializes tracing and the tokio runtime
// - Wires the HTTP address source and update endpoint into the engine
// - Runs the engine until SIGTERM/SIGINT
//
// All cycle logic lives in dcdns-core. Configuration is via environment
// variables ONLY.
//
// ## Configuration
//
// ### Update endpoint (required)
// - `DCDNS_FUNCTION_URL`: URL of the update endpoint
// - `DCDNS_TOKEN`: shared-secret token
// - `DCDNS_HOST`: hostname to keep updated
// - `DCDNS_ZONE`: DNS zone (optional)
//
// ### Address families
// - `DCDNS_IPV4`: set to `YES` to track IPv4 (default: YES)
// - `DCDNS_IPV6`: set to `YES` to track IPv6 (default: NO)
//
// ### Discovery
// - `DCDNS_IPV4_URL`: IPv4 discovery service URL (default: ipify)
// - `DCDNS_IPV6_URL`: IPv6 discovery service URL (default: ipify)
//
// ### Engine
// - `DCDNS_FREQUENCY`: seconds between cycles (default: 300)
// - `DCDNS_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export DCDNS_FUNCTION_URL=https://dns.example.com/update
// export DCDNS_TOKEN=your_token
// export DCDNS_HOST=home.example.com
// export DCDNS_IPV6=YES
//
// dcdnsd
// ```

use anyhow::Result;
use std::env;
use std::process::ExitCode;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

use dcdns_core::config::{DcdnsConfig, DiscoveryConfig, EngineConfig, FamilyConfig, UpdateConfig};
use dcdns_core::engine::CycleEngine;
use dcdns_endpoint_http::HttpUpdateEndpoint;
use dcdns_ip_http::HttpAddressSource;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DcdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DcdnsExitCode> for ExitCode {
    fn from(code: DcdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration, read from environment variables
struct EnvConfig {
    function_url: String,
    token: String,
    host: String,
    zone: Option<String>,
    ipv4: bool,
    ipv6: bool,
    ipv4_url: Option<String>,
    ipv6_url: Option<String>,
    frequency_secs: Option<u64>,
    log_level: String,
}

impl EnvConfig {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            function_url: env::var("DCDNS_FUNCTION_URL").map_err(|_| {
                anyhow::anyhow!(
                    "DCDNS_FUNCTION_URL is required. \
                    Set it via: export DCDNS_FUNCTION_URL=https://dns.example.com/update"
                )
            })?,
            token: env::var("DCDNS_TOKEN").map_err(|_| {
                anyhow::anyhow!(
                    "DCDNS_TOKEN is required. \
                    Set it via: export DCDNS_TOKEN=your_token"
                )
            })?,
            host: env::var("DCDNS_HOST").map_err(|_| {
                anyhow::anyhow!(
                    "DCDNS_HOST is required. \
                    Set it via: export DCDNS_HOST=home.example.com"
                )
            })?,
            zone: env::var("DCDNS_ZONE").ok(),
            ipv4: flag_from_env("DCDNS_IPV4", true),
            ipv6: flag_from_env("DCDNS_IPV6", false),
            ipv4_url: env::var("DCDNS_IPV4_URL").ok(),
            ipv6_url: env::var("DCDNS_IPV6_URL").ok(),
            frequency_secs: env::var("DCDNS_FREQUENCY")
                .ok()
                .map(|s| {
                    s.parse().map_err(|_| {
                        anyhow::anyhow!("DCDNS_FREQUENCY must be a number of seconds. Got: {}", s)
                    })
                })
                .transpose()?,
            log_level: env::var("DCDNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        // Check for obvious placeholder tokens (common mistake)
        let token_lower = self.token.to_lowercase();
        if token_lower.contains("your_token")
            || token_lower.contains("replace_me")
            || token_lower == "token"
        {
            anyhow::bail!(
                "DCDNS_TOKEN appears to be a placeholder. \
                Use the actual shared secret configured on the update endpoint."
            );
        }

        if !self.function_url.starts_with("https://") && !self.function_url.starts_with("http://")
        {
            anyhow::bail!(
                "DCDNS_FUNCTION_URL must use HTTP or HTTPS scheme. Got: {}",
                self.function_url
            );
        }

        if !self.ipv4 && !self.ipv6 {
            anyhow::bail!(
                "At least one address family must be enabled. \
                Set DCDNS_IPV4=YES or DCDNS_IPV6=YES."
            );
        }

        if let Some(frequency) = self.frequency_secs
            && frequency == 0
        {
            anyhow::bail!("DCDNS_FREQUENCY must be > 0");
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DCDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Build the core configuration from the validated environment
    fn to_core_config(&self) -> DcdnsConfig {
        let mut discovery = DiscoveryConfig::default();
        if let Some(url) = &self.ipv4_url {
            discovery.ipv4_url = url.clone();
        }
        if let Some(url) = &self.ipv6_url {
            discovery.ipv6_url = url.clone();
        }

        let mut engine = EngineConfig::default();
        if let Some(frequency) = self.frequency_secs {
            engine.poll_interval_secs = frequency;
        }

        DcdnsConfig {
            families: FamilyConfig {
                ipv4: self.ipv4,
                ipv6: self.ipv6,
            },
            discovery,
            update: UpdateConfig {
                url: self.function_url.clone(),
                token: self.token.clone(),
                host: self.host.clone(),
                zone: self.zone.clone(),
                timeout_secs: 10,
            },
            engine,
        }
    }
}

/// Read a YES/NO flag from the environment
///
/// Only the literal `YES` (case-insensitive) enables a flag; anything else
/// falls back to the default when unset, or disables it when set.
fn flag_from_env(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(value) => value.eq_ignore_ascii_case("yes"),
        Err(_) => default,
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match EnvConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DcdnsExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DcdnsExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DcdnsExitCode::ConfigError.into();
    }

    info!("Starting dcdnsd daemon");

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DcdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {}", e);
            DcdnsExitCode::RuntimeError
        } else {
            DcdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: EnvConfig) -> Result<()> {
    let core_config = config.to_core_config();

    info!(
        host = %core_config.update.host,
        ipv4 = core_config.families.ipv4,
        ipv6 = core_config.families.ipv6,
        poll_interval_secs = core_config.engine.poll_interval_secs,
        "Configuration loaded"
    );

    let source = HttpAddressSource::new(&core_config.discovery)?;
    let endpoint = HttpUpdateEndpoint::new(&core_config.update)?;

    let (engine, mut events) =
        CycleEngine::new(Box::new(source), Box::new(endpoint), &core_config)?;

    // Drain engine events into the log
    let event_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!(?event, "engine event");
        }
    });

    // Forward SIGTERM/SIGINT into the engine as a shutdown trigger
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        match wait_for_shutdown().await {
            Ok(signal) => info!("Received shutdown signal: {}", signal),
            Err(e) => error!("Shutdown handler error: {}", e),
        }
        let _ = shutdown_tx.send(());
    });

    info!("Starting cycle engine");
    engine.run_with_shutdown(Some(shutdown_rx)).await?;

    event_task.abort();
    info!("Daemon stopped");
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let signal = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(signal)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
