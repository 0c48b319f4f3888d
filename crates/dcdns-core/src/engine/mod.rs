//! Core cycle engine
//!
//! The CycleEngine is responsible for:
//! - Discovering the public address for each enabled family via AddressSource
//! - Deciding what changed via ChangeTracker
//! - Submitting change-sets via UpdateEndpoint
//! - Carrying the in-memory AddressState between cycles
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐
//! │ AddressSource  │─── FetchOutcome per family ───┐
//! └────────────────┘                               │
//!                                                  ▼
//!                                        ┌──────────────┐
//!                                        │ CycleEngine  │
//!                                        └──────────────┘
//!                                                  │
//!                    ┌─────────────────────────────┼─────────────────────┐
//!                    │                             │                     │
//!                    ▼                             ▼                     ▼
//!           ┌───────────────┐            ┌────────────────┐     ┌─────────────┐
//!           │ ChangeTracker │            │ UpdateEndpoint │     │   Events    │
//!           │ (decide)      │            │ (submit)       │     │  (notify)   │
//!           └───────────────┘            └────────────────┘     └─────────────┘
//! ```
//!
//! ## Cycle Flow
//!
//! 1. Fetch the address for each enabled family
//! 2. Compare against the in-memory state
//! 3. If anything changed, submit the change-set
//! 4. Advance the state regardless of submission outcome
//! 5. Emit events for monitoring/logging

use crate::config::DcdnsConfig;
use crate::error::{Error, Result};
use crate::state::{AddressState, ChangeSet};
use crate::tracker::ChangeTracker;
use crate::traits::{AddressFamily, AddressSource, FetchOutcome, UpdateEndpoint};
use std::net::IpAddr;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Events emitted by the CycleEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleEvent {
    /// Engine started
    Started {
        ipv4_enabled: bool,
        ipv6_enabled: bool,
    },

    /// A discovery fetch produced no usable data for one family
    FetchFailed {
        family: AddressFamily,
        detail: String,
    },

    /// A family's address changed this cycle
    AddressChanged {
        family: AddressFamily,
        address: IpAddr,
    },

    /// A change-set was accepted by the update endpoint
    UpdateSubmitted { changes: ChangeSet },

    /// The cycle found nothing to submit
    NothingToUpdate,

    /// The update endpoint rejected or failed the submission
    UpdateFailed { detail: String },

    /// One full cycle finished
    CycleCompleted,

    /// Engine stopped
    Stopped { reason: String },
}

/// Core cycle engine
///
/// The engine orchestrates the discovery → change detection → update flow.
/// It runs one cycle per poll interval until a shutdown signal arrives.
///
/// ## Lifecycle
///
/// 1. Create with [`CycleEngine::new()`]
/// 2. Start with [`CycleEngine::run()`]
/// 3. Engine runs until shutdown signal received
///
/// ## Failure Handling
///
/// Nothing inside a cycle is fatal. Fetch failures leave the stored state
/// untouched; submission failures are logged and the state advances anyway,
/// so the same change-set is never submitted twice.
pub struct CycleEngine {
    /// Address source for discovery
    source: Box<dyn AddressSource>,

    /// Update endpoint for submissions
    endpoint: Box<dyn UpdateEndpoint>,

    /// Change detection
    tracker: ChangeTracker,

    /// Whether to query the IPv4 discovery service
    ipv4_enabled: bool,

    /// Whether to query the IPv6 discovery service
    ipv6_enabled: bool,

    /// Delay between cycles
    poll_interval: Duration,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<CycleEvent>,
}

impl CycleEngine {
    /// Create a new cycle engine
    ///
    /// # Parameters
    ///
    /// - `source`: Address source implementation
    /// - `endpoint`: Update endpoint implementation
    /// - `config`: dcdns configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        source: Box<dyn AddressSource>,
        endpoint: Box<dyn UpdateEndpoint>,
        config: &DcdnsConfig,
    ) -> Result<(Self, mpsc::Receiver<CycleEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            source,
            endpoint,
            tracker: ChangeTracker::new(),
            ipv4_enabled: config.families.ipv4,
            ipv6_enabled: config.families.ipv6,
            poll_interval: config.engine.poll_interval(),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run the engine
    ///
    /// Starts the periodic discovery loop. The first cycle runs immediately;
    /// later cycles run once per poll interval. Runs until SIGINT/SIGTERM.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown
    /// - `Err(Error)`: Fatal error
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Internal run implementation that accepts an optional shutdown signal
    ///
    /// # Parameters
    ///
    /// - `shutdown_rx`: Optional oneshot receiver to trigger shutdown; when
    ///   absent the loop ends on Ctrl-C
    async fn run_internal(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.emit_event(CycleEvent::Started {
            ipv4_enabled: self.ipv4_enabled,
            ipv6_enabled: self.ipv6_enabled,
        });

        info!(
            source = self.source.source_name(),
            endpoint = self.endpoint.endpoint_name(),
            poll_interval_secs = self.poll_interval.as_secs(),
            "engine starting"
        );

        let mut state = AddressState::new();

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        // Main cycle loop
        if let Some(mut rx) = shutdown_rx {
            // Test mode: wait for provided shutdown signal
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        state = self.run_cycle(state).await;
                    }

                    // Handle test shutdown signal
                    _ = &mut rx => {
                        info!("Shutdown signal received");
                        self.emit_event(CycleEvent::Stopped {
                            reason: "Shutdown signal".to_string(),
                        });
                        break;
                    }
                }
            }
        } else {
            // Production mode: wait for SIGINT/SIGTERM
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        state = self.run_cycle(state).await;
                    }

                    _ = tokio::signal::ctrl_c() => {
                        info!("Shutdown signal received");
                        self.emit_event(CycleEvent::Stopped {
                            reason: "Shutdown signal".to_string(),
                        });
                        break;
                    }
                }
            }
        }

        info!("engine stopped");
        Ok(())
    }

    /// Run one discovery cycle
    ///
    /// Takes the state from the previous cycle and returns the state the
    /// next cycle should start from. Never fails: every error inside the
    /// cycle is logged and absorbed.
    pub async fn run_cycle(&self, state: AddressState) -> AddressState {
        debug!("cycle starting");

        let ipv4 = if self.ipv4_enabled {
            Some(self.fetch_family(AddressFamily::V4).await)
        } else {
            None
        };

        let ipv6 = if self.ipv6_enabled {
            Some(self.fetch_family(AddressFamily::V6).await)
        } else {
            None
        };

        let (changes, next_state) = self.tracker.decide(&state, ipv4.as_ref(), ipv6.as_ref());

        if let Some(addr) = changes.ipv4 {
            info!(family = %AddressFamily::V4, address = %addr, "address changed");
            self.emit_event(CycleEvent::AddressChanged {
                family: AddressFamily::V4,
                address: IpAddr::V4(addr),
            });
        }
        if let Some(addr) = changes.ipv6 {
            info!(family = %AddressFamily::V6, address = %addr, "address changed");
            self.emit_event(CycleEvent::AddressChanged {
                family: AddressFamily::V6,
                address: IpAddr::V6(addr),
            });
        }

        // One submission attempt, no retry. The endpoint reports an empty
        // change-set as a benign error before touching the network.
        match self.endpoint.submit(&changes).await {
            Ok(()) => {
                info!(?changes, "update submitted");
                self.emit_event(CycleEvent::UpdateSubmitted { changes });
            }
            Err(Error::NothingToUpdate) => {
                debug!("nothing to update this cycle");
                self.emit_event(CycleEvent::NothingToUpdate);
            }
            Err(e) => {
                error!(error = %e, "update submission failed");
                self.emit_event(CycleEvent::UpdateFailed {
                    detail: e.to_string(),
                });
            }
        }

        self.emit_event(CycleEvent::CycleCompleted);
        next_state
    }

    /// Fetch one family's address and emit a failure event if it produced
    /// no usable data
    async fn fetch_family(&self, family: AddressFamily) -> FetchOutcome {
        let outcome = self.source.fetch(family).await;

        match &outcome {
            FetchOutcome::Success(raw) => {
                debug!(%family, raw = %raw, "discovery answered");
            }
            FetchOutcome::TransientFailure => {
                warn!(%family, "discovery unreachable this cycle");
                self.emit_event(CycleEvent::FetchFailed {
                    family,
                    detail: "transient failure".to_string(),
                });
            }
            FetchOutcome::PermanentFailure(detail) => {
                warn!(%family, %detail, "discovery rejected the request");
                self.emit_event(CycleEvent::FetchFailed {
                    family,
                    detail: detail.clone(),
                });
            }
        }

        outcome
    }

    /// Emit an engine event
    ///
    /// # Parameters
    ///
    /// - `event`: The event to emit
    fn emit_event(&self, event: CycleEvent) {
        // Send event, logging warning if channel is full (backpressure)
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }

    /// Run the engine with an externally supplied shutdown trigger
    ///
    /// Used by contract tests, which need deterministic shutdown, and by
    /// daemons that install their own signal handlers (SIGTERM as well as
    /// SIGINT) and forward them through a oneshot channel. `run()` is the
    /// convenience entry that shuts down on Ctrl-C only.
    pub async fn run_with_shutdown(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }
}
