// # dcdns-core
//
// Core library for the dcdns update agent.
//
// ## Architecture Overview
//
// This library provides the core functionality for keeping a DNS record in
// sync with a machine's public address:
// - **AddressSource**: Trait for discovering the public address, one family at a time
// - **UpdateEndpoint**: Trait for submitting change-sets to the remote endpoint
// - **ChangeTracker**: Pure comparison of fetch outcomes against stored state
// - **CycleEngine**: Periodic loop that orchestrates discovery → detection → update
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from transport implementations
// 2. **Failure Tolerance**: No cycle outcome is fatal; the loop always continues
// 3. **At-Most-Once Updates**: State advances before submission, so a failed
//    submission is never replayed
// 4. **Library-First**: All core functionality can be used as a library

pub mod config;
pub mod engine;
pub mod error;
pub mod retry;
pub mod state;
pub mod tracker;
pub mod traits;
pub mod validate;

// Re-export core types for convenience
pub use config::{DcdnsConfig, DiscoveryConfig, EngineConfig, FamilyConfig, UpdateConfig};
pub use engine::{CycleEngine, CycleEvent};
pub use error::{Error, Result};
pub use retry::RetryPolicy;
pub use state::{AddressState, ChangeSet};
pub use tracker::ChangeTracker;
pub use traits::{AddressFamily, AddressSource, FetchOutcome, UpdateEndpoint};
