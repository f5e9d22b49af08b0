//! Gate simulator module - provides the transit kernel, collaborator traits, and persistence.
//!
//! This module is organized into submodules:
//! - `types`: Core type definitions (IDs, constants, transit payloads)
//! - `config`: Timing and hazard tuning (`GateConfig`)
//! - `registry`: Known dialable addresses
//! - `buffer`: Per-gate send/receive queues
//! - `endpoint`: Per-gate state
//! - `vortex` / `evacuation`: Opening hazard and actor evacuation
//! - `host`: Collaborator traits the kernel calls into
//! - `kernel`: GateKernel implementation (dialing, transit, idle, tick, persistence)
//! - `persist`: Snapshot, Journal, and persistence utilities
//! - `in_memory_host`: Grid-backed host used by the demo and tests

mod buffer;
mod config;
mod designation;
mod endpoint;
mod evacuation;
mod host;
mod in_memory_host;
mod kernel;
mod persist;
mod registry;
mod scenario;
mod types;
mod vortex;

#[cfg(test)]
mod tests;

pub use buffer::TransitBuffer;
pub use config::{ConfigError, GateConfig, DEFAULT_CONFIG_FILE_NAME};
pub use designation::{designation_or_unknown, designation_string, reseed};
pub use endpoint::{GateEndpoint, GateState, PendingOpen};
pub use evacuation::{EvacuationPlanner, EvacuationReport};
pub use host::{
    ActorView, AudioCue, CueSite, EntityPlacement, EventLog, GateFootprint, GateHost, HazardSink,
    MapProvider, RegionFallbackBuilder, RegionPoll, RegionTicket, TaskQueue,
};
pub use in_memory_host::{
    DamageCall, DialSuccess, EntityLocation, HoldOrder, InMemoryEntity, InMemoryGateHost,
    InMemoryRegion,
};
pub use kernel::{DialFailure, GateError, GateEvent, GateEventKind, GateKernel};
pub use persist::{EndpointRecord, GateJournal, GateSnapshot, PersistError};
pub use registry::AddressRegistry;
pub use scenario::{
    GateScenario, ScenarioOutcome, ScenarioWorld, DEFAULT_DIAL_DELAY, DESTINATION_ADDRESS,
    LAZY_ADDRESS, ORIGIN_ADDRESS,
};
pub use types::{
    Address, EndpointId, EntityId, GateCue, GateEventId, GateSite, GateTime, RegionId, RegionSize,
    TransitItem, ADDRESS_REGISTRY_CAPACITY, JOURNAL_VERSION, SNAPSHOT_VERSION,
};
pub use vortex::VortexHazard;
