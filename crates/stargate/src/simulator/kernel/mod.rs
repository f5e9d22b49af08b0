//! GateKernel: endpoint table, address registry, tick loop, and event journal.

mod dialing;
mod idle;
mod lifecycle;
mod persistence;
mod step;
mod transit;
mod types;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

use super::config::GateConfig;
use super::endpoint::{GateEndpoint, GateState};
use super::registry::AddressRegistry;
use super::types::{EndpointId, GateEventId, GateTime, RegionId};

pub use types::{DialFailure, GateError, GateEvent, GateEventKind};

/// World-scoped owner of every gate. Peers reference each other by
/// `EndpointId` and are resolved through `endpoints`; nothing holds a direct
/// reference to another endpoint.
#[derive(Debug, Clone)]
pub struct GateKernel {
    time: GateTime,
    config: GateConfig,
    world_seed: u64,
    next_event_id: GateEventId,
    next_endpoint_id: u64,
    endpoints: BTreeMap<EndpointId, GateEndpoint>,
    registry: AddressRegistry,
    journal: Vec<GateEvent>,
    rng: SmallRng,
}

impl Default for GateKernel {
    fn default() -> Self {
        Self::with_config(GateConfig::default(), 0)
    }
}

impl GateKernel {
    pub fn new(world_seed: u64) -> Self {
        Self::with_config(GateConfig::default(), world_seed)
    }

    pub fn with_config(config: GateConfig, world_seed: u64) -> Self {
        let config = config.sanitized();
        Self {
            time: 0,
            registry: AddressRegistry::with_capacity(config.registry_capacity),
            config,
            world_seed,
            next_event_id: 0,
            next_endpoint_id: 0,
            endpoints: BTreeMap::new(),
            journal: Vec::new(),
            rng: SmallRng::seed_from_u64(world_seed),
        }
    }

    pub fn time(&self) -> GateTime {
        self.time
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn world_seed(&self) -> u64 {
        self.world_seed
    }

    pub fn registry(&self) -> &AddressRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut AddressRegistry {
        &mut self.registry
    }

    pub fn journal(&self) -> &[GateEvent] {
        &self.journal
    }

    pub fn endpoint(&self, id: EndpointId) -> Option<&GateEndpoint> {
        self.endpoints.get(&id)
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &GateEndpoint> {
        self.endpoints.values()
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    pub fn endpoint_in_region(&self, region: RegionId) -> Option<&GateEndpoint> {
        self.endpoints
            .values()
            .find(|endpoint| endpoint.region() == region)
    }

    pub fn state(&self, id: EndpointId) -> Option<GateState> {
        self.endpoints.get(&id).map(GateEndpoint::state)
    }

    pub fn is_active(&self, id: EndpointId) -> bool {
        self.endpoints
            .get(&id)
            .is_some_and(GateEndpoint::is_active)
    }

    pub fn is_receiver(&self, id: EndpointId) -> bool {
        self.endpoints
            .get(&id)
            .is_some_and(GateEndpoint::is_receiver)
    }

    pub fn has_external_hold(&self, id: EndpointId) -> bool {
        self.endpoints
            .get(&id)
            .is_some_and(GateEndpoint::has_external_hold)
    }

    /// Peer of `id`, if it exists, is active, and points back at `id`.
    pub fn valid_peer(&self, id: EndpointId) -> Option<EndpointId> {
        let peer_id = self.endpoints.get(&id)?.peer_id()?;
        let peer = self.endpoints.get(&peer_id)?;
        (peer.is_active() && peer.peer_id() == Some(id)).then_some(peer_id)
    }

    fn endpoint_mut(&mut self, id: EndpointId) -> Result<&mut GateEndpoint, GateError> {
        self.endpoints
            .get_mut(&id)
            .ok_or(GateError::EndpointNotFound { endpoint: id })
    }

    fn require_endpoint(&self, id: EndpointId) -> Result<&GateEndpoint, GateError> {
        self.endpoints
            .get(&id)
            .ok_or(GateError::EndpointNotFound { endpoint: id })
    }

    fn allocate_endpoint_id(&mut self) -> EndpointId {
        let id = EndpointId(self.next_endpoint_id);
        self.next_endpoint_id = self.next_endpoint_id.saturating_add(1);
        id
    }

    fn record(&mut self, kind: GateEventKind) {
        let event = GateEvent {
            id: self.next_event_id,
            time: self.time,
            kind,
        };
        self.next_event_id = self.next_event_id.saturating_add(1);
        self.journal.push(event);
    }

    fn sample_idle_threshold(&mut self) -> u64 {
        self.rng
            .random_range(self.config.idle_threshold_min..=self.config.idle_threshold_max)
    }

    fn sample_unload_spacing(&mut self) -> u64 {
        self.rng
            .random_range(self.config.unload_spacing_min..=self.config.unload_spacing_max)
    }
}
