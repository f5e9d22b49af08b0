//! Collaborator boundary: everything the gate protocol needs from the host world.
//!
//! The kernel never owns maps, actors, or items. It reaches them only through
//! these traits, passed in as `&mut impl GateHost` on every call.

use serde::{Deserialize, Serialize};

use crate::geometry::{Cell, Rotation};

use super::kernel::DialFailure;
use super::types::{Address, EndpointId, EntityId, GateCue, GateSite, RegionId, RegionSize};

/// Continuation token for a region that is still being generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionTicket(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionPoll {
    Pending,
    Ready(RegionId),
    Failed,
}

/// Physical layout of a gate, handed to placement and hazard collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateFootprint {
    pub endpoint: EndpointId,
    pub region: RegionId,
    pub position: Cell,
    pub rotation: Rotation,
    pub cells: Vec<Cell>,
    pub interaction_cell: Cell,
}

impl GateFootprint {
    pub fn covers(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorView {
    pub entity: EntityId,
    pub cell: Cell,
    /// Next cell of the actor's current path, if it is walking.
    pub next_step: Option<Cell>,
    pub hazard_immune: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CueSite {
    pub endpoint: EndpointId,
    pub region: RegionId,
    pub cell: Cell,
}

pub trait MapProvider {
    /// Whether the address still names something that can host a region.
    fn is_resolvable(&self, address: Address) -> bool;

    /// Region already generated for the address, if any.
    fn region_for(&self, address: Address) -> Option<RegionId>;

    /// Address a generated region sits at.
    fn address_of(&self, region: RegionId) -> Option<Address>;

    /// Starts generation of the region at `address`. Every call returns its
    /// own ticket; cancelling one ticket leaves other waiters untouched, and a
    /// later ticket for an already generated address resolves to that region.
    fn request_region(&mut self, address: Address, size_hint: RegionSize) -> RegionTicket;

    fn poll_region(&mut self, ticket: RegionTicket) -> RegionPoll;

    fn cancel_region_request(&mut self, _ticket: RegionTicket) {}
}

pub trait RegionFallbackBuilder {
    /// Where a receiving gate can be erected in a region that has none.
    fn fallback_gate_site(&mut self, region: RegionId) -> Option<GateSite>;
}

pub trait EntityPlacement {
    fn find_adjacent_free_cell(&mut self, gate: &GateFootprint) -> Option<Cell>;

    fn is_walkable(&self, region: RegionId, cell: Cell) -> bool;

    fn entity_exists(&self, entity: EntityId) -> bool;

    /// Lifts a spawned entity out of the world so it can ride a buffer.
    /// Returns false if the entity is unknown.
    fn take_for_transit(&mut self, entity: EntityId) -> bool;

    fn spawn_entity(&mut self, entity: EntityId, region: RegionId, cell: Cell);

    fn destroy_entity(&mut self, entity: EntityId);
}

pub trait TaskQueue {
    fn actors_in_region(&self, region: RegionId) -> Vec<ActorView>;

    fn force_move_and_hold(&mut self, actor: EntityId, cell: Cell, hold_ticks: u64);

    /// Stops prior jobs, drafts the actor and holds it in place for one tick.
    fn redraft_and_hold(&mut self, actor: EntityId);
}

pub trait HazardSink {
    fn apply_area_damage(&mut self, region: RegionId, cell: Cell, radius: u32, spare: EndpointId);
}

pub trait EventLog {
    fn notify_failure(&mut self, endpoint: EndpointId, reason: &DialFailure);

    fn notify_success(&mut self, endpoint: EndpointId, peer: EndpointId, address: Address);
}

pub trait AudioCue {
    fn play(&mut self, cue: GateCue, at: CueSite);
}

/// Everything the kernel needs from the host, in one bound.
pub trait GateHost:
    MapProvider + RegionFallbackBuilder + EntityPlacement + TaskQueue + HazardSink + EventLog + AudioCue
{
}

impl<T> GateHost for T where
    T: MapProvider
        + RegionFallbackBuilder
        + EntityPlacement
        + TaskQueue
        + HazardSink
        + EventLog
        + AudioCue
{
}
