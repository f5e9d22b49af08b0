//! In-memory host world: grid regions, entities, and recorded side effects.
//!
//! Backs the demo binary and the test suites. Every collaborator call the
//! kernel makes is either applied to the grid or recorded for inspection.

use std::collections::{BTreeMap, BTreeSet};

use crate::geometry::{Cell, Rotation};

use super::host::{
    ActorView, AudioCue, CueSite, EntityPlacement, EventLog, GateFootprint, HazardSink,
    MapProvider, RegionFallbackBuilder, RegionPoll, RegionTicket, TaskQueue,
};
use super::kernel::DialFailure;
use super::types::{Address, EndpointId, EntityId, GateCue, GateSite, RegionId, RegionSize};

/// Neighbour order used when looking for a free cell around a gate.
const NEIGHBOUR_OFFSETS: [Cell; 8] = [
    Cell::new(0, -1),
    Cell::new(-1, 0),
    Cell::new(1, 0),
    Cell::new(0, 1),
    Cell::new(-1, -1),
    Cell::new(1, -1),
    Cell::new(-1, 1),
    Cell::new(1, 1),
];

// ============================================================================
// World State
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryRegion {
    pub id: RegionId,
    pub address: Option<Address>,
    pub size: RegionSize,
    pub blocked: BTreeSet<Cell>,
}

impl InMemoryRegion {
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0
            && cell.z >= 0
            && (cell.x as i64) < i64::from(self.size.width)
            && (cell.z as i64) < i64::from(self.size.depth)
    }

    pub fn center(&self) -> Cell {
        Cell::new(
            i32::try_from(self.size.width / 2).unwrap_or(i32::MAX),
            i32::try_from(self.size.depth / 2).unwrap_or(i32::MAX),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityLocation {
    Placed { region: RegionId, cell: Cell },
    InTransit,
    Destroyed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryEntity {
    pub location: EntityLocation,
    pub is_actor: bool,
    pub next_step: Option<Cell>,
    pub hazard_immune: bool,
    pub drafted: bool,
    pub damage_taken: u32,
}

impl InMemoryEntity {
    fn new(location: EntityLocation, is_actor: bool) -> Self {
        Self {
            location,
            is_actor,
            next_step: None,
            hazard_immune: false,
            drafted: false,
            damage_taken: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingGeneration {
    address: Address,
    remaining_polls: u64,
    size: RegionSize,
}

// ============================================================================
// Recorded Side Effects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageCall {
    pub region: RegionId,
    pub cell: Cell,
    pub radius: u32,
    pub spare: EndpointId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldOrder {
    pub actor: EntityId,
    pub cell: Cell,
    pub hold_ticks: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialSuccess {
    pub endpoint: EndpointId,
    pub peer: EndpointId,
    pub address: Address,
}

// ============================================================================
// Host
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct InMemoryGateHost {
    regions: BTreeMap<RegionId, InMemoryRegion>,
    resolvable: BTreeSet<Address>,
    failing_generation: BTreeSet<Address>,
    pending: BTreeMap<RegionTicket, PendingGeneration>,
    entities: BTreeMap<EntityId, InMemoryEntity>,
    generation_delay: u64,
    fallback_disabled: bool,
    next_region_id: u64,
    next_entity_id: u64,
    next_ticket: u64,
    cues: Vec<(GateCue, CueSite)>,
    failures: Vec<(EndpointId, DialFailure)>,
    successes: Vec<DialSuccess>,
    damage: Vec<DamageCall>,
    holds: Vec<HoldOrder>,
    redrafts: Vec<EntityId>,
    cancelled: Vec<RegionTicket>,
}

impl InMemoryGateHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of polls a requested region stays pending before it is ready.
    pub fn set_generation_delay(&mut self, polls: u64) {
        self.generation_delay = polls;
    }

    pub fn set_fallback_enabled(&mut self, enabled: bool) {
        self.fallback_disabled = !enabled;
    }

    // ------------------------------------------------------------------------
    // Regions and addresses
    // ------------------------------------------------------------------------

    /// Adds a generated region; its address, if any, becomes resolvable.
    pub fn add_region(&mut self, address: Option<Address>, size: RegionSize) -> RegionId {
        let id = RegionId(self.next_region_id);
        self.next_region_id += 1;
        if let Some(address) = address {
            self.resolvable.insert(address);
        }
        self.regions.insert(
            id,
            InMemoryRegion {
                id,
                address,
                size,
                blocked: BTreeSet::new(),
            },
        );
        id
    }

    /// Makes an address dialable without generating its region yet.
    pub fn add_ungenerated_address(&mut self, address: Address) {
        self.resolvable.insert(address);
    }

    /// Generation for `address` resolves to `Failed` instead of a region.
    pub fn fail_generation_for(&mut self, address: Address) {
        self.failing_generation.insert(address);
    }

    /// The address stops naming anything; a generated region stays loaded.
    pub fn forget_address(&mut self, address: Address) {
        self.resolvable.remove(&address);
    }

    /// Drops a region and everything placed in it. The caller notifies the
    /// kernel through `on_region_discarded`.
    pub fn discard_region(&mut self, region: RegionId) {
        let Some(removed) = self.regions.remove(&region) else {
            return;
        };
        if let Some(address) = removed.address {
            self.resolvable.remove(&address);
        }
        for entity in self.entities.values_mut() {
            if matches!(entity.location, EntityLocation::Placed { region: r, .. } if r == region) {
                entity.location = EntityLocation::Destroyed;
            }
        }
    }

    pub fn block_cell(&mut self, region: RegionId, cell: Cell) {
        if let Some(region) = self.regions.get_mut(&region) {
            region.blocked.insert(cell);
        }
    }

    pub fn region(&self, region: RegionId) -> Option<&InMemoryRegion> {
        self.regions.get(&region)
    }

    pub fn pending_generations(&self) -> usize {
        self.pending.len()
    }

    // ------------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------------

    pub fn spawn_item(&mut self, region: RegionId, cell: Cell) -> EntityId {
        self.insert_entity(EntityLocation::Placed { region, cell }, false)
    }

    pub fn spawn_actor(&mut self, region: RegionId, cell: Cell) -> EntityId {
        self.insert_entity(EntityLocation::Placed { region, cell }, true)
    }

    /// An entity that exists only inside a transit buffer, for scripted arrivals.
    pub fn create_in_transit(&mut self, is_actor: bool) -> EntityId {
        self.insert_entity(EntityLocation::InTransit, is_actor)
    }

    pub fn set_next_step(&mut self, entity: EntityId, step: Option<Cell>) {
        if let Some(entity) = self.entities.get_mut(&entity) {
            entity.next_step = step;
        }
    }

    pub fn set_hazard_immune(&mut self, entity: EntityId, immune: bool) {
        if let Some(entity) = self.entities.get_mut(&entity) {
            entity.hazard_immune = immune;
        }
    }

    pub fn entity(&self, entity: EntityId) -> Option<&InMemoryEntity> {
        self.entities.get(&entity)
    }

    pub fn location(&self, entity: EntityId) -> Option<EntityLocation> {
        self.entities.get(&entity).map(|entity| entity.location)
    }

    pub fn entities_in_region(&self, region: RegionId) -> Vec<(EntityId, Cell)> {
        self.entities
            .iter()
            .filter_map(|(id, entity)| match entity.location {
                EntityLocation::Placed { region: r, cell } if r == region => Some((*id, cell)),
                _ => None,
            })
            .collect()
    }

    fn insert_entity(&mut self, location: EntityLocation, is_actor: bool) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        self.entities.insert(id, InMemoryEntity::new(location, is_actor));
        id
    }

    fn occupied(&self, region: RegionId, cell: Cell) -> bool {
        self.entities.values().any(|entity| {
            matches!(entity.location, EntityLocation::Placed { region: r, cell: c } if r == region && c == cell)
        })
    }

    // ------------------------------------------------------------------------
    // Recorded effects
    // ------------------------------------------------------------------------

    pub fn cues(&self) -> &[(GateCue, CueSite)] {
        &self.cues
    }

    pub fn cue_count(&self, cue: GateCue, endpoint: EndpointId) -> usize {
        self.cues
            .iter()
            .filter(|(played, site)| *played == cue && site.endpoint == endpoint)
            .count()
    }

    pub fn failures(&self) -> &[(EndpointId, DialFailure)] {
        &self.failures
    }

    pub fn successes(&self) -> &[DialSuccess] {
        &self.successes
    }

    pub fn damage(&self) -> &[DamageCall] {
        &self.damage
    }

    pub fn holds(&self) -> &[HoldOrder] {
        &self.holds
    }

    pub fn redrafts(&self) -> &[EntityId] {
        &self.redrafts
    }

    pub fn cancelled_tickets(&self) -> &[RegionTicket] {
        &self.cancelled
    }
}

// ============================================================================
// Collaborator Implementations
// ============================================================================

impl MapProvider for InMemoryGateHost {
    fn is_resolvable(&self, address: Address) -> bool {
        self.resolvable.contains(&address)
    }

    fn region_for(&self, address: Address) -> Option<RegionId> {
        self.regions
            .values()
            .find(|region| region.address == Some(address))
            .map(|region| region.id)
    }

    fn address_of(&self, region: RegionId) -> Option<Address> {
        self.regions.get(&region)?.address
    }

    fn request_region(&mut self, address: Address, size_hint: RegionSize) -> RegionTicket {
        let ticket = RegionTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending.insert(
            ticket,
            PendingGeneration {
                address,
                remaining_polls: self.generation_delay,
                size: size_hint,
            },
        );
        ticket
    }

    fn poll_region(&mut self, ticket: RegionTicket) -> RegionPoll {
        let Some(pending) = self.pending.get_mut(&ticket) else {
            return RegionPoll::Failed;
        };
        if pending.remaining_polls > 0 {
            pending.remaining_polls -= 1;
            return RegionPoll::Pending;
        }
        let pending = *pending;
        self.pending.remove(&ticket);
        if self.failing_generation.contains(&pending.address)
            || !self.resolvable.contains(&pending.address)
        {
            return RegionPoll::Failed;
        }
        let region = match self.region_for(pending.address) {
            Some(region) => region,
            None => self.add_region(Some(pending.address), pending.size),
        };
        RegionPoll::Ready(region)
    }

    fn cancel_region_request(&mut self, ticket: RegionTicket) {
        if self.pending.remove(&ticket).is_some() {
            self.cancelled.push(ticket);
        }
    }
}

impl RegionFallbackBuilder for InMemoryGateHost {
    fn fallback_gate_site(&mut self, region: RegionId) -> Option<GateSite> {
        if self.fallback_disabled {
            return None;
        }
        let center = self.regions.get(&region)?.center();
        Some(GateSite::new(region, center, Rotation::South))
    }
}

impl EntityPlacement for InMemoryGateHost {
    fn find_adjacent_free_cell(&mut self, gate: &GateFootprint) -> Option<Cell> {
        let region = self.regions.get(&gate.region)?;
        let origin = gate.interaction_cell;
        std::iter::once(origin)
            .chain(NEIGHBOUR_OFFSETS.iter().map(|offset| origin.offset(*offset)))
            .find(|cell| {
                !gate.covers(*cell)
                    && region.in_bounds(*cell)
                    && !region.blocked.contains(cell)
                    && !self.occupied(gate.region, *cell)
            })
    }

    fn is_walkable(&self, region: RegionId, cell: Cell) -> bool {
        self.regions
            .get(&region)
            .is_some_and(|region| region.in_bounds(cell) && !region.blocked.contains(&cell))
    }

    fn entity_exists(&self, entity: EntityId) -> bool {
        self.entities
            .get(&entity)
            .is_some_and(|entity| entity.location != EntityLocation::Destroyed)
    }

    fn take_for_transit(&mut self, entity: EntityId) -> bool {
        match self.entities.get_mut(&entity) {
            Some(entity) if matches!(entity.location, EntityLocation::Placed { .. }) => {
                entity.location = EntityLocation::InTransit;
                entity.next_step = None;
                true
            }
            _ => false,
        }
    }

    fn spawn_entity(&mut self, entity: EntityId, region: RegionId, cell: Cell) {
        let location = EntityLocation::Placed { region, cell };
        self.entities
            .entry(entity)
            .and_modify(|entity| entity.location = location)
            .or_insert_with(|| InMemoryEntity::new(location, false));
    }

    fn destroy_entity(&mut self, entity: EntityId) {
        if let Some(entity) = self.entities.get_mut(&entity) {
            entity.location = EntityLocation::Destroyed;
        }
    }
}

impl TaskQueue for InMemoryGateHost {
    fn actors_in_region(&self, region: RegionId) -> Vec<ActorView> {
        self.entities
            .iter()
            .filter(|(_, entity)| entity.is_actor)
            .filter_map(|(id, entity)| match entity.location {
                EntityLocation::Placed { region: r, cell } if r == region => Some(ActorView {
                    entity: *id,
                    cell,
                    next_step: entity.next_step,
                    hazard_immune: entity.hazard_immune,
                }),
                _ => None,
            })
            .collect()
    }

    fn force_move_and_hold(&mut self, actor: EntityId, cell: Cell, hold_ticks: u64) {
        if let Some(entity) = self.entities.get_mut(&actor) {
            if let EntityLocation::Placed { region, .. } = entity.location {
                entity.location = EntityLocation::Placed { region, cell };
            }
            entity.next_step = None;
        }
        self.holds.push(HoldOrder {
            actor,
            cell,
            hold_ticks,
        });
    }

    fn redraft_and_hold(&mut self, actor: EntityId) {
        if let Some(entity) = self.entities.get_mut(&actor) {
            entity.drafted = true;
            entity.next_step = None;
        }
        self.redrafts.push(actor);
    }
}

impl HazardSink for InMemoryGateHost {
    fn apply_area_damage(&mut self, region: RegionId, cell: Cell, radius: u32, spare: EndpointId) {
        self.damage.push(DamageCall {
            region,
            cell,
            radius,
            spare,
        });
        for entity in self.entities.values_mut() {
            if entity.hazard_immune {
                continue;
            }
            if let EntityLocation::Placed { region: r, cell: at } = entity.location {
                if r == region && at.within_radius(cell, radius) {
                    entity.damage_taken += 1;
                }
            }
        }
    }
}

impl EventLog for InMemoryGateHost {
    fn notify_failure(&mut self, endpoint: EndpointId, reason: &DialFailure) {
        self.failures.push((endpoint, *reason));
    }

    fn notify_success(&mut self, endpoint: EndpointId, peer: EndpointId, address: Address) {
        self.successes.push(DialSuccess {
            endpoint,
            peer,
            address,
        });
    }
}

impl AudioCue for InMemoryGateHost {
    fn play(&mut self, cue: GateCue, at: CueSite) {
        self.cues.push((cue, at));
    }
}
