//! Per-gate state: activation, peer handle, buffers, and hazard timers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::geometry::{Cell, Rotation};

use super::buffer::TransitBuffer;
use super::host::{CueSite, GateFootprint, RegionTicket};
use super::types::{Address, EndpointId, EntityId, GateSite, RegionId};

/// Footprint of a south-facing gate, relative to its position.
const FOOTPRINT_OFFSETS: [Cell; 3] = [Cell::new(-1, 0), Cell::new(0, 0), Cell::new(1, 0)];
const INTERACTION_OFFSET: Cell = Cell::new(0, -1);
const BEHIND_OFFSET: Cell = Cell::new(0, 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOpen {
    pub target: Address,
    pub countdown: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connecting {
    pub target: Address,
    pub ticket: RegionTicket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GateState {
    Idle,
    PendingOpen { target: Address, countdown: u64 },
    Connecting { target: Address },
    Active { receiver: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GateEndpoint {
    pub(crate) id: EndpointId,
    pub(crate) region: RegionId,
    pub(crate) position: Cell,
    pub(crate) rotation: Rotation,
    pub(crate) address: Option<Address>,
    pub(crate) connected_address: Option<Address>,
    pub(crate) peer_id: Option<EndpointId>,
    pub(crate) is_active: bool,
    pub(crate) is_receiver: bool,
    pub(crate) has_iris: bool,
    pub(crate) iris_engaged: bool,
    pub(crate) external_hold_count: u32,
    pub(crate) ticks_since_opened: u64,
    pub(crate) ticks_since_buffer_unloaded: u64,
    pub(crate) idle_threshold: u64,
    pub(crate) unload_spacing: u64,
    pub(crate) pending_open: Option<PendingOpen>,
    pub(crate) connecting: Option<Connecting>,
    pub(crate) buffers: TransitBuffer,
    pub(crate) redraft_marks: BTreeSet<EntityId>,
}

impl GateEndpoint {
    pub fn new(id: EndpointId, site: GateSite, address: Option<Address>) -> Self {
        Self {
            id,
            region: site.region,
            position: site.position,
            rotation: site.rotation,
            address,
            connected_address: None,
            peer_id: None,
            is_active: false,
            is_receiver: false,
            has_iris: site.has_iris,
            iris_engaged: false,
            external_hold_count: 0,
            ticks_since_opened: 0,
            ticks_since_buffer_unloaded: 0,
            idle_threshold: 0,
            unload_spacing: 0,
            pending_open: None,
            connecting: None,
            buffers: TransitBuffer::new(),
            redraft_marks: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> EndpointId {
        self.id
    }

    pub fn region(&self) -> RegionId {
        self.region
    }

    pub fn position(&self) -> Cell {
        self.position
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn address(&self) -> Option<Address> {
        self.address
    }

    pub fn connected_address(&self) -> Option<Address> {
        self.connected_address
    }

    pub fn peer_id(&self) -> Option<EndpointId> {
        self.peer_id
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_receiver(&self) -> bool {
        self.is_receiver
    }

    pub fn has_iris(&self) -> bool {
        self.has_iris
    }

    pub fn iris_engaged(&self) -> bool {
        self.iris_engaged
    }

    pub fn external_hold_count(&self) -> u32 {
        self.external_hold_count
    }

    pub fn has_external_hold(&self) -> bool {
        self.external_hold_count > 0
    }

    pub fn ticks_since_opened(&self) -> u64 {
        self.ticks_since_opened
    }

    pub fn ticks_since_buffer_unloaded(&self) -> u64 {
        self.ticks_since_buffer_unloaded
    }

    pub fn idle_threshold(&self) -> u64 {
        self.idle_threshold
    }

    pub fn unload_spacing(&self) -> u64 {
        self.unload_spacing
    }

    pub fn pending_open(&self) -> Option<PendingOpen> {
        self.pending_open
    }

    pub fn buffers(&self) -> &TransitBuffer {
        &self.buffers
    }

    pub fn redraft_marks(&self) -> &BTreeSet<EntityId> {
        &self.redraft_marks
    }

    pub fn state(&self) -> GateState {
        if self.is_active {
            return GateState::Active {
                receiver: self.is_receiver,
            };
        }
        if let Some(connecting) = self.connecting {
            return GateState::Connecting {
                target: connecting.target,
            };
        }
        match self.pending_open {
            Some(pending) => GateState::PendingOpen {
                target: pending.target,
                countdown: pending.countdown,
            },
            None => GateState::Idle,
        }
    }

    /// Dialing or connecting, but not yet active.
    pub fn is_dialing(&self) -> bool {
        self.pending_open.is_some() || self.connecting.is_some()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state(), GateState::Idle)
    }

    pub fn footprint(&self) -> GateFootprint {
        GateFootprint {
            endpoint: self.id,
            region: self.region,
            position: self.position,
            rotation: self.rotation,
            cells: FOOTPRINT_OFFSETS
                .iter()
                .map(|offset| self.position.offset(self.rotation.rotate(*offset)))
                .collect(),
            interaction_cell: self.interaction_cell(),
        }
    }

    pub fn interaction_cell(&self) -> Cell {
        self.position
            .offset(self.rotation.rotate(INTERACTION_OFFSET))
    }

    /// The cell directly behind the gate, away from its facing.
    pub fn behind_cell(&self) -> Cell {
        self.position.offset(self.rotation.rotate(BEHIND_OFFSET))
    }

    pub(crate) fn cue_site(&self) -> CueSite {
        CueSite {
            endpoint: self.id,
            region: self.region,
            cell: self.position,
        }
    }

    pub(crate) fn reset_activity(&mut self) {
        self.is_active = false;
        self.is_receiver = false;
        self.iris_engaged = false;
        self.connected_address = None;
        self.peer_id = None;
        self.pending_open = None;
        self.connecting = None;
        self.external_hold_count = 0;
        self.ticks_since_opened = 0;
        self.ticks_since_buffer_unloaded = 0;
        self.idle_threshold = 0;
        self.unload_spacing = 0;
    }
}
