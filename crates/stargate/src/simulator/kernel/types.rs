use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Cell;

use super::super::types::{Address, EndpointId, EntityId, GateEventId, GateTime, RegionId};

// ============================================================================
// Event Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateEvent {
    pub id: GateEventId,
    pub time: GateTime,
    pub kind: GateEventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GateEventKind {
    EndpointSpawned {
        endpoint: EndpointId,
        region: RegionId,
        address: Option<Address>,
    },
    EndpointDemoted {
        endpoint: EndpointId,
        region: RegionId,
        kept: EndpointId,
    },
    EndpointDestroyed {
        endpoint: EndpointId,
        flushed: usize,
    },
    DialQueued {
        endpoint: EndpointId,
        target: Address,
        countdown: u64,
        evacuated: usize,
        stranded: usize,
    },
    RegionRequested {
        endpoint: EndpointId,
        target: Address,
    },
    ConnectionOpened {
        dialer: EndpointId,
        receiver: EndpointId,
        dialer_address: Option<Address>,
        receiver_address: Option<Address>,
    },
    InboundOpened {
        endpoint: EndpointId,
    },
    DialFailed {
        endpoint: EndpointId,
        target: Address,
        reason: DialFailure,
    },
    ConnectionClosed {
        endpoint: EndpointId,
        cascade: bool,
        flushed: usize,
    },
    ItemsTransferred {
        from: EndpointId,
        to: EndpointId,
        count: usize,
    },
    ItemsDiscarded {
        endpoint: EndpointId,
        count: usize,
    },
    EntityArrived {
        endpoint: EndpointId,
        entity: EntityId,
        cell: Cell,
        redrafted: bool,
    },
    EntityStruckIris {
        endpoint: EndpointId,
        entity: EntityId,
    },
    VortexStruck {
        endpoint: EndpointId,
        cells: usize,
    },
    IdleTimeout {
        endpoint: EndpointId,
        idle_ticks: u64,
    },
    PeerRelinked {
        endpoint: EndpointId,
        peer: EndpointId,
    },
    PeerLost {
        endpoint: EndpointId,
    },
    IrisChanged {
        endpoint: EndpointId,
        engaged: bool,
    },
}

/// Why a dial did not produce a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialFailure {
    /// The destination could not be resolved or generated.
    InvalidAddress,
    /// The destination gate is already connected or dialing.
    DestinationBusy,
    /// No gate exists at the destination and none could be erected.
    NoReceivableEndpoint,
}

impl DialFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialFailure::InvalidAddress => "invalid_address",
            DialFailure::DestinationBusy => "destination_busy",
            DialFailure::NoReceivableEndpoint => "no_receivable_endpoint",
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("endpoint {endpoint} not found")]
    EndpointNotFound { endpoint: EndpointId },
    #[error("address {address} cannot be dialed")]
    InvalidAddress { address: Address },
    #[error("endpoint {endpoint} is already active")]
    AlreadyActive { endpoint: EndpointId },
    #[error("endpoint {endpoint} is not active")]
    NotActive { endpoint: EndpointId },
    #[error("endpoint {endpoint} has no iris installed")]
    NoIris { endpoint: EndpointId },
    #[error("region {region} already has gate {existing}")]
    DuplicateEndpoint {
        region: RegionId,
        existing: EndpointId,
    },
    #[error("entity {entity} is not available for transit")]
    EntityUnavailable { entity: EntityId },
}
