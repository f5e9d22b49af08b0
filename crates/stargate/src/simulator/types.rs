//! Core type definitions: identity handles, constants, and transit payloads.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::{Cell, Rotation};

// ============================================================================
// Identity Handles
// ============================================================================

pub type GateTime = u64;
pub type GateEventId = u64;

/// Stable identity of one physical gate. Peers refer to each other only
/// through this handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointId(pub u64);

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gate#{}", self.0)
    }
}

/// Entity handle owned by the host world (actor or item).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Handle of a generated region (map) in the host world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub u64);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region#{}", self.0)
    }
}

/// World location identifier that a gate can be dialed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub u32);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Constants
// ============================================================================

pub const SNAPSHOT_VERSION: u32 = 1;
pub const JOURNAL_VERSION: u32 = 1;
pub const ADDRESS_REGISTRY_CAPACITY: usize = 256;

// ============================================================================
// Transit Payloads
// ============================================================================

/// An entity in flight plus its transport metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitItem {
    pub entity: EntityId,
    #[serde(default)]
    pub redraft: bool,
}

impl TransitItem {
    pub fn new(entity: EntityId, redraft: bool) -> Self {
        Self { entity, redraft }
    }
}

/// Where a gate stands in its region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSite {
    pub region: RegionId,
    pub position: Cell,
    #[serde(default)]
    pub rotation: Rotation,
    #[serde(default)]
    pub has_iris: bool,
}

impl GateSite {
    pub fn new(region: RegionId, position: Cell, rotation: Rotation) -> Self {
        Self {
            region,
            position,
            rotation,
            has_iris: false,
        }
    }

    pub fn with_iris(mut self) -> Self {
        self.has_iris = true;
        self
    }
}

/// Map size requested when a destination region has to be generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSize {
    pub width: u32,
    pub depth: u32,
}

impl Default for RegionSize {
    fn default() -> Self {
        Self {
            width: 75,
            depth: 75,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateCue {
    /// Sustained ambient loop started when a connection opens.
    Open,
    Close,
    Fail,
    IrisImpact,
    Teleport,
}
