//! Persistence utilities: GateSnapshot, GateJournal, EndpointRecord, and error types.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::geometry::{Cell, Rotation};

use super::buffer::TransitBuffer;
use super::config::GateConfig;
use super::endpoint::{GateEndpoint, PendingOpen};
use super::kernel::GateEvent;
use super::registry::AddressRegistry;
use super::types::{
    Address, EndpointId, EntityId, GateEventId, GateSite, GateTime, RegionId, TransitItem,
    JOURNAL_VERSION, SNAPSHOT_VERSION,
};

// ============================================================================
// Endpoint Record
// ============================================================================

/// Saved form of one gate. Peers are stored by identity only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointRecord {
    pub id: EndpointId,
    pub region: RegionId,
    pub position: Cell,
    #[serde(default)]
    pub rotation: Rotation,
    pub address: Option<Address>,
    pub connected_address: Option<Address>,
    pub peer_id: Option<EndpointId>,
    pub is_active: bool,
    pub is_receiver: bool,
    pub has_iris: bool,
    pub iris_engaged: bool,
    #[serde(default)]
    pub external_hold_count: u32,
    pub ticks_since_opened: u64,
    pub ticks_since_buffer_unloaded: u64,
    #[serde(default)]
    pub idle_threshold: u64,
    #[serde(default)]
    pub unload_spacing: u64,
    pub pending_open: Option<PendingOpen>,
    #[serde(default)]
    pub send_buffer: Vec<TransitItem>,
    #[serde(default)]
    pub recv_buffer: Vec<TransitItem>,
    #[serde(default)]
    pub redraft_marks: BTreeSet<EntityId>,
}

impl EndpointRecord {
    /// A dial still waiting on region generation is saved as a pending open
    /// that fires on the first tick after load.
    pub fn from_endpoint(endpoint: &GateEndpoint) -> Self {
        let pending_open = endpoint.pending_open.or_else(|| {
            endpoint.connecting.map(|connecting| PendingOpen {
                target: connecting.target,
                countdown: 0,
            })
        });
        Self {
            id: endpoint.id,
            region: endpoint.region,
            position: endpoint.position,
            rotation: endpoint.rotation,
            address: endpoint.address,
            connected_address: endpoint.connected_address,
            peer_id: endpoint.peer_id,
            is_active: endpoint.is_active,
            is_receiver: endpoint.is_receiver,
            has_iris: endpoint.has_iris,
            iris_engaged: endpoint.iris_engaged,
            external_hold_count: endpoint.external_hold_count,
            ticks_since_opened: endpoint.ticks_since_opened,
            ticks_since_buffer_unloaded: endpoint.ticks_since_buffer_unloaded,
            idle_threshold: endpoint.idle_threshold,
            unload_spacing: endpoint.unload_spacing,
            pending_open,
            send_buffer: endpoint.buffers.send_items().to_vec(),
            recv_buffer: endpoint.buffers.recv_items().copied().collect(),
            redraft_marks: endpoint.redraft_marks.clone(),
        }
    }

    pub fn into_endpoint(self) -> GateEndpoint {
        let site = GateSite {
            region: self.region,
            position: self.position,
            rotation: self.rotation,
            has_iris: self.has_iris,
        };
        let mut endpoint = GateEndpoint::new(self.id, site, self.address);
        endpoint.connected_address = self.connected_address;
        endpoint.peer_id = self.peer_id;
        endpoint.is_active = self.is_active;
        endpoint.is_receiver = self.is_receiver;
        endpoint.iris_engaged = self.has_iris && self.iris_engaged;
        endpoint.external_hold_count = self.external_hold_count;
        endpoint.ticks_since_opened = self.ticks_since_opened;
        endpoint.ticks_since_buffer_unloaded = self.ticks_since_buffer_unloaded;
        endpoint.idle_threshold = self.idle_threshold;
        endpoint.unload_spacing = self.unload_spacing;
        endpoint.pending_open = self.pending_open;
        endpoint.buffers = TransitBuffer::from_parts(self.send_buffer, self.recv_buffer);
        endpoint.redraft_marks = self.redraft_marks;
        endpoint
    }
}

// ============================================================================
// Snapshot
// ============================================================================

fn default_snapshot_version() -> u32 {
    SNAPSHOT_VERSION
}

fn default_journal_version() -> u32 {
    JOURNAL_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateSnapshot {
    #[serde(default = "default_snapshot_version")]
    pub version: u32,
    pub time: GateTime,
    pub config: GateConfig,
    pub world_seed: u64,
    pub registry: AddressRegistry,
    pub endpoints: Vec<EndpointRecord>,
    pub next_event_id: GateEventId,
    pub next_endpoint_id: u64,
    pub journal_len: usize,
}

impl GateSnapshot {
    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(input: &str) -> Result<Self, PersistError> {
        let snapshot: Self = serde_json::from_str(input)?;
        snapshot.validate_version()?;
        Ok(snapshot)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        write_json_to_path(self, path.as_ref())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let snapshot: Self = read_json_from_path(path.as_ref())?;
        snapshot.validate_version()?;
        Ok(snapshot)
    }

    pub(crate) fn validate_version(&self) -> Result<(), PersistError> {
        if self.version == SNAPSHOT_VERSION {
            Ok(())
        } else {
            Err(PersistError::UnsupportedVersion {
                kind: "snapshot".to_string(),
                version: self.version,
                expected: SNAPSHOT_VERSION,
            })
        }
    }
}

// ============================================================================
// Journal
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateJournal {
    #[serde(default = "default_journal_version")]
    pub version: u32,
    pub events: Vec<GateEvent>,
}

impl GateJournal {
    pub fn new() -> Self {
        Self {
            version: JOURNAL_VERSION,
            events: Vec::new(),
        }
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(input: &str) -> Result<Self, PersistError> {
        let journal: Self = serde_json::from_str(input)?;
        journal.validate_version()?;
        Ok(journal)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        write_json_to_path(self, path.as_ref())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let journal: Self = read_json_from_path(path.as_ref())?;
        journal.validate_version()?;
        Ok(journal)
    }

    pub(crate) fn validate_version(&self) -> Result<(), PersistError> {
        if self.version == JOURNAL_VERSION {
            Ok(())
        } else {
            Err(PersistError::UnsupportedVersion {
                kind: "journal".to_string(),
                version: self.version,
                expected: JOURNAL_VERSION,
            })
        }
    }
}

impl Default for GateJournal {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serde error: {0}")]
    Serde(String),
    #[error("snapshot expects {expected} journal events, found {actual}")]
    SnapshotMismatch { expected: usize, actual: usize },
    #[error("unsupported {kind} version {version}, expected {expected}")]
    UnsupportedVersion {
        kind: String,
        version: u32,
        expected: u32,
    },
}

impl From<io::Error> for PersistError {
    fn from(err: io::Error) -> Self {
        PersistError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(err: serde_json::Error) -> Self {
        PersistError::Serde(err.to_string())
    }
}

// ============================================================================
// Helper functions
// ============================================================================

pub(crate) fn write_json_to_path<T: Serialize>(value: &T, path: &Path) -> Result<(), PersistError> {
    let data = serde_json::to_vec_pretty(value)?;
    fs::write(path, data)?;
    Ok(())
}

pub(crate) fn read_json_from_path<T: DeserializeOwned>(path: &Path) -> Result<T, PersistError> {
    let data = fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}
