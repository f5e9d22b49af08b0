use log::{info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::super::designation::reseed;
use super::super::endpoint::GateEndpoint;
use super::super::host::GateHost;
use super::super::persist::{EndpointRecord, GateJournal, GateSnapshot, PersistError};
use super::super::types::{EndpointId, RegionId, JOURNAL_VERSION, SNAPSHOT_VERSION};
use super::types::GateEventKind;
use super::GateKernel;

const SNAPSHOT_FILE_NAME: &str = "snapshot.json";
const JOURNAL_FILE_NAME: &str = "journal.json";

impl GateKernel {
    pub fn snapshot(&self) -> GateSnapshot {
        GateSnapshot {
            version: SNAPSHOT_VERSION,
            time: self.time,
            config: self.config.clone(),
            world_seed: self.world_seed,
            registry: self.registry.clone(),
            endpoints: self
                .endpoints
                .values()
                .map(EndpointRecord::from_endpoint)
                .collect(),
            next_event_id: self.next_event_id,
            next_endpoint_id: self.next_endpoint_id,
            journal_len: self.journal.len(),
        }
    }

    pub fn journal_snapshot(&self) -> GateJournal {
        GateJournal {
            version: JOURNAL_VERSION,
            events: self.journal.clone(),
        }
    }

    /// Rebuilds a kernel from saved state, then repairs what the save could
    /// not carry: duplicate gates per region are demoted and peer links are
    /// re-resolved by identity, with one rediscovery pass through the map.
    pub fn from_snapshot<H>(
        snapshot: GateSnapshot,
        journal: GateJournal,
        host: &mut H,
    ) -> Result<Self, PersistError>
    where
        H: GateHost + ?Sized,
    {
        snapshot.validate_version()?;
        journal.validate_version()?;
        if snapshot.journal_len != journal.events.len() {
            return Err(PersistError::SnapshotMismatch {
                expected: snapshot.journal_len,
                actual: journal.events.len(),
            });
        }

        let config = snapshot.config.sanitized();
        let mut registry = snapshot.registry;
        registry.set_capacity(config.registry_capacity);

        let endpoints: BTreeMap<EndpointId, GateEndpoint> = snapshot
            .endpoints
            .into_iter()
            .map(|record| (record.id, record.into_endpoint()))
            .collect();
        let next_endpoint_id = endpoints
            .keys()
            .next_back()
            .map(|id| id.0.saturating_add(1))
            .unwrap_or(0)
            .max(snapshot.next_endpoint_id);

        let mut kernel = Self {
            time: snapshot.time,
            config,
            world_seed: snapshot.world_seed,
            next_event_id: snapshot.next_event_id,
            next_endpoint_id,
            endpoints,
            registry,
            journal: journal.events,
            rng: SmallRng::seed_from_u64(reseed(snapshot.world_seed, snapshot.time)),
        };
        kernel.demote_duplicates(host);
        kernel.rehydrate_peers(host);
        info!(
            "restored {} gates at tick {}",
            kernel.endpoints.len(),
            kernel.time
        );
        Ok(kernel)
    }

    pub fn save_to_dir(&self, dir: impl AsRef<Path>) -> Result<(), PersistError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        self.snapshot().save_json(dir.join(SNAPSHOT_FILE_NAME))?;
        self.journal_snapshot().save_json(dir.join(JOURNAL_FILE_NAME))?;
        Ok(())
    }

    pub fn load_from_dir<H>(dir: impl AsRef<Path>, host: &mut H) -> Result<Self, PersistError>
    where
        H: GateHost + ?Sized,
    {
        let dir = dir.as_ref();
        let snapshot = GateSnapshot::load_json(dir.join(SNAPSHOT_FILE_NAME))?;
        let journal = GateJournal::load_json(dir.join(JOURNAL_FILE_NAME))?;
        Self::from_snapshot(snapshot, journal, host)
    }

    /// One gate per region survives: the first active one, else the lowest id.
    fn demote_duplicates<H>(&mut self, host: &mut H)
    where
        H: GateHost + ?Sized,
    {
        let mut by_region: BTreeMap<RegionId, Vec<EndpointId>> = BTreeMap::new();
        for endpoint in self.endpoints.values() {
            by_region
                .entry(endpoint.region())
                .or_default()
                .push(endpoint.id());
        }

        for ids in by_region.into_values() {
            if ids.len() < 2 {
                continue;
            }
            let kept = ids
                .iter()
                .copied()
                .find(|id| self.is_active(*id))
                .unwrap_or(ids[0]);
            for id in ids.into_iter().filter(|id| *id != kept) {
                self.demote(id, kept, host);
            }
        }
    }

    fn rehydrate_peers<H>(&mut self, host: &mut H)
    where
        H: GateHost + ?Sized,
    {
        let ids: Vec<EndpointId> = self.endpoints.keys().copied().collect();
        for id in ids {
            let Some(endpoint) = self.endpoints.get(&id) else {
                continue;
            };
            if !endpoint.is_active() {
                if let Some(endpoint) = self.endpoints.get_mut(&id) {
                    endpoint.peer_id = None;
                }
                continue;
            }
            if self.valid_peer(id).is_some() {
                continue;
            }
            // Inbound receivers run without a peer.
            if endpoint.is_receiver() && endpoint.peer_id().is_none() {
                continue;
            }

            match self.rediscover_peer(id, &*host) {
                Some(peer) => {
                    if let Some(endpoint) = self.endpoints.get_mut(&id) {
                        endpoint.peer_id = Some(peer);
                    }
                    if let Some(other) = self.endpoints.get_mut(&peer) {
                        other.peer_id = Some(id);
                    }
                    info!("{id} relinked to {peer}");
                    self.record(GateEventKind::PeerRelinked { endpoint: id, peer });
                }
                None => {
                    warn!("{id} could not find its peer after load, closing");
                    self.record(GateEventKind::PeerLost { endpoint: id });
                    if let Err(err) = self.close(id, false, host) {
                        warn!("failed to close {id} after load: {err}");
                    }
                }
            }
        }
    }

    /// Looks up the gate at the remembered connected address. It qualifies if
    /// it already points back, or if it is active and remembers our address
    /// without holding a working link of its own.
    fn rediscover_peer<H>(&self, id: EndpointId, host: &H) -> Option<EndpointId>
    where
        H: GateHost + ?Sized,
    {
        let endpoint = self.endpoints.get(&id)?;
        let region = host.region_for(endpoint.connected_address()?)?;
        let candidate = self.endpoint_in_region(region)?;
        if candidate.id() == id {
            return None;
        }
        if candidate.is_active() && candidate.peer_id() == Some(id) {
            return Some(candidate.id());
        }
        let remembers_us = candidate.is_active()
            && endpoint.address().is_some()
            && candidate.connected_address() == endpoint.address()
            && candidate.is_receiver() != endpoint.is_receiver()
            && self.valid_peer(candidate.id()).is_none();
        remembers_us.then_some(candidate.id())
    }
}
