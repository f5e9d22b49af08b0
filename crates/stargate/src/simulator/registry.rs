//! World-scoped registry of dialable gate addresses.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::host::MapProvider;
use super::types::{Address, ADDRESS_REGISTRY_CAPACITY};

/// Bounded, idempotent set of known addresses. Owned by the `GateKernel`;
/// every mutation is safe to repeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRegistry {
    addresses: BTreeSet<Address>,
    #[serde(default)]
    modification_equipment_active: bool,
    #[serde(default = "default_capacity")]
    capacity: usize,
}

fn default_capacity() -> usize {
    ADDRESS_REGISTRY_CAPACITY
}

impl Default for AddressRegistry {
    fn default() -> Self {
        Self::with_capacity(ADDRESS_REGISTRY_CAPACITY)
    }
}

impl AddressRegistry {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            addresses: BTreeSet::new(),
            modification_equipment_active: false,
            capacity,
        }
    }

    /// Returns false when the registry is full, the address does not resolve,
    /// or it is already present. Full registries never evict.
    pub fn add<M>(&mut self, address: Address, maps: &M) -> bool
    where
        M: MapProvider + ?Sized,
    {
        if self.addresses.contains(&address) {
            return false;
        }
        if self.addresses.len() >= self.capacity {
            debug!("address registry full, rejecting {address}");
            return false;
        }
        if !maps.is_resolvable(address) {
            debug!("address {address} is not resolvable, rejecting");
            return false;
        }
        self.addresses.insert(address)
    }

    pub fn remove(&mut self, address: Address) {
        self.addresses.remove(&address);
    }

    /// Prunes stale entries, then lists the remaining ones in ascending order.
    pub fn list<M>(&mut self, excluding: Option<Address>, maps: &M) -> Vec<Address>
    where
        M: MapProvider + ?Sized,
    {
        self.prune(maps);
        self.addresses
            .iter()
            .copied()
            .filter(|address| Some(*address) != excluding)
            .collect()
    }

    pub fn prune<M>(&mut self, maps: &M) -> usize
    where
        M: MapProvider + ?Sized,
    {
        let before = self.addresses.len();
        self.addresses.retain(|address| maps.is_resolvable(*address));
        let pruned = before - self.addresses.len();
        if pruned > 0 {
            debug!("pruned {pruned} unresolvable gate addresses");
        }
        pruned
    }

    pub fn contains(&self, address: Address) -> bool {
        self.addresses.contains(&address)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Shrinking below the current size keeps existing entries; only new
    /// additions are refused.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    pub fn modification_equipment_active(&self) -> bool {
        self.modification_equipment_active
    }

    pub fn set_modification_equipment_active(&mut self, active: bool) {
        self.modification_equipment_active = active;
    }

    /// Whether `target` may be dialed right now.
    pub fn permits_dial<M>(&self, target: Address, maps: &M) -> bool
    where
        M: MapProvider + ?Sized,
    {
        if !maps.is_resolvable(target) {
            return false;
        }
        self.modification_equipment_active || self.addresses.contains(&target)
    }
}
