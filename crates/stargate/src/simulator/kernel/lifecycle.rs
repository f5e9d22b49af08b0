use log::{debug, info, warn};

use super::super::endpoint::GateEndpoint;
use super::super::host::GateHost;
use super::super::types::{EndpointId, GateSite, RegionId};
use super::types::{GateError, GateEventKind};
use super::GateKernel;

impl GateKernel {
    /// Places a gate. A region that already hosts a gate keeps the existing
    /// one; the newcomer demotes itself and is never added to the table.
    pub fn spawn_endpoint<H>(&mut self, site: GateSite, host: &mut H) -> Result<EndpointId, GateError>
    where
        H: GateHost + ?Sized,
    {
        if let Some(existing) = self.endpoint_in_region(site.region).map(GateEndpoint::id) {
            let demoted = self.allocate_endpoint_id();
            warn!(
                "{demoted} spawned into {} which already has {existing}, demoting",
                site.region
            );
            self.record(GateEventKind::EndpointDemoted {
                endpoint: demoted,
                region: site.region,
                kept: existing,
            });
            return Err(GateError::DuplicateEndpoint {
                region: site.region,
                existing,
            });
        }

        let id = self.allocate_endpoint_id();
        let address = host.address_of(site.region);
        if let Some(address) = address {
            if !self.registry.add(address, &*host) {
                debug!("{id} address {address} not added to registry");
            }
        }
        self.endpoints
            .insert(id, GateEndpoint::new(id, site, address));
        self.record(GateEventKind::EndpointSpawned {
            endpoint: id,
            region: site.region,
            address,
        });
        debug!("spawned {id} in {} at {:?}", site.region, site.position);
        Ok(id)
    }

    /// Removes a gate: buffers are returned to its own region, an active peer
    /// is cascade-closed, and its address leaves the registry.
    pub fn destroy_endpoint<H>(&mut self, id: EndpointId, host: &mut H) -> Result<(), GateError>
    where
        H: GateHost + ?Sized,
    {
        self.require_endpoint(id)?;
        let mut flushed = self.close(id, true, host)?;
        flushed += self.flush_buffers(id, host);
        let Some(endpoint) = self.endpoints.remove(&id) else {
            return Ok(());
        };
        if let Some(address) = endpoint.address() {
            let shared = self
                .endpoints
                .values()
                .any(|other| other.address() == Some(address));
            if !shared {
                self.registry.remove(address);
            }
        }
        self.record(GateEventKind::EndpointDestroyed {
            endpoint: id,
            flushed,
        });
        info!("destroyed {id}");
        Ok(())
    }

    /// Destroys every gate of a region the host is discarding.
    pub fn on_region_discarded<H>(&mut self, region: RegionId, host: &mut H)
    where
        H: GateHost + ?Sized,
    {
        let ids: Vec<EndpointId> = self
            .endpoints
            .values()
            .filter(|endpoint| endpoint.region() == region)
            .map(GateEndpoint::id)
            .collect();
        for id in ids {
            if let Err(err) = self.destroy_endpoint(id, host) {
                warn!("failed to destroy {id} in discarded {region}: {err}");
            }
        }
        self.registry.prune(&*host);
    }

    /// Existing gate of `region`, or a fallback gate erected by the host.
    pub fn ensure_receivable_endpoint<H>(&mut self, region: RegionId, host: &mut H) -> Option<EndpointId>
    where
        H: GateHost + ?Sized,
    {
        if let Some(existing) = self.endpoint_in_region(region) {
            return Some(existing.id());
        }
        let site = host.fallback_gate_site(region)?;
        if site.region != region {
            warn!("fallback site for {region} points at {}, ignoring", site.region);
            return None;
        }
        self.spawn_endpoint(site, host).ok()
    }

    pub fn install_iris(&mut self, id: EndpointId) -> Result<(), GateError> {
        self.endpoint_mut(id)?.has_iris = true;
        Ok(())
    }

    pub fn set_iris_engaged(&mut self, id: EndpointId, engaged: bool) -> Result<(), GateError> {
        let endpoint = self.endpoint_mut(id)?;
        if !endpoint.has_iris {
            return Err(GateError::NoIris { endpoint: id });
        }
        if endpoint.iris_engaged == engaged {
            return Ok(());
        }
        endpoint.iris_engaged = engaged;
        self.record(GateEventKind::IrisChanged {
            endpoint: id,
            engaged,
        });
        Ok(())
    }

    pub fn push_external_hold(&mut self, id: EndpointId) -> Result<u32, GateError> {
        let endpoint = self.endpoint_mut(id)?;
        endpoint.external_hold_count = endpoint.external_hold_count.saturating_add(1);
        Ok(endpoint.external_hold_count)
    }

    pub fn pop_external_hold(&mut self, id: EndpointId) -> Result<u32, GateError> {
        let endpoint = self.endpoint_mut(id)?;
        endpoint.external_hold_count = endpoint.external_hold_count.saturating_sub(1);
        Ok(endpoint.external_hold_count)
    }

    /// Flushes and removes an endpoint that lost a duplicate-active conflict.
    pub(super) fn demote<H>(&mut self, id: EndpointId, kept: EndpointId, host: &mut H)
    where
        H: GateHost + ?Sized,
    {
        self.flush_buffers(id, host);
        let Some(endpoint) = self.endpoints.remove(&id) else {
            return;
        };
        warn!(
            "{id} claims to be active in {} alongside {kept}, demoting",
            endpoint.region()
        );
        self.record(GateEventKind::EndpointDemoted {
            endpoint: id,
            region: endpoint.region(),
            kept,
        });
    }
}
