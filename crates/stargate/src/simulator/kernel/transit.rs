use log::{debug, warn};

use super::super::host::GateHost;
use super::super::types::{EndpointId, EntityId, GateCue, TransitItem};
use super::types::{GateError, GateEventKind};
use super::GateKernel;

impl GateKernel {
    /// Lifts `entity` out of the world and queues it for the peer.
    pub fn enqueue_send<H>(
        &mut self,
        id: EndpointId,
        entity: EntityId,
        redraft: bool,
        host: &mut H,
    ) -> Result<(), GateError>
    where
        H: GateHost + ?Sized,
    {
        let endpoint = self.require_endpoint(id)?;
        if !endpoint.is_active() {
            return Err(GateError::NotActive { endpoint: id });
        }
        if endpoint.buffers().contains(entity) || !host.take_for_transit(entity) {
            return Err(GateError::EntityUnavailable { entity });
        }
        let peer = endpoint.peer_id();

        self.endpoint_mut(id)?
            .buffers
            .push_send(TransitItem::new(entity, redraft));
        if redraft {
            if let Some(peer) = peer.and_then(|peer| self.endpoints.get_mut(&peer)) {
                peer.redraft_marks.insert(entity);
            }
        }
        debug!("{id} queued {entity} for transit");
        Ok(())
    }

    /// Opens a receiving gate with no peer, kept alive by an external hold.
    pub fn open_inbound<H>(&mut self, id: EndpointId, host: &mut H) -> Result<(), GateError>
    where
        H: GateHost + ?Sized,
    {
        let endpoint = self.require_endpoint(id)?;
        if endpoint.is_active() {
            return Err(GateError::AlreadyActive { endpoint: id });
        }
        let idle_threshold = self.sample_idle_threshold();
        let unload_spacing = self.sample_unload_spacing();
        let endpoint = self.endpoint_mut(id)?;
        endpoint.pending_open = None;
        if let Some(connecting) = endpoint.connecting.take() {
            host.cancel_region_request(connecting.ticket);
        }
        endpoint.is_active = true;
        endpoint.is_receiver = true;
        endpoint.peer_id = None;
        endpoint.connected_address = None;
        endpoint.ticks_since_opened = 0;
        endpoint.ticks_since_buffer_unloaded = 0;
        endpoint.idle_threshold = idle_threshold;
        endpoint.unload_spacing = unload_spacing;
        endpoint.external_hold_count = endpoint.external_hold_count.saturating_add(1);
        let site = endpoint.cue_site();
        host.play(GateCue::Open, site);
        self.record(GateEventKind::InboundOpened { endpoint: id });
        Ok(())
    }

    /// Queues a scripted arrival directly into the incoming buffer. The
    /// entity is not expected to exist in any region yet.
    pub fn enqueue_arrival<H>(
        &mut self,
        id: EndpointId,
        entity: EntityId,
        redraft: bool,
        host: &mut H,
    ) -> Result<(), GateError>
    where
        H: GateHost + ?Sized,
    {
        if !self.require_endpoint(id)?.is_active() {
            self.open_inbound(id, host)?;
        }
        let endpoint = self.endpoint_mut(id)?;
        endpoint
            .buffers
            .push_recv(TransitItem::new(entity, redraft));
        if redraft {
            endpoint.redraft_marks.insert(entity);
        }
        Ok(())
    }

    /// Moves the whole outgoing buffer into the peer's incoming queue.
    pub(super) fn drain_send_to_peer<H>(&mut self, id: EndpointId, host: &mut H)
    where
        H: GateHost + ?Sized,
    {
        let peer = self.valid_peer(id);
        let Some(endpoint) = self.endpoints.get_mut(&id) else {
            return;
        };
        if !endpoint.is_active || endpoint.buffers.send_is_empty() {
            return;
        }

        match peer {
            Some(peer) => {
                let items = endpoint.buffers.take_send();
                let count = items.len();
                if let Some(peer_endpoint) = self.endpoints.get_mut(&peer) {
                    peer_endpoint.buffers.extend_recv(items);
                }
                self.record(GateEventKind::ItemsTransferred {
                    from: id,
                    to: peer,
                    count,
                });
            }
            None if endpoint.is_receiver => {
                let items = endpoint.buffers.take_send();
                let count = items.len();
                for item in items {
                    host.destroy_entity(item.entity);
                }
                self.record(GateEventKind::ItemsDiscarded {
                    endpoint: id,
                    count,
                });
                debug!("{id} has nothing to send to, discarded {count} items");
            }
            None => {}
        }
    }

    /// Unloads at most one item from the head of the incoming queue.
    pub(super) fn try_spawn_from_recv<H>(&mut self, id: EndpointId, host: &mut H)
    where
        H: GateHost + ?Sized,
    {
        let Some(endpoint) = self.endpoints.get(&id) else {
            return;
        };
        if !endpoint.is_active()
            || endpoint.ticks_since_buffer_unloaded() < endpoint.unload_spacing()
        {
            return;
        }
        let Some(head) = endpoint.buffers().peek_recv().copied() else {
            return;
        };

        if !host.entity_exists(head.entity) {
            if let Some(endpoint) = self.endpoints.get_mut(&id) {
                endpoint.buffers.pop_recv();
                endpoint.redraft_marks.remove(&head.entity);
            }
            debug!("{id} skipped vanished {}", head.entity);
            return;
        }

        let site = endpoint.cue_site();
        if endpoint.iris_engaged() {
            host.destroy_entity(head.entity);
            host.play(GateCue::IrisImpact, site);
            self.finish_unload(id, head.entity);
            self.record(GateEventKind::EntityStruckIris {
                endpoint: id,
                entity: head.entity,
            });
            return;
        }

        let footprint = endpoint.footprint();
        let cell = host
            .find_adjacent_free_cell(&footprint)
            .filter(|cell| !footprint.covers(*cell))
            .unwrap_or(footprint.interaction_cell);
        let redrafted = head.redraft || endpoint.redraft_marks().contains(&head.entity);
        host.spawn_entity(head.entity, footprint.region, cell);
        if redrafted {
            host.redraft_and_hold(head.entity);
        }
        host.play(GateCue::Teleport, site);
        self.finish_unload(id, head.entity);
        self.record(GateEventKind::EntityArrived {
            endpoint: id,
            entity: head.entity,
            cell,
            redrafted,
        });
    }

    fn finish_unload(&mut self, id: EndpointId, entity: EntityId) {
        let spacing = self.sample_unload_spacing();
        if let Some(endpoint) = self.endpoints.get_mut(&id) {
            endpoint.buffers.pop_recv();
            endpoint.redraft_marks.remove(&entity);
            endpoint.ticks_since_buffer_unloaded = 0;
            endpoint.unload_spacing = spacing;
        }
    }

    /// Returns every buffered entity to the endpoint's own region.
    pub(super) fn flush_buffers<H>(&mut self, id: EndpointId, host: &mut H) -> usize
    where
        H: GateHost + ?Sized,
    {
        let Some(endpoint) = self.endpoints.get_mut(&id) else {
            return 0;
        };
        if endpoint.buffers.is_empty() {
            return 0;
        }
        let items = endpoint.buffers.drain_all();
        let footprint = endpoint.footprint();

        let mut flushed = 0;
        for item in items {
            if !host.entity_exists(item.entity) {
                continue;
            }
            let cell = match host
                .find_adjacent_free_cell(&footprint)
                .filter(|cell| !footprint.covers(*cell))
            {
                Some(cell) => cell,
                None => {
                    warn!(
                        "{id} found no free cell while flushing {}, using interaction cell",
                        item.entity
                    );
                    footprint.interaction_cell
                }
            };
            host.spawn_entity(item.entity, footprint.region, cell);
            flushed += 1;
        }
        debug!("{id} flushed {flushed} buffered entities");
        flushed
    }
}
