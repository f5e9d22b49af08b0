use log::{debug, info, warn};

use super::super::endpoint::{Connecting, PendingOpen};
use super::super::evacuation::{EvacuationPlanner, EvacuationReport};
use super::super::host::{GateHost, RegionPoll};
use super::super::types::{Address, EndpointId, GateCue, RegionId};
use super::types::{DialFailure, GateError, GateEventKind};
use super::GateKernel;

impl GateKernel {
    /// Queues a delayed open towards `target`. The hazard footprint is
    /// evacuated right away, before the countdown starts. Re-queuing while a
    /// dial is pending overwrites the target.
    pub fn queue_open<H>(
        &mut self,
        id: EndpointId,
        target: Address,
        delay: u64,
        host: &mut H,
    ) -> Result<EvacuationReport, GateError>
    where
        H: GateHost + ?Sized,
    {
        let endpoint = self
            .endpoints
            .get(&id)
            .ok_or(GateError::EndpointNotFound { endpoint: id })?;
        if endpoint.is_active() {
            return Err(GateError::AlreadyActive { endpoint: id });
        }
        if endpoint.address() == Some(target) || !self.registry.permits_dial(target, &*host) {
            self.fail_dial(id, target, DialFailure::InvalidAddress, host);
            return Err(GateError::InvalidAddress { address: target });
        }

        let hold_ticks = EvacuationPlanner::hold_ticks_for(delay, &self.config);
        let report = EvacuationPlanner::new(endpoint, &self.config).evacuate(
            hold_ticks,
            host,
            &mut self.rng,
        );

        let endpoint = self.endpoint_mut(id)?;
        if let Some(connecting) = endpoint.connecting.take() {
            host.cancel_region_request(connecting.ticket);
        }
        endpoint.pending_open = Some(PendingOpen {
            target,
            countdown: delay,
        });
        self.record(GateEventKind::DialQueued {
            endpoint: id,
            target,
            countdown: delay,
            evacuated: report.relocated.len(),
            stranded: report.stranded.len(),
        });
        debug!("{id} dialing {target} in {delay} ticks");
        Ok(report)
    }

    /// Closes the connection. With `cascade`, the peer is closed as well.
    /// Closing an idle endpoint with no holds and empty buffers does nothing.
    /// Returns how many buffered entities were flushed back into the region.
    pub fn close<H>(&mut self, id: EndpointId, cascade: bool, host: &mut H) -> Result<usize, GateError>
    where
        H: GateHost + ?Sized,
    {
        let endpoint = self.require_endpoint(id)?;
        if endpoint.is_idle() && !endpoint.has_external_hold() && endpoint.buffers().is_empty() {
            return Ok(0);
        }
        let was_active = endpoint.is_active();
        let peer = endpoint.peer_id();
        let cue_site = endpoint.cue_site();

        let flushed = self.flush_buffers(id, host);
        let endpoint = self.endpoint_mut(id)?;
        if let Some(connecting) = endpoint.connecting {
            host.cancel_region_request(connecting.ticket);
        }
        endpoint.reset_activity();
        endpoint.redraft_marks.clear();
        if was_active {
            host.play(GateCue::Close, cue_site);
            info!("{id} closed (cascade: {cascade}, flushed: {flushed})");
        }
        self.record(GateEventKind::ConnectionClosed {
            endpoint: id,
            cascade,
            flushed,
        });

        if cascade {
            if let Some(peer) = peer {
                let points_back = self
                    .endpoints
                    .get(&peer)
                    .is_some_and(|other| other.peer_id() == Some(id));
                if points_back {
                    self.close(peer, false, host)?;
                }
            }
        }
        Ok(flushed)
    }

    pub fn force_close<H>(&mut self, id: EndpointId, cascade: bool, host: &mut H) -> Result<(), GateError>
    where
        H: GateHost + ?Sized,
    {
        self.close(id, cascade, host).map(|_| ())
    }

    /// Advances a pending or connecting dial by one tick.
    pub(super) fn advance_dial<H>(&mut self, id: EndpointId, host: &mut H)
    where
        H: GateHost + ?Sized,
    {
        let Some(endpoint) = self.endpoints.get_mut(&id) else {
            return;
        };
        if endpoint.is_active {
            return;
        }

        if let Some(connecting) = endpoint.connecting {
            match host.poll_region(connecting.ticket) {
                RegionPoll::Pending => {}
                RegionPoll::Ready(region) => {
                    endpoint.connecting = None;
                    self.finalize_dial(id, connecting.target, region, host);
                }
                RegionPoll::Failed => {
                    endpoint.connecting = None;
                    self.fail_dial(id, connecting.target, DialFailure::InvalidAddress, host);
                }
            }
            return;
        }

        let Some(pending) = endpoint.pending_open.as_mut() else {
            return;
        };
        pending.countdown = pending.countdown.saturating_sub(1);
        if pending.countdown > 0 {
            return;
        }
        let target = pending.target;
        endpoint.pending_open = None;
        self.begin_connecting(id, target, host);
    }

    fn begin_connecting<H>(&mut self, id: EndpointId, target: Address, host: &mut H)
    where
        H: GateHost + ?Sized,
    {
        if !host.is_resolvable(target) {
            self.fail_dial(id, target, DialFailure::InvalidAddress, host);
            return;
        }
        if let Some(region) = host.region_for(target) {
            self.finalize_dial(id, target, region, host);
            return;
        }

        let ticket = host.request_region(target, self.config.region_size_hint);
        if let Some(endpoint) = self.endpoints.get_mut(&id) {
            endpoint.connecting = Some(Connecting { target, ticket });
        }
        self.record(GateEventKind::RegionRequested {
            endpoint: id,
            target,
        });
        debug!("{id} waiting on region generation for {target}");
    }

    fn finalize_dial<H>(&mut self, id: EndpointId, target: Address, region: RegionId, host: &mut H)
    where
        H: GateHost + ?Sized,
    {
        if !self.endpoints.contains_key(&id) {
            return;
        }
        let Some(receiver) = self.ensure_receivable_endpoint(region, host) else {
            self.fail_dial(id, target, DialFailure::NoReceivableEndpoint, host);
            return;
        };
        if receiver == id {
            self.fail_dial(id, target, DialFailure::InvalidAddress, host);
            return;
        }
        let busy = self
            .endpoints
            .get(&receiver)
            .map_or(true, |other| other.is_active() || other.is_dialing());
        if busy {
            self.fail_dial(id, target, DialFailure::DestinationBusy, host);
            return;
        }

        let dialer_idle = self.sample_idle_threshold();
        let dialer_spacing = self.sample_unload_spacing();
        let receiver_idle = self.sample_idle_threshold();
        let receiver_spacing = self.sample_unload_spacing();

        let (dialer_address, dialer_site) = {
            let Some(dialer) = self.endpoints.get(&id) else {
                return;
            };
            (dialer.address(), dialer.cue_site())
        };
        let Some(receiver_endpoint) = self.endpoints.get_mut(&receiver) else {
            return;
        };
        let receiver_address = receiver_endpoint.address().or(Some(target));
        receiver_endpoint.is_active = true;
        receiver_endpoint.is_receiver = true;
        receiver_endpoint.peer_id = Some(id);
        receiver_endpoint.connected_address = dialer_address;
        receiver_endpoint.ticks_since_opened = 0;
        receiver_endpoint.ticks_since_buffer_unloaded = 0;
        receiver_endpoint.idle_threshold = receiver_idle;
        receiver_endpoint.unload_spacing = receiver_spacing;
        let receiver_site = receiver_endpoint.cue_site();

        let Some(dialer) = self.endpoints.get_mut(&id) else {
            return;
        };
        dialer.is_active = true;
        dialer.is_receiver = false;
        dialer.peer_id = Some(receiver);
        dialer.connected_address = receiver_address;
        dialer.ticks_since_opened = 0;
        dialer.ticks_since_buffer_unloaded = 0;
        dialer.idle_threshold = dialer_idle;
        dialer.unload_spacing = dialer_spacing;

        host.play(GateCue::Open, dialer_site);
        host.play(GateCue::Open, receiver_site);
        host.notify_success(id, receiver, target);
        self.record(GateEventKind::ConnectionOpened {
            dialer: id,
            receiver,
            dialer_address,
            receiver_address,
        });
        info!("{id} connected to {receiver} at {target}");
    }

    fn fail_dial<H>(&mut self, id: EndpointId, target: Address, reason: DialFailure, host: &mut H)
    where
        H: GateHost + ?Sized,
    {
        let Some(endpoint) = self.endpoints.get_mut(&id) else {
            return;
        };
        endpoint.pending_open = None;
        if let Some(connecting) = endpoint.connecting.take() {
            host.cancel_region_request(connecting.ticket);
        }
        let site = endpoint.cue_site();
        host.play(GateCue::Fail, site);
        host.notify_failure(id, &reason);
        self.record(GateEventKind::DialFailed {
            endpoint: id,
            target,
            reason,
        });
        warn!("{id} failed to dial {target}: {}", reason.as_str());
    }
}
