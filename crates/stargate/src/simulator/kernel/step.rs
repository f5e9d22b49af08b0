use log::warn;

use super::super::host::GateHost;
use super::super::types::EndpointId;
use super::super::vortex::VortexHazard;
use super::types::GateEventKind;
use super::GateKernel;

impl GateKernel {
    /// Advances every endpoint by exactly one tick, in ascending id order.
    ///
    /// Phases run across all endpoints before the next phase starts: dials,
    /// timers and vortex, buffer drains, spawn attempts, idle checks. Every
    /// drain therefore happens before any spawn within a tick.
    pub fn tick<H>(&mut self, host: &mut H)
    where
        H: GateHost + ?Sized,
    {
        self.time = self.time.saturating_add(1);
        let ids: Vec<EndpointId> = self.endpoints.keys().copied().collect();

        for &id in &ids {
            self.advance_dial(id, host);
        }
        for &id in &ids {
            self.advance_timers(id, host);
        }
        for &id in &ids {
            self.drain_send_to_peer(id, host);
        }
        for &id in &ids {
            self.try_spawn_from_recv(id, host);
        }
        for &id in &ids {
            if let Err(err) = self.check_idle(id, host) {
                warn!("idle check for {id} failed: {err}");
            }
        }
    }

    pub fn tick_n<H>(&mut self, ticks: u64, host: &mut H)
    where
        H: GateHost + ?Sized,
    {
        for _ in 0..ticks {
            self.tick(host);
        }
    }

    fn advance_timers<H>(&mut self, id: EndpointId, host: &mut H)
    where
        H: GateHost + ?Sized,
    {
        let Some(endpoint) = self.endpoints.get(&id) else {
            return;
        };
        if !endpoint.is_active() {
            return;
        }

        if !endpoint.is_receiver()
            && VortexHazard::fires_at(endpoint.ticks_since_opened(), &self.config)
        {
            let vortex = VortexHazard::for_endpoint(endpoint);
            vortex.strike(endpoint, self.config.hazard_radius, host);
            let cells = vortex.cells().len();
            self.record(GateEventKind::VortexStruck {
                endpoint: id,
                cells,
            });
        }

        if let Some(endpoint) = self.endpoints.get_mut(&id) {
            endpoint.ticks_since_opened = endpoint.ticks_since_opened.saturating_add(1);
            endpoint.ticks_since_buffer_unloaded =
                endpoint.ticks_since_buffer_unloaded.saturating_add(1);
        }
    }
}
