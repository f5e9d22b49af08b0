use log::{info, warn};

use super::super::host::GateHost;
use super::super::types::EndpointId;
use super::types::{GateError, GateEventKind};
use super::GateKernel;

impl GateKernel {
    /// Closes connections that have gone quiet or lost their peer.
    pub(super) fn check_idle<H>(&mut self, id: EndpointId, host: &mut H) -> Result<(), GateError>
    where
        H: GateHost + ?Sized,
    {
        let peer = self.valid_peer(id);
        let peer_loading = peer
            .and_then(|peer| self.endpoints.get(&peer))
            .is_some_and(|peer| !peer.buffers().send_is_empty());
        let Some(endpoint) = self.endpoints.get(&id) else {
            return Ok(());
        };
        if !endpoint.is_active() {
            return Ok(());
        }

        if !endpoint.is_receiver() && peer.is_none() {
            warn!("{id} lost its peer while dialing out, closing");
            self.record(GateEventKind::PeerLost { endpoint: id });
            self.close(id, false, host)?;
            return Ok(());
        }
        if endpoint.has_external_hold() {
            return Ok(());
        }

        let idle_ticks = endpoint.ticks_since_buffer_unloaded();
        if endpoint.is_receiver() && !peer_loading && idle_ticks > endpoint.idle_threshold() {
            info!("{id} idle for {idle_ticks} ticks, closing");
            self.record(GateEventKind::IdleTimeout {
                endpoint: id,
                idle_ticks,
            });
            self.close(id, true, host)?;
            return Ok(());
        }

        if peer.is_none() && endpoint.buffers().is_empty() && endpoint.connected_address().is_none()
        {
            self.close(id, false, host)?;
        }
        Ok(())
    }
}
