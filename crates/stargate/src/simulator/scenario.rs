//! Gate scenario templates (stable IDs) and the scripted run used by the demo.

use log::info;
use serde::{Deserialize, Serialize};

use crate::geometry::{Cell, Rotation};

use super::config::GateConfig;
use super::in_memory_host::{EntityLocation, InMemoryGateHost};
use super::kernel::{GateError, GateKernel};
use super::types::{Address, EndpointId, EntityId, GateSite, GateTime, RegionSize};

pub const ORIGIN_ADDRESS: Address = Address(100);
pub const DESTINATION_ADDRESS: Address = Address(200);
pub const LAZY_ADDRESS: Address = Address(300);
pub const DEFAULT_DIAL_DELAY: u64 = 360;
const GATE_POSITION: Cell = Cell::new(20, 20);
const LAZY_GENERATION_POLLS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateScenario {
    /// Two generated regions, each with a gate, both addresses registered.
    TwinGates,
    /// The destination region does not exist until the dial reaches it.
    LazyDestination,
    /// Like twin gates, but the destination keeps its iris closed.
    IrisDefense,
}

impl GateScenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateScenario::TwinGates => "twin_gates",
            GateScenario::LazyDestination => "lazy_destination",
            GateScenario::IrisDefense => "iris_defense",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "twin_gates" | "twin-gates" | "twin" => Some(GateScenario::TwinGates),
            "lazy_destination" | "lazy-destination" | "lazy" => {
                Some(GateScenario::LazyDestination)
            }
            "iris_defense" | "iris-defense" | "iris" => Some(GateScenario::IrisDefense),
            _ => None,
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["twin_gates", "lazy_destination", "iris_defense"]
    }

    pub fn destination_address(&self) -> Address {
        match self {
            GateScenario::LazyDestination => LAZY_ADDRESS,
            GateScenario::TwinGates | GateScenario::IrisDefense => DESTINATION_ADDRESS,
        }
    }

    pub fn build(&self, config: GateConfig, seed: u64) -> Result<ScenarioWorld, GateError> {
        let mut host = InMemoryGateHost::new();
        let mut kernel = GateKernel::with_config(config, seed);

        let origin_region = host.add_region(Some(ORIGIN_ADDRESS), RegionSize::default());
        let origin_site = GateSite::new(origin_region, GATE_POSITION, Rotation::South);
        let origin = kernel.spawn_endpoint(origin_site, &mut host)?;

        let mut destination = None;
        match self {
            GateScenario::TwinGates | GateScenario::IrisDefense => {
                let region = host.add_region(Some(DESTINATION_ADDRESS), RegionSize::default());
                let mut site = GateSite::new(region, GATE_POSITION, Rotation::North);
                if *self == GateScenario::IrisDefense {
                    site = site.with_iris();
                }
                let id = kernel.spawn_endpoint(site, &mut host)?;
                if *self == GateScenario::IrisDefense {
                    kernel.set_iris_engaged(id, true)?;
                }
                destination = Some(id);
            }
            GateScenario::LazyDestination => {
                host.add_ungenerated_address(LAZY_ADDRESS);
                host.set_generation_delay(LAZY_GENERATION_POLLS);
                if !kernel.registry_mut().add(LAZY_ADDRESS, &host) {
                    return Err(GateError::InvalidAddress {
                        address: LAZY_ADDRESS,
                    });
                }
            }
        }

        // Stands behind the gate, clear of the vortex.
        let traveller = host.spawn_actor(origin_region, GATE_POSITION.offset(Cell::new(0, 2)));

        Ok(ScenarioWorld {
            scenario: *self,
            kernel,
            host,
            origin,
            destination,
            traveller,
        })
    }
}

/// A built scenario: kernel, host, and the handles the script needs.
#[derive(Debug, Clone)]
pub struct ScenarioWorld {
    pub scenario: GateScenario,
    pub kernel: GateKernel,
    pub host: InMemoryGateHost,
    pub origin: EndpointId,
    /// Receiving gate; filled in once a lazy destination has been generated.
    pub destination: Option<EndpointId>,
    pub traveller: EntityId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOutcome {
    pub opened_at: Option<GateTime>,
    pub sent_at: Option<GateTime>,
    pub traveller: Option<EntityLocation>,
    pub origin_active: bool,
    pub final_time: GateTime,
}

impl ScenarioWorld {
    /// Dials the destination, sends the traveller through as soon as the
    /// connection opens, then keeps ticking until `ticks` have elapsed.
    pub fn run(&mut self, dial_delay: u64, ticks: u64) -> Result<ScenarioOutcome, GateError> {
        let target = self.scenario.destination_address();
        self.kernel
            .queue_open(self.origin, target, dial_delay, &mut self.host)?;

        let mut opened_at = None;
        let mut sent_at = None;
        for _ in 0..ticks {
            self.kernel.tick(&mut self.host);
            if opened_at.is_none() && self.kernel.is_active(self.origin) {
                opened_at = Some(self.kernel.time());
                self.destination = self.kernel.valid_peer(self.origin);
                self.kernel
                    .enqueue_send(self.origin, self.traveller, true, &mut self.host)?;
                sent_at = Some(self.kernel.time());
                info!(
                    "{} opened at tick {}, traveller sent",
                    self.scenario.as_str(),
                    self.kernel.time()
                );
            }
        }

        Ok(ScenarioOutcome {
            opened_at,
            sent_at,
            traveller: self.host.location(self.traveller),
            origin_active: self.kernel.is_active(self.origin),
            final_time: self.kernel.time(),
        })
    }
}
