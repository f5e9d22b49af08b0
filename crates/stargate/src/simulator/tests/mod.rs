//! Tests for the simulator module.

use super::*;
use crate::geometry::{Cell, Rotation};
use std::path::PathBuf;

const GATE_CELL: Cell = Cell::new(20, 20);
const ADDRESS_A: Address = Address(100);
const ADDRESS_B: Address = Address(200);
const ADDRESS_C: Address = Address(300);

struct TwinWorld {
    kernel: GateKernel,
    host: InMemoryGateHost,
    a: EndpointId,
    b: EndpointId,
    region_a: RegionId,
    region_b: RegionId,
}

fn twin_world(seed: u64) -> TwinWorld {
    twin_world_with(GateConfig::default(), seed)
}

fn twin_world_with(config: GateConfig, seed: u64) -> TwinWorld {
    let mut host = InMemoryGateHost::new();
    let mut kernel = GateKernel::with_config(config, seed);
    let region_a = host.add_region(Some(ADDRESS_A), RegionSize::default());
    let region_b = host.add_region(Some(ADDRESS_B), RegionSize::default());
    let a = kernel
        .spawn_endpoint(GateSite::new(region_a, GATE_CELL, Rotation::South), &mut host)
        .expect("spawn gate A");
    let b = kernel
        .spawn_endpoint(GateSite::new(region_b, GATE_CELL, Rotation::North), &mut host)
        .expect("spawn gate B");
    TwinWorld {
        kernel,
        host,
        a,
        b,
        region_a,
        region_b,
    }
}

/// Dials B from A and ticks until the countdown has elapsed.
fn open_twin(world: &mut TwinWorld, delay: u64) {
    world
        .kernel
        .queue_open(world.a, ADDRESS_B, delay, &mut world.host)
        .expect("queue open");
    world.kernel.tick_n(delay, &mut world.host);
    assert!(world.kernel.is_active(world.a), "A should be active");
}

fn is_adjacent(cell: Cell, other: Cell) -> bool {
    (cell.x - other.x).abs() <= 1 && (cell.z - other.z).abs() <= 1
}

fn tick_until<F>(world: &mut TwinWorld, max_ticks: u64, mut done: F) -> Option<u64>
where
    F: FnMut(&GateKernel, &InMemoryGateHost) -> bool,
{
    for elapsed in 1..=max_ticks {
        world.kernel.tick(&mut world.host);
        if done(&world.kernel, &world.host) {
            return Some(elapsed);
        }
    }
    None
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("stargate-{name}-{}", std::process::id()));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).expect("clear temp dir");
    }
    dir
}

mod config;
mod designation;
mod idle;
mod transit;
mod vortex;
