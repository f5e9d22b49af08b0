//! Unstable vortex: the cell pattern that turns hazardous right after a gate opens.

use crate::geometry::{Cell, CellRect, Rotation};

use super::config::GateConfig;
use super::endpoint::GateEndpoint;
use super::host::HazardSink;

/// Pattern for a south-facing gate; the vortex extends out of the gate face.
const VORTEX_PATTERN: [Cell; 13] = [
    Cell::new(-1, -1),
    Cell::new(0, -1),
    Cell::new(1, -1),
    Cell::new(-1, -2),
    Cell::new(0, -2),
    Cell::new(1, -2),
    Cell::new(-1, -3),
    Cell::new(0, -3),
    Cell::new(1, -3),
    Cell::new(-1, -4),
    Cell::new(0, -4),
    Cell::new(1, -4),
    Cell::new(0, -5),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VortexHazard {
    cells: Vec<Cell>,
}

impl VortexHazard {
    pub fn new(position: Cell, rotation: Rotation) -> Self {
        Self {
            cells: VORTEX_PATTERN
                .iter()
                .map(|offset| position.offset(rotation.rotate(*offset)))
                .collect(),
        }
    }

    pub fn for_endpoint(endpoint: &GateEndpoint) -> Self {
        Self::new(endpoint.position(), endpoint.rotation())
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn bounds(&self) -> Option<CellRect> {
        CellRect::bounding(self.cells.iter().copied())
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// True if `cell` lies within `radius` of any hazard cell.
    pub fn threatens(&self, cell: Cell, radius: u32) -> bool {
        self.cells
            .iter()
            .any(|hazard| hazard.within_radius(cell, radius))
    }

    /// Whether the vortex fires on this tick of the connection.
    pub fn fires_at(ticks_since_opened: u64, config: &GateConfig) -> bool {
        ticks_since_opened < config.unstable_window_ticks
            && ticks_since_opened % config.hazard_interval_ticks == 0
    }

    /// Deals the area effect over every pattern cell, sparing the gate itself.
    pub fn strike<H>(&self, endpoint: &GateEndpoint, radius: u32, host: &mut H)
    where
        H: HazardSink + ?Sized,
    {
        for cell in &self.cells {
            host.apply_area_damage(endpoint.region(), *cell, radius, endpoint.id());
        }
    }
}
