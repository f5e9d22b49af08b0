//! Clears actors out of the vortex footprint before a gate opens.

use log::{debug, warn};
use rand::Rng;
use std::collections::BTreeSet;

use crate::geometry::Cell;

use super::config::GateConfig;
use super::endpoint::GateEndpoint;
use super::host::{ActorView, EntityPlacement, GateFootprint, TaskQueue};
use super::types::EntityId;
use super::vortex::VortexHazard;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EvacuationReport {
    pub relocated: Vec<(EntityId, Cell)>,
    /// Actors left in place because no safe cell was found.
    pub stranded: Vec<EntityId>,
    pub hold_ticks: u64,
}

pub struct EvacuationPlanner<'a> {
    config: &'a GateConfig,
    vortex: VortexHazard,
    footprint: GateFootprint,
    behind: Cell,
    reserved: BTreeSet<Cell>,
}

impl<'a> EvacuationPlanner<'a> {
    pub fn new(endpoint: &GateEndpoint, config: &'a GateConfig) -> Self {
        Self {
            config,
            vortex: VortexHazard::for_endpoint(endpoint),
            footprint: endpoint.footprint(),
            behind: endpoint.behind_cell(),
            reserved: BTreeSet::new(),
        }
    }

    /// Hold duration covering the remaining countdown plus the unstable window.
    pub fn hold_ticks_for(countdown: u64, config: &GateConfig) -> u64 {
        config
            .evacuation_hold_floor
            .max(countdown.saturating_add(config.evacuation_hold_margin))
    }

    pub fn evacuate<H, R>(&mut self, hold_ticks: u64, host: &mut H, rng: &mut R) -> EvacuationReport
    where
        H: EntityPlacement + TaskQueue + ?Sized,
        R: Rng,
    {
        let mut report = EvacuationReport {
            hold_ticks,
            ..EvacuationReport::default()
        };
        let Some(bounds) = self.vortex.bounds() else {
            return report;
        };
        let zone = bounds.expanded_by(self.config.evacuation_margin.max(self.config.hazard_radius));

        let mut actors = host.actors_in_region(self.footprint.region);
        actors.sort_by_key(|actor| actor.entity);
        for actor in actors {
            if actor.hazard_immune {
                continue;
            }
            let near = zone.contains(actor.cell)
                || actor.next_step.is_some_and(|step| zone.contains(step));
            if !near || !self.in_danger(&actor) {
                continue;
            }
            match self.find_safe_cell(actor.cell, &*host, rng) {
                Some(cell) => {
                    self.reserved.insert(cell);
                    host.force_move_and_hold(actor.entity, cell, hold_ticks);
                    debug!(
                        "evacuating {} from {:?} to {:?} for {} ticks",
                        actor.entity, actor.cell, cell, hold_ticks
                    );
                    report.relocated.push((actor.entity, cell));
                }
                None => {
                    warn!(
                        "no safe cell for {} near {}, leaving it in place",
                        actor.entity, self.footprint.endpoint
                    );
                    report.stranded.push(actor.entity);
                }
            }
        }
        report
    }

    fn in_danger(&self, actor: &ActorView) -> bool {
        let radius = self.config.hazard_radius;
        if self.vortex.threatens(actor.cell, radius) {
            return true;
        }
        actor.next_step.is_some_and(|step| {
            self.vortex.threatens(step, radius) || self.reserved.contains(&step)
        })
    }

    fn is_safe<H>(&self, cell: Cell, host: &H) -> bool
    where
        H: EntityPlacement + ?Sized,
    {
        !self.reserved.contains(&cell)
            && !self.footprint.covers(cell)
            && !self.vortex.threatens(cell, self.config.hazard_radius)
            && host.is_walkable(self.footprint.region, cell)
    }

    fn find_safe_cell<H, R>(&self, origin: Cell, host: &H, rng: &mut R) -> Option<Cell>
    where
        H: EntityPlacement + ?Sized,
        R: Rng,
    {
        let radius = i32::try_from(self.config.evacuation_search_radius).unwrap_or(i32::MAX);
        for _ in 0..self.config.evacuation_search_attempts {
            let candidate = origin.offset(Cell::new(
                rng.random_range(-radius..=radius),
                rng.random_range(-radius..=radius),
            ));
            if self.is_safe(candidate, host) {
                return Some(candidate);
            }
        }
        if self.is_safe(self.behind, host) {
            return Some(self.behind);
        }
        None
    }
}
