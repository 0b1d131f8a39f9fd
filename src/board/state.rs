//! The board arena and the order state transitions applied during resolution.
//!
//! Regions are stored in a `Vec` and addressed by [`RegionId`]. Only the task
//! resolving a round mutates the board; battle tasks work on snapshots and
//! report back through a channel.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::order::{Order, OrderKind};
use super::region::{Region, RegionId};
use super::unit::{Faction, Unit, UnitType};

/// Season of the year. Winter is for builds and internal moves; the others for combat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub const fn next(self) -> Season {
        match self {
            Season::Winter => Season::Spring,
            Season::Spring => Season::Summer,
            Season::Summer => Season::Fall,
            Season::Fall => Season::Winter,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
        };
        f.write_str(name)
    }
}

/// The full board: every region plus a name index.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Board {
    regions: Vec<Region>,
    #[serde(skip)]
    by_name: HashMap<String, RegionId>,
}

impl Board {
    /// Builds a board from regions whose neighbor handles index into `regions`.
    pub fn new(regions: Vec<Region>) -> Self {
        let by_name = regions
            .iter()
            .enumerate()
            .map(|(i, region)| (region.name.clone(), RegionId::new(i as u16)))
            .collect();
        Board { regions, by_name }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = RegionId> {
        (0..self.regions.len() as u16).map(RegionId::new)
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.index())
    }

    pub fn region_id(&self, name: &str) -> Option<RegionId> {
        self.by_name.get(name).copied()
    }

    pub fn region_by_name(&self, name: &str) -> Option<&Region> {
        self.region_id(name).map(|id| &self[id])
    }

    /// Name of a region, or its handle if it is not on the board.
    pub fn name_of(&self, id: RegionId) -> String {
        self.get(id)
            .map(|region| region.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// A land region bordering at least one sea.
    pub fn is_coast(&self, id: RegionId) -> bool {
        let region = &self[id];
        !region.sea && region.neighbors.iter().any(|n| self[n.region].sea)
    }

    /// Puts a unit in a region, taking control of land regions. For game setup.
    pub fn place_unit(&mut self, id: RegionId, unit: Unit) {
        let region = &mut self[id];
        if !region.sea {
            region.controlling_faction = Some(unit.faction.clone());
        }
        region.unit = Some(unit);
    }

    pub fn set_controlling_faction(&mut self, id: RegionId, faction: Option<Faction>) {
        self[id].controlling_faction = faction;
    }

    pub fn castles_controlled_by(&self, faction: &Faction) -> usize {
        self.regions
            .iter()
            .filter(|r| r.castle && r.controlling_faction.as_ref() == Some(faction))
            .count()
    }

    /// Current unit count and the maximum the faction may field.
    ///
    /// The maximum is the number of controlled home regions, plus one per
    /// foreign or neutral nation whose regions the faction fully controls.
    pub fn unit_counts(&self, faction: &Faction) -> (usize, usize) {
        let units = self
            .regions
            .iter()
            .filter(|r| r.unit.as_ref().is_some_and(|u| &u.faction == faction))
            .count();

        let mut home_regions = 0;
        let mut nations: BTreeMap<&str, bool> = BTreeMap::new();
        for region in &self.regions {
            let controlled = region.controlling_faction.as_ref() == Some(faction);
            if region.home_faction.as_ref() == Some(faction) {
                if controlled {
                    home_regions += 1;
                }
                continue;
            }
            if let Some(nation) = region.nation.as_deref() {
                *nations.entry(nation).or_insert(true) &= controlled;
            }
        }
        let nations = nations.values().filter(|&&all| all).count();
        (units, home_regions + nations)
    }

    /// Clears all per-round state.
    pub fn reset_round(&mut self) {
        for region in &mut self.regions {
            region.round = Default::default();
        }
    }

    /// Whether every region has been finalized.
    pub(crate) fn all_resolved(&self) -> bool {
        self.regions.iter().all(|r| {
            r.round.resolved && !r.round.resolving && r.round.pending_retreat.is_none()
        })
    }

    /// Places a round's orders. Supports from attacked regions are cut and never placed.
    pub(crate) fn place_orders(&mut self, orders: &[Order]) {
        for order in orders.iter().filter(|o| o.kind != OrderKind::Support) {
            self.place_order(order.clone());
        }
        for order in orders.iter().filter(|o| o.kind == OrderKind::Support) {
            if self[order.origin].is_attacked() {
                debug!(region = %self[order.origin].name, "support cut by attack on its origin");
                continue;
            }
            self.place_order(order.clone());
        }
    }

    fn place_order(&mut self, order: Order) {
        match (order.kind, order.destination) {
            (OrderKind::Move, Some(destination)) => {
                if let Some(second) = order.second_destination {
                    self[second].round.expected_second_legs += 1;
                }
                self[destination].round.incoming_moves.push(order.clone());
            }
            (OrderKind::Support, Some(destination)) => {
                self[destination].round.incoming_supports.push(order.clone());
            }
            _ => {}
        }
        let origin = order.origin;
        self[origin].round.order = Some(order);
    }

    /// Detaches an order from its origin and destination.
    pub(crate) fn remove_order(&mut self, order: &Order) {
        let origin = &mut self[order.origin].round;
        if origin.order.as_ref() == Some(order) {
            origin.order = None;
        }
        if let Some(destination) = order.destination {
            let round = &mut self[destination].round;
            match order.kind {
                OrderKind::Move => round.incoming_moves.retain(|o| o != order),
                OrderKind::Support => round.incoming_supports.retain(|o| o != order),
                _ => {}
            }
        }
    }

    /// Relocates the moving unit and takes control of the destination where allowed.
    pub(crate) fn succeed_move(&mut self, order: &Order) {
        let Some(destination) = order.destination else {
            return;
        };
        let unit = order.unit();
        let origin = &mut self[order.origin];
        if origin.unit.as_ref() == Some(&unit) {
            origin.remove_unit();
        }

        let target = &mut self[destination];
        target.replace_unit(unit);
        target.round.order = None;
        let catapult = order.unit_type == UnitType::Catapult;
        if !target.sea && (!target.castle || target.is_controlled() || catapult) {
            target.controlling_faction = Some(order.faction.clone());
        }
        debug!(from = %self[order.origin].name, to = %self[destination].name, "move succeeded");

        self.remove_order(order);
        if let Some(leg) = order.second_leg() {
            if let Some(second) = leg.destination {
                self[second].round.incoming_second_legs.push(leg);
            }
        }
    }

    /// Destroys the moving unit and discards the order.
    pub(crate) fn kill_move(&mut self, order: &Order) {
        self.remove_order(order);
        self.settle_second_leg(order);
        let origin = &mut self[order.origin];
        if origin.unit.as_ref() == Some(&order.unit()) {
            origin.remove_unit();
        }
        debug!(region = %self[order.origin].name, "moving unit destroyed");
    }

    /// Sends the moving unit back to its origin.
    ///
    /// A unit that never left stays put. If the origin is attacked or part of a
    /// cycle, the retreat is parked until the region settles.
    pub(crate) fn retreat_move(&mut self, order: &Order) {
        self.remove_order(order);
        self.settle_second_leg(order);

        let unit = order.unit();
        let origin = &mut self[order.origin];
        if !origin.round.part_of_cycle && origin.unit.as_ref() == Some(&unit) {
            return;
        }
        if origin.is_attacked() || origin.round.part_of_cycle {
            origin.round.pending_retreat = Some(Order {
                retreat: true,
                ..order.clone()
            });
            return;
        }
        if origin.is_empty() {
            origin.replace_unit(unit);
        } else {
            debug!(region = %origin.name, "retreating unit lost, origin occupied");
        }
    }

    /// Applies a parked retreat to a region that is no longer attacked.
    pub(crate) fn resolve_pending_retreat(&mut self, id: RegionId) {
        let region = &mut self[id];
        let Some(retreat) = region.round.pending_retreat.take() else {
            return;
        };
        if region.is_empty() {
            region.replace_unit(retreat.unit());
        } else {
            debug!(region = %region.name, "retreating unit lost, origin occupied");
        }
    }

    /// Arms a region with the knight second legs that have arrived.
    ///
    /// A pending support from the region is cut, as the region is now attacked.
    pub(crate) fn place_second_legs(&mut self, id: RegionId) {
        if let Some(order) = self[id].round.order.clone() {
            if order.kind == OrderKind::Support {
                debug!(region = %self[id].name, "support cut by knight move");
                self.remove_order(&order);
            }
        }

        let round = &mut self[id].round;
        let legs = std::mem::take(&mut round.incoming_second_legs);
        round.expected_second_legs = 0;
        round.transports_resolved = false;
        round.danger_zones_resolved = false;
        round.part_of_cycle = false;
        for leg in legs {
            self[leg.origin].round.order = Some(leg.clone());
            self[id].round.incoming_moves.push(leg);
        }
    }

    /// A knight's first leg failed: its second destination should stop waiting for it.
    fn settle_second_leg(&mut self, order: &Order) {
        if !order.has_second_leg() {
            return;
        }
        if let Some(second) = order.second_destination {
            let expected = &mut self[second].round.expected_second_legs;
            *expected = expected.saturating_sub(1);
        }
    }
}

impl Index<RegionId> for Board {
    type Output = Region;

    fn index(&self, id: RegionId) -> &Region {
        &self.regions[id.index()]
    }
}

impl IndexMut<RegionId> for Board {
    fn index_mut(&mut self, id: RegionId) -> &mut Region {
        &mut self.regions[id.index()]
    }
}
