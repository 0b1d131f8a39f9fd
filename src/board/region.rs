//! Regions, their neighbor relations, and per-round resolving state.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::order::Order;
use super::unit::{Faction, Unit};

/// Stable handle to a region in the board arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(u16);

impl RegionId {
    pub const fn new(index: u16) -> Self {
        RegionId(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Name of a hazardous border that must be crossed with a dice roll.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DangerZone(String);

impl DangerZone {
    pub fn new(name: impl Into<String>) -> Self {
        DangerZone(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DangerZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DangerZone {
    fn from(name: &str) -> Self {
        DangerZone::new(name)
    }
}

/// One side of an adjacency between two regions.
///
/// Two regions may be joined by several relations (e.g. an ordinary border and
/// a danger zone); each is its own `Neighbor` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Neighbor {
    pub region: RegionId,
    /// Moving from `region` into the owning region crosses a river or comes from the sea.
    pub across_water: bool,
    pub cliffs: bool,
    pub danger_zone: Option<DangerZone>,
}

/// A node of the board graph.
#[derive(Debug, Clone, Serialize)]
pub struct Region {
    pub name: String,
    pub neighbors: Vec<Neighbor>,
    pub sea: bool,
    pub forest: bool,
    pub castle: bool,
    pub nation: Option<String>,
    pub home_faction: Option<Faction>,
    pub unit: Option<Unit>,
    pub controlling_faction: Option<Faction>,
    pub siege_count: u8,
    #[serde(skip)]
    pub(crate) round: RoundState,
}

/// Transient state used while resolving one round. Reset between rounds.
#[derive(Debug, Clone, Default)]
pub(crate) struct RoundState {
    pub order: Option<Order>,
    pub incoming_moves: Vec<Order>,
    pub incoming_supports: Vec<Order>,
    /// Second legs of knight moves that have completed their first leg.
    pub incoming_second_legs: Vec<Order>,
    /// Second legs announced at placement that have not been settled yet.
    pub expected_second_legs: u8,
    pub transports_resolved: bool,
    pub danger_zones_resolved: bool,
    /// A battle or crossing involving this region is in flight.
    pub resolving: bool,
    pub resolved: bool,
    pub part_of_cycle: bool,
    pub pending_retreat: Option<Order>,
}

impl Region {
    /// Creates an empty, neutral land region with no neighbors.
    pub fn new(name: impl Into<String>) -> Self {
        Region {
            name: name.into(),
            neighbors: Vec::new(),
            sea: false,
            forest: false,
            castle: false,
            nation: None,
            home_faction: None,
            unit: None,
            controlling_faction: None,
            siege_count: 0,
            round: RoundState::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.unit.is_none()
    }

    pub fn is_controlled(&self) -> bool {
        self.controlling_faction.is_some()
    }

    /// Whether any move currently targets this region.
    pub fn is_attacked(&self) -> bool {
        !self.round.incoming_moves.is_empty()
    }

    /// This round's order for the unit in this region, if any.
    pub fn order(&self) -> Option<&Order> {
        self.round.order.as_ref()
    }

    pub fn is_adjacent_to(&self, region: RegionId) -> bool {
        self.neighbors.iter().any(|n| n.region == region)
    }

    /// Looks up the relation to `region`.
    ///
    /// The first matching relation wins, unless a later one carries the danger
    /// zone named by `via`.
    pub fn neighbor(&self, region: RegionId, via: Option<&DangerZone>) -> Option<&Neighbor> {
        let mut found: Option<&Neighbor> = None;
        for candidate in self.neighbors.iter().filter(|n| n.region == region) {
            match found {
                None => found = Some(candidate),
                Some(_) if via.is_some() && candidate.danger_zone.as_ref() == via => {
                    found = Some(candidate)
                }
                Some(_) => {}
            }
        }
        found
    }

    /// Looks up the relation to `region`, preferring one without a danger zone.
    pub fn safest_neighbor(&self, region: RegionId) -> Option<&Neighbor> {
        let mut matching = self.neighbors.iter().filter(|n| n.region == region);
        let first = matching.next()?;
        if first.danger_zone.is_none() {
            return Some(first);
        }
        Some(matching.find(|n| n.danger_zone.is_none()).unwrap_or(first))
    }

    /// Removes the unit. No-op inside a move cycle, whose units were already lifted.
    pub(crate) fn remove_unit(&mut self) {
        if self.round.part_of_cycle {
            return;
        }
        self.unit = None;
        self.siege_count = 0;
    }

    pub(crate) fn replace_unit(&mut self, unit: Unit) {
        self.unit = Some(unit);
        self.siege_count = 0;
    }
}
