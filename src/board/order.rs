//! Orders submitted by factions each round.
//!
//! One order type covers every season: moves, supports, transports and
//! besieges during spring/summer/fall, builds, disbands and internal moves
//! during winter. Orders refer to regions by arena handle; translating
//! region names from the wire is the messenger's job.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::region::{DangerZone, RegionId};
use super::unit::{Faction, Unit, UnitType};

/// The kind of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    Move,
    Support,
    Transport,
    Besiege,
    Build,
    Disband,
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderKind::Move => "move",
            OrderKind::Support => "support",
            OrderKind::Transport => "transport",
            OrderKind::Besiege => "besiege",
            OrderKind::Build => "build",
            OrderKind::Disband => "disband",
        };
        f.write_str(name)
    }
}

/// An order for the unit in `origin` (or, for builds, the unit to place there).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    pub kind: OrderKind,
    pub unit_type: UnitType,
    /// Set by the server from the submitting player, never trusted from the wire.
    #[serde(default)]
    pub faction: Faction,
    pub origin: RegionId,
    #[serde(default)]
    pub destination: Option<RegionId>,
    /// Knight-only: the region to continue to after reaching `destination`.
    #[serde(default)]
    pub second_destination: Option<RegionId>,
    /// Picks a danger-zone relation when two regions share more than one border.
    #[serde(default)]
    pub via_danger_zone: Option<DangerZone>,
    /// Marks a move the server turned into a retreat. Illegal on submission.
    #[serde(default)]
    pub retreat: bool,
}

impl Order {
    pub fn new(
        kind: OrderKind,
        unit_type: UnitType,
        faction: impl Into<Faction>,
        origin: RegionId,
    ) -> Self {
        Order {
            kind,
            unit_type,
            faction: faction.into(),
            origin,
            destination: None,
            second_destination: None,
            via_danger_zone: None,
            retreat: false,
        }
    }

    pub fn with_destination(mut self, destination: RegionId) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn with_second_destination(mut self, second_destination: RegionId) -> Self {
        self.second_destination = Some(second_destination);
        self
    }

    pub fn via(mut self, danger_zone: impl Into<DangerZone>) -> Self {
        self.via_danger_zone = Some(danger_zone.into());
        self
    }

    /// The unit carrying out this order.
    pub fn unit(&self) -> Unit {
        Unit {
            unit_type: self.unit_type,
            faction: self.faction.clone(),
        }
    }

    pub fn is_move(&self) -> bool {
        self.kind == OrderKind::Move
    }

    pub fn has_second_leg(&self) -> bool {
        self.is_move() && self.second_destination.is_some()
    }

    /// The second leg of a knight move: from the first destination to the second.
    pub fn second_leg(&self) -> Option<Order> {
        if !self.is_move() {
            return None;
        }
        let (first, second) = (self.destination?, self.second_destination?);
        Some(Order {
            origin: first,
            destination: Some(second),
            second_destination: None,
            via_danger_zone: None,
            ..self.clone()
        })
    }
}
