//! Unit types and the factions that own them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A player-controlled side, identified by the tag used in the board configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Faction(String);

impl Faction {
    pub fn new(name: impl Into<String>) -> Self {
        Faction(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Faction {
    fn from(name: &str) -> Self {
        Faction::new(name)
    }
}

/// The kind of a unit on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    Footman,
    Knight,
    Ship,
    Catapult,
}

impl UnitType {
    /// Battle bonus this unit type contributes.
    ///
    /// Footmen always get +1. Catapults get +1 only when attacking a castle.
    pub const fn battle_bonus(self, attacking_castle: bool) -> i32 {
        match self {
            UnitType::Footman => 1,
            UnitType::Catapult if attacking_castle => 1,
            _ => 0,
        }
    }

    pub const fn is_ship(self) -> bool {
        matches!(self, UnitType::Ship)
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitType::Footman => "footman",
            UnitType::Knight => "knight",
            UnitType::Ship => "ship",
            UnitType::Catapult => "catapult",
        };
        f.write_str(name)
    }
}

/// A unit on the board: its type and owning faction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    pub unit_type: UnitType,
    pub faction: Faction,
}

impl Unit {
    pub fn new(unit_type: UnitType, faction: impl Into<Faction>) -> Self {
        Unit {
            unit_type,
            faction: faction.into(),
        }
    }
}

impl From<String> for Faction {
    fn from(name: String) -> Self {
        Faction(name)
    }
}
