//! Battles, results and modifiers.
//!
//! A [`Battle`] holds one [`BattleResult`] per combatant. Each result sums its
//! modifiers into a running total; the highest total wins.

use std::fmt;

use serde::Serialize;

use crate::board::{DangerZone, Faction, Order, RegionId};

/// Total a lone attacker needs to conquer an unconquered region.
pub const MIN_TOTAL_TO_CONQUER: i32 = 4;

/// Total needed to survive crossing a danger zone.
pub const MIN_TOTAL_TO_CROSS_DANGER_ZONE: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ModifierKind {
    Dice,
    Unit,
    Forest,
    Castle,
    Water,
    Surprise,
    Support,
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One part of a combatant's total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Modifier {
    pub kind: ModifierKind,
    pub value: i32,
    /// Set only for `Support`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supporting_faction: Option<Faction>,
}

impl Modifier {
    pub fn new(kind: ModifierKind, value: i32) -> Self {
        Modifier {
            kind,
            value,
            supporting_faction: None,
        }
    }

    pub fn dice(value: i32) -> Self {
        Modifier::new(ModifierKind::Dice, value)
    }

    pub fn support(from: Faction, value: i32) -> Self {
        Modifier {
            kind: ModifierKind::Support,
            value,
            supporting_faction: Some(from),
        }
    }
}

/// Who a result belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Combatant {
    Attacker(Order),
    Defender(Faction),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BattleResult {
    pub total: i32,
    pub parts: Vec<Modifier>,
    pub combatant: Combatant,
}

impl BattleResult {
    pub fn new(combatant: Combatant) -> Self {
        BattleResult {
            total: 0,
            parts: Vec::new(),
            combatant,
        }
    }

    pub fn faction(&self) -> &Faction {
        match &self.combatant {
            Combatant::Attacker(order) => &order.faction,
            Combatant::Defender(faction) => faction,
        }
    }

    pub fn order(&self) -> Option<&Order> {
        match &self.combatant {
            Combatant::Attacker(order) => Some(order),
            Combatant::Defender(_) => None,
        }
    }

    pub fn add(&mut self, modifier: Modifier) {
        self.total += modifier.value;
        self.parts.push(modifier);
    }
}

/// A fight between one or more combatants, or a one-sided danger-zone crossing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Battle {
    pub results: Vec<BattleResult>,
    pub danger_zone: Option<DangerZone>,
}

impl Battle {
    pub fn new(results: Vec<BattleResult>) -> Self {
        Battle {
            results,
            danger_zone: None,
        }
    }

    /// A one-sided battle recording a danger-zone crossing.
    pub fn crossing(order: Order, danger_zone: DangerZone) -> Self {
        Battle {
            results: vec![BattleResult::new(Combatant::Attacker(order))],
            danger_zone: Some(danger_zone),
        }
    }

    /// Adds a modifier to `faction`'s result. Returns false if the faction is not fighting.
    pub fn add_modifier(&mut self, faction: &Faction, modifier: Modifier) -> bool {
        match self.results.iter_mut().find(|r| r.faction() == faction) {
            Some(result) => {
                result.add(modifier);
                true
            }
            None => false,
        }
    }

    pub fn is_fighting(&self, faction: &Faction) -> bool {
        self.results.iter().any(|r| r.faction() == faction)
    }

    pub fn factions(&self) -> Vec<Faction> {
        self.results.iter().map(|r| r.faction().clone()).collect()
    }

    pub fn is_crossing(&self) -> bool {
        self.danger_zone.is_some()
    }

    /// Two attackers whose moves target each other's origin.
    pub fn is_border_battle(&self) -> bool {
        match self.results.as_slice() {
            [a, b] => match (a.order(), b.order()) {
                (Some(a), Some(b)) => {
                    a.destination == Some(b.origin) && b.destination == Some(a.origin)
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Regions the battle was fought over: the destinations of its attackers.
    pub fn regions(&self) -> Vec<RegionId> {
        let mut regions: Vec<RegionId> = self
            .results
            .iter()
            .filter_map(|r| r.order().and_then(|o| o.destination))
            .collect();
        regions.dedup();
        regions
    }

    /// Splits combatants into winners and losers.
    ///
    /// A lone combatant wins with a total of at least [`MIN_TOTAL_TO_CONQUER`].
    /// Otherwise every combatant sharing the highest total is a winner; more
    /// than one winner means a tie.
    pub fn winners_and_losers(&self) -> (Vec<Faction>, Vec<Faction>) {
        if let [only] = self.results.as_slice() {
            let faction = only.faction().clone();
            return if only.total >= MIN_TOTAL_TO_CONQUER {
                (vec![faction], Vec::new())
            } else {
                (Vec::new(), vec![faction])
            };
        }

        let Some(highest) = self.results.iter().map(|r| r.total).max() else {
            return (Vec::new(), Vec::new());
        };
        let (winners, losers): (Vec<&BattleResult>, Vec<&BattleResult>) =
            self.results.iter().partition(|r| r.total == highest);
        (
            winners.into_iter().map(|r| r.faction().clone()).collect(),
            losers.into_iter().map(|r| r.faction().clone()).collect(),
        )
    }

    /// Whether a danger-zone crossing was survived.
    pub fn survived_crossing(&self) -> bool {
        self.results
            .first()
            .is_some_and(|r| r.total >= MIN_TOTAL_TO_CROSS_DANGER_ZONE)
    }
}
