//! Modifier calculation for attackers and defenders.
//!
//! Dice are not part of these builders; they are added once each faction
//! has rolled.

use crate::board::{Board, Order, RegionId};

use super::battle::{BattleResult, Combatant, Modifier, ModifierKind};

/// The shape of a battle, which decides which terrain penalties apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleKind {
    /// One attacker against an unconquered region.
    Singleplayer,
    /// Several attackers, or attackers against a defending unit.
    Multiplayer { with_defender: bool },
    /// Two moves targeting each other's origin.
    Border,
}

/// Modifiers for a move attacking its destination.
pub fn attack_result(board: &Board, order: &Order, kind: BattleKind) -> BattleResult {
    let mut result = BattleResult::new(Combatant::Attacker(order.clone()));
    let Some(destination) = order.destination else {
        return result;
    };
    let region = &board[destination];
    let neighbor = region.neighbor(order.origin, order.via_danger_zone.as_ref());

    if neighbor.is_some_and(|n| n.danger_zone.is_some()) {
        result.add(Modifier::new(ModifierKind::Surprise, 1));
    }

    let terrain = match kind {
        BattleKind::Singleplayer => !region.is_controlled(),
        BattleKind::Multiplayer { with_defender } => {
            region.is_controlled() && !region.is_empty() && with_defender
        }
        BattleKind::Border => false,
    };
    if terrain {
        if region.forest {
            result.add(Modifier::new(ModifierKind::Forest, -1));
        }
        if region.castle {
            result.add(Modifier::new(ModifierKind::Castle, -1));
        }
    }

    // Transported moves are never adjacent.
    if neighbor.map_or(true, |n| n.across_water) {
        result.add(Modifier::new(ModifierKind::Water, -1));
    }

    let bonus = order.unit_type.battle_bonus(region.castle);
    if bonus != 0 {
        result.add(Modifier::new(ModifierKind::Unit, bonus));
    }
    result
}

/// Modifiers for the unit holding `region`. `None` if the region is empty.
pub fn defense_result(board: &Board, region: RegionId) -> Option<BattleResult> {
    let unit = board[region].unit.as_ref()?;
    let mut result = BattleResult::new(Combatant::Defender(unit.faction.clone()));
    let bonus = unit.unit_type.battle_bonus(false);
    if bonus != 0 {
        result.add(Modifier::new(ModifierKind::Unit, bonus));
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Faction, OrderKind, Unit, UnitType};
    use crate::config::test_board;

    fn id(board: &Board, name: &str) -> RegionId {
        board.region_id(name).unwrap()
    }

    fn moving(board: &Board, unit: UnitType, from: &str, to: &str) -> Order {
        Order::new(OrderKind::Move, unit, "red", id(board, from)).with_destination(id(board, to))
    }

    fn kinds(result: &BattleResult) -> Vec<(ModifierKind, i32)> {
        result.parts.iter().map(|m| (m.kind, m.value)).collect()
    }

    #[test]
    fn footman_into_neutral_forest_takes_terrain_penalty() {
        let board = test_board();
        let order = moving(&board, UnitType::Footman, "Marrow", "Thornwood");
        let result = attack_result(&board, &order, BattleKind::Singleplayer);
        assert_eq!(
            kinds(&result),
            vec![(ModifierKind::Forest, -1), (ModifierKind::Unit, 1)]
        );
        assert_eq!(result.total, 0);
    }

    #[test]
    fn catapult_bonus_against_castle() {
        let board = test_board();
        let order = moving(&board, UnitType::Catapult, "Marrow", "Oldcastle");
        let result = attack_result(&board, &order, BattleKind::Singleplayer);
        assert_eq!(
            kinds(&result),
            vec![(ModifierKind::Castle, -1), (ModifierKind::Unit, 1)]
        );
    }

    #[test]
    fn danger_zone_via_hint_gives_surprise() {
        let board = test_board();
        let order = moving(&board, UnitType::Knight, "Marrow", "Thornwood").via("Hollow");
        let result = attack_result(&board, &order, BattleKind::Multiplayer { with_defender: false });
        assert_eq!(kinds(&result), vec![(ModifierKind::Surprise, 1)]);
    }

    #[test]
    fn river_crossing_takes_water_penalty() {
        let board = test_board();
        let order = moving(&board, UnitType::Knight, "Marrow", "Stonebridge");
        let result = attack_result(&board, &order, BattleKind::Border);
        assert_eq!(kinds(&result), vec![(ModifierKind::Water, -1)]);
    }

    #[test]
    fn transported_move_takes_water_penalty() {
        let board = test_board();
        let order = moving(&board, UnitType::Footman, "Brightwater", "Stonebridge");
        let result = attack_result(&board, &order, BattleKind::Singleplayer);
        assert!(kinds(&result).contains(&(ModifierKind::Water, -1)));
    }

    #[test]
    fn defended_controlled_castle_applies_terrain_in_multiplayer() {
        let mut board = test_board();
        board.place_unit(id(&board, "Greenkeep"), Unit::new(UnitType::Footman, "green"));
        let order = moving(&board, UnitType::Knight, "Oldcastle", "Greenkeep");

        let defended = attack_result(&board, &order, BattleKind::Multiplayer { with_defender: true });
        assert_eq!(kinds(&defended), vec![(ModifierKind::Castle, -1)]);

        let border = attack_result(&board, &order, BattleKind::Border);
        assert!(border.parts.is_empty());
    }

    #[test]
    fn defender_gets_unit_bonus_without_castle_bonus() {
        let mut board = test_board();
        let greenkeep = id(&board, "Greenkeep");
        assert!(defense_result(&board, greenkeep).is_none());

        board.place_unit(greenkeep, Unit::new(UnitType::Catapult, "green"));
        let result = defense_result(&board, greenkeep).unwrap();
        assert_eq!(result.faction(), &Faction::new("green"));
        assert!(result.parts.is_empty());

        board.place_unit(greenkeep, Unit::new(UnitType::Footman, "green"));
        assert_eq!(defense_result(&board, greenkeep).unwrap().total, 1);
    }
}
