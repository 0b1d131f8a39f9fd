//! Danger-zone crossings.
//!
//! Moves and supports that cross a danger zone roll one die before anything
//! else happens to them. The die is drawn when the crossing is prepared and
//! counted once the player has been asked to roll.

use tracing::debug;

use crate::board::{Board, DangerZone, Faction, Order, OrderKind};
use crate::dice::DiceRoller;

use super::battle::{Battle, Modifier};

/// The danger zone `order` crosses into its destination, if any.
///
/// Looked up from the destination's side, honoring the order's via hint.
pub fn crossing_for(board: &Board, order: &Order) -> Option<DangerZone> {
    let destination = order.destination?;
    board[destination]
        .neighbor(order.origin, order.via_danger_zone.as_ref())?
        .danger_zone
        .clone()
}

/// A crossing with its die drawn but not yet counted.
#[derive(Debug, Clone)]
pub(crate) struct PreparedCrossing {
    pub battle: Battle,
    pub roll: i32,
}

impl PreparedCrossing {
    pub fn new(order: Order, danger_zone: DangerZone, dice: &dyn DiceRoller) -> Self {
        PreparedCrossing {
            battle: Battle::crossing(order, danger_zone),
            roll: dice.roll(),
        }
    }

    pub fn faction(&self) -> &Faction {
        self.battle.results[0].faction()
    }

    /// Counts the die.
    pub fn finish(self) -> Battle {
        let PreparedCrossing { mut battle, roll } = self;
        let faction = battle.results[0].faction().clone();
        battle.add_modifier(&faction, Modifier::dice(roll));
        battle
    }
}

/// Applies a crossing: a failed move loses its unit, a failed support is dropped.
pub(crate) fn apply_crossing(board: &mut Board, battle: &Battle) {
    if battle.survived_crossing() {
        return;
    }
    let Some(order) = battle.results.first().and_then(|r| r.order()) else {
        return;
    };
    debug!(
        region = %board[order.origin].name,
        danger_zone = ?battle.danger_zone,
        "failed to cross danger zone"
    );
    match order.kind {
        OrderKind::Move => board.kill_move(order),
        _ => board.remove_order(order),
    }
}

/// Prepares a crossing for every placed support that crosses a danger zone.
pub(crate) fn support_crossings(board: &Board, dice: &dyn DiceRoller) -> Vec<PreparedCrossing> {
    board
        .regions()
        .filter_map(|r| r.order())
        .filter(|o| o.kind == OrderKind::Support)
        .filter_map(|support| {
            let danger_zone = crossing_for(board, support)?;
            Some(PreparedCrossing::new(support.clone(), danger_zone, dice))
        })
        .collect()
}
