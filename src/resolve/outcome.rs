//! Applying finished battles to the board.

use tracing::debug;

use crate::board::Board;

use super::battle::{Battle, Combatant};

/// Applies a battle's outcome. Dispatches on the battle's shape.
pub(crate) fn apply_battle(board: &mut Board, battle: &Battle) {
    if battle.is_border_battle() {
        apply_border(board, battle);
    } else if battle.results.len() == 1 {
        apply_singleplayer(board, battle);
    } else {
        apply_multiplayer(board, battle);
    }
}

/// A lone attacker against an unconquered region: win and move in, or go back.
fn apply_singleplayer(board: &mut Board, battle: &Battle) {
    let Some(order) = battle.results[0].order() else {
        return;
    };
    let (winners, _) = battle.winners_and_losers();
    if winners.len() == 1 {
        board.succeed_move(order);
    } else {
        board.retreat_move(order);
    }
}

/// Several attackers, possibly with a defender.
///
/// Losing attackers die. On a tie the tied attackers go back, and a defender
/// below the tie is removed. A defender beaten in a region nobody controls is
/// removed too; in a controlled region the winner's move replaces it. A winner
/// into an unconquered region must still conquer it in a later pass.
fn apply_multiplayer(board: &mut Board, battle: &Battle) {
    let (winners, losers) = battle.winners_and_losers();
    let tie = winners.len() > 1;
    let Some(&embattled) = battle.regions().first() else {
        return;
    };

    for result in &battle.results {
        match &result.combatant {
            Combatant::Defender(faction) => {
                if losers.contains(faction) && (tie || !board[embattled].is_controlled()) {
                    debug!(region = %board[embattled].name, "defender removed");
                    board[embattled].remove_unit();
                }
            }
            Combatant::Attacker(order) => {
                if losers.contains(&order.faction) {
                    board.kill_move(order);
                } else if tie {
                    board.retreat_move(order);
                } else if board[embattled].is_controlled() {
                    board.succeed_move(order);
                }
            }
        }
    }
}

/// Two moves into each other. The loser dies; the winner's move stays pending
/// and is settled in its destination. On a tie both go back.
fn apply_border(board: &mut Board, battle: &Battle) {
    let (winners, losers) = battle.winners_and_losers();
    let orders: Vec<_> = battle.results.iter().filter_map(|r| r.order()).collect();
    if winners.len() > 1 {
        for order in orders {
            board.retreat_move(order);
        }
        return;
    }
    for order in orders {
        if losers.contains(&order.faction) {
            board.kill_move(order);
        }
    }
}
