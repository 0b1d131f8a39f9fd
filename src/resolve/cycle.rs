//! Move cycles and border battles.
//!
//! Two regions of different factions moving into each other fight a border
//! battle. Any other closed chain of moves is a cycle: its units are lifted
//! off the board so each move can land without fighting the unit that is
//! leaving its destination.

use std::collections::HashSet;

use tracing::debug;

use crate::board::{Board, Order, RegionId};

/// The region whose move targets `id` while `id`'s move targets it, if the
/// two moves belong to different factions.
pub fn border_partner(board: &Board, id: RegionId) -> Option<RegionId> {
    let own = board[id].order().filter(|o| o.is_move())?;
    let partner = own.destination?;
    let theirs = board[partner].order().filter(|o| o.is_move())?;
    (theirs.destination == Some(id) && theirs.faction != own.faction).then_some(partner)
}

/// Follows move orders from `start` and returns them if they lead back to `start`.
///
/// The moves are returned in chain order, beginning with `start`'s own move.
pub fn find_cycle(board: &Board, start: RegionId) -> Option<Vec<Order>> {
    let mut cycle = Vec::new();
    let mut visited = HashSet::new();
    let mut current = start;
    loop {
        if !visited.insert(current) {
            return None;
        }
        let order = board[current].order().filter(|o| o.is_move())?;
        let next = order.destination?;
        cycle.push(order.clone());
        if next == start {
            return Some(cycle);
        }
        current = next;
    }
}

/// Lifts every cycle member's unit and clears its order.
///
/// The moves stay registered on their destinations, which then resolve as
/// empty regions.
pub(crate) fn prepare_cycle(board: &mut Board, cycle: &[Order]) {
    for order in cycle {
        let region = &mut board[order.origin];
        region.remove_unit();
        region.round.order = None;
        region.round.part_of_cycle = true;
    }
    debug!(
        regions = ?cycle.iter().map(|o| board[o.origin].name.as_str()).collect::<Vec<_>>(),
        "move cycle found"
    );
}
