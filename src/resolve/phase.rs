//! End-of-round bookkeeping: sieges and the win check.

use tracing::{debug, info};

use crate::board::{Board, Faction, OrderKind};
use crate::config::BoardInfo;

/// Sieges needed to take a castle without a fight.
pub const SIEGES_TO_CONQUER: u8 = 2;

/// Advances every siege that survived the round.
///
/// A unit still holding its besiege order adds one to the region's siege
/// count; at [`SIEGES_TO_CONQUER`] the region falls to the unit's faction.
pub fn resolve_sieges(board: &mut Board) {
    for id in board.ids().collect::<Vec<_>>() {
        let region = &mut board[id];
        let besieging = region
            .order()
            .is_some_and(|o| o.kind == OrderKind::Besiege);
        let Some(unit) = region.unit.clone().filter(|_| besieging) else {
            continue;
        };

        region.siege_count += 1;
        debug!(region = %region.name, sieges = region.siege_count, "siege continues");
        if region.siege_count >= SIEGES_TO_CONQUER {
            info!(region = %region.name, faction = %unit.faction, "castle taken by siege");
            region.controlling_faction = Some(unit.faction);
            region.siege_count = 0;
        }
    }
}

/// The faction holding more castles than the board's threshold and more than
/// any other faction, if there is one.
pub fn check_winner(board: &Board, info: &BoardInfo) -> Option<Faction> {
    let counts: Vec<(&Faction, usize)> = info
        .factions
        .iter()
        .map(|f| (f, board.castles_controlled_by(f)))
        .collect();
    let &(leader, most) = counts.iter().max_by_key(|(_, count)| *count)?;
    let unrivaled = counts
        .iter()
        .all(|&(faction, count)| faction == leader || count < most);
    (most > info.winning_castle_count && unrivaled).then(|| leader.clone())
}
