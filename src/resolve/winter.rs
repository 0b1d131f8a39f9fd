//! Winter resolution: builds, disbands and internal moves.
//!
//! Winter orders never fight. Builds and disbands apply at once; a move waits
//! until its destination has been vacated, and closed chains of moves rotate
//! together.

use tracing::{debug, warn};

use crate::board::{Board, Order, OrderKind};

use super::cycle::{find_cycle, prepare_cycle};

/// Applies a winter's validated orders.
pub fn resolve_winter_orders(board: &mut Board, orders: &[Order]) {
    board.place_orders(orders);

    // Every pass settles at least one order, or nothing is left to settle.
    for _ in 0..=board.len() {
        let mut progressed = false;

        for id in board.ids().collect::<Vec<_>>() {
            let Some(order) = board[id].order().cloned() else {
                continue;
            };
            match order.kind {
                OrderKind::Build => {
                    debug!(region = %board[id].name, unit = %order.unit_type, "unit built");
                    board[id].replace_unit(order.unit());
                    board[id].round.order = None;
                    progressed = true;
                }
                OrderKind::Disband => {
                    debug!(region = %board[id].name, "unit disbanded");
                    board[id].remove_unit();
                    board[id].round.order = None;
                    progressed = true;
                }
                OrderKind::Move => {
                    if let Some(cycle) = find_cycle(board, id) {
                        prepare_cycle(board, &cycle);
                        progressed = true;
                    }
                }
                _ => {}
            }
        }

        for id in board.ids().collect::<Vec<_>>() {
            if board[id].order().is_some() {
                continue;
            }
            let Some(mv) = board[id].round.incoming_moves.first().cloned() else {
                continue;
            };
            board.succeed_move(&mv);
            progressed = true;
        }

        if !progressed {
            break;
        }
    }

    if board.regions().any(|r| r.order().is_some() || r.is_attacked()) {
        warn!("winter orders left unsettled");
    }
}
