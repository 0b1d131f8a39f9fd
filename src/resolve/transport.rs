//! Transport pathfinding through chains of allied ships.
//!
//! A land unit can move to a non-adjacent region if a chain of same-faction
//! ships, each under a transport order, links its origin to the destination.

use std::collections::HashSet;

use crate::board::{Board, DangerZone, Faction, Order, OrderKind, RegionId};

/// The best transport chain found for a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportPath {
    /// Some ship on the chain is under attack, so the chain may still break.
    pub attacked: bool,
    /// Danger zone between the last ship and the destination, if any.
    pub danger_zone: Option<DangerZone>,
}

impl TransportPath {
    /// Unattacked beats attacked; then no danger zone beats one. Ties keep `self`.
    fn better(self, other: TransportPath) -> TransportPath {
        let key = |p: &TransportPath| (p.attacked, p.danger_zone.is_some());
        if key(&other) < key(&self) {
            other
        } else {
            self
        }
    }
}

/// Finds the best transport chain carrying `order`'s unit to its destination.
///
/// Returns `None` for ships, for units at sea, and when no chain exists.
pub fn find_transport_path(board: &Board, order: &Order) -> Option<TransportPath> {
    let destination = order.destination?;
    if order.unit_type.is_ship() || board[order.origin].sea {
        return None;
    }
    let visited = HashSet::from([order.origin]);
    search(board, order.origin, destination, &order.faction, &visited)
}

fn search(
    board: &Board,
    from: RegionId,
    destination: RegionId,
    faction: &Faction,
    visited: &HashSet<RegionId>,
) -> Option<TransportPath> {
    let mut hops: Vec<RegionId> = Vec::new();
    for neighbor in &board[from].neighbors {
        let id = neighbor.region;
        if !visited.contains(&id) && !hops.contains(&id) && is_transport(board, id, faction) {
            hops.push(id);
        }
    }
    if hops.is_empty() {
        return None;
    }

    let mut visited = visited.clone();
    visited.extend(hops.iter().copied());

    let mut best: Option<TransportPath> = None;
    for hop in hops {
        let attacked = board[hop].is_attacked();
        let direct = board[hop]
            .safest_neighbor(destination)
            .map(|n| TransportPath {
                attacked,
                danger_zone: n.danger_zone.clone(),
            });
        let onward = search(board, hop, destination, faction, &visited).map(|next| TransportPath {
            attacked: attacked || next.attacked,
            danger_zone: next.danger_zone,
        });
        for candidate in direct.into_iter().chain(onward) {
            best = Some(match best {
                Some(current) => current.better(candidate),
                None => candidate,
            });
        }
    }
    best
}

fn is_transport(board: &Board, id: RegionId, faction: &Faction) -> bool {
    let region = &board[id];
    region.order().is_some_and(|o| o.kind == OrderKind::Transport)
        && region.unit.as_ref().is_some_and(|u| &u.faction == faction)
}
