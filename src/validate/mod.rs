//! Order validation.
//!
//! A faction's submission is checked order by order against the board, then
//! as a set. The first failure is returned to the faction, wrapped with the
//! region of the order that caused it, and the faction is asked again.

mod non_winter;
mod winter;

use std::collections::HashSet;

use crate::board::{Board, Faction, Order, Season, Unit};
use crate::error::OrderError;

/// Checks one faction's orders for the given season.
///
/// `faction` is the submitting faction; every order is expected to carry it.
pub fn validate_orders(
    orders: &[Order],
    faction: &Faction,
    board: &Board,
    season: Season,
) -> Result<(), OrderError> {
    for order in orders {
        let origin = board
            .get(order.origin)
            .ok_or_else(|| OrderError::UnknownRegion(order.origin.to_string()))?;
        check_order(order, orders, faction, board, season)
            .map_err(|err| err.in_region(origin.name.as_str()))?;
    }

    check_order_set(orders, board)?;

    match season {
        Season::Winter => winter::check_unit_count(orders, faction, board),
        _ => non_winter::check_reachable(orders, board),
    }
}

fn check_order(
    order: &Order,
    orders: &[Order],
    faction: &Faction,
    board: &Board,
    season: Season,
) -> Result<(), OrderError> {
    if order.retreat {
        return Err(OrderError::RetreatSubmitted);
    }
    for id in [order.destination, order.second_destination].into_iter().flatten() {
        if board.get(id).is_none() {
            return Err(OrderError::UnknownRegion(id.to_string()));
        }
    }

    match season {
        Season::Winter => winter::check_order(order, orders, faction, board),
        _ => non_winter::check_order(order, faction, board, season),
    }
}

/// The unit the order commands, if it is there and matches the order.
fn ordered_unit<'a>(order: &Order, faction: &Faction, board: &'a Board) -> Result<&'a Unit, OrderError> {
    let unit = board[order.origin].unit.as_ref().ok_or(OrderError::NoUnit)?;
    if &unit.faction != faction {
        return Err(OrderError::WrongFaction {
            expected: faction.clone(),
            found: unit.faction.clone(),
        });
    }
    if unit.unit_type != order.unit_type {
        return Err(OrderError::WrongUnitType {
            ordered: order.unit_type,
            found: unit.unit_type,
        });
    }
    Ok(unit)
}

/// One order per region, and no two moves (second legs included) into the same region.
fn check_order_set(orders: &[Order], board: &Board) -> Result<(), OrderError> {
    let mut origins = HashSet::new();
    for order in orders {
        if !origins.insert(order.origin) {
            return Err(OrderError::OrderedTwice(board.name_of(order.origin)));
        }
    }

    let mut destinations = HashSet::new();
    for order in orders.iter().filter(|o| o.is_move()) {
        for id in [order.destination, order.second_destination].into_iter().flatten() {
            if !destinations.insert(id) {
                return Err(OrderError::DuplicateDestination(board.name_of(id)));
            }
        }
    }
    Ok(())
}
