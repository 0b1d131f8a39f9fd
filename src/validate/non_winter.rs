//! Checks for spring, summer and fall orders.

use crate::board::{Board, Faction, Order, OrderKind, RegionId, Season, UnitType};
use crate::error::OrderError;
use crate::resolve::find_transport_path;

use super::ordered_unit;

pub(super) fn check_order(
    order: &Order,
    faction: &Faction,
    board: &Board,
    season: Season,
) -> Result<(), OrderError> {
    if matches!(order.kind, OrderKind::Build | OrderKind::Disband) {
        return Err(OrderError::WrongSeason(order.kind, season));
    }
    let unit = ordered_unit(order, faction, board)?;
    let origin = &board[order.origin];

    match order.kind {
        OrderKind::Move | OrderKind::Support => {
            let destination = order
                .destination
                .ok_or(OrderError::MissingDestination(order.kind))?;
            if destination == order.origin {
                return Err(OrderError::DestinationIsOrigin(order.kind));
            }
            check_terrain(unit.unit_type, destination, board)?;
            if order.kind == OrderKind::Support {
                if !origin.is_adjacent_to(destination) {
                    return Err(OrderError::SupportNotAdjacent(board.name_of(destination)));
                }
            } else if let Some(second) = order.second_destination {
                check_second_destination(unit.unit_type, destination, second, board)?;
            }
        }
        OrderKind::Besiege => {
            if order.destination.is_some() {
                return Err(OrderError::UnexpectedDestination(order.kind));
            }
            if !origin.castle {
                return Err(OrderError::BesiegeWithoutCastle);
            }
            if origin.is_controlled() {
                return Err(OrderError::BesiegeControlled);
            }
            if unit.unit_type.is_ship() {
                return Err(OrderError::ShipBesiege);
            }
        }
        OrderKind::Transport => {
            if order.destination.is_some() {
                return Err(OrderError::UnexpectedDestination(order.kind));
            }
            if !unit.unit_type.is_ship() {
                return Err(OrderError::TransportNotShip);
            }
            if !origin.sea {
                return Err(OrderError::TransportNotAtSea);
            }
        }
        OrderKind::Build | OrderKind::Disband => {}
    }
    Ok(())
}

/// Ships stay on sea and coast; everything else stays on land.
fn check_terrain(unit_type: UnitType, destination: RegionId, board: &Board) -> Result<(), OrderError> {
    let to = &board[destination];
    if unit_type.is_ship() {
        if !to.sea && !board.is_coast(destination) {
            return Err(OrderError::ShipDestinationInland(to.name.clone()));
        }
    } else if to.sea {
        return Err(OrderError::LandUnitToSea(to.name.clone()));
    }
    Ok(())
}

fn check_second_destination(
    unit_type: UnitType,
    first: RegionId,
    second: RegionId,
    board: &Board,
) -> Result<(), OrderError> {
    if unit_type != UnitType::Knight {
        return Err(OrderError::SecondDestinationNotKnight);
    }
    if board[second].sea {
        return Err(OrderError::LandUnitToSea(board.name_of(second)));
    }
    if !board[first].is_adjacent_to(second) {
        return Err(OrderError::SecondDestinationNotAdjacent {
            first: board.name_of(first),
            second: board.name_of(second),
        });
    }
    Ok(())
}

/// Every move must reach its destination directly or through a transport
/// chain. Checked with the whole set placed, so ships ordered to transport in
/// the same submission count.
pub(super) fn check_reachable(orders: &[Order], board: &Board) -> Result<(), OrderError> {
    let mut scratch = board.clone();
    scratch.reset_round();
    scratch.place_orders(orders);

    for order in orders.iter().filter(|o| o.is_move()) {
        let Some(destination) = order.destination else {
            continue;
        };
        if scratch[order.origin].is_adjacent_to(destination)
            || find_transport_path(&scratch, order).is_some()
        {
            continue;
        }
        return Err(OrderError::Unreachable(scratch.name_of(destination))
            .in_region(scratch.name_of(order.origin)));
    }
    Ok(())
}
