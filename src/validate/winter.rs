//! Checks for winter builds, disbands and internal moves.

use crate::board::{Board, Faction, Order, OrderKind, Season};
use crate::error::OrderError;

use super::ordered_unit;

pub(super) fn check_order(
    order: &Order,
    orders: &[Order],
    faction: &Faction,
    board: &Board,
) -> Result<(), OrderError> {
    match order.kind {
        OrderKind::Build => check_build(order, faction, board),
        OrderKind::Disband => ordered_unit(order, faction, board).map(|_| ()),
        OrderKind::Move => check_move(order, orders, faction, board),
        kind => Err(OrderError::WrongSeason(kind, Season::Winter)),
    }
}

fn check_build(order: &Order, faction: &Faction, board: &Board) -> Result<(), OrderError> {
    let origin = &board[order.origin];
    if order.destination.is_some() {
        return Err(OrderError::UnexpectedDestination(order.kind));
    }
    if !origin.is_empty() {
        return Err(OrderError::BuildOccupied(origin.name.clone()));
    }
    if origin.controlling_faction.as_ref() != Some(faction) {
        return Err(OrderError::BuildNotControlled(origin.name.clone()));
    }
    if order.unit_type.is_ship() && !board.is_coast(order.origin) {
        return Err(OrderError::BuildShipInland(origin.name.clone()));
    }
    Ok(())
}

/// Internal moves stay within the faction's territory and need a destination
/// that is empty or being vacated by the same submission.
fn check_move(
    order: &Order,
    orders: &[Order],
    faction: &Faction,
    board: &Board,
) -> Result<(), OrderError> {
    let unit = ordered_unit(order, faction, board)?;
    let destination = order
        .destination
        .ok_or(OrderError::MissingDestination(order.kind))?;
    if destination == order.origin {
        return Err(OrderError::DestinationIsOrigin(order.kind));
    }
    if order.second_destination.is_some() {
        return Err(OrderError::SecondDestinationInWinter);
    }

    let to = &board[destination];
    if to.controlling_faction.as_ref() != Some(faction) {
        return Err(OrderError::WinterDestinationNotControlled(to.name.clone()));
    }
    if unit.unit_type.is_ship() && !board.is_coast(destination) {
        return Err(OrderError::WinterShipInland(to.name.clone()));
    }
    let vacated = orders.iter().any(|other| {
        other.origin == destination && matches!(other.kind, OrderKind::Move | OrderKind::Disband)
    });
    if !to.is_empty() && !vacated {
        return Err(OrderError::DestinationOccupied(to.name.clone()));
    }
    Ok(())
}

/// Builds minus disbands must bring the faction exactly to its unit cap.
pub(super) fn check_unit_count(
    orders: &[Order],
    faction: &Faction,
    board: &Board,
) -> Result<(), OrderError> {
    let (current, max) = board.unit_counts(faction);
    let expected = max as i64 - current as i64;
    let found: i64 = orders
        .iter()
        .map(|order| match order.kind {
            OrderKind::Build => 1,
            OrderKind::Disband => -1,
            _ => 0,
        })
        .sum();

    if found != expected {
        return Err(OrderError::WrongBuildCount { expected, found });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::board::{Board, Faction, Order, OrderKind, RegionId, Season, Unit, UnitType};
    use crate::config::test_board;
    use crate::error::OrderError;
    use crate::validate::validate_orders;

    fn id(board: &Board, name: &str) -> RegionId {
        board.region_id(name).unwrap()
    }

    fn build(board: &Board, name: &str, unit_type: UnitType) -> Order {
        Order::new(OrderKind::Build, unit_type, "red", id(board, name))
    }

    fn validate(board: &Board, orders: &[Order]) -> Result<(), OrderError> {
        validate_orders(orders, &Faction::new("red"), board, Season::Winter)
    }

    /// Red at its cap: three home regions, three units.
    fn full_board() -> Board {
        let mut board = test_board();
        for name in ["Redhold", "Ashford", "Brightwater"] {
            let at = id(&board, name);
            board.place_unit(at, Unit::new(UnitType::Footman, "red"));
        }
        board
    }

    // === Builds ===

    #[test]
    fn builds_fill_the_unit_cap_exactly() {
        let board = test_board();
        let all = [
            build(&board, "Redhold", UnitType::Footman),
            build(&board, "Ashford", UnitType::Knight),
            build(&board, "Brightwater", UnitType::Ship),
        ];
        assert_eq!(validate(&board, &all), Ok(()));
        assert_eq!(
            validate(&board, &all[..2]),
            Err(OrderError::WrongBuildCount {
                expected: 3,
                found: 2,
            })
        );
    }

    #[test]
    fn build_needs_empty_controlled_region() {
        let mut board = full_board();
        let redhold = build(&board, "Redhold", UnitType::Footman);
        assert_eq!(
            validate(&board, &[redhold]),
            Err(OrderError::BuildOccupied("Redhold".into()).in_region("Redhold"))
        );

        let marrow = build(&board, "Marrow", UnitType::Footman);
        assert_eq!(
            validate(&board, &[marrow]),
            Err(OrderError::BuildNotControlled("Marrow".into()).in_region("Marrow"))
        );

        let ashford = id(&board, "Ashford");
        board[ashford].unit = None;
        let ship = build(&board, "Ashford", UnitType::Ship);
        assert_eq!(
            validate(&board, &[ship]),
            Err(OrderError::BuildShipInland("Ashford".into()).in_region("Ashford"))
        );
    }

    #[test]
    fn disbands_bring_an_oversized_army_down() {
        let mut board = full_board();
        let marrow = id(&board, "Marrow");
        board[marrow].unit = Some(Unit::new(UnitType::Knight, "red"));

        let disband = Order::new(OrderKind::Disband, UnitType::Knight, "red", marrow);
        assert_eq!(validate(&board, &[disband]), Ok(()));
        assert_eq!(
            validate(&board, &[]),
            Err(OrderError::WrongBuildCount {
                expected: -1,
                found: 0,
            })
        );
    }

    // === Internal moves ===

    #[test]
    fn move_into_vacated_region() {
        let board = full_board();
        let (redhold, ashford, brightwater) = (
            id(&board, "Redhold"),
            id(&board, "Ashford"),
            id(&board, "Brightwater"),
        );
        let blocked = Order::new(OrderKind::Move, UnitType::Footman, "red", redhold)
            .with_destination(ashford);
        assert_eq!(
            validate(&board, &[blocked.clone()]),
            Err(OrderError::DestinationOccupied("Ashford".into()).in_region("Redhold"))
        );

        let onward = Order::new(OrderKind::Move, UnitType::Footman, "red", ashford)
            .with_destination(brightwater);
        let back = Order::new(OrderKind::Move, UnitType::Footman, "red", brightwater)
            .with_destination(redhold);
        assert_eq!(validate(&board, &[blocked, onward, back]), Ok(()));
    }

    #[test]
    fn move_in_place_is_rejected() {
        let board = full_board();
        let ashford = id(&board, "Ashford");
        let mv = Order::new(OrderKind::Move, UnitType::Footman, "red", ashford).with_destination(ashford);
        assert_eq!(
            validate(&board, &[mv]),
            Err(OrderError::DestinationIsOrigin(OrderKind::Move).in_region("Ashford"))
        );
    }

    #[test]
    fn move_stays_in_own_territory() {
        let board = full_board();
        let mv = Order::new(OrderKind::Move, UnitType::Footman, "red", id(&board, "Ashford"))
            .with_destination(id(&board, "Marrow"));
        assert_eq!(
            validate(&board, &[mv]),
            Err(OrderError::WinterDestinationNotControlled("Marrow".into()).in_region("Ashford"))
        );
    }

    #[test]
    fn combat_orders_are_not_allowed() {
        let board = full_board();
        let support = Order::new(OrderKind::Support, UnitType::Footman, "red", id(&board, "Redhold"))
            .with_destination(id(&board, "Ashford"));
        assert_eq!(
            validate(&board, &[support]),
            Err(OrderError::WrongSeason(OrderKind::Support, Season::Winter).in_region("Redhold"))
        );
    }
}
