//! Game driver tests: order gathering, season flow, sieges and the win check.

mod common;

use std::sync::Arc;
use std::time::Duration;

use bastion::board::{Board, Faction, Order, OrderKind, Season, Unit, UnitType};
use bastion::config::{BoardInfo, GameOptions};
use bastion::game::Game;

use common::{id, setup, ScriptedMessenger, SequenceDice};

fn new_game(board: Board, info: BoardInfo, messenger: &Arc<ScriptedMessenger>) -> Game {
    let options = GameOptions {
        order_timeout: Duration::from_secs(60),
        input_timeout: None,
    };
    Game::new(
        board,
        info,
        messenger.clone(),
        Arc::new(SequenceDice::constant(3)),
        options,
    )
}

/// A footman in every home region `faction` still controls: exactly its
/// builds in a winter where it has no units and no foreign nations.
fn home_builds(board: &Board, faction: &str) -> Vec<Order> {
    let faction = Faction::new(faction);
    board
        .ids()
        .filter(|&r| {
            let region = &board[r];
            region.home_faction.as_ref() == Some(&faction)
                && region.controlling_faction.as_ref() == Some(&faction)
        })
        .map(|r| Order::new(OrderKind::Build, UnitType::Footman, faction.clone(), r))
        .collect()
}

// === Order gathering ===

#[tokio::test]
async fn first_winter_builds_armies_and_moves_to_spring() {
    let (board, info) = setup();
    let messenger = Arc::new(ScriptedMessenger::default());
    let marrow = id(&board, "Marrow");
    messenger.queue_orders(
        "red",
        vec![Order::new(OrderKind::Build, UnitType::Footman, "red", marrow)],
    );
    for faction in ["red", "green", "yellow"] {
        messenger.queue_orders(faction, home_builds(&board, faction));
    }
    let mut game = new_game(board, info, &messenger);

    assert_eq!(game.play_round().await, None);

    assert_eq!(game.season, Season::Spring);
    assert_eq!(game.round, 1);
    for name in ["Redhold", "Greenkeep", "Saltmarsh"] {
        assert!(!game.board[id(&game.board, name)].is_empty(), "{name} is empty");
    }
    assert!(game.board[marrow].is_empty());

    let log = messenger.log();
    assert_eq!(log.errors.len(), 1);
    assert_eq!(log.errors[0].0, Faction::new("red"));
    let red_requests = log
        .order_requests
        .iter()
        .filter(|(f, _)| f == &Faction::new("red"))
        .count();
    assert_eq!(red_requests, 2);
    assert_eq!(log.confirmations.len(), 3);
    assert_eq!(log.orders_received.len(), 1);
    assert_eq!(log.orders_received[0].len(), 3);
    assert_eq!(log.cleared, 1);
}

#[tokio::test(start_paused = true)]
async fn silent_faction_submits_nothing_after_deadline() {
    let (board, info) = setup();
    let messenger = Arc::new(ScriptedMessenger::default());
    for faction in ["red", "green"] {
        messenger.queue_orders(faction, home_builds(&board, faction));
    }
    messenger.silence("yellow");
    let mut game = new_game(board, info, &messenger);

    assert_eq!(game.play_round().await, None);

    assert!(game.board[id(&game.board, "Yellowmoor")].is_empty());
    assert!(!game.board[id(&game.board, "Redhold")].is_empty());
    let log = messenger.log();
    assert!(!log.confirmations.contains(&Faction::new("yellow")));
    assert_eq!(log.orders_received[0][&Faction::new("yellow")], Vec::new());
}

// === Sieges and winning ===

#[tokio::test]
async fn two_sieges_take_a_castle_across_rounds() {
    let (mut board, info) = setup();
    let oldcastle = id(&board, "Oldcastle");
    board[oldcastle].unit = Some(Unit::new(UnitType::Catapult, "red"));
    let messenger = Arc::new(ScriptedMessenger::default());
    let besiege = Order::new(OrderKind::Besiege, UnitType::Catapult, "red", oldcastle);
    messenger.queue_orders("red", vec![besiege.clone()]);
    messenger.queue_orders("red", vec![besiege]);
    let mut game = new_game(board, info, &messenger);
    game.season = Season::Spring;

    assert_eq!(game.play_round().await, None);
    assert_eq!(game.board[oldcastle].siege_count, 1);
    assert_eq!(game.board[oldcastle].controlling_faction, None);

    assert_eq!(game.play_round().await, None);
    assert_eq!(game.board[oldcastle].siege_count, 0);
    assert_eq!(
        game.board[oldcastle].controlling_faction,
        Some(Faction::new("red"))
    );
    assert_eq!(game.season, Season::Fall);
}

#[tokio::test]
async fn game_ends_when_a_faction_holds_enough_castles() {
    let (mut board, info) = setup();
    let red = Faction::new("red");
    for name in ["Oldcastle", "Greenkeep"] {
        let castle = id(&board, name);
        board.set_controlling_faction(castle, Some(red.clone()));
    }
    let messenger = Arc::new(ScriptedMessenger::default());
    let mut game = new_game(board, info, &messenger);
    game.season = Season::Summer;

    assert_eq!(game.run().await, red);

    let log = messenger.log();
    assert_eq!(log.games_started, 1);
    assert_eq!(log.winners, vec![red]);
    assert_eq!(game.round, 1);
}

#[tokio::test]
async fn winter_never_decides_the_game() {
    let (mut board, info) = setup();
    let red = Faction::new("red");
    for name in ["Oldcastle", "Greenkeep"] {
        let castle = id(&board, name);
        board.set_controlling_faction(castle, Some(red.clone()));
    }
    let messenger = Arc::new(ScriptedMessenger::default());
    // Green lost Greenkeep, so it builds one unit fewer.
    for faction in ["red", "green", "yellow"] {
        messenger.queue_orders(faction, home_builds(&board, faction));
    }
    let mut game = new_game(board, info, &messenger);

    assert_eq!(game.play_round().await, None);
    assert_eq!(game.season, Season::Spring);
}
