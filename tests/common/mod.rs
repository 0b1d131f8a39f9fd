//! Shared fixtures for the scenario tests: the test board, a scripted
//! messenger that records everything sent to players, and rigged dice.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use bastion::board::{Board, Faction, Order, OrderKind, RegionId, Season, Unit, UnitType};
use bastion::config::{load_board, BoardInfo};
use bastion::dice::DiceRoller;
use bastion::error::MessageError;
use bastion::messenger::Messenger;
use bastion::resolve::Battle;

pub const TEST_BOARD_JSON: &str = include_str!("../fixtures/test_board.json");

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn setup() -> (Board, BoardInfo) {
    init_tracing();
    load_board("three-crowns", TEST_BOARD_JSON).expect("test board fixture must be valid")
}

pub fn id(board: &Board, name: &str) -> RegionId {
    board
        .region_id(name)
        .unwrap_or_else(|| panic!("no region named {name}"))
}

/// Places a unit and returns a move order for it.
pub fn move_order(
    board: &mut Board,
    faction: &str,
    unit_type: UnitType,
    from: &str,
    to: &str,
) -> Order {
    let origin = id(board, from);
    board.place_unit(origin, Unit::new(unit_type, faction));
    Order::new(OrderKind::Move, unit_type, faction, origin).with_destination(id(board, to))
}

/// Places a unit and returns an order of the given kind for it.
pub fn unit_order(
    board: &mut Board,
    faction: &str,
    unit_type: UnitType,
    kind: OrderKind,
    at: &str,
) -> Order {
    let origin = id(board, at);
    board.place_unit(origin, Unit::new(unit_type, faction));
    Order::new(kind, unit_type, faction, origin)
}

/// Dice that roll a fixed sequence, then a fallback value.
pub struct SequenceDice {
    rolls: Mutex<VecDeque<i32>>,
    fallback: i32,
}

impl SequenceDice {
    pub fn new(rolls: &[i32]) -> Self {
        SequenceDice {
            rolls: Mutex::new(rolls.iter().copied().collect()),
            fallback: 1,
        }
    }

    pub fn constant(value: i32) -> Self {
        SequenceDice {
            rolls: Mutex::new(VecDeque::new()),
            fallback: value,
        }
    }

    pub fn remaining(&self) -> usize {
        self.rolls.lock().unwrap().len()
    }
}

impl DiceRoller for SequenceDice {
    fn roll(&self) -> i32 {
        self.rolls.lock().unwrap().pop_front().unwrap_or(self.fallback)
    }
}

/// How a faction answers a support request.
#[derive(Debug, Clone)]
pub enum SupportAnswer {
    Back(Faction),
    Decline,
    /// Never answers.
    Hang,
}

/// Everything the engine told or asked the players.
#[derive(Debug, Default)]
pub struct Log {
    pub games_started: usize,
    pub order_requests: Vec<(Faction, Season)>,
    pub errors: Vec<(Faction, String)>,
    pub confirmations: Vec<Faction>,
    pub orders_received: Vec<BTreeMap<Faction, Vec<Order>>>,
    pub announcements: Vec<Battle>,
    pub results: Vec<Battle>,
    pub crossings: Vec<Battle>,
    pub dice_requests: Vec<Faction>,
    pub support_requests: Vec<(Faction, RegionId, Vec<Faction>)>,
    pub winners: Vec<Faction>,
    pub cleared: usize,
}

/// A messenger playing back queued player input.
///
/// Factions with no queued orders submit an empty set, unless silenced, in
/// which case they never answer. Support answers scripted for a region take
/// precedence over a faction's queue; unscripted requests are declined.
#[derive(Default)]
pub struct ScriptedMessenger {
    orders: Mutex<HashMap<Faction, VecDeque<Vec<Order>>>>,
    supports: Mutex<HashMap<Faction, VecDeque<SupportAnswer>>>,
    region_supports: Mutex<HashMap<(Faction, RegionId), SupportAnswer>>,
    silent: Mutex<HashSet<Faction>>,
    unreachable_dice: Mutex<HashSet<Faction>>,
    log: Mutex<Log>,
}

impl ScriptedMessenger {
    pub fn queue_orders(&self, faction: &str, orders: Vec<Order>) {
        self.orders
            .lock()
            .unwrap()
            .entry(Faction::new(faction))
            .or_default()
            .push_back(orders);
    }

    pub fn answer_support(&self, faction: &str, answer: SupportAnswer) {
        self.supports
            .lock()
            .unwrap()
            .entry(Faction::new(faction))
            .or_default()
            .push_back(answer);
    }

    pub fn answer_support_in(&self, faction: &str, region: RegionId, answer: SupportAnswer) {
        self.region_supports
            .lock()
            .unwrap()
            .insert((Faction::new(faction), region), answer);
    }

    /// Every dice roll request to `faction` fails as if it had disconnected.
    pub fn fail_dice(&self, faction: &str) {
        self.unreachable_dice
            .lock()
            .unwrap()
            .insert(Faction::new(faction));
    }

    pub fn silence(&self, faction: &str) {
        self.silent.lock().unwrap().insert(Faction::new(faction));
    }

    pub fn log(&self) -> MutexGuard<'_, Log> {
        self.log.lock().unwrap()
    }
}

#[async_trait]
impl Messenger for ScriptedMessenger {
    fn send_error(&self, to: &Faction, error: &(dyn std::error::Error + Send + Sync)) {
        self.log().errors.push((to.clone(), error.to_string()));
    }

    fn send_game_started(&self, _board: &Board) {
        self.log().games_started += 1;
    }

    fn send_order_request(&self, to: &Faction, season: Season) -> Result<(), MessageError> {
        self.log().order_requests.push((to.clone(), season));
        Ok(())
    }

    fn send_orders_received(&self, orders: &BTreeMap<Faction, Vec<Order>>) {
        self.log().orders_received.push(orders.clone());
    }

    fn send_orders_confirmation(&self, faction: &Faction) {
        self.log().confirmations.push(faction.clone());
    }

    fn send_battle_announcement(&self, battle: &Battle) {
        self.log().announcements.push(battle.clone());
    }

    fn send_battle_results(&self, battle: &Battle) {
        self.log().results.push(battle.clone());
    }

    fn send_danger_zone_crossings(&self, crossings: &[Battle]) {
        self.log().crossings.extend_from_slice(crossings);
    }

    fn send_winner(&self, winner: &Faction) {
        self.log().winners.push(winner.clone());
    }

    fn clear_messages(&self) {
        self.log().cleared += 1;
    }

    async fn await_orders(&self, from: &Faction) -> Result<Vec<Order>, MessageError> {
        let queued = self
            .orders
            .lock()
            .unwrap()
            .get_mut(from)
            .and_then(VecDeque::pop_front);
        if let Some(orders) = queued {
            return Ok(orders);
        }
        let silent = self.silent.lock().unwrap().contains(from);
        if silent {
            std::future::pending::<()>().await;
        }
        Ok(Vec::new())
    }

    async fn await_dice_roll(&self, from: &Faction) -> Result<(), MessageError> {
        self.log().dice_requests.push(from.clone());
        if self.unreachable_dice.lock().unwrap().contains(from) {
            return Err(MessageError::Disconnected(from.clone()));
        }
        Ok(())
    }

    async fn await_support(
        &self,
        from: &Faction,
        embattled: RegionId,
        supportable: &[Faction],
    ) -> Result<Option<Faction>, MessageError> {
        self.log()
            .support_requests
            .push((from.clone(), embattled, supportable.to_vec()));
        let scripted = self
            .region_supports
            .lock()
            .unwrap()
            .remove(&(from.clone(), embattled));
        let answer = scripted
            .or_else(|| {
                self.supports
                    .lock()
                    .unwrap()
                    .get_mut(from)
                    .and_then(VecDeque::pop_front)
            })
            .unwrap_or(SupportAnswer::Decline);
        match answer {
            SupportAnswer::Back(faction) => Ok(Some(faction)),
            SupportAnswer::Decline => Ok(None),
            SupportAnswer::Hang => {
                std::future::pending::<()>().await;
                Ok(None)
            }
        }
    }
}
