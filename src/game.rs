//! The game driver.
//!
//! A [`Game`] runs rounds until a faction wins: it gathers every faction's
//! orders concurrently, resolves them, and advances the season. Winter rounds
//! build and reposition; the other three seasons fight.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info, warn};

use crate::board::{Board, Faction, Order, Season};
use crate::config::{BoardInfo, GameOptions};
use crate::dice::DiceRoller;
use crate::messenger::Messenger;
use crate::resolve::{check_winner, resolve_orders, resolve_sieges, resolve_winter_orders};
use crate::validate::validate_orders;

/// A running game: the board, whose turn of the year it is, and the players.
pub struct Game {
    pub info: BoardInfo,
    pub board: Board,
    pub season: Season,
    /// Rounds played so far.
    pub round: u32,
    messenger: Arc<dyn Messenger>,
    dice: Arc<dyn DiceRoller>,
    options: GameOptions,
}

impl Game {
    /// A new game, starting in winter so factions can build their first units.
    pub fn new(
        board: Board,
        info: BoardInfo,
        messenger: Arc<dyn Messenger>,
        dice: Arc<dyn DiceRoller>,
        options: GameOptions,
    ) -> Self {
        Game {
            info,
            board,
            season: Season::Winter,
            round: 0,
            messenger,
            dice,
            options,
        }
    }

    /// Plays rounds until a faction wins, then announces and returns it.
    pub async fn run(&mut self) -> Faction {
        info!(board = %self.info.name, factions = self.info.factions.len(), "game started");
        self.messenger.send_game_started(&self.board);

        loop {
            if let Some(winner) = self.play_round().await {
                info!(faction = %winner, rounds = self.round, "game won");
                self.messenger.send_winner(&winner);
                return winner;
            }
        }
    }

    /// Plays one round. Returns the winner if the round decided the game;
    /// otherwise the game moves on to the next season.
    pub async fn play_round(&mut self) -> Option<Faction> {
        self.round += 1;
        info!(round = self.round, season = %self.season, "round started");

        let orders: Vec<Order> = self.gather_orders().await.into_values().flatten().collect();

        if self.season == Season::Winter {
            resolve_winter_orders(&mut self.board, &orders);
        } else {
            let battles = resolve_orders(
                &mut self.board,
                &orders,
                Arc::clone(&self.messenger),
                self.dice.as_ref(),
                self.options.input_timeout,
            )
            .await;
            debug!(battles = battles.len(), "round resolved");

            resolve_sieges(&mut self.board);
            if let Some(winner) = check_winner(&self.board, &self.info) {
                return Some(winner);
            }
        }

        self.next_round();
        None
    }

    /// Collects a valid order set from every faction.
    ///
    /// Factions that miss the deadline or cannot be reached submit nothing.
    async fn gather_orders(&self) -> BTreeMap<Faction, Vec<Order>> {
        let deadline = Instant::now() + self.options.order_timeout;
        let board = Arc::new(self.board.clone());

        let mut tasks = JoinSet::new();
        for faction in &self.info.factions {
            let gatherer = OrderGatherer {
                faction: faction.clone(),
                board: Arc::clone(&board),
                season: self.season,
                messenger: Arc::clone(&self.messenger),
            };
            tasks.spawn(async move {
                let orders = match timeout_at(deadline, gatherer.gather()).await {
                    Ok(orders) => orders,
                    Err(_) => {
                        warn!(faction = %gatherer.faction, "order deadline passed, no orders submitted");
                        Vec::new()
                    }
                };
                (gatherer.faction, orders)
            });
        }

        let mut orders: BTreeMap<Faction, Vec<Order>> = self
            .info
            .factions
            .iter()
            .map(|faction| (faction.clone(), Vec::new()))
            .collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((faction, submitted)) => {
                    orders.insert(faction, submitted);
                }
                Err(err) => error!(error = %err, "order gathering task failed"),
            }
        }

        self.messenger.send_orders_received(&orders);
        orders
    }

    fn next_round(&mut self) {
        self.season = self.season.next();
        self.messenger.clear_messages();
        self.board.reset_round();
    }
}

/// Asks one faction for orders until it submits a valid set.
struct OrderGatherer {
    faction: Faction,
    board: Arc<Board>,
    season: Season,
    messenger: Arc<dyn Messenger>,
}

impl OrderGatherer {
    async fn gather(&self) -> Vec<Order> {
        loop {
            if let Err(err) = self.messenger.send_order_request(&self.faction, self.season) {
                warn!(faction = %self.faction, error = %err, "failed to request orders");
                return Vec::new();
            }

            let mut orders = match self.messenger.await_orders(&self.faction).await {
                Ok(orders) => orders,
                Err(err) => {
                    warn!(faction = %self.faction, error = %err, "failed to receive orders");
                    return Vec::new();
                }
            };
            for order in &mut orders {
                order.faction = self.faction.clone();
            }

            match validate_orders(&orders, &self.faction, &self.board, self.season) {
                Ok(()) => {
                    debug!(faction = %self.faction, orders = orders.len(), "orders accepted");
                    self.messenger.send_orders_confirmation(&self.faction);
                    return orders;
                }
                Err(err) => {
                    debug!(faction = %self.faction, error = %err, "orders rejected");
                    self.messenger.send_error(&self.faction, &err);
                }
            }
        }
    }
}
