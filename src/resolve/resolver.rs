//! The round resolution loop.
//!
//! The resolver owns the board for the duration of a round. It repeatedly
//! scans every region and settles what it can: transports first, then danger
//! zones, then the region's own battles. Battles and crossings wait on player
//! input, so they are spawned as tasks and report back on a channel; the
//! resolver applies their results as they arrive and blocks only when nothing
//! else can move.
//!
//! When nothing is in flight and no region can progress, the loop is stuck on
//! a dependency (a transport waiting on its own attacker, or moves waiting on
//! each other). One forced pass then breaks the first such wait.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::board::{Board, DangerZone, Order, RegionId};
use crate::dice::DiceRoller;
use crate::messenger::Messenger;

use super::battle::{Battle, BattleResult};
use super::combat::{PreparedBattle, Solicitor};
use super::cycle::{border_partner, find_cycle, prepare_cycle};
use super::danger_zone::{apply_crossing, crossing_for, support_crossings, PreparedCrossing};
use super::modifier::{attack_result, defense_result, BattleKind};
use super::outcome::apply_battle;
use super::transport::find_transport_path;

/// Resolves a spring, summer or fall round of placed orders.
///
/// Returns every battle and danger-zone crossing of the round, in the order
/// they were settled.
pub async fn resolve_orders(
    board: &mut Board,
    orders: &[Order],
    messenger: Arc<dyn Messenger>,
    dice: &dyn DiceRoller,
    input_timeout: Option<Duration>,
) -> Vec<Battle> {
    board.place_orders(orders);
    Resolver::new(board, messenger, dice, input_timeout).run().await
}

/// Finished work reported by a spawned task.
enum Settled {
    Battle(Battle),
    /// Every crossing into one region.
    Crossings(RegionId, Vec<Battle>),
}

struct Resolver<'a> {
    board: &'a mut Board,
    messenger: Arc<dyn Messenger>,
    solicitor: Solicitor,
    dice: &'a dyn DiceRoller,
    results_tx: mpsc::Sender<Settled>,
    results_rx: mpsc::Receiver<Settled>,
    /// Dropping the set aborts battles still waiting on players.
    tasks: JoinSet<()>,
    in_flight: usize,
    battles: Vec<Battle>,
}

impl<'a> Resolver<'a> {
    fn new(
        board: &'a mut Board,
        messenger: Arc<dyn Messenger>,
        dice: &'a dyn DiceRoller,
        input_timeout: Option<Duration>,
    ) -> Self {
        let (results_tx, results_rx) = mpsc::channel(1);
        Resolver {
            board,
            solicitor: Solicitor::new(Arc::clone(&messenger), input_timeout),
            messenger,
            dice,
            results_tx,
            results_rx,
            tasks: JoinSet::new(),
            in_flight: 0,
            battles: Vec::new(),
        }
    }

    async fn run(mut self) -> Vec<Battle> {
        // Support crossings settle before any battle can count the support.
        let crossings = support_crossings(self.board, self.dice);
        if !crossings.is_empty() {
            self.announce_crossings(&crossings);
            let crossed = self.solicitor.cross(crossings).await;
            self.apply_crossings(crossed);
        }

        loop {
            while let Ok(settled) = self.results_rx.try_recv() {
                self.apply(settled);
            }
            if self.is_settled() {
                break;
            }
            if self.scan(false) {
                continue;
            }
            if self.in_flight > 0 {
                match self.results_rx.recv().await {
                    Some(settled) => self.apply(settled),
                    None => break,
                }
                continue;
            }
            if self.scan(true) {
                continue;
            }
            error!(
                unresolved = self.board.regions().filter(|r| !r.round.resolved).count(),
                "resolution cannot progress, leaving regions unresolved"
            );
            break;
        }
        self.battles
    }

    fn is_settled(&self) -> bool {
        self.in_flight == 0 && self.board.all_resolved()
    }

    /// One pass over the board. A forced pass stops at the first region it moves.
    fn scan(&mut self, force: bool) -> bool {
        let mut progressed = false;
        for id in self.board.ids().collect::<Vec<_>>() {
            if self.resolve_region(id, force) {
                progressed = true;
                if force {
                    break;
                }
            }
        }
        progressed
    }

    fn resolve_region(&mut self, id: RegionId, force: bool) -> bool {
        let round = &self.board[id].round;
        if round.resolving || (round.resolved && round.pending_retreat.is_none()) {
            return false;
        }
        let mut progressed = false;
        let mut crossings: Vec<(Order, DangerZone)> = Vec::new();

        if !self.board[id].round.transports_resolved {
            let transported: Vec<Order> = self.board[id]
                .round
                .incoming_moves
                .iter()
                .filter(|mv| !self.board[mv.origin].is_adjacent_to(id))
                .cloned()
                .collect();
            let mut waiting = false;
            for mv in &transported {
                match find_transport_path(self.board, mv) {
                    None => {
                        debug!(region = %self.board[mv.origin].name, "transport path lost");
                        self.board.retreat_move(mv);
                        progressed = true;
                    }
                    Some(path) if path.attacked && !force => waiting = true,
                    Some(path) => {
                        if path.attacked {
                            warn!(region = %self.board[id].name, "forcing transport past attacked ship");
                        }
                        crossings.extend(path.danger_zone.map(|dz| (mv.clone(), dz)));
                    }
                }
            }
            if waiting {
                return progressed;
            }
            self.board[id].round.transports_resolved = true;
            progressed = true;
        }

        if !self.board[id].round.danger_zones_resolved {
            let board: &Board = self.board;
            crossings.extend(
                board[id]
                    .round
                    .incoming_moves
                    .iter()
                    .filter_map(|mv| crossing_for(board, mv).map(|dz| (mv.clone(), dz))),
            );
            self.board[id].round.danger_zones_resolved = true;
            progressed = true;
        }

        if !crossings.is_empty() {
            let batch: Vec<PreparedCrossing> = crossings
                .into_iter()
                .map(|(mv, dz)| PreparedCrossing::new(mv, dz, self.dice))
                .collect();
            self.dispatch_crossings(id, batch);
            return true;
        }

        if !self.board[id].is_attacked() {
            return self.settle_unattacked(id) || progressed;
        }

        if let Some(partner) = border_partner(self.board, id) {
            let theirs = &self.board[partner].round;
            if theirs.resolving || !theirs.transports_resolved || !theirs.danger_zones_resolved {
                return progressed;
            }
            if !force && (self.supports_await_knight(id) || self.supports_await_knight(partner)) {
                return progressed;
            }
            self.dispatch_border_battle(id, partner);
            return true;
        }

        if let Some(cycle) = find_cycle(self.board, id) {
            prepare_cycle(self.board, &cycle);
            return true;
        }

        let region = &self.board[id];
        if let ([mv], true) = (region.round.incoming_moves.as_slice(), region.is_empty()) {
            let mv = mv.clone();
            if region.is_controlled() || region.sea {
                self.board.succeed_move(&mv);
            } else {
                if !force && self.supports_await_knight(id) {
                    return progressed;
                }
                let result = attack_result(self.board, &mv, BattleKind::Singleplayer);
                self.dispatch(vec![result]);
            }
            return true;
        }

        if let Some(own) = region.order().filter(|o| o.is_move()).cloned() {
            if !force {
                return progressed;
            }
            warn!(region = %region.name, "moves wait on each other, bouncing the defender's own move");
            self.board.retreat_move(&own);
            return true;
        }

        if !force && self.supports_await_knight(id) {
            return progressed;
        }
        self.dispatch_multiplayer_battle(id);
        true
    }

    /// Whether a support into `id` comes from a region a knight's second leg
    /// has yet to reach. Such a support may still be cut.
    fn supports_await_knight(&self, id: RegionId) -> bool {
        self.board[id]
            .round
            .incoming_supports
            .iter()
            .any(|support| self.board[support.origin].round.expected_second_legs > 0)
    }

    /// Finalizes a region nobody attacks: returns parked retreats and arms
    /// knight second legs once they have all arrived.
    fn settle_unattacked(&mut self, id: RegionId) -> bool {
        let mut progressed = false;
        if self.board[id].round.pending_retreat.is_some() {
            self.board.resolve_pending_retreat(id);
            progressed = true;
        }
        let round = &mut self.board[id].round;
        if round.expected_second_legs == 0 {
            if !round.resolved {
                round.resolved = true;
                progressed = true;
            }
        } else if round.incoming_second_legs.len() >= usize::from(round.expected_second_legs) {
            self.board.place_second_legs(id);
            progressed = true;
        }
        progressed
    }

    fn dispatch_border_battle(&mut self, id: RegionId, partner: RegionId) {
        let (Some(ours), Some(theirs)) = (
            self.board[id].order().cloned(),
            self.board[partner].order().cloned(),
        ) else {
            return;
        };
        let results = vec![
            attack_result(self.board, &ours, BattleKind::Border),
            attack_result(self.board, &theirs, BattleKind::Border),
        ];
        self.dispatch(results);
    }

    fn dispatch_multiplayer_battle(&mut self, id: RegionId) {
        if let Some(defender) = self.board[id].unit.clone() {
            let bounced: Vec<Order> = self.board[id]
                .round
                .incoming_moves
                .iter()
                .filter(|mv| mv.faction == defender.faction)
                .cloned()
                .collect();
            for mv in &bounced {
                debug!(region = %self.board[id].name, "move into own faction's unit bounced");
                self.board.retreat_move(mv);
            }
            if !self.board[id].is_attacked() {
                return;
            }
        }

        let with_defender = !self.board[id].is_empty();
        let kind = BattleKind::Multiplayer { with_defender };
        let mut results: Vec<BattleResult> = self.board[id]
            .round
            .incoming_moves
            .iter()
            .map(|mv| attack_result(self.board, mv, kind))
            .collect();
        results.extend(defense_result(self.board, id));
        self.dispatch(results);
    }

    /// Spawns a battle task and marks its regions as resolving.
    fn dispatch(&mut self, results: Vec<BattleResult>) {
        let prepared = PreparedBattle::new(self.board, results, self.dice);
        let regions = prepared.battle.regions();
        for &region in &regions {
            self.board[region].round.resolving = true;
        }
        debug!(
            regions = ?regions.iter().map(|&r| self.board[r].name.as_str()).collect::<Vec<_>>(),
            combatants = prepared.battle.results.len(),
            "battle started"
        );
        self.messenger.send_battle_announcement(&prepared.battle);

        let solicitor = self.solicitor.clone();
        let results_tx = self.results_tx.clone();
        self.tasks.spawn(async move {
            let battle = solicitor.fight(prepared).await;
            if results_tx.send(Settled::Battle(battle)).await.is_err() {
                warn!("round ended before battle result was delivered");
            }
        });
        self.in_flight += 1;
    }

    /// Spawns the crossings into `id`. The region waits until all of them are back.
    fn dispatch_crossings(&mut self, id: RegionId, crossings: Vec<PreparedCrossing>) {
        self.board[id].round.resolving = true;
        debug!(region = %self.board[id].name, crossings = crossings.len(), "danger zone crossings started");
        self.announce_crossings(&crossings);

        let solicitor = self.solicitor.clone();
        let results_tx = self.results_tx.clone();
        self.tasks.spawn(async move {
            let crossed = solicitor.cross(crossings).await;
            if results_tx.send(Settled::Crossings(id, crossed)).await.is_err() {
                warn!("round ended before crossing results were delivered");
            }
        });
        self.in_flight += 1;
    }

    fn announce_crossings(&self, crossings: &[PreparedCrossing]) {
        for crossing in crossings {
            self.messenger.send_battle_announcement(&crossing.battle);
        }
    }

    fn apply(&mut self, settled: Settled) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match settled {
            Settled::Battle(battle) => {
                for region in battle.regions() {
                    self.board[region].round.resolving = false;
                }
                apply_battle(self.board, &battle);
                self.messenger.send_battle_results(&battle);
                self.battles.push(battle);
            }
            Settled::Crossings(region, crossed) => {
                self.board[region].round.resolving = false;
                self.apply_crossings(crossed);
            }
        }
    }

    fn apply_crossings(&mut self, crossed: Vec<Battle>) {
        for crossing in &crossed {
            apply_crossing(self.board, crossing);
        }
        self.messenger.send_danger_zone_crossings(&crossed);
        self.battles.extend(crossed);
    }
}
