//! Player input for battles: dice rolls and support declarations.
//!
//! A battle is prepared by the resolving task, which owns the board: it builds
//! the modifiers, rolls the dice, credits automatic supports, and works out
//! which factions must be asked about their supports. The prepared battle is
//! then handed to [`Solicitor::fight`], which runs in its own task and asks
//! every involved faction concurrently. Answers land in the battle behind a
//! mutex.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::board::{Board, Faction, RegionId};
use crate::dice::DiceRoller;
use crate::error::MessageError;
use crate::messenger::Messenger;

use super::battle::{Battle, BattleResult, Combatant, Modifier};
use super::danger_zone::PreparedCrossing;

/// One faction's supports into one embattled region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SupportRequest {
    pub region: RegionId,
    pub region_name: String,
    /// Combatants the faction may back in this region.
    pub supportable: Vec<Faction>,
    /// Number of support orders, all backing the same choice.
    pub count: i32,
}

/// A battle ready to be fought, with everything decided that needs no player input.
#[derive(Debug, Clone)]
pub(crate) struct PreparedBattle {
    pub battle: Battle,
    /// Each combatant's pre-rolled die, in result order.
    pub dice: Vec<(Faction, i32)>,
    /// Supports that need an answer, per supporting faction.
    pub supports: BTreeMap<Faction, Vec<SupportRequest>>,
}

impl PreparedBattle {
    /// Builds a battle from its combatants' modifiers.
    ///
    /// Supports into an embattled region are credited automatically when the
    /// supporting faction attacks into or defends that region; the rest are
    /// left to be asked. Border battles have no defenders, so a faction
    /// supporting the region its own unit is leaving is asked like anyone else.
    pub fn new(board: &Board, results: Vec<BattleResult>, dice: &dyn DiceRoller) -> Self {
        let mut battle = Battle::new(results);
        let rolls = battle
            .results
            .iter()
            .map(|r| (r.faction().clone(), dice.roll()))
            .collect();

        let mut supports: BTreeMap<Faction, Vec<SupportRequest>> = BTreeMap::new();
        for region in battle.regions() {
            let supportable: Vec<Faction> = battle
                .results
                .iter()
                .filter(|r| match &r.combatant {
                    Combatant::Attacker(order) => order.destination == Some(region),
                    Combatant::Defender(_) => true,
                })
                .map(|r| r.faction().clone())
                .collect();

            // A faction fighting over this very region backs itself.
            let mut asked: BTreeMap<Faction, i32> = BTreeMap::new();
            for support in &board[region].round.incoming_supports {
                if supportable.contains(&support.faction) {
                    battle.add_modifier(
                        &support.faction,
                        Modifier::support(support.faction.clone(), 1),
                    );
                } else {
                    *asked.entry(support.faction.clone()).or_default() += 1;
                }
            }
            for (faction, count) in asked {
                supports.entry(faction).or_default().push(SupportRequest {
                    region,
                    region_name: board[region].name.clone(),
                    supportable: supportable.clone(),
                    count,
                });
            }
        }

        PreparedBattle {
            battle,
            dice: rolls,
            supports,
        }
    }
}

/// Asks players for input on behalf of battles.
#[derive(Clone)]
pub(crate) struct Solicitor {
    messenger: Arc<dyn Messenger>,
    input_timeout: Option<Duration>,
}

impl Solicitor {
    pub fn new(messenger: Arc<dyn Messenger>, input_timeout: Option<Duration>) -> Self {
        Solicitor {
            messenger,
            input_timeout,
        }
    }

    /// Collects every faction's dice roll and support answers, and returns the finished battle.
    pub async fn fight(&self, prepared: PreparedBattle) -> Battle {
        let PreparedBattle {
            mut battle,
            dice,
            supports,
        } = prepared;

        if let ([(faction, roll)], true) = (dice.as_slice(), supports.is_empty()) {
            if self.roll(faction).await.is_ok() {
                battle.add_modifier(faction, Modifier::dice(*roll));
            }
            return battle;
        }

        let shared = Arc::new(Mutex::new(battle));
        let mut tasks = JoinSet::new();
        for (faction, roll) in dice {
            let solicitor = self.clone();
            let shared = Arc::clone(&shared);
            tasks.spawn(async move {
                if solicitor.roll(&faction).await.is_ok() {
                    shared.lock().await.add_modifier(&faction, Modifier::dice(roll));
                }
            });
        }
        for (faction, requests) in supports {
            let solicitor = self.clone();
            let shared = Arc::clone(&shared);
            tasks.spawn(async move { solicitor.call_support(&shared, faction, requests).await });
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                error!(error = %err, "battle input task failed");
            }
        }

        let battle = shared.lock().await.clone();
        battle
    }

    /// Asks every crossing faction to roll and counts the drawn dice, in input order.
    ///
    /// A crossing's die always counts: an unanswered prompt is rolled on the
    /// faction's behalf.
    pub async fn cross(&self, crossings: Vec<PreparedCrossing>) -> Vec<Battle> {
        let mut tasks = JoinSet::new();
        for (index, crossing) in crossings.into_iter().enumerate() {
            let solicitor = self.clone();
            tasks.spawn(async move {
                let faction = crossing.faction().clone();
                let rolled = solicitor
                    .input(&faction, solicitor.messenger.await_dice_roll(&faction))
                    .await;
                if let Err(err) = rolled {
                    warn!(faction = %faction, error = %err, "no crossing roll received, rolling on their behalf");
                }
                (index, crossing.finish())
            });
        }

        let mut finished = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(crossing) => finished.push(crossing),
                Err(err) => error!(error = %err, "danger zone crossing task failed"),
            }
        }
        finished.sort_by_key(|&(index, _)| index);
        finished.into_iter().map(|(_, battle)| battle).collect()
    }

    /// Waits for `faction` to roll. On failure the faction is told and its die is forfeit.
    async fn roll(&self, faction: &Faction) -> Result<(), MessageError> {
        let rolled = self
            .input(faction, self.messenger.await_dice_roll(faction))
            .await;
        if let Err(err) = &rolled {
            warn!(faction = %faction, error = %err, "abandoned dice roll");
            self.messenger.send_error(faction, err);
        }
        rolled
    }

    async fn call_support(
        &self,
        battle: &Mutex<Battle>,
        faction: Faction,
        requests: Vec<SupportRequest>,
    ) {
        let answer = match requests.as_slice() {
            [only] => self.ask_support(&faction, only).await,
            [first, second] => {
                tokio::select! {
                    answer = self.ask_support(&faction, first) => answer,
                    answer = self.ask_support(&faction, second) => answer,
                }
            }
            _ => {
                error!(faction = %faction, requests = requests.len(), "unexpected support request count");
                return;
            }
        };

        let (request, chosen) = match answer {
            Ok((_, None)) => {
                debug!(faction = %faction, "declined to support");
                return;
            }
            Ok((request, Some(chosen))) => (request, chosen),
            Err(err) => {
                warn!(faction = %faction, error = %err, "abandoned support request");
                return;
            }
        };

        if !request.supportable.contains(&chosen) {
            let err = MessageError::InvalidSupport {
                chosen,
                region: request.region_name.clone(),
            };
            warn!(faction = %faction, error = %err, "invalid support choice");
            self.messenger.send_error(&faction, &err);
            return;
        }

        debug!(from = %faction, to = %chosen, region = %request.region_name, "support given");
        battle
            .lock()
            .await
            .add_modifier(&chosen, Modifier::support(faction, request.count));
    }

    async fn ask_support<'r>(
        &self,
        faction: &Faction,
        request: &'r SupportRequest,
    ) -> Result<(&'r SupportRequest, Option<Faction>), MessageError> {
        let choice = self
            .input(
                faction,
                self.messenger
                    .await_support(faction, request.region, &request.supportable),
            )
            .await?;
        Ok((request, choice))
    }

    async fn input<T>(
        &self,
        faction: &Faction,
        request: impl Future<Output = Result<T, MessageError>>,
    ) -> Result<T, MessageError> {
        match self.input_timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .unwrap_or_else(|_| Err(MessageError::TimedOut(faction.clone()))),
            None => request.await,
        }
    }
}
