//! The boundary between the engine and the players.
//!
//! The engine never touches sockets or wire formats. Everything it tells or
//! asks the players goes through a [`Messenger`]. Send methods are
//! fire-and-forget: an implementation owns its I/O failures. Await methods
//! return errors so the engine can log and abandon the request. Dropping an
//! await future cancels the request.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::board::{Board, Faction, Order, RegionId, Season};
use crate::error::MessageError;
use crate::resolve::Battle;

#[async_trait]
pub trait Messenger: Send + Sync {
    fn send_error(&self, to: &Faction, error: &(dyn std::error::Error + Send + Sync));

    fn send_game_started(&self, board: &Board);

    /// Asks a faction for its orders. An error means the faction cannot be reached.
    fn send_order_request(&self, to: &Faction, season: Season) -> Result<(), MessageError>;

    fn send_orders_received(&self, orders: &BTreeMap<Faction, Vec<Order>>);

    fn send_orders_confirmation(&self, faction: &Faction);

    fn send_battle_announcement(&self, battle: &Battle);

    fn send_battle_results(&self, battle: &Battle);

    fn send_danger_zone_crossings(&self, crossings: &[Battle]);

    fn send_winner(&self, winner: &Faction);

    /// Drops anything buffered for the round that just ended.
    fn clear_messages(&self) {}

    async fn await_orders(&self, from: &Faction) -> Result<Vec<Order>, MessageError>;

    async fn await_dice_roll(&self, from: &Faction) -> Result<(), MessageError>;

    /// Asks `from` which of `supportable` to back in the battle for `embattled`.
    /// `None` means the faction declines to support anyone.
    async fn await_support(
        &self,
        from: &Faction,
        embattled: RegionId,
        supportable: &[Faction],
    ) -> Result<Option<Faction>, MessageError>;
}
