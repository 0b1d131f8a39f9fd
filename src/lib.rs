//! Bastion round-resolution engine.
//!
//! Exposes the board representation, order validation, the concurrent
//! battle resolver, and the game driver. Talking to players is left to a
//! [`Messenger`] implementation supplied by the host.

pub mod board;
pub mod config;
pub mod dice;
pub mod error;
pub mod game;
pub mod messenger;
pub mod resolve;
pub mod validate;

pub use board::{Board, Faction, Order, OrderKind, Region, RegionId, Season, Unit, UnitType};
pub use config::{load_board, BoardConfig, BoardInfo, GameOptions};
pub use dice::{DiceRoller, RandomDice};
pub use error::{ConfigError, MessageError, OrderError};
pub use game::Game;
pub use messenger::Messenger;
pub use resolve::{resolve_orders, resolve_winter_orders, Battle};
pub use validate::validate_orders;
