//! Order resolution.
//!
//! Turns a round of simultaneous orders into a new board state. Non-winter
//! rounds go through the fixed-point [`resolve_orders`] loop, which fights
//! battles concurrently with player input; winter rounds are settled by
//! [`resolve_winter_orders`] without combat.

pub mod battle;
pub(crate) mod combat;
pub mod cycle;
pub mod danger_zone;
pub mod modifier;
pub(crate) mod outcome;
pub mod phase;
pub mod resolver;
pub mod transport;
pub mod winter;

pub use battle::{
    Battle, BattleResult, Combatant, Modifier, ModifierKind, MIN_TOTAL_TO_CONQUER,
    MIN_TOTAL_TO_CROSS_DANGER_ZONE,
};
pub use modifier::BattleKind;
pub use phase::{check_winner, resolve_sieges};
pub use resolver::resolve_orders;
pub use transport::{find_transport_path, TransportPath};
pub use winter::resolve_winter_orders;
