//! Board representation and game-state types.
//!
//! Contains the region arena, units, orders, and the per-round resolving
//! state the resolver drives to a fixed point.

pub mod order;
pub mod region;
pub mod state;
pub mod unit;

pub use order::{Order, OrderKind};
pub use region::{DangerZone, Neighbor, Region, RegionId};
pub use state::{Board, Season};
pub use unit::{Faction, Unit, UnitType};
