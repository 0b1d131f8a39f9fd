//! Error types for board setup, order validation, and player messaging.

use crate::board::{Faction, OrderKind, Season, UnitType};

/// Malformed static board configuration. Fatal: surfaced before a game starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse board config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid winningCastleCount {0} in board config")]
    InvalidWinningCastleCount(i64),

    #[error("failed to find regions for neighbor relation '{0}' <-> '{1}'")]
    UnknownNeighbor(String, String),

    #[error("region '{0}' is defined more than once")]
    DuplicateRegion(String),

    #[error("board has {0} regions, more than a region handle can address")]
    TooManyRegions(usize),

    #[error("found no playable factions in board config")]
    NoFactions,
}

/// An order or order set rejected during validation.
///
/// Sent back to the submitting faction, which is asked to submit again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("invalid order in region '{region}': {source}")]
    InRegion {
        region: String,
        #[source]
        source: Box<OrderError>,
    },

    #[error("region {0} is not on the board")]
    UnknownRegion(String),

    #[error("ordered region does not have a unit")]
    NoUnit,

    #[error("ordered unit belongs to '{found}', not '{expected}'")]
    WrongFaction { expected: Faction, found: Faction },

    #[error("order unit type '{ordered}' does not match unit type '{found}' in region")]
    WrongUnitType { ordered: UnitType, found: UnitType },

    #[error("retreat orders can only be created by the server")]
    RetreatSubmitted,

    #[error("{0} orders are not allowed in {1}")]
    WrongSeason(OrderKind, Season),

    #[error("{0} orders must have a destination")]
    MissingDestination(OrderKind),

    #[error("{0} orders cannot have a destination")]
    UnexpectedDestination(OrderKind),

    #[error("{0} destination cannot be the ordered unit's own region")]
    DestinationIsOrigin(OrderKind),

    #[error("ship order destination '{0}' must be sea or coast")]
    ShipDestinationInland(String),

    #[error("only ships can be ordered to the sea region '{0}'")]
    LandUnitToSea(String),

    #[error("second destinations can only be given to knights")]
    SecondDestinationNotKnight,

    #[error("winter moves cannot have a second destination")]
    SecondDestinationInWinter,

    #[error("second destination '{second}' is not adjacent to '{first}'")]
    SecondDestinationNotAdjacent { first: String, second: String },

    #[error("support order must be adjacent to '{0}'")]
    SupportNotAdjacent(String),

    #[error("'{0}' is not adjacent, and no transport path is available")]
    Unreachable(String),

    #[error("besieged region must have a castle")]
    BesiegeWithoutCastle,

    #[error("besieged region is already controlled")]
    BesiegeControlled,

    #[error("ships cannot besiege")]
    ShipBesiege,

    #[error("only ships can transport")]
    TransportNotShip,

    #[error("transport orders can only be placed at sea")]
    TransportNotAtSea,

    #[error("must control destination region '{0}' in winter move")]
    WinterDestinationNotControlled(String),

    #[error("move destination '{0}' already has a unit")]
    DestinationOccupied(String),

    #[error("ship winter move destination '{0}' must be coast")]
    WinterShipInland(String),

    #[error("cannot build in '{0}': region already occupied")]
    BuildOccupied(String),

    #[error("cannot build in '{0}': region not controlled by you")]
    BuildNotControlled(String),

    #[error("ships can only be built on coast, '{0}' is not")]
    BuildShipInland(String),

    #[error("orders must change unit count by {expected}, but change it by {found}")]
    WrongBuildCount { expected: i64, found: i64 },

    #[error("orders include two moves to region '{0}'")]
    DuplicateDestination(String),

    #[error("unit in region '{0}' is ordered twice")]
    OrderedTwice(String),
}

impl OrderError {
    pub(crate) fn in_region(self, region: impl Into<String>) -> Self {
        OrderError::InRegion {
            region: region.into(),
            source: Box::new(self),
        }
    }
}

/// Failure talking to a player.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("faction '{0}' is not connected")]
    Disconnected(Faction),

    #[error("timed out waiting for input from '{0}'")]
    TimedOut(Faction),

    #[error("'{chosen}' is not fighting in the battle for {region}")]
    InvalidSupport { chosen: Faction, region: String },

    #[error("message transport failed: {0}")]
    Transport(String),
}
