//! Board configuration and game options.
//!
//! A board is described by a JSON document listing nations with their land
//! regions, seas, and neighbor relations. [`BoardConfig::build`] turns it into
//! the region arena and the static [`BoardInfo`], rejecting malformed boards
//! before any game starts.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::board::{Board, DangerZone, Faction, Neighbor, Region, RegionId};
use crate::error::ConfigError;

/// Time every faction gets to submit a valid order set each round.
pub const DEFAULT_ORDER_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Static facts about a board that do not change during a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardInfo {
    pub id: String,
    pub name: String,
    /// A faction must hold more castles than this, and more than anyone else, to win.
    pub winning_castle_count: usize,
    /// Playable factions, sorted.
    pub factions: Vec<Faction>,
}

/// Tunables for running a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOptions {
    /// Overall deadline for gathering one round of orders.
    pub order_timeout: Duration,
    /// Per-request limit on dice rolls and support answers. `None` waits indefinitely.
    pub input_timeout: Option<Duration>,
}

impl Default for GameOptions {
    fn default() -> Self {
        GameOptions {
            order_timeout: DEFAULT_ORDER_TIMEOUT,
            input_timeout: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardConfig {
    pub name: String,
    pub winning_castle_count: i64,
    #[serde(default)]
    pub nations: BTreeMap<String, Vec<LandRegionConfig>>,
    #[serde(default)]
    pub seas: Vec<SeaRegionConfig>,
    #[serde(default)]
    pub neighbors: Vec<NeighborConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandRegionConfig {
    pub name: String,
    #[serde(default)]
    pub forest: bool,
    #[serde(default)]
    pub castle: bool,
    #[serde(default)]
    pub home_faction: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeaRegionConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborConfig {
    pub region1: String,
    pub region2: String,
    #[serde(default)]
    pub river: bool,
    #[serde(default)]
    pub cliffs: bool,
    #[serde(default)]
    pub danger_zone: Option<String>,
}

impl BoardConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the board arena. Land regions start controlled by their home faction.
    pub fn build(&self, id: &str) -> Result<(Board, BoardInfo), ConfigError> {
        if self.winning_castle_count <= 0 {
            return Err(ConfigError::InvalidWinningCastleCount(self.winning_castle_count));
        }

        let mut regions = Vec::new();
        let mut factions = BTreeSet::new();
        for (nation, lands) in &self.nations {
            for land in lands {
                let home = land
                    .home_faction
                    .as_deref()
                    .filter(|name| !name.is_empty())
                    .map(Faction::new);
                let mut region = Region::new(&land.name);
                region.forest = land.forest;
                region.castle = land.castle;
                region.nation = Some(nation.clone());
                region.controlling_faction = home.clone();
                region.home_faction = home.clone();
                factions.extend(home);
                regions.push(region);
            }
        }
        for sea in &self.seas {
            let mut region = Region::new(&sea.name);
            region.sea = true;
            regions.push(region);
        }

        if regions.len() > usize::from(u16::MAX) {
            return Err(ConfigError::TooManyRegions(regions.len()));
        }
        let mut index = HashMap::with_capacity(regions.len());
        for (i, region) in regions.iter().enumerate() {
            if index.insert(region.name.clone(), RegionId::new(i as u16)).is_some() {
                return Err(ConfigError::DuplicateRegion(region.name.clone()));
            }
        }

        for relation in &self.neighbors {
            let (Some(&first), Some(&second)) =
                (index.get(&relation.region1), index.get(&relation.region2))
            else {
                return Err(ConfigError::UnknownNeighbor(
                    relation.region1.clone(),
                    relation.region2.clone(),
                ));
            };
            let danger_zone = relation
                .danger_zone
                .as_deref()
                .filter(|name| !name.is_empty())
                .map(DangerZone::new);
            for (from, to) in [(first, second), (second, first)] {
                let across_water =
                    relation.river || (regions[from.index()].sea && !regions[to.index()].sea);
                regions[to.index()].neighbors.push(Neighbor {
                    region: from,
                    across_water,
                    cliffs: relation.cliffs,
                    danger_zone: danger_zone.clone(),
                });
            }
        }

        if factions.is_empty() {
            return Err(ConfigError::NoFactions);
        }

        let info = BoardInfo {
            id: id.to_string(),
            name: self.name.clone(),
            winning_castle_count: self.winning_castle_count as usize,
            factions: factions.into_iter().collect(),
        };
        Ok((Board::new(regions), info))
    }
}

/// Parses and builds a board in one step.
pub fn load_board(id: &str, json: &str) -> Result<(Board, BoardInfo), ConfigError> {
    BoardConfig::from_json(json)?.build(id)
}

#[cfg(test)]
pub(crate) const TEST_BOARD_JSON: &str = include_str!("../tests/fixtures/test_board.json");

#[cfg(test)]
pub(crate) fn test_board() -> Board {
    load_board("three-crowns", TEST_BOARD_JSON)
        .map(|(board, _)| board)
        .expect("test board fixture must be valid")
}
