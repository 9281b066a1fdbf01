//! World map snapshot: players, alliances and their towns from the world dumps,
//! bundled with the static temples into `mapData.js`.

mod assemble;
mod dump;

use serde::{Deserialize, Serialize};

use crate::temples::TempleRecord;

pub use assemble::{assemble, render_map_data, write_map_data};
pub use dump::{parse_alliance, parse_player, parse_town, split_fields, TownRow};

pub const PLAYERS_FILE: &str = "players.txt.gz";
pub const ALLIANCES_FILE: &str = "alliances.txt.gz";
pub const TOWNS_FILE: &str = "towns.txt.gz";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Town {
    pub x: i64,
    pub y: i64,
    pub slot: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub alliance_id: i64,
    pub towns: Vec<Town>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alliance {
    pub id: i64,
    pub name: String,
    pub towns: Vec<Town>,
}

impl Alliance {
    /// Stand-in for an alliance id referenced by a player but missing from the dump.
    pub fn placeholder(id: i64) -> Self {
        Self {
            id,
            name: format!("Alliance {id}"),
            towns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    pub alliances: Vec<Alliance>,
    pub players: Vec<Player>,
    pub temples: Vec<TempleRecord>,
}
