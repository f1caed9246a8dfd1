/// Raw wire types for the game document produced by the upstream generator.
/// These map to the clean domain types in `record.rs`.
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct GameDocument {
    pub game_info: Option<GameInfoWire>,
    pub events: Option<Vec<EventWire>>,
    pub checkpoints: Option<Vec<CheckpointWire>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct GameInfoWire {
    pub game_id: Option<WireId>,
    pub date: Option<String>,
    pub teams: Option<Vec<TeamWire>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct TeamWire {
    pub team_id: Option<WireId>,
    pub team_name: Option<String>,
    pub abbreviation: Option<String>,
    /// Usually "W-L" text; some generators emit an object.
    pub record: Option<serde_json::Value>,
    pub season: Option<WireId>,
    pub coach: Option<String>,
    pub arena: Option<String>,
    pub players: Option<Vec<PlayerWire>>,
    pub starting_lineup: Option<Vec<WireId>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PlayerWire {
    pub player_id: Option<WireId>,
    pub player_name: Option<String>,
    pub player_index: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EventWire {
    pub event_type: String,
    pub timestamp: Option<WireClock>,
    pub quarter: Option<u8>,
    pub team_id: Option<i64>,
    pub player_id: Option<WireId>,
    pub details: Option<DetailsWire>,
}

/// Union of every event type's `details` keys.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct DetailsWire {
    pub points: Option<u32>,
    pub shot_type: Option<String>,
    pub assist_player_id: Option<WireId>,
    pub made: Option<bool>,
    pub free_throw_num: Option<u8>,
    pub total_free_throws: Option<u8>,
    pub rebound_type: Option<String>,
    pub steal_player_id: Option<WireId>,
    pub player_in_id: Option<WireId>,
    pub player_out_id: Option<WireId>,
    pub quarter: Option<u8>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub player_states: Option<HashMap<String, PlayerStateWire>>,
}

/// Per-player counters as the generator names them.
#[derive(Debug, Deserialize, Default, Clone, Copy)]
#[serde(default)]
pub struct PlayerStateWire {
    pub pts: u32,
    pub ast: u32,
    pub stl: u32,
    pub blk: u32,
    pub tov: u32,
    pub orb: u32,
    pub drb: u32,
    pub fg: u32,
    pub fga: u32,
    pub fg_threepoint: u32,
    pub fga_threepoint: u32,
    pub ft: u32,
    pub fta: u32,
    pub pf: u32,
    pub mp: u32,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct CheckpointWire {
    pub checkpoint_id: Option<String>,
    pub quarter: Option<u8>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub last_event_index: Option<i64>,
    pub player_states: Option<HashMap<String, PlayerStateWire>>,
    pub team_stats: Option<Vec<TeamStatsWire>>,
}

#[derive(Debug, Deserialize, Default, Clone, Copy)]
#[serde(default)]
pub struct TeamStatsWire {
    pub pts: u32,
}

/// Ids arrive as strings from some generators and as integers from others.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(i64),
}

impl WireId {
    pub fn into_string(self) -> String {
        match self {
            WireId::Text(s) => s,
            WireId::Number(n) => n.to_string(),
        }
    }
}

/// Clock remaining, either preformatted ("7:05") or raw seconds.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum WireClock {
    Text(String),
    Seconds(f64),
}

impl WireClock {
    pub fn display(&self) -> String {
        match self {
            WireClock::Text(s) => s.clone(),
            WireClock::Seconds(secs) => {
                let total = secs.max(0.0) as u64;
                format!("{}:{:02}", total / 60, total % 60)
            }
        }
    }
}
