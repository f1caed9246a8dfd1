pub mod checkpoint;
pub mod client;
pub mod cursor;
pub mod error;
pub mod record;
pub mod scheduler;
pub mod session;
pub mod stats;
pub mod summary;
pub mod wire;

pub use cursor::{Advance, Projection, ReplayCursor};
pub use error::{LoadError, ReplayError, ReplayResult};
pub use scheduler::{PlaybackScheduler, PlaybackSpeed, PlaybackTick};
pub use session::{LoadTicket, ReplaySession, SessionStatus, TickOutcome};
pub use stats::{AggregateState, PlayerStatLine, TeamStatLine};

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

// ---------------------------------------------------------------------------
// Domain types: independent of the JSON wire format
// ---------------------------------------------------------------------------

/// Home/away slot of a team. The wire format encodes this as `team_id` 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Home, Side::Away];

    pub fn from_team_id(team_id: i64) -> Option<Self> {
        match team_id {
            0 => Some(Side::Home),
            1 => Some(Side::Away),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::Home => 0,
            Side::Away => 1,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Home => "Home",
            Side::Away => "Away",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scores {
    pub home: u32,
    pub away: u32,
}

impl Scores {
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }

    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }

    pub fn add(&mut self, side: Side, points: u32) {
        match side {
            Side::Home => self.home += points,
            Side::Away => self.away += points,
        }
    }

    /// `None` when the game is tied.
    pub fn leader(&self) -> Option<Side> {
        match self.home.cmp(&self.away) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less => Some(Side::Away),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Quarter number plus the clock-remaining display string ("12:00").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameClock {
    pub quarter: u8,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default)]
pub struct GameInfo {
    pub game_id: String,
    pub date: Option<NaiveDate>,
    pub teams: [TeamInfo; 2],
}

#[derive(Debug, Clone, Default)]
pub struct TeamInfo {
    pub team_id: String,
    pub name: String,
    pub abbreviation: String,
    pub record: Option<String>,
    pub season: Option<String>,
    pub coach: Option<String>,
    pub arena: Option<String>,
    pub players: Vec<PlayerInfo>,
    /// Starter ids in display order. Empty when the document has no lineup.
    pub starting_lineup: Vec<String>,
}

impl TeamInfo {
    pub fn is_starter(&self, player_id: &str) -> bool {
        self.starting_lineup.iter().any(|id| id == player_id)
    }

    /// Starters in lineup order, then the bench in roster order.
    pub fn display_order(&self) -> Vec<&PlayerInfo> {
        let mut ordered: Vec<&PlayerInfo> = self
            .starting_lineup
            .iter()
            .filter_map(|id| self.players.iter().find(|p| &p.player_id == id))
            .collect();
        ordered.extend(self.players.iter().filter(|p| !self.is_starter(&p.player_id)));
        ordered
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerInfo {
    /// Stable id from the document, or the positional fallback `p{index}`.
    pub player_id: String,
    pub name: String,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShotType {
    Inside,
    Midrange,
    ThreePoint,
    #[default]
    Unknown,
}

impl ShotType {
    pub fn parse(s: &str) -> Self {
        match s {
            "fga_inside" => ShotType::Inside,
            "fga_midrange" => ShotType::Midrange,
            "fga_threepoint" => ShotType::ThreePoint,
            _ => ShotType::Unknown,
        }
    }

    pub fn is_three(self) -> bool {
        self == ShotType::ThreePoint
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReboundType {
    Offensive,
    Defensive,
}

/// Per-player counters reported by the upstream generator alongside an event
/// or checkpoint. Only some of these are derivable from the event log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerSnapshot {
    pub points: u32,
    pub assists: u32,
    pub steals: u32,
    pub blocks: u32,
    pub turnovers: u32,
    pub offensive_rebounds: u32,
    pub defensive_rebounds: u32,
    pub field_goals_made: u32,
    pub field_goals_attempted: u32,
    pub three_pointers_made: u32,
    pub three_pointers_attempted: u32,
    pub free_throws_made: u32,
    pub free_throws_attempted: u32,
    pub fouls: u32,
    /// Seconds on court; the generator logs `mp` before rounding it to minutes.
    pub seconds_played: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    TipOff,
    ShotMade {
        points: u32,
        shot_type: ShotType,
        assist_player_id: Option<String>,
    },
    ShotMissed {
        shot_type: ShotType,
    },
    FreeThrow {
        made: bool,
        number: u8,
        total: u8,
    },
    Rebound {
        rebound_type: ReboundType,
    },
    Turnover {
        steal_player_id: Option<String>,
    },
    Substitution {
        player_in_id: Option<String>,
        player_out_id: Option<String>,
    },
    /// Checkpoint marker; `scores` is the authoritative cumulative score.
    QuarterEnd {
        quarter: u8,
        scores: Scores,
    },
    /// Terminal event. `player_states` carries counters the event log cannot
    /// reconstruct (blocks, fouls, seconds played).
    GameOver {
        scores: Scores,
        player_states: Option<BTreeMap<String, PlayerSnapshot>>,
    },
    /// Event type this engine does not know; carries the raw name.
    Other(String),
}

impl EventKind {
    pub fn name(&self) -> &str {
        match self {
            EventKind::TipOff => "tip_off",
            EventKind::ShotMade { .. } => "shot_made",
            EventKind::ShotMissed { .. } => "shot_missed",
            EventKind::FreeThrow { .. } => "free_throw",
            EventKind::Rebound { .. } => "rebound",
            EventKind::Turnover { .. } => "turnover",
            EventKind::Substitution { .. } => "substitution",
            EventKind::QuarterEnd { .. } => "quarter_end",
            EventKind::GameOver { .. } => "game_over",
            EventKind::Other(name) => name,
        }
    }

    pub fn is_quarter_end(&self) -> bool {
        matches!(self, EventKind::QuarterEnd { .. })
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self, EventKind::GameOver { .. })
    }

    /// Score carried verbatim by boundary events.
    pub fn authoritative_scores(&self) -> Option<Scores> {
        match self {
            EventKind::QuarterEnd { scores, .. } | EventKind::GameOver { scores, .. } => {
                Some(*scores)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEvent {
    pub kind: EventKind,
    /// `None` when the document's `team_id` is neither 0 nor 1.
    pub side: Option<Side>,
    pub player_id: Option<String>,
    pub quarter: u8,
    pub timestamp: String,
}

impl GameEvent {
    pub fn clock(&self) -> GameClock {
        GameClock {
            quarter: self.quarter,
            timestamp: self.timestamp.clone(),
        }
    }

    /// Every player id this event mentions, primary actor first.
    pub fn referenced_players(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.player_id.iter().map(String::as_str).collect();
        match &self.kind {
            EventKind::ShotMade { assist_player_id: Some(id), .. } => ids.push(id),
            EventKind::Turnover { steal_player_id: Some(id) } => ids.push(id),
            EventKind::Substitution { player_in_id, player_out_id } => {
                ids.extend(player_in_id.iter().map(String::as_str));
                ids.extend(player_out_id.iter().map(String::as_str));
            }
            _ => {}
        }
        ids
    }

    /// The side this event credits `player_id` to when the roster does not
    /// list them: the event's team, except a steal, which goes to the defense.
    pub fn side_for(&self, player_id: &str) -> Option<Side> {
        match &self.kind {
            EventKind::Turnover { steal_player_id: Some(thief) } if thief == player_id => {
                self.side.map(Side::opponent)
            }
            _ if self.referenced_players().contains(&player_id) => self.side,
            _ => None,
        }
    }
}

/// Aggregate snapshot shipped with the document by the upstream generator.
/// Used only to cross-check the engine's own checkpoints.
#[derive(Debug, Clone, Default)]
pub struct UpstreamCheckpoint {
    pub checkpoint_id: String,
    pub quarter: u8,
    pub scores: Scores,
    pub last_event_index: Option<usize>,
    pub players: BTreeMap<String, PlayerSnapshot>,
    pub team_points: Option<[u32; 2]>,
}

/// The immutable input of a replay session.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub info: GameInfo,
    events: Vec<GameEvent>,
    pub checkpoints: Vec<UpstreamCheckpoint>,
    roster: HashMap<String, Side>,
}

impl GameRecord {
    /// Build a record from already-mapped parts. Rejects an empty event log;
    /// use [`GameRecord::validate`] for the full invariant check.
    pub fn new(
        info: GameInfo,
        events: Vec<GameEvent>,
        checkpoints: Vec<UpstreamCheckpoint>,
    ) -> ReplayResult<Self> {
        if events.is_empty() {
            return Err(ReplayError::MalformedRecord("event log is empty".into()));
        }
        let mut roster = HashMap::new();
        for side in Side::BOTH {
            for player in &info.teams[side.index()].players {
                roster.entry(player.player_id.clone()).or_insert(side);
            }
        }
        Ok(Self { info, events, checkpoints, roster })
    }

    /// Exactly one `game_over`, and it is the last event.
    pub fn validate(&self) -> ReplayResult<()> {
        let terminals: Vec<usize> = self
            .events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.kind.is_game_over())
            .map(|(i, _)| i)
            .collect();
        match terminals.as_slice() {
            [] => Err(ReplayError::MissingGameOver),
            [index] if *index == self.events.len() - 1 => Ok(()),
            [index] => Err(ReplayError::MalformedRecord(format!(
                "game_over at index {index} is not the last of {} events",
                self.events.len()
            ))),
            many => Err(ReplayError::MalformedRecord(format!(
                "{} game_over events found",
                many.len()
            ))),
        }
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn team(&self, side: Side) -> &TeamInfo {
        &self.info.teams[side.index()]
    }

    /// Roster side of a player, `None` for ids no roster lists.
    pub fn side_of(&self, player_id: &str) -> Option<Side> {
        self.roster.get(player_id).copied()
    }

    pub fn player(&self, player_id: &str) -> Option<&PlayerInfo> {
        let side = self.side_of(player_id)?;
        self.team(side).players.iter().find(|p| p.player_id == player_id)
    }

    pub fn game_over_index(&self) -> Option<usize> {
        self.events.iter().position(|e| e.kind.is_game_over())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn player(id: &str, name: &str, index: usize) -> PlayerInfo {
        PlayerInfo { player_id: id.into(), name: name.into(), index }
    }

    pub fn info() -> GameInfo {
        GameInfo {
            game_id: "test".into(),
            date: None,
            teams: [
                TeamInfo {
                    team_id: "celtics24".into(),
                    name: "Boston Celtics".into(),
                    abbreviation: "BOS".into(),
                    players: vec![player("p1", "Jayson Tatum", 0), player("p3", "Jrue Holiday", 1)],
                    starting_lineup: vec!["p1".into()],
                    ..Default::default()
                },
                TeamInfo {
                    team_id: "lakers24".into(),
                    name: "Los Angeles Lakers".into(),
                    abbreviation: "LAL".into(),
                    players: vec![player("p2", "LeBron James", 0), player("p4", "Anthony Davis", 1)],
                    starting_lineup: vec!["p2".into()],
                    ..Default::default()
                },
            ],
        }
    }

    pub fn event(kind: EventKind, team: i64, player: Option<&str>, quarter: u8) -> GameEvent {
        GameEvent {
            kind,
            side: Side::from_team_id(team),
            player_id: player.map(str::to_owned),
            quarter,
            timestamp: "12:00".into(),
        }
    }

    pub fn made(team: i64, player: &str, points: u32, assist: Option<&str>) -> GameEvent {
        let shot_type = if points == 3 { ShotType::ThreePoint } else { ShotType::Inside };
        event(
            EventKind::ShotMade {
                points,
                shot_type,
                assist_player_id: assist.map(str::to_owned),
            },
            team,
            Some(player),
            1,
        )
    }

    pub fn quarter_end(quarter: u8, home: u32, away: u32) -> GameEvent {
        event(
            EventKind::QuarterEnd { quarter, scores: Scores::new(home, away) },
            0,
            None,
            quarter,
        )
    }

    pub fn game_over(home: u32, away: u32) -> GameEvent {
        event(
            EventKind::GameOver { scores: Scores::new(home, away), player_states: None },
            0,
            None,
            4,
        )
    }

    /// The five-event scenario: tip, a made two, a miss, end of Q1, final.
    pub fn scenario() -> GameRecord {
        let events = vec![
            event(EventKind::TipOff, 0, Some("p1"), 1),
            made(0, "p1", 2, None),
            event(EventKind::ShotMissed { shot_type: ShotType::Midrange }, 1, Some("p2"), 1),
            quarter_end(1, 2, 0),
            game_over(2, 0),
        ];
        GameRecord::new(info(), events, vec![]).expect("scenario is non-empty")
    }

    /// Two quarters with every counter-bearing event type.
    pub fn two_quarters() -> GameRecord {
        let events = vec![
            event(EventKind::TipOff, 0, Some("p1"), 1),
            made(0, "p1", 3, Some("p3")),
            event(
                EventKind::Rebound { rebound_type: ReboundType::Defensive },
                1,
                Some("p4"),
                1,
            ),
            event(
                EventKind::FreeThrow { made: true, number: 1, total: 2 },
                1,
                Some("p2"),
                1,
            ),
            event(
                EventKind::FreeThrow { made: false, number: 2, total: 2 },
                1,
                Some("p2"),
                1,
            ),
            event(
                EventKind::Rebound { rebound_type: ReboundType::Offensive },
                1,
                Some("p4"),
                1,
            ),
            made(1, "p4", 2, Some("p2")),
            quarter_end(1, 3, 3),
            event(
                EventKind::Turnover { steal_player_id: Some("p2".into()) },
                0,
                Some("p3"),
                2,
            ),
            event(
                EventKind::Substitution {
                    player_in_id: Some("p3".into()),
                    player_out_id: Some("p1".into()),
                },
                0,
                None,
                2,
            ),
            event(EventKind::ShotMissed { shot_type: ShotType::ThreePoint }, 1, Some("p2"), 2),
            made(0, "p3", 2, None),
            quarter_end(2, 5, 3),
            game_over(5, 3),
        ];
        GameRecord::new(info(), events, vec![]).expect("fixture is non-empty")
    }
}
