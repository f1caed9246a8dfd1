use crate::error::{ReplayError, ReplayResult};
use crate::wire::{
    CheckpointWire, DetailsWire, EventWire, GameDocument, PlayerStateWire, PlayerWire, TeamWire,
    WireId,
};
use crate::{
    EventKind, GameEvent, GameInfo, GameRecord, PlayerInfo, PlayerSnapshot, ReboundType, Scores,
    ShotType, Side, TeamInfo, UpstreamCheckpoint,
};
use chrono::NaiveDate;
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

impl GameRecord {
    /// Map a parsed document into a validated record.
    ///
    /// Fails on a missing/empty event log, a missing terminal event, or a
    /// quarter/game end without both scores. Softer
    /// data-quality problems (unknown player ids, colliding positional ids,
    /// unknown event types) are logged and tolerated.
    pub fn from_document(doc: GameDocument) -> ReplayResult<Self> {
        let events = doc
            .events
            .ok_or_else(|| ReplayError::MalformedRecord("document has no events".into()))?;
        let info = map_game_info(doc.game_info.unwrap_or_default());
        let events = events
            .into_iter()
            .enumerate()
            .map(|(index, raw)| map_event(index, raw))
            .collect::<ReplayResult<Vec<GameEvent>>>()?;
        let checkpoints = doc
            .checkpoints
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, cp)| map_checkpoint(i, cp))
            .collect();

        let record = GameRecord::new(info, events, checkpoints)?;
        record.validate()?;
        report_data_quality(&record);
        Ok(record)
    }

    pub fn from_json(json: &str) -> ReplayResult<Self> {
        let doc: GameDocument = serde_json::from_str(json)
            .map_err(|e| ReplayError::LoadFailure(format!("invalid game json: {e}")))?;
        Self::from_document(doc)
    }
}

fn map_game_info(raw: crate::wire::GameInfoWire) -> GameInfo {
    let mut teams = raw.teams.unwrap_or_default().into_iter();
    let home = teams.next().map(|t| map_team(t, Side::Home)).unwrap_or_else(|| placeholder_team(Side::Home));
    let away = teams.next().map(|t| map_team(t, Side::Away)).unwrap_or_else(|| placeholder_team(Side::Away));
    if teams.next().is_some() {
        warn!("game document lists more than two teams; extra teams ignored");
    }

    let date = raw.date.as_deref().and_then(|d| {
        NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .map_err(|e| debug!("unparseable game date {d}: {e}"))
            .ok()
    });

    GameInfo {
        game_id: raw.game_id.map(WireId::into_string).unwrap_or_default(),
        date,
        teams: [home, away],
    }
}

fn placeholder_team(side: Side) -> TeamInfo {
    warn!("game document is missing the {} team", side.label().to_lowercase());
    TeamInfo {
        name: side.label().to_string(),
        abbreviation: side.label().to_uppercase(),
        ..Default::default()
    }
}

fn map_team(raw: TeamWire, side: Side) -> TeamInfo {
    let name = raw.team_name.unwrap_or_else(|| side.label().to_string());
    let abbreviation = raw
        .abbreviation
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| name.chars().take(3).collect::<String>().to_uppercase());
    let record = raw.record.map(|r| match r {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    });

    TeamInfo {
        team_id: raw.team_id.map(WireId::into_string).unwrap_or_default(),
        players: map_players(raw.players.unwrap_or_default(), &name),
        name,
        abbreviation,
        record,
        season: raw.season.map(WireId::into_string),
        coach: raw.coach,
        arena: raw.arena,
        starting_lineup: raw
            .starting_lineup
            .unwrap_or_default()
            .into_iter()
            .map(WireId::into_string)
            .collect(),
    }
}

/// Stable id if present, else the positional fallback `p{index}`.
fn map_players(raw: Vec<PlayerWire>, team_name: &str) -> Vec<PlayerInfo> {
    let explicit: HashSet<String> = raw
        .iter()
        .filter_map(|p| p.player_id.clone().map(WireId::into_string))
        .collect();

    raw.into_iter()
        .enumerate()
        .map(|(position, p)| {
            let index = p.player_index.unwrap_or(position);
            let player_id = match p.player_id {
                Some(id) => id.into_string(),
                None => {
                    let fallback = format!("p{index}");
                    if explicit.contains(&fallback) {
                        warn!(
                            "{team_name}: positional id {fallback} collides with an explicit player id"
                        );
                    }
                    fallback
                }
            };
            PlayerInfo {
                name: p.player_name.unwrap_or_else(|| format!("Player {player_id}")),
                player_id,
                index,
            }
        })
        .collect()
}

fn map_event(index: usize, raw: EventWire) -> ReplayResult<GameEvent> {
    let details = raw.details.unwrap_or_default();
    let quarter = raw.quarter.unwrap_or(1);
    let kind = map_event_kind(&raw.event_type, details, quarter).map_err(|missing| {
        ReplayError::MalformedRecord(format!(
            "event {index} ({}) has no {missing}",
            raw.event_type
        ))
    })?;

    Ok(GameEvent {
        kind,
        side: raw.team_id.and_then(Side::from_team_id),
        player_id: raw.player_id.map(WireId::into_string),
        quarter,
        timestamp: raw.timestamp.map(|t| t.display()).unwrap_or_default(),
    })
}

/// Boundary scores are authoritative, so they must be present verbatim.
fn boundary_scores(d: &DetailsWire) -> Result<Scores, &'static str> {
    match (d.home_score, d.away_score) {
        (Some(home), Some(away)) => Ok(Scores::new(home, away)),
        (None, _) => Err("home_score"),
        (_, None) => Err("away_score"),
    }
}

/// Errs with the name of a missing required detail.
fn map_event_kind(event_type: &str, d: DetailsWire, quarter: u8) -> Result<EventKind, &'static str> {
    let id = |v: Option<WireId>| v.map(WireId::into_string);

    let kind = match event_type {
        "tip_off" => EventKind::TipOff,
        "shot_made" => {
            let shot_type = d.shot_type.as_deref().map(ShotType::parse).unwrap_or_default();
            let fallback_points = if shot_type.is_three() { 3 } else { 2 };
            EventKind::ShotMade {
                points: d.points.unwrap_or(fallback_points),
                shot_type,
                assist_player_id: id(d.assist_player_id),
            }
        }
        "shot_missed" => EventKind::ShotMissed {
            shot_type: d.shot_type.as_deref().map(ShotType::parse).unwrap_or_default(),
        },
        "free_throw" => EventKind::FreeThrow {
            made: d.made.unwrap_or(false),
            number: d.free_throw_num.unwrap_or(1),
            total: d.total_free_throws.unwrap_or(1),
        },
        "rebound" => EventKind::Rebound {
            rebound_type: match d.rebound_type.as_deref() {
                Some("offensive") => ReboundType::Offensive,
                _ => ReboundType::Defensive,
            },
        },
        "turnover" => EventKind::Turnover { steal_player_id: id(d.steal_player_id) },
        "substitution" => EventKind::Substitution {
            player_in_id: id(d.player_in_id),
            player_out_id: id(d.player_out_id),
        },
        "quarter_end" => EventKind::QuarterEnd {
            quarter: d.quarter.unwrap_or(quarter),
            scores: boundary_scores(&d)?,
        },
        "game_over" | "game_end" => EventKind::GameOver {
            scores: boundary_scores(&d)?,
            player_states: d.player_states.map(map_player_states),
        },
        other => EventKind::Other(other.to_string()),
    };
    Ok(kind)
}

fn map_player_states(raw: HashMap<String, PlayerStateWire>) -> BTreeMap<String, PlayerSnapshot> {
    raw.into_iter().map(|(id, s)| (id, map_snapshot(s))).collect()
}

fn map_snapshot(s: PlayerStateWire) -> PlayerSnapshot {
    PlayerSnapshot {
        points: s.pts,
        assists: s.ast,
        steals: s.stl,
        blocks: s.blk,
        turnovers: s.tov,
        offensive_rebounds: s.orb,
        defensive_rebounds: s.drb,
        field_goals_made: s.fg,
        field_goals_attempted: s.fga,
        three_pointers_made: s.fg_threepoint,
        three_pointers_attempted: s.fga_threepoint,
        free_throws_made: s.ft,
        free_throws_attempted: s.fta,
        fouls: s.pf,
        seconds_played: s.mp,
    }
}

fn map_checkpoint(position: usize, raw: CheckpointWire) -> UpstreamCheckpoint {
    let team_points = raw.team_stats.as_deref().and_then(|stats| match stats {
        [home, away, ..] => Some([home.pts, away.pts]),
        _ => None,
    });
    UpstreamCheckpoint {
        checkpoint_id: raw.checkpoint_id.unwrap_or_else(|| format!("cp_{}", position + 1)),
        quarter: raw.quarter.unwrap_or_default(),
        scores: Scores::new(
            raw.home_score.unwrap_or_default(),
            raw.away_score.unwrap_or_default(),
        ),
        last_event_index: raw.last_event_index.and_then(|i| usize::try_from(i).ok()),
        players: raw.player_states.map(map_player_states).unwrap_or_default(),
        team_points,
    }
}

fn report_data_quality(record: &GameRecord) {
    let mut unknown_players = BTreeSet::new();
    let mut unknown_teams = 0usize;
    let mut unknown_types = BTreeSet::new();

    for event in record.events() {
        for id in event.referenced_players() {
            if record.side_of(id).is_none() {
                unknown_players.insert(id.to_string());
            }
        }
        if event.side.is_none() {
            unknown_teams += 1;
        }
        if let EventKind::Other(name) = &event.kind {
            unknown_types.insert(name.clone());
        }
    }

    if !unknown_players.is_empty() {
        warn!(
            "game {}: {} player id(s) missing from rosters: {}",
            record.info.game_id,
            unknown_players.len(),
            unknown_players.into_iter().collect::<Vec<_>>().join(", ")
        );
    }
    if unknown_teams > 0 {
        warn!(
            "game {}: {unknown_teams} event(s) carry a team_id other than 0 or 1",
            record.info.game_id
        );
    }
    if !unknown_types.is_empty() {
        warn!(
            "game {}: unrecognised event types ignored: {}",
            record.info.game_id,
            unknown_types.into_iter().collect::<Vec<_>>().join(", ")
        );
    }
    debug!(
        "game {} loaded: {} events, {} upstream checkpoints",
        record.info.game_id,
        record.len(),
        record.checkpoints.len()
    );
}
