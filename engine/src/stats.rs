//! Stat accumulation: folding a prefix of the event log into box-score totals.
//!
//! The fold is pure. The same `(record, end)` always produces an identical
//! [`AggregateState`], which is what makes arbitrary seeking safe: a backward
//! seek recomputes from scratch instead of decrementing counters in place.

use crate::{EventKind, GameEvent, GameRecord, ReboundType, Scores, Side};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerStatLine {
    pub points: u32,
    pub offensive_rebounds: u32,
    pub defensive_rebounds: u32,
    pub assists: u32,
    pub steals: u32,
    pub blocks: u32,
    pub turnovers: u32,
    pub field_goals_made: u32,
    pub field_goals_attempted: u32,
    pub three_pointers_made: u32,
    pub three_pointers_attempted: u32,
    pub free_throws_made: u32,
    pub free_throws_attempted: u32,
    pub seconds_played: u32,
    pub fouls: u32,
}

/// Team totals share the player counter layout.
pub type TeamStatLine = PlayerStatLine;

impl PlayerStatLine {
    pub fn rebounds(&self) -> u32 {
        self.offensive_rebounds + self.defensive_rebounds
    }

    pub fn minutes_played(&self) -> u32 {
        self.seconds_played / 60
    }

    /// Every counter in declaration order.
    pub fn counters(&self) -> [u32; 15] {
        [
            self.points,
            self.offensive_rebounds,
            self.defensive_rebounds,
            self.assists,
            self.steals,
            self.blocks,
            self.turnovers,
            self.field_goals_made,
            self.field_goals_attempted,
            self.three_pointers_made,
            self.three_pointers_attempted,
            self.free_throws_made,
            self.free_throws_attempted,
            self.seconds_played,
            self.fouls,
        ]
    }
}

/// Score plus box-score totals after some prefix of the event log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateState {
    pub scores: Scores,
    pub players: BTreeMap<String, PlayerStatLine>,
    pub teams: [TeamStatLine; 2],
}

impl AggregateState {
    pub fn team(&self, side: Side) -> &TeamStatLine {
        &self.teams[side.index()]
    }

    /// Zeroed line for players that have not registered a stat yet.
    pub fn player(&self, player_id: &str) -> PlayerStatLine {
        self.players.get(player_id).copied().unwrap_or_default()
    }

    /// Apply the same update to a player's line and to the line of the team
    /// they play for. Players missing from both rosters are attributed to
    /// `fallback`; the team total is skipped when that is unknown too.
    fn credit(
        &mut self,
        record: &GameRecord,
        player_id: &str,
        fallback: Option<Side>,
        update: impl Fn(&mut PlayerStatLine),
    ) {
        update(self.players.entry(player_id.to_string()).or_default());
        if let Some(side) = record.side_of(player_id).or(fallback) {
            update(&mut self.teams[side.index()]);
        }
    }

    /// Incremental update by a single event.
    pub fn apply(&mut self, record: &GameRecord, event: &GameEvent) {
        let actor = event.player_id.as_deref();
        match &event.kind {
            EventKind::ShotMade { points, shot_type, assist_player_id } => {
                let points = *points;
                let three = shot_type.is_three();
                if let Some(shooter) = actor {
                    self.credit(record, shooter, event.side, |line| {
                        line.points += points;
                        line.field_goals_made += 1;
                        line.field_goals_attempted += 1;
                        if three {
                            line.three_pointers_made += 1;
                            line.three_pointers_attempted += 1;
                        }
                    });
                }
                if let Some(passer) = assist_player_id {
                    self.credit(record, passer, event.side, |line| line.assists += 1);
                }
                if let Some(side) = event.side {
                    self.scores.add(side, points);
                }
            }
            EventKind::ShotMissed { shot_type } => {
                let three = shot_type.is_three();
                if let Some(shooter) = actor {
                    self.credit(record, shooter, event.side, |line| {
                        line.field_goals_attempted += 1;
                        if three {
                            line.three_pointers_attempted += 1;
                        }
                    });
                }
            }
            EventKind::FreeThrow { made, .. } => {
                let made = *made;
                if let Some(shooter) = actor {
                    self.credit(record, shooter, event.side, |line| {
                        line.free_throws_attempted += 1;
                        if made {
                            line.free_throws_made += 1;
                            line.points += 1;
                        }
                    });
                }
                if made && let Some(side) = event.side {
                    self.scores.add(side, 1);
                }
            }
            EventKind::Rebound { rebound_type } => {
                let offensive = *rebound_type == ReboundType::Offensive;
                if let Some(rebounder) = actor {
                    self.credit(record, rebounder, event.side, |line| {
                        if offensive {
                            line.offensive_rebounds += 1;
                        } else {
                            line.defensive_rebounds += 1;
                        }
                    });
                }
            }
            EventKind::Turnover { steal_player_id } => {
                if let Some(handler) = actor {
                    self.credit(record, handler, event.side, |line| line.turnovers += 1);
                }
                if let Some(thief) = steal_player_id {
                    let defense = event.side.map(Side::opponent);
                    self.credit(record, thief, defense, |line| line.steals += 1);
                }
            }
            EventKind::QuarterEnd { scores, .. } => {
                self.scores = *scores;
            }
            EventKind::GameOver { scores, player_states } => {
                self.scores = *scores;
                if let Some(states) = player_states {
                    for (player_id, snapshot) in states {
                        let current = self.player(player_id);
                        let blocks = snapshot.blocks.saturating_sub(current.blocks);
                        let fouls = snapshot.fouls.saturating_sub(current.fouls);
                        let seconds = snapshot.seconds_played.saturating_sub(current.seconds_played);
                        if blocks + fouls + seconds == 0 {
                            continue;
                        }
                        self.credit(record, player_id, None, |line| {
                            line.blocks += blocks;
                            line.fouls += fouls;
                            line.seconds_played += seconds;
                        });
                    }
                }
            }
            EventKind::TipOff | EventKind::Substitution { .. } | EventKind::Other(_) => {}
        }
    }
}

/// Fold `events[0..=end]` from an all-zero state. `None` is the empty prefix.
pub fn fold_prefix(record: &GameRecord, end: Option<usize>) -> AggregateState {
    let mut state = AggregateState::default();
    if let Some(end) = end {
        fold_range(&mut state, record, 0, end);
    }
    state
}

/// Continue folding `events[start..=end]` into an existing state.
pub fn fold_range(state: &mut AggregateState, record: &GameRecord, start: usize, end: usize) {
    let events = record.events();
    let end = end.min(events.len().saturating_sub(1));
    if start > end {
        return;
    }
    for event in &events[start..=end] {
        state.apply(record, event);
    }
}
