//! The replay state machine.
//!
//! A cursor always sits on an event of a loaded record (index 0 after load or
//! reset). Everything the view may show is derived from the prefix
//! `events[0..=index]`; nothing past the cursor is ever exposed.

use crate::checkpoint::CheckpointIndex;
use crate::error::{ReplayError, ReplayResult};
use crate::stats::{AggregateState, PlayerStatLine, TeamStatLine};
use crate::{GameClock, GameEvent, GameRecord, Scores};
use log::{debug, warn};
use std::collections::BTreeMap;

/// Outcome of [`ReplayCursor::advance_one`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved onto an ordinary event.
    Moved,
    /// Moved onto the terminal `game_over` event.
    ReachedEnd,
    /// Already on the terminal event (or the last event); nothing changed.
    AlreadyFinished,
}

impl Advance {
    pub fn is_finished(self) -> bool {
        matches!(self, Advance::ReachedEnd | Advance::AlreadyFinished)
    }
}

/// Read-only view of the cursor handed to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct Projection<'a> {
    pub index: usize,
    pub scores: Scores,
    pub clock: &'a GameClock,
    pub players: &'a BTreeMap<String, PlayerStatLine>,
    pub teams: &'a [TeamStatLine; 2],
    /// Exactly `events[0..=index]`.
    pub visible_events: &'a [GameEvent],
    pub finished: bool,
}

#[derive(Debug)]
pub struct ReplayCursor {
    record: GameRecord,
    checkpoints: CheckpointIndex,
    index: usize,
    state: AggregateState,
    clock: GameClock,
}

impl ReplayCursor {
    pub fn new(record: GameRecord) -> Self {
        let checkpoints = CheckpointIndex::build(&record);
        checkpoints.cross_check(&record);
        let mut cursor = Self {
            record,
            checkpoints,
            index: 0,
            state: AggregateState::default(),
            clock: GameClock::default(),
        };
        cursor.jump_to(0);
        cursor
    }

    pub fn record(&self) -> &GameRecord {
        &self.record
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self) -> &AggregateState {
        &self.state
    }

    pub fn current_event(&self) -> &GameEvent {
        &self.record.events()[self.index]
    }

    /// On the terminal event, or on the last event of a log without one.
    pub fn is_finished(&self) -> bool {
        self.current_event().kind.is_game_over() || self.index + 1 >= self.record.len()
    }

    /// Back to the first event with zeroed aggregates.
    pub fn reset(&mut self) {
        self.seek_to_start();
    }

    pub fn advance_one(&mut self) -> Advance {
        if self.is_finished() {
            return Advance::AlreadyFinished;
        }
        self.index += 1;
        let event = &self.record.events()[self.index];
        self.state.apply(&self.record, event);
        self.clock = event.clock();

        if event.kind.is_game_over() {
            debug!("replay reached game_over at index {}", self.index);
            Advance::ReachedEnd
        } else {
            Advance::Moved
        }
    }

    /// Jump forward to the next `quarter_end`. Returns `false` (and stays put)
    /// when no boundary lies ahead.
    pub fn seek_to_next_quarter_boundary(&mut self) -> bool {
        let ahead = self.index + 1;
        let Some(offset) = self.record.events()[ahead.min(self.record.len())..]
            .iter()
            .position(|e| e.kind.is_quarter_end())
        else {
            return false;
        };
        self.jump_to(ahead + offset);
        true
    }

    /// Jump back to the nearest earlier `quarter_end`, or to the first event
    /// when there is none. Returns `false` when already at the first event.
    pub fn seek_to_previous_quarter_boundary(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        let target = self.record.events()[..self.index]
            .iter()
            .rposition(|e| e.kind.is_quarter_end())
            .unwrap_or(0);
        self.jump_to(target);
        true
    }

    pub fn seek_to_start(&mut self) {
        self.jump_to(0);
    }

    /// Jump to the terminal event. A log without one is reported rather than
    /// approximated by its last event.
    pub fn seek_to_end(&mut self) -> ReplayResult<()> {
        let Some(end) = self.record.game_over_index() else {
            warn!("seek to end requested but game {} has no game_over event", self.record.info.game_id);
            return Err(ReplayError::MissingGameOver);
        };
        self.jump_to(end);
        Ok(())
    }

    pub fn projection(&self) -> Projection<'_> {
        Projection {
            index: self.index,
            scores: self.state.scores,
            clock: &self.clock,
            players: &self.state.players,
            teams: &self.state.teams,
            visible_events: &self.record.events()[..=self.index],
            finished: self.is_finished(),
        }
    }

    /// Recompute from scratch (via the nearest checkpoint); counters are never
    /// decremented in place.
    fn jump_to(&mut self, index: usize) {
        self.index = index;
        self.state = self.checkpoints.fold_prefix(&self.record, Some(index));
        if let Some(scores) = self.current_event().kind.authoritative_scores() {
            debug_assert_eq!(self.state.scores, scores);
            self.state.scores = scores;
        }
        self.clock = self.current_event().clock();
    }
}
