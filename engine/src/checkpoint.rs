//! Per-quarter aggregate snapshots for bulk seeks.
//!
//! The engine derives its own checkpoints by folding the event log once at
//! load. Upstream checkpoints shipped with the document are only compared
//! against these; they never feed the fold.

use crate::stats::{AggregateState, fold_prefix, fold_range};
use crate::{EventKind, GameRecord};
use log::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    /// Index of the `quarter_end` event this snapshot includes.
    pub event_index: usize,
    pub quarter: u8,
    pub state: AggregateState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointMismatch {
    pub checkpoint_id: String,
    pub quarter: u8,
    pub detail: String,
}

#[derive(Debug, Clone, Default)]
pub struct CheckpointIndex {
    checkpoints: Vec<Checkpoint>,
}

impl CheckpointIndex {
    pub fn build(record: &GameRecord) -> Self {
        let mut state = AggregateState::default();
        let mut checkpoints = Vec::new();
        for (index, event) in record.events().iter().enumerate() {
            state.apply(record, event);
            if let EventKind::QuarterEnd { quarter, .. } = event.kind {
                checkpoints.push(Checkpoint { event_index: index, quarter, state: state.clone() });
            }
        }
        debug!("built {} checkpoints for game {}", checkpoints.len(), record.info.game_id);
        Self { checkpoints }
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> {
        self.checkpoints.iter()
    }

    pub fn nearest_at_or_before(&self, index: usize) -> Option<&Checkpoint> {
        let after = self.checkpoints.partition_point(|cp| cp.event_index <= index);
        after.checked_sub(1).map(|i| &self.checkpoints[i])
    }

    /// Same result as [`fold_prefix`], starting from the nearest snapshot.
    pub fn fold_prefix(&self, record: &GameRecord, end: Option<usize>) -> AggregateState {
        let Some(end) = end else {
            return AggregateState::default();
        };
        match self.nearest_at_or_before(end) {
            Some(cp) => {
                let mut state = cp.state.clone();
                fold_range(&mut state, record, cp.event_index + 1, end);
                state
            }
            None => fold_prefix(record, Some(end)),
        }
    }

    /// Compare upstream checkpoints against the derived ones, matched by quarter.
    /// Mismatches are logged; the derived snapshot stays authoritative.
    pub fn cross_check(&self, record: &GameRecord) -> Vec<CheckpointMismatch> {
        let mut mismatches = Vec::new();
        for upstream in &record.checkpoints {
            let Some(derived) = self.checkpoints.iter().find(|cp| cp.quarter == upstream.quarter)
            else {
                mismatches.push(CheckpointMismatch {
                    checkpoint_id: upstream.checkpoint_id.clone(),
                    quarter: upstream.quarter,
                    detail: "no quarter_end event for this quarter".into(),
                });
                continue;
            };

            let mut push = |detail: String| {
                mismatches.push(CheckpointMismatch {
                    checkpoint_id: upstream.checkpoint_id.clone(),
                    quarter: upstream.quarter,
                    detail,
                })
            };

            if upstream.scores != derived.state.scores {
                push(format!(
                    "score {}-{} vs derived {}-{}",
                    upstream.scores.home,
                    upstream.scores.away,
                    derived.state.scores.home,
                    derived.state.scores.away
                ));
            }
            for (player_id, snap) in &upstream.players {
                let line = derived.state.player(player_id);
                let upstream_line = (snap.points, snap.offensive_rebounds + snap.defensive_rebounds, snap.assists);
                let derived_line = (line.points, line.rebounds(), line.assists);
                if upstream_line != derived_line {
                    push(format!(
                        "{player_id} pts/reb/ast {upstream_line:?} vs derived {derived_line:?}"
                    ));
                }
            }
        }

        for m in &mismatches {
            warn!(
                "upstream checkpoint {} (Q{}) disagrees with event log: {}",
                m.checkpoint_id, m.quarter, m.detail
            );
        }
        mismatches
    }
}
