//! One replay session: load lifecycle plus the transport commands the view
//! sends. Playback and seeking are mutually exclusive; every seek stops the
//! timer first.

use crate::cursor::{Advance, Projection, ReplayCursor};
use crate::error::{ReplayError, ReplayResult};
use crate::scheduler::{PlaybackScheduler, PlaybackSpeed, PlaybackTick};
use crate::GameRecord;
use log::{debug, info, warn};
use tokio::sync::mpsc;

/// Identifies one load request. Results carrying an older generation are
/// discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub game_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// From a stopped or replaced timer, or no replay is active.
    Stale,
    Advanced,
    /// The cursor reached the terminal event and playback stopped.
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus<'a> {
    Idle,
    Loading,
    Ready,
    Failed(&'a ReplayError),
    Closed,
}

#[derive(Debug)]
struct Replay {
    cursor: ReplayCursor,
    scheduler: PlaybackScheduler,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Loading,
    Ready(Box<Replay>),
    Failed(ReplayError),
    Closed,
}

#[derive(Debug)]
pub struct ReplaySession {
    phase: Phase,
    ticks: mpsc::Sender<PlaybackTick>,
    speed: PlaybackSpeed,
    generation: u64,
    game_id: Option<String>,
}

impl ReplaySession {
    pub fn new(ticks: mpsc::Sender<PlaybackTick>, speed: PlaybackSpeed) -> Self {
        Self {
            phase: Phase::Idle,
            ticks,
            speed,
            generation: 0,
            game_id: None,
        }
    }

    pub fn status(&self) -> SessionStatus<'_> {
        match &self.phase {
            Phase::Idle => SessionStatus::Idle,
            Phase::Loading => SessionStatus::Loading,
            Phase::Ready(_) => SessionStatus::Ready,
            Phase::Failed(err) => SessionStatus::Failed(err),
            Phase::Closed => SessionStatus::Closed,
        }
    }

    pub fn game_id(&self) -> Option<&str> {
        self.game_id.as_deref()
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    pub fn is_playing(&self) -> bool {
        matches!(&self.phase, Phase::Ready(replay) if replay.scheduler.is_running())
    }

    /// Start a new session for `game_id`. Any previous replay is torn down
    /// and any in-flight load is superseded.
    pub fn begin_load(&mut self, game_id: impl Into<String>) -> LoadTicket {
        self.generation += 1;
        let game_id = game_id.into();
        info!("loading game {game_id}");
        self.phase = Phase::Loading;
        self.game_id = Some(game_id.clone());
        LoadTicket { generation: self.generation, game_id }
    }

    /// Apply a finished load. Returns `false` when the result was stale.
    pub fn finish_load(&mut self, ticket: &LoadTicket, result: ReplayResult<GameRecord>) -> bool {
        if ticket.generation != self.generation || !matches!(self.phase, Phase::Loading) {
            debug!(
                "discarding stale load result for game {} (generation {})",
                ticket.game_id, ticket.generation
            );
            return false;
        }
        self.phase = match result {
            Ok(record) => {
                info!("game {} ready: {} events", ticket.game_id, record.len());
                Phase::Ready(Box::new(Replay {
                    cursor: ReplayCursor::new(record),
                    scheduler: PlaybackScheduler::new(self.ticks.clone())
                        .for_session(ticket.generation),
                }))
            }
            Err(err) => {
                warn!("game {} failed to load: {err}", ticket.game_id);
                Phase::Failed(err)
            }
        };
        true
    }

    /// Tear down: stop playback, drop the cursor, ignore later load results.
    pub fn close(&mut self) {
        if let Phase::Ready(replay) = &mut self.phase {
            replay.scheduler.stop();
        }
        self.generation += 1;
        self.phase = Phase::Closed;
    }

    fn replay(&self) -> ReplayResult<&Replay> {
        match &self.phase {
            Phase::Ready(replay) => Ok(replay),
            _ => Err(ReplayError::NotReady),
        }
    }

    fn replay_mut(&mut self) -> ReplayResult<&mut Replay> {
        match &mut self.phase {
            Phase::Ready(replay) => Ok(replay),
            _ => Err(ReplayError::NotReady),
        }
    }

    /// Stop playback, then run a seek on the cursor.
    fn seek<T>(&mut self, op: impl FnOnce(&mut ReplayCursor) -> T) -> ReplayResult<T> {
        let replay = self.replay_mut()?;
        replay.scheduler.stop();
        Ok(op(&mut replay.cursor))
    }

    pub fn cursor(&self) -> ReplayResult<&ReplayCursor> {
        Ok(&self.replay()?.cursor)
    }

    pub fn record(&self) -> ReplayResult<&GameRecord> {
        Ok(self.replay()?.cursor.record())
    }

    pub fn projection(&self) -> ReplayResult<Projection<'_>> {
        Ok(self.replay()?.cursor.projection())
    }

    /// Start playback. Playing from the terminal event is a no-op.
    pub fn play(&mut self) -> ReplayResult<()> {
        let speed = self.speed;
        let replay = self.replay_mut()?;
        if replay.cursor.is_finished() {
            debug!("play ignored: replay already at the final event");
            return Ok(());
        }
        replay.scheduler.start(speed);
        Ok(())
    }

    pub fn pause(&mut self) -> ReplayResult<()> {
        self.replay_mut()?.scheduler.stop();
        Ok(())
    }

    pub fn toggle_play(&mut self) -> ReplayResult<()> {
        if self.is_playing() { self.pause() } else { self.play() }
    }

    pub fn set_speed(&mut self, multiplier: f64) -> ReplayResult<PlaybackSpeed> {
        let speed = PlaybackSpeed::new(multiplier);
        self.replay_mut()?.scheduler.set_speed(speed);
        self.speed = speed;
        Ok(speed)
    }

    pub fn skip_to_start(&mut self) -> ReplayResult<()> {
        self.seek(ReplayCursor::seek_to_start)
    }

    pub fn skip_to_end(&mut self) -> ReplayResult<()> {
        self.seek(ReplayCursor::seek_to_end)?
    }

    pub fn skip_to_previous_quarter(&mut self) -> ReplayResult<bool> {
        self.seek(ReplayCursor::seek_to_previous_quarter_boundary)
    }

    pub fn skip_to_next_quarter(&mut self) -> ReplayResult<bool> {
        self.seek(ReplayCursor::seek_to_next_quarter_boundary)
    }

    /// Handle one scheduler tick.
    pub fn on_tick(&mut self, tick: PlaybackTick) -> TickOutcome {
        let Phase::Ready(replay) = &mut self.phase else {
            return TickOutcome::Stale;
        };
        if !replay.scheduler.accepts(tick) {
            return TickOutcome::Stale;
        }
        match replay.cursor.advance_one() {
            Advance::Moved => TickOutcome::Advanced,
            Advance::ReachedEnd | Advance::AlreadyFinished => {
                replay.scheduler.stop();
                info!("replay of game {} complete", replay.cursor.record().info.game_id);
                TickOutcome::Completed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use crate::Scores;
    use std::time::Duration;

    fn session() -> (ReplaySession, mpsc::Receiver<PlaybackTick>) {
        let (tx, rx) = mpsc::channel(1);
        (ReplaySession::new(tx, PlaybackSpeed::default()), rx)
    }

    fn ready(record: GameRecord) -> (ReplaySession, mpsc::Receiver<PlaybackTick>) {
        let (mut session, rx) = session();
        let ticket = session.begin_load("test");
        assert!(session.finish_load(&ticket, Ok(record)));
        (session, rx)
    }

    #[test]
    fn commands_before_load_are_not_ready() {
        let (mut session, _rx) = session();
        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.play(), Err(ReplayError::NotReady));
        assert_eq!(session.skip_to_end(), Err(ReplayError::NotReady));
        assert_eq!(session.set_speed(2.0), Err(ReplayError::NotReady));

        session.begin_load("test");
        assert_eq!(session.status(), SessionStatus::Loading);
        assert_eq!(session.skip_to_next_quarter(), Err(ReplayError::NotReady));
        assert!(matches!(session.projection(), Err(ReplayError::NotReady)));
    }

    #[test]
    fn failed_load_is_terminal_for_the_session() {
        let (mut session, _rx) = session();
        let ticket = session.begin_load("404");
        session.finish_load(&ticket, Err(ReplayError::LoadFailure("not found".into())));
        assert!(matches!(session.status(), SessionStatus::Failed(ReplayError::LoadFailure(_))));
        assert_eq!(session.play(), Err(ReplayError::NotReady));
    }

    #[test]
    fn stale_load_results_are_discarded() {
        let (mut session, _rx) = session();
        let old = session.begin_load("first");
        let new = session.begin_load("second");
        assert!(!session.finish_load(&old, Ok(scenario())));
        assert_eq!(session.status(), SessionStatus::Loading);
        assert!(session.finish_load(&new, Ok(two_quarters())));
        assert_eq!(session.record().unwrap().len(), two_quarters().len());
    }

    #[test]
    fn results_after_close_are_discarded() {
        let (mut session, _rx) = session();
        let ticket = session.begin_load("test");
        session.close();
        assert!(!session.finish_load(&ticket, Ok(scenario())));
        assert_eq!(session.status(), SessionStatus::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn start_then_immediate_stop_keeps_position() {
        let (mut session, mut rx) = ready(scenario());
        session.play().unwrap();
        session.pause().unwrap();

        let waited = tokio::time::timeout(Duration::from_secs(3), rx.recv()).await;
        assert!(waited.is_err());
        assert_eq!(session.projection().unwrap().index, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn playback_runs_to_completion() {
        let (mut session, mut rx) = ready(scenario());
        session.play().unwrap();

        let mut outcomes = Vec::new();
        while session.is_playing() {
            let tick = rx.recv().await.unwrap();
            outcomes.push(session.on_tick(tick));
        }
        assert_eq!(
            outcomes,
            vec![
                TickOutcome::Advanced,
                TickOutcome::Advanced,
                TickOutcome::Advanced,
                TickOutcome::Completed
            ]
        );
        let view = session.projection().unwrap();
        assert!(view.finished);
        assert_eq!(view.scores, Scores::new(2, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn speed_change_neither_skips_nor_repeats() {
        let (mut session, mut rx) = ready(two_quarters());
        session.play().unwrap();

        let tick = rx.recv().await.unwrap();
        assert_eq!(session.on_tick(tick), TickOutcome::Advanced);
        assert_eq!(session.projection().unwrap().index, 1);

        session.set_speed(2.0).unwrap();
        assert!(session.is_playing());
        // A tick from the replaced timer must not move the cursor.
        assert_eq!(session.on_tick(tick), TickOutcome::Stale);
        assert_eq!(session.projection().unwrap().index, 1);

        let tick = rx.recv().await.unwrap();
        assert_eq!(session.on_tick(tick), TickOutcome::Advanced);
        assert_eq!(session.projection().unwrap().index, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn seeking_stops_playback() {
        let (mut session, _rx) = ready(two_quarters());
        session.play().unwrap();
        assert!(session.is_playing());

        assert_eq!(session.skip_to_next_quarter(), Ok(true));
        assert!(!session.is_playing());
        assert_eq!(session.projection().unwrap().scores, Scores::new(3, 3));

        session.play().unwrap();
        session.skip_to_end().unwrap();
        assert!(!session.is_playing());
        assert!(session.projection().unwrap().finished);

        session.play().unwrap();
        assert!(!session.is_playing(), "play at the final event is a no-op");

        session.skip_to_previous_quarter().unwrap();
        session.skip_to_start().unwrap();
        assert_eq!(session.projection().unwrap().index, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn close_stops_the_timer() {
        let (mut session, mut rx) = ready(scenario());
        session.play().unwrap();
        session.close();
        let waited = tokio::time::timeout(Duration::from_secs(3), rx.recv()).await;
        assert!(waited.is_err());
        assert_eq!(
            session.on_tick(PlaybackTick { session: 1, generation: 1 }),
            TickOutcome::Stale
        );
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_from_a_previous_session_are_stale() {
        let (mut session, mut rx) = ready(two_quarters());
        session.play().unwrap();
        let old_tick = rx.recv().await.unwrap();

        let ticket = session.begin_load("reloaded");
        assert!(session.finish_load(&ticket, Ok(two_quarters())));
        session.play().unwrap();

        assert_eq!(session.on_tick(old_tick), TickOutcome::Stale);
        assert_eq!(session.projection().unwrap().index, 0);

        let fresh = rx.recv().await.unwrap();
        assert_eq!(session.on_tick(fresh), TickOutcome::Advanced);
        assert_eq!(session.projection().unwrap().index, 1);
    }
}
