use log::{debug, warn};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

/// One event per second at 1.0x.
pub const BASE_INTERVAL: Duration = Duration::from_millis(1000);
pub const MIN_SPEED: f64 = 0.5;
pub const MAX_SPEED: f64 = 2.0;
const PRESETS: [f64; 3] = [0.5, 1.0, 2.0];

/// Speed multiplier, always within [`MIN_SPEED`, `MAX_SPEED`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSpeed(f64);

impl Default for PlaybackSpeed {
    fn default() -> Self {
        Self(1.0)
    }
}

impl PlaybackSpeed {
    /// Clamps out-of-range multipliers; non-finite input falls back to 1.0.
    pub fn new(multiplier: f64) -> Self {
        if !multiplier.is_finite() {
            warn!("ignoring non-finite playback speed {multiplier}");
            return Self::default();
        }
        let clamped = multiplier.clamp(MIN_SPEED, MAX_SPEED);
        if clamped != multiplier {
            warn!("playback speed {multiplier}x clamped to {clamped}x");
        }
        Self(clamped)
    }

    pub fn multiplier(self) -> f64 {
        self.0
    }

    pub fn interval(self, base: Duration) -> Duration {
        base.div_f64(self.0)
    }

    /// Next preset up, wrapping from the fastest back to the slowest.
    pub fn next_preset(self) -> Self {
        let next = PRESETS.iter().find(|p| **p > self.0).copied().unwrap_or(PRESETS[0]);
        Self(next)
    }

    pub fn label(self) -> String {
        format!("{}x", self.0)
    }
}

/// Tick emitted by a running timer. `session` identifies the scheduler's owner
/// and `generation` the timer, so that ticks already queued by a stopped or
/// replaced timer, or by a torn-down session's timer, can be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackTick {
    pub session: u64,
    pub generation: u64,
}

/// Drives playback by emitting [`PlaybackTick`]s at `base / speed`.
///
/// There is never more than one timer task. Ticks are delivered with
/// `try_send`, so a slow consumer sees at most the channel's capacity of
/// pending ticks rather than a growing backlog.
#[derive(Debug)]
pub struct PlaybackScheduler {
    ticks: mpsc::Sender<PlaybackTick>,
    base_interval: Duration,
    speed: PlaybackSpeed,
    session: u64,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl PlaybackScheduler {
    pub fn new(ticks: mpsc::Sender<PlaybackTick>) -> Self {
        Self::with_base_interval(ticks, BASE_INTERVAL)
    }

    pub fn with_base_interval(ticks: mpsc::Sender<PlaybackTick>, base_interval: Duration) -> Self {
        Self {
            ticks,
            base_interval,
            speed: PlaybackSpeed::default(),
            session: 0,
            generation: 0,
            timer: None,
        }
    }

    /// Tag every tick with `session`. Schedulers sharing one channel must use
    /// distinct ids.
    pub fn for_session(mut self, session: u64) -> Self {
        self.session = session;
        self
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    pub fn period(&self) -> Duration {
        self.speed.interval(self.base_interval)
    }

    /// Start ticking. Calling this while running replaces the existing timer.
    pub fn start(&mut self, speed: PlaybackSpeed) {
        self.speed = speed;
        self.restart();
    }

    /// Cancel the timer. Idempotent.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            self.generation += 1;
            debug!("playback stopped");
        }
    }

    /// Change cadence; a running timer restarts at the new period.
    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        self.speed = speed;
        if self.is_running() {
            self.restart();
        }
    }

    /// Whether a tick came from the timer that is currently running.
    pub fn accepts(&self, tick: PlaybackTick) -> bool {
        self.is_running() && tick.session == self.session && tick.generation == self.generation
    }

    fn restart(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.generation += 1;

        let tick = PlaybackTick { session: self.session, generation: self.generation };
        let period = self.period();
        let ticks = self.ticks.clone();
        debug!("playback timer {} started at {:?} per event", tick.generation, period);

        self.timer = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                match ticks.try_send(tick) {
                    Ok(()) | Err(TrySendError::Full(_)) => {}
                    Err(TrySendError::Closed(_)) => break,
                }
            }
        }));
    }
}

impl Drop for PlaybackScheduler {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Paused-clock timers fire on millisecond boundaries.
    fn assert_elapsed(since: Instant, expected: Duration) {
        let elapsed = since.elapsed();
        assert!(
            elapsed >= expected && elapsed <= expected + Duration::from_millis(1),
            "expected ~{expected:?}, got {elapsed:?}"
        );
    }

    #[test]
    fn speed_is_clamped_into_range() {
        assert_eq!(PlaybackSpeed::new(4.0).multiplier(), MAX_SPEED);
        assert_eq!(PlaybackSpeed::new(0.1).multiplier(), MIN_SPEED);
        assert_eq!(PlaybackSpeed::new(1.5).multiplier(), 1.5);
        assert_eq!(PlaybackSpeed::new(f64::NAN).multiplier(), 1.0);
    }

    #[test]
    fn speed_interval_scales_base() {
        assert_eq!(PlaybackSpeed::new(2.0).interval(BASE_INTERVAL), Duration::from_millis(500));
        assert_eq!(PlaybackSpeed::new(0.5).interval(BASE_INTERVAL), Duration::from_millis(2000));
    }

    #[test]
    fn presets_cycle() {
        let speed = PlaybackSpeed::default();
        assert_eq!(speed.next_preset().multiplier(), 2.0);
        assert_eq!(speed.next_preset().next_preset().multiplier(), 0.5);
        assert_eq!(PlaybackSpeed::new(1.5).next_preset().multiplier(), 2.0);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_arrive_at_the_configured_cadence() {
        let (tx, mut rx) = mpsc::channel(1);
        let mut scheduler = PlaybackScheduler::new(tx);
        let started = Instant::now();
        scheduler.start(PlaybackSpeed::default());

        let tick = rx.recv().await.unwrap();
        assert!(scheduler.accepts(tick));
        assert_elapsed(started, Duration::from_millis(1000));

        rx.recv().await.unwrap();
        assert_elapsed(started, Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_first_tick_emits_nothing() {
        let (tx, mut rx) = mpsc::channel(1);
        let mut scheduler = PlaybackScheduler::new(tx);
        scheduler.start(PlaybackSpeed::default());
        scheduler.stop();
        scheduler.stop();

        let waited = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(waited.is_err(), "no tick after stop");
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_the_previous_timer() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut scheduler = PlaybackScheduler::new(tx);
        let started = Instant::now();
        scheduler.start(PlaybackSpeed::default());
        scheduler.start(PlaybackSpeed::default());

        let tick = rx.recv().await.unwrap();
        assert!(scheduler.accepts(tick));
        assert_elapsed(started, Duration::from_millis(1000));
        let more = tokio::time::timeout(Duration::from_millis(900), rx.recv()).await;
        assert!(more.is_err(), "only one timer may be ticking");
    }

    #[tokio::test(start_paused = true)]
    async fn speed_change_restarts_at_new_period() {
        let (tx, mut rx) = mpsc::channel(1);
        let mut scheduler = PlaybackScheduler::new(tx);
        scheduler.start(PlaybackSpeed::default());
        let first = rx.recv().await.unwrap();

        scheduler.set_speed(PlaybackSpeed::new(2.0));
        assert!(!scheduler.accepts(first), "ticks from the old timer are stale");

        let changed = Instant::now();
        let tick = rx.recv().await.unwrap();
        assert!(scheduler.accepts(tick));
        assert_elapsed(changed, Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_from_another_session_are_rejected() {
        let (tx, mut rx) = mpsc::channel(1);
        let mut old = PlaybackScheduler::new(tx.clone()).for_session(1);
        old.start(PlaybackSpeed::default());
        let stale = rx.recv().await.unwrap();
        drop(old);

        let mut new = PlaybackScheduler::new(tx).for_session(2);
        new.start(PlaybackSpeed::default());
        assert_eq!(stale.generation, 1);
        assert!(!new.accepts(stale), "same timer generation, different session");
        let tick = rx.recv().await.unwrap();
        assert!(new.accepts(tick));
    }

    #[tokio::test(start_paused = true)]
    async fn set_speed_while_stopped_does_not_start() {
        let (tx, _rx) = mpsc::channel(1);
        let mut scheduler = PlaybackScheduler::new(tx);
        scheduler.set_speed(PlaybackSpeed::new(0.5));
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.period(), Duration::from_millis(2000));
    }
}
