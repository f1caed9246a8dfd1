use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use hoopcast_engine::summary::GameSummary;
use hoopcast_engine::{
    GameRecord, LoadTicket, PlaybackTick, ReplayError, ReplayResult, ReplaySession, SessionStatus,
    TickOutcome,
};
use log::{info, warn};
use tokio::sync::mpsc;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Broadcast,
    BoxScore,
    Summary,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    pub session: ReplaySession,
}

impl App {
    pub fn new(settings: AppSettings, ticks: mpsc::Sender<PlaybackTick>) -> Self {
        let app = Self {
            session: ReplaySession::new(ticks, settings.initial_speed),
            state: AppState::new(),
            settings,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Load lifecycle, driven by main_ui_loop
    // -----------------------------------------------------------------------

    pub fn begin_load(&mut self) -> LoadTicket {
        self.state.status_message = None;
        self.state.feed = Default::default();
        self.session.begin_load(self.settings.game_id.clone())
    }

    pub fn on_game_loaded(&mut self, ticket: LoadTicket, result: ReplayResult<GameRecord>) {
        if !self.session.finish_load(&ticket, result) {
            return;
        }
        if let SessionStatus::Failed(err) = self.session.status() {
            self.state.status_message = Some(err.to_string());
        }
    }

    /// Returns whether the screen needs a redraw.
    pub fn on_tick(&mut self, tick: PlaybackTick) -> bool {
        match self.session.on_tick(tick) {
            TickOutcome::Stale => false,
            TickOutcome::Advanced => true,
            TickOutcome::Completed => {
                info!("replay complete, switching to summary");
                self.update_tab(MenuItem::Summary);
                true
            }
        }
    }

    pub fn close(&mut self) {
        self.session.close();
    }

    pub fn summary(&self) -> Option<GameSummary> {
        let cursor = self.session.cursor().ok()?;
        cursor
            .is_finished()
            .then(|| GameSummary::new(cursor.record(), cursor.state()))
    }

    // -----------------------------------------------------------------------
    // Transport controls, delegated to ReplaySession
    // -----------------------------------------------------------------------

    pub fn toggle_play(&mut self) {
        let result = self.session.toggle_play();
        self.report(result);
    }

    pub fn cycle_speed(&mut self) {
        let next = self.session.speed().next_preset();
        let result = self.session.set_speed(next.multiplier()).map(|speed| {
            info!("playback speed {}", speed.label());
        });
        self.report(result);
    }

    pub fn skip_to_start(&mut self) {
        let result = self.session.skip_to_start();
        self.state.feed.scroll_offset = 0;
        self.report(result);
    }

    pub fn skip_to_end(&mut self) {
        let result = self.session.skip_to_end();
        self.state.feed.scroll_offset = 0;
        self.report(result);
    }

    pub fn skip_to_previous_quarter(&mut self) {
        let result = self.session.skip_to_previous_quarter().map(|_| ());
        self.state.feed.scroll_offset = 0;
        self.report(result);
    }

    pub fn skip_to_next_quarter(&mut self) {
        self.state.feed.scroll_offset = 0;
        match self.session.skip_to_next_quarter() {
            Ok(false) => self.state.status_message = Some("No quarter break ahead".to_string()),
            other => self.report(other.map(|_| ())),
        }
    }

    fn report(&mut self, result: ReplayResult<()>) {
        match result {
            Ok(()) => self.state.status_message = None,
            Err(ReplayError::NotReady) => {
                self.state.status_message = Some("Game still loading".to_string());
            }
            Err(err) => {
                warn!("{err}");
                self.state.status_message = Some(err.to_string());
            }
        }
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    pub fn feed_scroll_back(&mut self) {
        let visible = self.session.projection().map(|p| p.visible_events.len()).unwrap_or(0);
        self.state.feed.scroll_back(visible);
    }

    pub fn feed_scroll_forward(&mut self) {
        self.state.feed.scroll_forward();
    }

    pub fn toggle_box_score_side(&mut self) {
        self.state.box_score.toggle_side();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoopcast_engine::client::sample_game;

    fn loaded_app() -> (App, mpsc::Receiver<PlaybackTick>) {
        let (tx, rx) = mpsc::channel(1);
        let mut app = App::new(AppSettings::default(), tx);
        let ticket = app.begin_load();
        app.on_game_loaded(ticket, sample_game());
        (app, rx)
    }

    #[test]
    fn commands_before_load_show_a_notice() {
        let (tx, _rx) = mpsc::channel(1);
        let mut app = App::new(AppSettings::default(), tx);
        app.begin_load();
        app.skip_to_end();
        assert_eq!(app.state.status_message.as_deref(), Some("Game still loading"));
    }

    #[test]
    fn failed_load_is_shown() {
        let (tx, _rx) = mpsc::channel(1);
        let mut app = App::new(AppSettings::default(), tx);
        let ticket = app.begin_load();
        app.on_game_loaded(ticket, Err(ReplayError::LoadFailure("offline".into())));
        assert_eq!(
            app.state.status_message.as_deref(),
            Some("Failed to load game: offline")
        );
    }

    #[test]
    fn summary_only_after_the_final_event() {
        let (mut app, _rx) = loaded_app();
        assert!(app.summary().is_none());
        app.skip_to_end();
        let summary = app.summary().expect("summary at the final event");
        assert_eq!(summary.scores, app.session.projection().unwrap().scores);
    }

    #[tokio::test(start_paused = true)]
    async fn completed_playback_switches_to_summary() {
        let (mut app, mut rx) = loaded_app();
        app.skip_to_previous_quarter();
        app.skip_to_end();
        app.skip_to_previous_quarter();
        assert_eq!(app.state.active_tab, MenuItem::Broadcast);

        app.toggle_play();
        while app.session.is_playing() {
            let tick = rx.recv().await.unwrap();
            app.on_tick(tick);
        }
        assert_eq!(app.state.active_tab, MenuItem::Summary);
        assert!(app.summary().is_some());
    }
}
