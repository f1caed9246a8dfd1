use crate::app::{App, MenuItem};
use crate::state::messages::LoadRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum KeyFlow {
    Continue,
    Quit,
}

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    load_requests: &mpsc::Sender<LoadRequest>,
) -> KeyFlow {
    let mut guard = app.lock().await;

    match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => return KeyFlow::Quit,

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Broadcast),
        (_, Char('2'), _) => guard.update_tab(MenuItem::BoxScore),
        (_, Char('3'), _) => guard.update_tab(MenuItem::Summary),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => guard.exit_help(),

        // Transport
        (_, Char(' '), _) => guard.toggle_play(),
        (_, Char('h') | KeyCode::Left, _) => guard.skip_to_previous_quarter(),
        (_, Char('l') | KeyCode::Right, _) => guard.skip_to_next_quarter(),
        (_, Char('g') | KeyCode::Home, _) => guard.skip_to_start(),
        (_, Char('G') | KeyCode::End, _) => guard.skip_to_end(),
        (_, Char('s'), _) => guard.cycle_speed(),

        // Play-by-play scrolling
        (MenuItem::Broadcast, Char('j') | KeyCode::Down, _) => guard.feed_scroll_back(),
        (MenuItem::Broadcast, Char('k') | KeyCode::Up, _) => guard.feed_scroll_forward(),

        // Box score
        (MenuItem::BoxScore, Char('t') | KeyCode::Tab, _) => guard.toggle_box_score_side(),

        (_, Char('R'), _) => {
            let ticket = guard.begin_load();
            drop(guard);
            let _ = load_requests.send(LoadRequest::Load { ticket }).await;
            return KeyFlow::Continue;
        }

        // Global
        (_, Char('f'), _) => guard.toggle_full_screen(),
        (_, Char('"'), _) => guard.toggle_show_logs(),

        _ => {}
    }

    KeyFlow::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_settings::AppSettings;
    use hoopcast_engine::client::sample_game;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn loaded_app() -> Arc<Mutex<App>> {
        let (ticks, _rx) = mpsc::channel(1);
        let mut app = App::new(AppSettings::default(), ticks);
        let ticket = app.begin_load();
        app.on_game_loaded(ticket, sample_game());
        Arc::new(Mutex::new(app))
    }

    #[tokio::test]
    async fn quit_keys_end_the_loop() {
        let app = loaded_app();
        let (tx, _rx) = mpsc::channel(1);
        assert_eq!(handle_key_bindings(press(Char('q')), &app, &tx).await, KeyFlow::Quit);
        let ctrl_c = KeyEvent::new(Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key_bindings(ctrl_c, &app, &tx).await, KeyFlow::Quit);
        assert_eq!(handle_key_bindings(press(Char('c')), &app, &tx).await, KeyFlow::Continue);
    }

    #[tokio::test]
    async fn jump_keys_move_the_cursor() {
        let app = loaded_app();
        let (tx, _rx) = mpsc::channel(1);

        handle_key_bindings(press(Char('G')), &app, &tx).await;
        assert!(app.lock().await.session.projection().unwrap().finished);

        handle_key_bindings(press(KeyCode::Left), &app, &tx).await;
        handle_key_bindings(press(Char('g')), &app, &tx).await;
        assert_eq!(app.lock().await.session.projection().unwrap().index, 0);
    }

    #[tokio::test]
    async fn reload_sends_a_fresh_ticket() {
        let app = loaded_app();
        let (tx, mut rx) = mpsc::channel(1);

        handle_key_bindings(press(Char('R')), &app, &tx).await;
        let Some(LoadRequest::Load { ticket }) = rx.recv().await else {
            panic!("expected a load request");
        };
        assert_eq!(ticket.game_id, AppSettings::default().game_id);
        assert!(!app.lock().await.session.is_playing());
    }

    #[tokio::test]
    async fn t_switches_team_only_on_box_score() {
        let app = loaded_app();
        let (tx, _rx) = mpsc::channel(1);

        handle_key_bindings(press(Char('t')), &app, &tx).await;
        assert_eq!(app.lock().await.state.box_score.side, hoopcast_engine::Side::Home);

        handle_key_bindings(press(Char('2')), &app, &tx).await;
        handle_key_bindings(press(Char('t')), &app, &tx).await;
        assert_eq!(app.lock().await.state.box_score.side, hoopcast_engine::Side::Away);
    }
}
