mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::keys::KeyFlow;
use crate::state::app_settings::AppSettings;
use crate::state::messages::{LoadRequest, LoadResponse, UiEvent};
use crate::state::network::{LoadWorker, LoadingState};
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use hoopcast_engine::PlaybackTick;
use hoopcast_engine::client::GameLoader;
use log::error;
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tokio::time::Duration;
use tui::{Terminal, backend::CrosstermBackend};

const INPUT_POLL: Duration = Duration::from_millis(200);

enum Cli {
    Run { game_id: Option<String> },
    Exit,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let game_id = match handle_cli_args() {
        Cli::Run { game_id } => game_id,
        Cli::Exit => return Ok(()),
    };

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Info)?;
    tui_logger::set_default_level(log::LevelFilter::Warn);

    let mut settings = AppSettings::load();
    if let Some(game_id) = game_id {
        settings.game_id = game_id;
    }
    let loader = GameLoader::new(settings.source.clone());

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (load_req_tx, load_req_rx) = mpsc::channel::<LoadRequest>(100);
    let (load_resp_tx, load_resp_rx) = mpsc::channel::<LoadResponse>(100);
    // A single slot: ticks the loop has not drained yet are dropped, not queued.
    let (tick_tx, tick_rx) = mpsc::channel::<PlaybackTick>(1);

    let app = Arc::new(Mutex::new(App::new(settings, tick_tx)));

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Loader thread
    let load_worker = LoadWorker::new(loader, load_req_rx, load_resp_tx);
    let load_task = tokio::spawn(load_worker.run());

    // Trigger the first load on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    let terminal = main_ui_loop(
        terminal,
        app.clone(),
        ui_event_rx,
        load_req_tx.clone(),
        load_resp_rx,
        tick_rx,
    )
    .await;

    app.lock().await.close();
    let _ = load_req_tx.send(LoadRequest::Cancel).await;
    input_handler.abort();
    load_task.abort();

    drop(terminal);
    cleanup_terminal();
    Ok(())
}

fn handle_cli_args() -> Cli {
    let mut game_id = None;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{}", usage_text());
                return Cli::Exit;
            }
            "-V" | "--version" => {
                println!("hoopcast {}", env!("CARGO_PKG_VERSION"));
                return Cli::Exit;
            }
            flag if flag.starts_with('-') => {
                eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
                std::process::exit(2);
            }
            _ if game_id.is_some() => {
                eprintln!("Unexpected argument: {arg}\n\n{}", usage_text());
                std::process::exit(2);
            }
            _ => game_id = Some(arg),
        }
    }

    Cli::Run { game_id }
}

fn usage_text() -> &'static str {
    "hoopcast - basketball game replay in the terminal

Usage:
  hoopcast [GAME_ID]
  hoopcast --help
  hoopcast --version

GAME_ID is requested from HOOPCAST_BASE_URL when set; otherwise the bundled
sample game is replayed.

Environment:
  HOOPCAST_GAME_JSON   Path to a local game JSON file (takes precedence)
  HOOPCAST_BASE_URL    Game server base URL, fetched as <url>/game_<id>.json
  HOOPCAST_SPEED       Initial playback speed, 0.5 to 2.0 (default 1)
  HOOPCAST_LOG         Log level for the log pane (error, warn, info, debug)"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    load_requests: mpsc::Sender<LoadRequest>,
    mut load_responses: mpsc::Receiver<LoadResponse>,
    mut ticks: mpsc::Receiver<PlaybackTick>,
) -> Terminal<CrosstermBackend<Stdout>> {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let Some(should_redraw) = handle_ui_event(ui_event, &app, &load_requests).await else {
                    break;
                };
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = load_responses.recv() => {
                handle_load_response(response, &app, &mut loading).await;
                let mut app_guard = app.lock().await;
                draw::draw(&mut terminal, &mut app_guard, loading);
            }

            Some(tick) = ticks.recv() => {
                let mut app_guard = app.lock().await;
                if app_guard.on_tick(tick) {
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            else => break,
        }
    }

    terminal
}

/// Returns whether to redraw, or `None` to quit.
async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    load_requests: &mpsc::Sender<LoadRequest>,
) -> Option<bool> {
    match ui_event {
        UiEvent::AppStarted => {
            let ticket = app.lock().await.begin_load();
            if load_requests.send(LoadRequest::Load { ticket }).await.is_err() {
                error!("load worker is gone");
            }
            Some(true)
        }
        UiEvent::KeyPressed(key_event) => match keys::handle_key_bindings(key_event, app, load_requests).await {
            KeyFlow::Quit => None,
            KeyFlow::Continue => Some(true),
        },
        UiEvent::Resize => Some(true),
    }
}

async fn handle_load_response(response: LoadResponse, app: &Arc<Mutex<App>>, loading: &mut LoadingState) {
    match response {
        LoadResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
        }
        LoadResponse::GameLoaded { ticket, result } => {
            app.lock().await.on_game_loaded(ticket, result);
        }
    }
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        // Bounded poll: abort only lands at an await point.
        match crossterm_event::poll(INPUT_POLL) {
            Ok(true) => {}
            Ok(false) => {
                tokio::task::yield_now().await;
                continue;
            }
            Err(err) => {
                error!("terminal input error: {err}");
                break;
            }
        }

        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
