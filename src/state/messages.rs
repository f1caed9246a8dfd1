use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use hoopcast_engine::{GameRecord, LoadTicket, ReplayResult};

#[derive(Debug, Clone)]
pub enum LoadRequest {
    /// Fetch a game; supersedes any load still in flight.
    Load { ticket: LoadTicket },
    Cancel,
}

#[derive(Debug)]
pub enum LoadResponse {
    LoadingStateChanged { loading_state: LoadingState },
    GameLoaded { ticket: LoadTicket, result: ReplayResult<GameRecord> },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
