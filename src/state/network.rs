use crate::state::messages::{LoadRequest, LoadResponse};
use hoopcast_engine::LoadTicket;
use hoopcast_engine::client::GameLoader;
use log::{debug, error};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Runs game fetches off the UI loop. At most one fetch is in flight; a new
/// request or a cancel aborts the previous one.
pub struct LoadWorker {
    loader: GameLoader,
    requests: mpsc::Receiver<LoadRequest>,
    responses: mpsc::Sender<LoadResponse>,
    is_loading: Arc<AtomicBool>,
    in_flight: Option<JoinHandle<()>>,
    spinner: Option<JoinHandle<()>>,
}

impl LoadWorker {
    pub fn new(
        loader: GameLoader,
        requests: mpsc::Receiver<LoadRequest>,
        responses: mpsc::Sender<LoadResponse>,
    ) -> Self {
        Self {
            loader,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
            in_flight: None,
            spinner: None,
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            match request {
                LoadRequest::Load { ticket } => {
                    self.cancel_in_flight();
                    self.start_loading_animation().await;
                    self.spawn_fetch(ticket);
                }
                LoadRequest::Cancel => {
                    if self.cancel_in_flight() {
                        self.stop_loading_animation(true).await;
                    }
                }
            }
        }
        self.cancel_in_flight();
    }

    fn spawn_fetch(&mut self, ticket: LoadTicket) {
        debug!("fetching game {} (load {})", ticket.game_id, ticket.generation);
        let loader = self.loader.clone();
        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        self.in_flight = Some(tokio::spawn(async move {
            let result = loader.fetch_game(&ticket.game_id).await;

            is_loading.store(false, Ordering::Relaxed);
            let spinner_char = if result.is_ok() { ' ' } else { ERROR_CHAR };
            let _ = responses
                .send(LoadResponse::LoadingStateChanged {
                    loading_state: LoadingState { is_loading: false, spinner_char },
                })
                .await;

            if let Err(e) = responses.send(LoadResponse::GameLoaded { ticket, result }).await {
                error!("Failed to send load response: {e}");
            }
        }));
    }

    /// Returns whether a fetch was actually aborted.
    fn cancel_in_flight(&mut self) -> bool {
        if let Some(spinner) = self.spinner.take() {
            spinner.abort();
        }
        match self.in_flight.take() {
            Some(task) if !task.is_finished() => {
                task.abort();
                self.is_loading.store(false, Ordering::Relaxed);
                debug!("aborted in-flight game fetch");
                true
            }
            _ => false,
        }
    }

    async fn start_loading_animation(&mut self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(LoadResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        self.spinner = Some(tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(LoadResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        }));
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(LoadResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoopcast_engine::client::GameSource;
    use hoopcast_engine::{PlaybackSpeed, ReplaySession};

    async fn next_game(responses: &mut mpsc::Receiver<LoadResponse>) -> LoadResponse {
        loop {
            match responses.recv().await {
                Some(LoadResponse::LoadingStateChanged { .. }) => continue,
                Some(other) => return other,
                None => panic!("worker hung up"),
            }
        }
    }

    #[tokio::test]
    async fn loads_the_embedded_game() {
        let (req_tx, req_rx) = mpsc::channel(8);
        let (resp_tx, mut resp_rx) = mpsc::channel(64);
        let worker = LoadWorker::new(GameLoader::new(GameSource::Embedded), req_rx, resp_tx);
        let task = tokio::spawn(worker.run());

        let (ticks, _) = mpsc::channel(1);
        let mut session = ReplaySession::new(ticks, PlaybackSpeed::default());
        let ticket = session.begin_load("sample");
        req_tx.send(LoadRequest::Load { ticket }).await.unwrap();

        let LoadResponse::GameLoaded { ticket, result } = next_game(&mut resp_rx).await else {
            panic!("expected a loaded game");
        };
        assert!(session.finish_load(&ticket, result));
        assert!(session.projection().is_ok());
        task.abort();
    }

    #[tokio::test]
    async fn failed_fetch_reports_a_load_failure() {
        let (req_tx, req_rx) = mpsc::channel(8);
        let (resp_tx, mut resp_rx) = mpsc::channel(64);
        let loader = GameLoader::new(GameSource::File("/nonexistent/hoopcast.json".into()));
        let task = tokio::spawn(LoadWorker::new(loader, req_rx, resp_tx).run());

        let ticket = LoadTicket { generation: 1, game_id: "x".into() };
        req_tx.send(LoadRequest::Load { ticket }).await.unwrap();

        let LoadResponse::GameLoaded { result, .. } = next_game(&mut resp_rx).await else {
            panic!("expected a load result");
        };
        assert!(matches!(result, Err(hoopcast_engine::ReplayError::LoadFailure(_))));
        task.abort();
    }
}
