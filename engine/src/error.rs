use std::fmt;

pub type ReplayResult<T> = Result<T, ReplayError>;
pub type LoadResult<T> = Result<T, LoadError>;

/// Errors surfaced by the replay engine to the view.
///
/// Every variant ends the replay session except `NotReady`, which only means
/// the caller raced the initial load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// The game document could not be fetched or parsed.
    LoadFailure(String),
    /// The document parsed but breaks an event-log invariant.
    MalformedRecord(String),
    /// No `game_over` event exists, so the end of the game cannot be located.
    MissingGameOver,
    /// A cursor operation was invoked before a game record finished loading.
    NotReady,
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::LoadFailure(msg) => write!(f, "Failed to load game: {msg}"),
            ReplayError::MalformedRecord(msg) => write!(f, "Malformed game record: {msg}"),
            ReplayError::MissingGameOver => write!(f, "Malformed game record: no game_over event"),
            ReplayError::NotReady => write!(f, "Replay not ready: game record is still loading"),
        }
    }
}

impl std::error::Error for ReplayError {}

/// Transport-level failures from [`crate::client::GameLoader`].
#[derive(Debug)]
pub enum LoadError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(String, String),
    NotFound(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            LoadError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            LoadError::Parsing(e, source) => write!(f, "Parse error for {source}: {e}"),
            LoadError::NotFound(msg) => write!(f, "Not found: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<LoadError> for ReplayError {
    fn from(err: LoadError) -> Self {
        ReplayError::LoadFailure(err.to_string())
    }
}
