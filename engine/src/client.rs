use crate::GameRecord;
use crate::error::{LoadError, LoadResult, ReplayError, ReplayResult};
use crate::wire::GameDocument;
use log::{debug, info};
use reqwest::{Client, StatusCode};
use std::path::PathBuf;
use std::time::Duration;

const SAMPLE_GAME_JSON: &str = include_str!("../data/sample_game.json");

/// Where game documents come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameSource {
    /// A single local game document; the requested id is ignored.
    File(PathBuf),
    /// Documents served at `{base_url}/game_{id}.json`.
    Http { base_url: String },
    /// The sample game compiled into the binary.
    Embedded,
}

impl GameSource {
    pub fn describe(&self) -> String {
        match self {
            GameSource::File(path) => format!("file {}", path.display()),
            GameSource::Http { base_url } => base_url.clone(),
            GameSource::Embedded => "embedded sample".to_string(),
        }
    }
}

/// Fetches and validates game records.
#[derive(Debug, Clone)]
pub struct GameLoader {
    client: Client,
    timeout: Duration,
    source: GameSource,
}

impl Default for GameLoader {
    fn default() -> Self {
        Self::new(GameSource::Embedded)
    }
}

impl GameLoader {
    pub fn new(source: GameSource) -> Self {
        Self {
            client: Client::builder()
                .user_agent("hoopcast/0.1 (terminal game replay)")
                .build()
                .unwrap_or_default(),
            timeout: Duration::from_secs(10),
            source,
        }
    }

    pub fn source(&self) -> &GameSource {
        &self.source
    }

    /// Fetch, parse and validate one game.
    ///
    /// Transport and JSON errors surface as [`ReplayError::LoadFailure`]; a
    /// document that parses but breaks the event-log rules surfaces as
    /// [`ReplayError::MalformedRecord`] or [`ReplayError::MissingGameOver`].
    pub async fn fetch_game(&self, game_id: &str) -> ReplayResult<GameRecord> {
        let doc = match &self.source {
            GameSource::File(path) => {
                let content = tokio::fs::read_to_string(path).await.map_err(|e| {
                    LoadError::NotFound(format!("could not read {}: {e}", path.display()))
                })?;
                parse_document(&content, &path.display().to_string())?
            }
            GameSource::Http { base_url } => {
                let url = format!("{}/game_{game_id}.json", base_url.trim_end_matches('/'));
                self.get(&url).await?
            }
            GameSource::Embedded => parse_document(SAMPLE_GAME_JSON, "embedded sample")?,
        };

        let record = GameRecord::from_document(doc)?;
        info!(
            "loaded game {} from {}: {} vs {}, {} events",
            record.info.game_id,
            self.source.describe(),
            record.info.teams[0].abbreviation,
            record.info.teams[1].abbreviation,
            record.len()
        );
        Ok(record)
    }

    async fn get(&self, url: &str) -> LoadResult<GameDocument> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| LoadError::Network(e, url.to_owned()))?;

        match response.error_for_status() {
            Ok(res) => {
                let body = res.text().await.map_err(|e| LoadError::Network(e, url.to_owned()))?;
                parse_document(&body, url)
            }
            Err(e) if e.status() == Some(StatusCode::NOT_FOUND) => {
                Err(LoadError::NotFound(format!("no game document at {url}")))
            }
            Err(e) => Err(LoadError::Api(e, url.to_owned())),
        }
    }
}

fn parse_document(json: &str, source: &str) -> LoadResult<GameDocument> {
    serde_json::from_str(json).map_err(|e| LoadError::Parsing(e.to_string(), source.to_owned()))
}

/// The compiled-in sample game.
pub fn sample_game() -> ReplayResult<GameRecord> {
    let doc = parse_document(SAMPLE_GAME_JSON, "embedded sample").map_err(ReplayError::from)?;
    GameRecord::from_document(doc)
}
