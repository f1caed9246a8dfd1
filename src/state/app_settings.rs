use hoopcast_engine::PlaybackSpeed;
use hoopcast_engine::client::GameSource;
use log::{LevelFilter, warn};
use std::path::PathBuf;

pub const DEFAULT_GAME_ID: &str = "sample";

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub source: GameSource,
    pub game_id: String,
    pub initial_speed: PlaybackSpeed,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            source: GameSource::Embedded,
            game_id: DEFAULT_GAME_ID.to_string(),
            initial_speed: PlaybackSpeed::default(),
        }
    }
}

impl AppSettings {
    /// Settings from the `HOOPCAST_*` environment variables.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut settings = Self::default();

        if let Some(path) = var("HOOPCAST_GAME_JSON") {
            settings.source = GameSource::File(PathBuf::from(path));
        } else if let Some(base_url) = var("HOOPCAST_BASE_URL") {
            settings.source = GameSource::Http { base_url };
        }

        if let Some(raw) = var("HOOPCAST_SPEED") {
            match raw.parse::<f64>() {
                Ok(multiplier) => settings.initial_speed = PlaybackSpeed::new(multiplier),
                Err(_) => warn!("HOOPCAST_SPEED={raw} is not a number; using 1x"),
            }
        }

        if let Some(raw) = var("HOOPCAST_LOG") {
            match raw.parse::<LevelFilter>() {
                Ok(level) => settings.log_level = Some(level),
                Err(_) => warn!("HOOPCAST_LOG={raw} is not a log level"),
            }
        }

        settings
    }
}
