//! Bot configuration loaded from environment variables.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::infrastructure::openai::{
    OpenAiCompatConfig, DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL, DEFAULT_LLM_TIMEOUT_SECS,
};
use crate::use_cases::NormalizerMode;

pub const DEFAULT_GAME_BRIDGE_URL: &str = "ws://127.0.0.1:56272/bridge";
pub const DEFAULT_BOT_USERNAME: &str = "Bot";
pub const DEFAULT_MINECRAFT_DATA_DIR: &str = "minecraft-data";
pub const DEFAULT_RELAY_SPEAKER: &str = "dashboard";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("NORMALIZER_MODE={0} needs LLM_API_KEY or OPENROUTER_API_KEY")]
    MissingApiKey(NormalizerMode),
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Sidecar WebSocket endpoint that owns the game connection
    pub game_bridge_url: String,
    /// Name the actor plays under; chat from this name is ignored
    pub username: String,
    pub normalizer_mode: NormalizerMode,
    pub llm: OpenAiCompatConfig,
    /// Root of the minecraft-data tables
    pub minecraft_data_dir: PathBuf,
    /// Observer relay listen address
    pub relay_addr: SocketAddr,
    /// Speaker name used for text relayed from observers
    pub relay_speaker: String,
    pub stats_interval: Duration,
    /// CORS allowed origins (comma-separated, or "*" for any); unset disables CORS
    pub cors_allowed_origins: Option<String>,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = var("LLM_API_KEY").or_else(|| var("OPENROUTER_API_KEY"));

        let normalizer_mode = match var("NORMALIZER_MODE") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "NORMALIZER_MODE",
                value: raw,
                expected: "literal, classifier or hybrid",
            })?,
            None if api_key.is_some() => NormalizerMode::Hybrid,
            None => NormalizerMode::Literal,
        };
        if normalizer_mode.uses_classifier() && api_key.is_none() {
            return Err(ConfigError::MissingApiKey(normalizer_mode));
        }

        let timeout_secs = parse_or(
            "LLM_TIMEOUT_SECS",
            var("LLM_TIMEOUT_SECS"),
            DEFAULT_LLM_TIMEOUT_SECS,
            "a whole number of seconds",
        )?;
        let host: IpAddr = parse_or(
            "RELAY_HOST",
            var("RELAY_HOST"),
            IpAddr::from([0, 0, 0, 0]),
            "an IP address",
        )?;
        let port: u16 = parse_or("RELAY_PORT", var("RELAY_PORT"), 3000, "a valid port number")?;
        let stats_interval_ms: u64 = parse_or(
            "STATS_INTERVAL_MS",
            var("STATS_INTERVAL_MS"),
            1000,
            "a positive number of milliseconds",
        )?;
        if stats_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                name: "STATS_INTERVAL_MS",
                value: "0".to_string(),
                expected: "a positive number of milliseconds",
            });
        }

        Ok(Self {
            game_bridge_url: var("GAME_BRIDGE_URL")
                .unwrap_or_else(|| DEFAULT_GAME_BRIDGE_URL.to_string()),
            username: var("BOT_USERNAME").unwrap_or_else(|| DEFAULT_BOT_USERNAME.to_string()),
            normalizer_mode,
            llm: OpenAiCompatConfig {
                base_url: var("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
                model: var("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
                api_key,
                timeout_secs,
                ..OpenAiCompatConfig::default()
            },
            minecraft_data_dir: var("MINECRAFT_DATA_DIR")
                .unwrap_or_else(|| DEFAULT_MINECRAFT_DATA_DIR.to_string())
                .into(),
            relay_addr: SocketAddr::new(host, port),
            relay_speaker: var("RELAY_SPEAKER")
                .unwrap_or_else(|| DEFAULT_RELAY_SPEAKER.to_string()),
            stats_interval: Duration::from_millis(stats_interval_ms),
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS"),
        })
    }
}

/// Load `.env.local`, then `.env`, from `dir` into the process environment.
///
/// Variables already set are kept, so `.env.local` wins over `.env` and both
/// lose to the real environment. Missing files are skipped.
pub fn load_dotenv_from(dir: &Path) {
    for filename in [".env.local", ".env"] {
        let path = dir.join(filename);
        if path.exists() {
            if let Err(e) = dotenvy::from_path(&path) {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load env file");
            }
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            name,
            value,
            expected,
        }),
        None => Ok(default),
    }
}
