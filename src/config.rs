// Configuration from environment variables (optionally seeded from .env)

use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;

use crate::fallback::DEFAULT_WIKI_BASE_URL;
use crate::llm::core::config::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::llm::{GeminiBackend, GeminiModel, GeminiSettings, GenerationConfig, SystemPlacement};
use crate::render::Branding;
use crate::session::DEFAULT_MAX_SESSIONS;

pub const DEFAULT_ADDR: &str = "127.0.0.1:3030";
pub const DEFAULT_GCP_LOCATION: &str = "us-central1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no model credentials: set GEMINI_API_KEY, or GCP_PROJECT_ID for Vertex AI")]
    MissingCredentials,

    #[error("invalid value for `{key}`: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub gemini: GeminiSettings,
    pub generation: GenerationConfig,
    pub wiki_base_url: String,
    pub max_sessions: usize,
    pub branding: Branding,
}

impl Config {
    /// Read from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let addr: SocketAddr = parse_or(
            "MEDASSIST_ADDR",
            get("MEDASSIST_ADDR"),
            DEFAULT_ADDR.parse::<SocketAddr>().ok(),
        )?;

        let backend = match (get("GEMINI_API_KEY"), get("GCP_PROJECT_ID")) {
            (Some(api_key), _) => GeminiBackend::DeveloperApi { api_key },
            (None, Some(project_id)) => GeminiBackend::VertexAi {
                project_id,
                location: get("GCP_LOCATION").unwrap_or_else(|| DEFAULT_GCP_LOCATION.to_string()),
            },
            (None, None) => return Err(ConfigError::MissingCredentials),
        };

        let model = get("GEMINI_MODEL")
            .and_then(|m| m.parse::<GeminiModel>().ok())
            .unwrap_or_default();

        let mut gemini = GeminiSettings::new(model, backend);
        if let Some(base_url) = get("GEMINI_BASE_URL") {
            gemini = gemini.with_base_url(base_url);
        }
        if let Some(placement) = get("GEMINI_SYSTEM_PLACEMENT") {
            gemini = gemini.with_system_placement(parse_placement(&placement)?);
        }

        let temperature: f32 = parse_or(
            "GEMINI_TEMPERATURE",
            get("GEMINI_TEMPERATURE"),
            Some(DEFAULT_TEMPERATURE),
        )?;
        let max_tokens: u32 = parse_or(
            "GEMINI_MAX_TOKENS",
            get("GEMINI_MAX_TOKENS"),
            Some(DEFAULT_MAX_TOKENS),
        )?;

        let max_sessions: usize = parse_or(
            "MEDASSIST_MAX_SESSIONS",
            get("MEDASSIST_MAX_SESSIONS"),
            Some(DEFAULT_MAX_SESSIONS),
        )?;

        Ok(Self {
            addr,
            gemini,
            generation: GenerationConfig::new(max_tokens).with_temperature(temperature),
            wiki_base_url: get("WIKI_BASE_URL").unwrap_or_else(|| DEFAULT_WIKI_BASE_URL.to_string()),
            max_sessions,
            branding: Branding::default(),
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: Option<T>) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match (raw, default) {
        (Some(value), _) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
        (None, Some(default)) => Ok(default),
        (None, None) => Err(ConfigError::Invalid {
            key,
            value: String::new(),
            reason: "no default".to_string(),
        }),
    }
}

fn parse_placement(value: &str) -> Result<SystemPlacement, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "instruction" => Ok(SystemPlacement::Instruction),
        "user" => Ok(SystemPlacement::FirstUserTurn),
        _ => Err(ConfigError::Invalid {
            key: "GEMINI_SYSTEM_PLACEMENT",
            value: value.to_string(),
            reason: "expected `instruction` or `user`".to_string(),
        }),
    }
}
