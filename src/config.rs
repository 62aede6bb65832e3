use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ArtLensError, Result};

const PLACEHOLDER_API_KEY: &str = "PLACEHOLDER_GEMINI_API_KEY";

/// Main configuration structure for artlens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub intent: IntentConfig,
    pub session: SessionConfig,
    pub redis: RedisConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub uploads_dir: PathBuf,
    /// URL prefix under which stored uploads are served
    pub uploads_url_prefix: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

/// Which classification scheme a deployment uses for the first chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationScheme {
    /// Painting or sketch, then a question archetype
    #[default]
    Medium,
    /// Art style, emotion or specific object
    Focus,
}

impl std::str::FromStr for ClassificationScheme {
    type Err = ArtLensError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "medium" => Ok(Self::Medium),
            "focus" => Ok(Self::Focus),
            other => Err(ArtLensError::Config(format!(
                "Unknown intent scheme '{other}'. Expected 'medium' or 'focus'."
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntentConfig {
    #[serde(default)]
    pub scheme: ClassificationScheme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionBackend {
    Memory,
    Redis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub backend: SessionBackend,
    pub ttl_seconds: u64,
    pub cookie_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub database: u8,
    pub pool: PoolConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    pub max_size: usize,
    pub timeout_seconds: u64,
}

impl Config {
    /// Load configuration from file with environment variable overrides.
    /// Missing or broken files fall back to defaults; call [`Config::validate`]
    /// before serving.
    pub fn load() -> Self {
        for path in ["../.env", ".env"] {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                break;
            }
        }

        let config_path =
            env::var("ARTLENS_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match serde_yaml::from_str::<Config>(&contents) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", config_path);
                        config
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to parse config file {}: {} - using defaults",
                            config_path,
                            e
                        );
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            tracing::debug!("Config file not found at {} - using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides(|key| env::var(key).ok());
        config
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Server overrides
        if let Some(bind) = var("ARTLENS_BIND") {
            self.server.bind = bind;
        }
        if let Some(dir) = var("ARTLENS_UPLOADS_DIR") {
            self.server.uploads_dir = PathBuf::from(dir);
        }

        // Gemini overrides; GOOGLE_API_KEY kept for older .env files
        if let Some(api_key) = var("GEMINI_API_KEY").or_else(|| var("GOOGLE_API_KEY")) {
            self.gemini.api_key = api_key;
        }
        if let Some(model) = var("GEMINI_MODEL") {
            self.gemini.model = model;
        }
        if let Some(base_url) = var("GEMINI_BASE_URL") {
            self.gemini.base_url = base_url;
        }
        if let Some(timeout) = var("GEMINI_TIMEOUT_SECONDS") {
            if let Ok(secs) = timeout.parse() {
                self.gemini.timeout_seconds = secs;
            }
        }

        // Intent overrides
        if let Some(scheme) = var("ARTLENS_INTENT_SCHEME") {
            match scheme.parse() {
                Ok(scheme) => self.intent.scheme = scheme,
                Err(e) => tracing::warn!("{} - keeping {:?}", e, self.intent.scheme),
            }
        }

        // Session overrides
        if let Some(backend) = var("ARTLENS_SESSION_BACKEND") {
            match backend.to_lowercase().as_str() {
                "memory" => self.session.backend = SessionBackend::Memory,
                "redis" => self.session.backend = SessionBackend::Redis,
                other => tracing::warn!("Unknown session backend '{}', ignoring", other),
            }
        }
        if let Some(ttl) = var("ARTLENS_SESSION_TTL_SECONDS") {
            if let Ok(secs) = ttl.parse() {
                self.session.ttl_seconds = secs;
            }
        }

        // Redis overrides
        if let Some(host) = var("REDIS_HOST") {
            self.redis.host = host;
        }
        if let Some(port) = var("REDIS_PORT") {
            if let Ok(port_num) = port.parse() {
                self.redis.port = port_num;
            }
        }
        if let Some(db) = var("REDIS_DB") {
            if let Ok(db_num) = db.parse() {
                self.redis.database = db_num;
            }
        }
    }

    /// Reject configurations the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.gemini.api_key.is_empty() || self.gemini.api_key == PLACEHOLDER_API_KEY {
            return Err(ArtLensError::Config(
                "GEMINI_API_KEY must be set (in the environment or a .env file)".to_string(),
            ));
        }
        if self.gemini.timeout_seconds == 0 {
            return Err(ArtLensError::Config(
                "gemini.timeout_seconds cannot be 0".to_string(),
            ));
        }
        if self.gemini.model.is_empty() {
            return Err(ArtLensError::Config("gemini.model cannot be empty".to_string()));
        }
        if self.session.ttl_seconds == 0 {
            return Err(ArtLensError::Config(
                "session.ttl_seconds cannot be 0".to_string(),
            ));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(ArtLensError::Config(
                "server.max_upload_bytes cannot be 0".to_string(),
            ));
        }
        if self.session.backend == SessionBackend::Redis && self.redis.port == 0 {
            return Err(ArtLensError::Config("Redis port cannot be 0".to_string()));
        }
        Ok(())
    }

    /// Get Redis URL with password from environment
    pub fn get_redis_url(&self) -> String {
        let password = env::var("REDIS_PASSWORD").unwrap_or_default();

        if password.is_empty() {
            format!(
                "redis://{}:{}/{}",
                self.redis.host, self.redis.port, self.redis.database
            )
        } else {
            format!(
                "redis://:{}@{}:{}/{}",
                password, self.redis.host, self.redis.port, self.redis.database
            )
        }
    }

    /// Get pool timeout as Duration
    pub fn get_pool_timeout(&self) -> Duration {
        Duration::from_secs(self.redis.pool.timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind: "127.0.0.1:5000".to_string(),
                uploads_dir: PathBuf::from("static/uploads"),
                uploads_url_prefix: "/uploads".to_string(),
                max_upload_bytes: 16 * 1024 * 1024,
            },
            gemini: GeminiConfig {
                api_key: PLACEHOLDER_API_KEY.to_string(),
                model: "gemini-1.5-flash".to_string(),
                base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                timeout_seconds: 30,
            },
            intent: IntentConfig::default(),
            session: SessionConfig {
                backend: SessionBackend::Memory,
                ttl_seconds: 86400,
                cookie_name: "artlens_session".to_string(),
            },
            redis: RedisConfig {
                host: "localhost".to_string(),
                port: 6379,
                database: 0,
                pool: PoolConfig {
                    max_size: 16,
                    timeout_seconds: 5,
                },
            },
        }
    }
}
