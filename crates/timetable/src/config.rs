/// Server configuration, read from a JSON file with environment overrides
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default endpoint that turns a one-time session id into profile data.
const DEFAULT_SESSION_DATA_URL: &str =
    "https://demobackend.emergentagent.com/auth/v1/env/oauth/session-data";

/// Longest session lifetime accepted, in days.
const MAX_SESSION_TTL_DAYS: i64 = 3650;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "TIMETABLE_CONFIG";

/// Config file used when neither an argument nor the environment names one.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {message}")]
    InvalidEnv { key: String, message: String },

    #[error("Invalid config field {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
}

/// Top-level configuration. Every field has a default, so a partial
/// (or missing) config file is fine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address to bind the HTTP server to
    pub address: String,
    pub port: u16,
    /// SQLite database file, or `:memory:`
    pub database_path: String,
    /// Allowed CORS origins; `*` mirrors whatever origin the request came from
    pub cors_origins: Vec<String>,
    pub session_ttl_days: i64,
    /// Adds the `Secure` attribute to the session cookie
    pub cookie_secure: bool,
    pub session_prune_interval_secs: u64,
    pub identity: IdentityConfig,
}

/// Settings for the external identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub session_data_url: String,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8001,
            database_path: "timetable.db".to_string(),
            cors_origins: vec!["*".to_string()],
            session_ttl_days: 7,
            cookie_secure: false,
            session_prune_interval_secs: 60 * 60,
            identity: IdentityConfig::default(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            session_data_url: DEFAULT_SESSION_DATA_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl Config {
    /// Loads the config file at `path` (defaults if `None`), then applies
    /// environment overrides.
    ///
    /// # Arguments
    /// * `path` - Path to a JSON config file
    ///
    /// # Returns
    /// * `Ok(Config)` - The merged configuration
    /// * `Err` - If the file can't be read or parsed, or an override is malformed
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_json(&content)?
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a JSON config document.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Applies overrides from `lookup`, which maps variable names to values.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(address) = lookup("TIMETABLE_ADDRESS") {
            self.address = address;
        }

        if let Some(port) = lookup("TIMETABLE_PORT") {
            self.port = port.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnv {
                    key: "TIMETABLE_PORT".to_string(),
                    message: e.to_string(),
                }
            })?;
        }

        if let Some(path) = lookup("TIMETABLE_DATABASE_PATH") {
            self.database_path = path;
        }

        if let Some(origins) = lookup("CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }

        if let Some(url) = lookup("IDENTITY_SESSION_URL") {
            self.identity.session_data_url = url;
        }

        Ok(())
    }

    /// Checks values that would otherwise fail later at startup or at login.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_SESSION_TTL_DAYS).contains(&self.session_ttl_days) {
            return Err(ConfigError::InvalidField {
                field: "session_ttl_days",
                message: format!(
                    "must be between 1 and {MAX_SESSION_TTL_DAYS}, got {}",
                    self.session_ttl_days
                ),
            });
        }

        Ok(())
    }

    /// How long a new session stays valid.
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.session_ttl_days)
    }

    /// How often expired sessions are swept from the store.
    pub fn prune_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.session_prune_interval_secs.max(1))
    }
}

/// Resolves the config file path: explicit argument, then the
/// `TIMETABLE_CONFIG` variable, then `config.json` if it exists.
pub fn resolve_config_path(arg: Option<String>) -> Option<PathBuf> {
    arg.or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
        .map(PathBuf::from)
        .or_else(|| {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        })
}
