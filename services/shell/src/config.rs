//! services/shell/src/config.rs
//!
//! Defines the shell's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub storage_path: PathBuf,
    pub log_level: Level,
    /// Stand-in for the OS colour-scheme preference, used when no dark-mode flag is stored.
    pub prefers_dark_scheme: bool,
    pub countdown_tick: Duration,
    pub payment_delay: Duration,
    pub google_client_id: String,
    pub github_client_id: String,
    pub oauth_redirect_uri: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("./growify-storage.json"),
            log_level: Level::INFO,
            prefers_dark_scheme: false,
            countdown_tick: Duration::from_millis(1000),
            payment_delay: Duration::from_millis(2000),
            google_client_id: "YOUR_GOOGLE_CLIENT_ID".to_string(),
            github_client_id: "YOUR_GITHUB_CLIENT_ID".to_string(),
            oauth_redirect_uri: "http://localhost:3000/auth/callback".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables, falling back to the defaults.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let storage_path = lookup("STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_path);

        let log_level = match lookup("RUST_LOG") {
            Some(raw) => raw.parse::<Level>().map_err(|_| {
                ConfigError::InvalidValue(
                    "RUST_LOG".to_string(),
                    format!("'{}' is not a valid log level", raw),
                )
            })?,
            None => defaults.log_level,
        };

        let prefers_dark_scheme = match lookup("PREFERS_DARK_SCHEME") {
            Some(raw) => raw.trim().parse::<bool>().map_err(|_| {
                ConfigError::InvalidValue(
                    "PREFERS_DARK_SCHEME".to_string(),
                    format!("'{}' is not true or false", raw),
                )
            })?,
            None => defaults.prefers_dark_scheme,
        };

        let countdown_tick =
            parse_millis(&lookup, "COUNTDOWN_TICK_MS")?.unwrap_or(defaults.countdown_tick);
        let payment_delay =
            parse_millis(&lookup, "PAYMENT_DELAY_MS")?.unwrap_or(defaults.payment_delay);

        let google_client_id = lookup("GOOGLE_CLIENT_ID").unwrap_or(defaults.google_client_id);
        let github_client_id = lookup("GITHUB_CLIENT_ID").unwrap_or(defaults.github_client_id);
        let oauth_redirect_uri =
            lookup("OAUTH_REDIRECT_URI").unwrap_or(defaults.oauth_redirect_uri);

        Ok(Self {
            storage_path,
            log_level,
            prefers_dark_scheme,
            countdown_tick,
            payment_delay,
            google_client_id,
            github_client_id,
            oauth_redirect_uri,
        })
    }
}

fn parse_millis<F>(lookup: &F, name: &str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let millis = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))?;
    if millis == 0 {
        return Err(ConfigError::InvalidValue(
            name.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Some(Duration::from_millis(millis)))
}
