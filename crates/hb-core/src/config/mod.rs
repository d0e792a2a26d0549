//! Configuration management for helpbot

mod bot;
pub mod serde_utils;

pub use bot::{
    BackoffConfig, BotConfig, ConnectionConfig, ReplyConfig, DEFAULT_API_BASE, DEFAULT_ORIGIN,
    DEFAULT_REPLY, DEFAULT_TRIGGER,
};

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "config.toml";

/// Environment variable that supplies or overrides the token
pub const TOKEN_ENV: &str = "HELPBOT_TOKEN";

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("helpbot")
}

/// Get the default configuration file path
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Config files searched when no explicit path is given, in order
pub fn default_search_paths() -> Vec<PathBuf> {
    vec![PathBuf::from(LOCAL_CONFIG_FILE), default_config_path()]
}

/// Load configuration from a file
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Resolve the bot configuration from the default locations.
///
/// See [`resolve_config_from`].
pub fn resolve_config(
    explicit: Option<&Path>,
    token_override: Option<String>,
) -> Result<Option<BotConfig>, ConfigError> {
    resolve_config_from(&default_search_paths(), explicit, token_override)
}

/// Resolve the bot configuration.
///
/// An explicit path must exist. Otherwise the first existing search path
/// is loaded. A non-empty `token_override` replaces the file's token, or
/// stands in for a file altogether.
///
/// Returns `Ok(None)` when there is neither a file nor a token: the caller
/// treats that as "nothing to run". A configuration that was found but
/// cannot start a session is an error.
pub fn resolve_config_from(
    search_paths: &[PathBuf],
    explicit: Option<&Path>,
    token_override: Option<String>,
) -> Result<Option<BotConfig>, ConfigError> {
    let mut config = match explicit {
        Some(path) => Some(load_config::<BotConfig>(path)?),
        None => match search_paths.iter().find(|path| path.exists()) {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Some(load_config::<BotConfig>(path)?)
            }
            None => None,
        },
    };

    if let Some(token) = token_override.filter(|token| !token.trim().is_empty()) {
        config.get_or_insert_with(BotConfig::default).connection.token = token;
    }

    match config {
        Some(config) => {
            config.validate()?;
            Ok(Some(config))
        }
        None => Ok(None),
    }
}
