//! Bot configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::duration_secs;
use crate::error::ConfigError;

/// Default platform API base for the bootstrap call
pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

/// Origin declared when opening the streaming connection
pub const DEFAULT_ORIGIN: &str = "https://api.slack.com/";

/// Substring that makes a message worth answering
pub const DEFAULT_TRIGGER: &str = "help";

/// Reply sent when the trigger is seen
pub const DEFAULT_REPLY: &str = "Don't be scared, I'm here to help you!";

/// Top-level configuration for the bot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Platform connection settings
    pub connection: ConnectionConfig,

    /// Reply behaviour
    pub bot: ReplyConfig,
}

impl BotConfig {
    /// Check that the configuration can start a session
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connection.token.trim().is_empty() {
            return Err(ConfigError::MissingField("connection.token".to_string()));
        }
        if self.connection.api_base.trim().is_empty() {
            return Err(ConfigError::MissingField("connection.api_base".to_string()));
        }
        if self.connection.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "connection.max_attempts must be at least 1".to_string(),
            ));
        }
        let backoff = &self.connection.backoff;
        if !backoff.multiplier.is_finite() || backoff.multiplier < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "connection.backoff.multiplier must be a finite number >= 1, got {}",
                backoff.multiplier
            )));
        }
        if !(0.0..=1.0).contains(&backoff.jitter) {
            return Err(ConfigError::Invalid(format!(
                "connection.backoff.jitter must be between 0 and 1, got {}",
                backoff.jitter
            )));
        }
        if self.bot.trigger.is_empty() {
            return Err(ConfigError::Invalid(
                "bot.trigger must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for the bootstrap call and the streaming connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Bot token used to authenticate the bootstrap call
    pub token: String,

    /// Base URL of the platform's web API
    pub api_base: String,

    /// Origin header declared on the streaming handshake
    pub origin: String,

    /// Timeout for the bootstrap HTTP request
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,

    /// Timeout for the streaming handshake
    #[serde(with = "duration_secs")]
    pub connect_timeout: Duration,

    /// How many times the bootstrap+connect sequence is attempted.
    ///
    /// The default of 1 gives up on the first failure.
    pub max_attempts: u32,

    /// Delay between attempts
    pub backoff: BackoffConfig,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(30),
            max_attempts: 1,
            backoff: BackoffConfig::default(),
        }
    }
}

impl ConnectionConfig {
    /// Full URL of the bootstrap method (token not included)
    pub fn bootstrap_url(&self) -> String {
        format!("{}/rtm.start", self.api_base.trim_end_matches('/'))
    }
}

/// Exponential backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Initial delay
    #[serde(with = "duration_secs")]
    pub initial: Duration,

    /// Maximum delay
    #[serde(with = "duration_secs")]
    pub max: Duration,

    /// Multiplier for each retry
    pub multiplier: f64,

    /// Jitter factor (0.0 to 1.0)
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(60),
            multiplier: 2.0,
            jitter: 0.25,
        }
    }
}

/// What the bot listens for and what it answers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyConfig {
    /// Substring that triggers a reply
    pub trigger: String,

    /// Fixed reply text
    pub reply: String,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            trigger: DEFAULT_TRIGGER.to_string(),
            reply: DEFAULT_REPLY.to_string(),
        }
    }
}
