//! Core error types for helpbot

use hb_protocol::WireError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Lifecycle stage an error occurred in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The authenticated bootstrap call
    Bootstrap,
    /// Opening the streaming connection
    Connect,
    /// Reading inbound events
    Receive,
    /// Writing an outbound event
    Send,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Bootstrap => "bootstrap",
            Stage::Connect => "connection",
            Stage::Receive => "receive",
            Stage::Send => "send",
        };
        f.write_str(name)
    }
}

/// Top-level error type for the bot
#[derive(Error, Debug)]
pub enum BotError {
    /// Network-level failure
    #[error("Transport error during {stage}: {message}")]
    Transport { stage: Stage, message: String },

    /// The platform answered but signaled failure
    #[error("Platform error: {0}")]
    Protocol(String),

    /// A payload did not parse into the expected shape
    #[error("Decode error during {stage}: {source}")]
    Decode {
        stage: Stage,
        #[source]
        source: WireError,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl BotError {
    /// Build a transport error for a stage
    pub fn transport(stage: Stage, message: impl fmt::Display) -> Self {
        BotError::Transport {
            stage,
            message: message.to_string(),
        }
    }

    /// Build a decode error for a stage
    pub fn decode(stage: Stage, source: impl Into<WireError>) -> Self {
        BotError::Decode {
            stage,
            source: source.into(),
        }
    }

    /// Stage the error belongs to, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            BotError::Transport { stage, .. } | BotError::Decode { stage, .. } => Some(*stage),
            BotError::Protocol(_) => Some(Stage::Bootstrap),
            BotError::Config(_) => None,
        }
    }

    /// Whether retrying the whole bootstrap sequence could succeed.
    ///
    /// Only network failures qualify; a rejected token or a malformed
    /// answer will not change on a second attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BotError::Transport { .. })
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),
}
