//! hb-core: Core abstractions and configuration for helpbot
//!
//! This crate provides the configuration structures, the error taxonomy
//! and the reply seam shared by the session and event loop components.

pub mod config;
pub mod error;
pub mod responder;

pub use error::{BotError, ConfigError, Stage};
pub use responder::Responder;
