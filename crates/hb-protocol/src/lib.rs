//! hb-protocol: Wire types for the helpbot real-time session
//!
//! This crate defines the JSON shapes exchanged with the messaging
//! platform: the bootstrap response that hands out a streaming address,
//! and the chat events carried as frames over that stream.

pub mod bootstrap;
pub mod codec;
pub mod error;
pub mod message;

pub use bootstrap::{BootstrapResponse, SelfIdentity};
pub use codec::{decode_event, decode_event_slice, encode_event};
pub use error::WireError;
pub use message::{ChatEvent, MESSAGE_KIND};
