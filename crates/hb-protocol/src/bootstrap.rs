//! Bootstrap call response
//!
//! The `rtm.start` method exchanges a token for the address of the
//! streaming endpoint and the identity of the bot user the token belongs
//! to. The platform returns many more fields; only these are read.

use serde::{Deserialize, Serialize};

/// Response body of the bootstrap call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapResponse {
    /// Whether the platform accepted the request
    pub ok: bool,
    /// Streaming connection address
    pub url: String,
    /// Platform error code when `ok` is false (e.g. "invalid_auth")
    pub error: String,
    /// Identity of the acting agent
    #[serde(rename = "self")]
    pub identity: SelfIdentity,
}

/// The agent's own identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfIdentity {
    /// User identifier of the bot account
    pub id: String,
}
