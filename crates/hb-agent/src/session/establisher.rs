//! Two-step session handshake
//!
//! 1. An authenticated `GET <api_base>/rtm.start?token=...` returns the
//!    streaming address and the bot's own user id.
//! 2. A WebSocket handshake against that address, declaring the configured
//!    origin, opens the persistent connection.
//!
//! A single attempt never retries. [`SessionEstablisher::establish_with_retry`]
//! repeats the whole sequence when configured to.

use reqwest::StatusCode;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, ORIGIN};
use tokio_tungstenite::tungstenite::http::Uri;

use hb_core::config::ConnectionConfig;
use hb_core::{BotError, ConfigError, Stage};
use hb_protocol::BootstrapResponse;

use super::connection::{Session, WsStream};
use super::reconnect::ExponentialBackoff;

/// Performs the bootstrap call and opens the streaming connection
pub struct SessionEstablisher {
    config: ConnectionConfig,
    http: reqwest::Client,
    origin: HeaderValue,
}

impl SessionEstablisher {
    /// Create an establisher for the given connection settings
    pub fn new(config: ConnectionConfig) -> Result<Self, BotError> {
        let origin = HeaderValue::from_str(&config.origin).map_err(|e| {
            ConfigError::Invalid(format!("connection.origin {:?}: {}", config.origin, e))
        })?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                BotError::transport(Stage::Bootstrap, format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            config,
            http,
            origin,
        })
    }

    /// Exchange the token for a streaming address and the agent identity
    pub async fn bootstrap(&self) -> Result<BootstrapResponse, BotError> {
        tracing::debug!("Calling {}", self.config.bootstrap_url());

        // Errors carry the request URL, which includes the token
        let response = self
            .http
            .get(self.config.bootstrap_url())
            .query(&[("token", self.config.token.as_str())])
            .send()
            .await
            .map_err(|e| BotError::transport(Stage::Bootstrap, e.without_url()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(BotError::Protocol(format!(
                "API request failed with code {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| BotError::transport(Stage::Bootstrap, e.without_url()))?;

        let bootstrap: BootstrapResponse = serde_json::from_str(&body)
            .map_err(|e| BotError::decode(Stage::Bootstrap, e))?;

        if !bootstrap.ok {
            return Err(BotError::Protocol(bootstrap.error));
        }

        Ok(bootstrap)
    }

    /// Open the streaming connection at `url`
    pub async fn connect(&self, url: &str) -> Result<WsStream, BotError> {
        let mut request = url
            .into_client_request()
            .map_err(|e| BotError::transport(Stage::Connect, e))?;
        request.headers_mut().insert(ORIGIN, self.origin.clone());

        tracing::debug!("Opening streaming connection to {}", endpoint_host(request.uri()));
        let (stream, _response) =
            tokio::time::timeout(self.config.connect_timeout, connect_async(request))
                .await
                .map_err(|_| BotError::transport(Stage::Connect, "Handshake timed out"))?
                .map_err(|e| BotError::transport(Stage::Connect, e))?;

        Ok(stream)
    }

    /// Run the full handshake once
    pub async fn establish(&self) -> Result<Session, BotError> {
        let bootstrap = self.bootstrap().await?;
        let stream = self.connect(&bootstrap.url).await?;
        Ok(Session::new(stream, bootstrap.identity.id))
    }

    /// Run the handshake up to `max_attempts` times.
    ///
    /// Only transport failures are retried; a rejected token or an
    /// unreadable answer is returned immediately.
    pub async fn establish_with_retry(&self) -> Result<Session, BotError> {
        let mut backoff = ExponentialBackoff::from_config(&self.config.backoff);
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.establish().await {
                Ok(session) => return Ok(session),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = backoff.next_delay();
                    tracing::warn!(
                        "Session setup failed (attempt {}/{}): {}. Retrying in {:?}",
                        attempt,
                        max_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Host and port of a streaming address; the path carries a session secret
fn endpoint_host(uri: &Uri) -> String {
    match (uri.host(), uri.port_u16()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => "<unknown host>".to_string(),
    }
}
