//! The established session

use std::fmt;

use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::sender::Sender;

/// Streaming connection to the platform
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Write half of the streaming connection
pub type WsSink = futures::stream::SplitSink<WsStream, Message>;

/// Read half of the streaming connection
pub type WsSource = futures::stream::SplitStream<WsStream>;

/// An authenticated streaming connection and the agent's own identity.
///
/// Created once at startup. Nothing reopens it: when the connection fails
/// the session is gone.
pub struct Session {
    stream: WsStream,
    self_id: String,
}

impl Session {
    pub(crate) fn new(stream: WsStream, self_id: String) -> Self {
        Self { stream, self_id }
    }

    /// Identity of the bot user the token belongs to
    pub fn self_id(&self) -> &str {
        &self.self_id
    }

    /// Split into the outbound sender, the inbound frame stream and the
    /// agent identity
    pub fn into_parts(self) -> (Sender<WsSink>, WsSource, String) {
        let (sink, source) = self.stream.split();
        (Sender::new(sink), source, self.self_id)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("self_id", &self.self_id)
            .finish_non_exhaustive()
    }
}
