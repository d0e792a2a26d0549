//! Outbound event sender
//!
//! The write half of the connection is shared by every reply task. The
//! sender owns it together with the sequence counter, so assigning an id
//! and writing the frame happen as one step under the write lock: ids go
//! out strictly increasing and two replies never share a frame.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::{Sink, SinkExt};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;

use hb_core::{BotError, Stage};
use hb_protocol::{encode_event, ChatEvent};

/// Sends chat events over a shared, message-framed sink
pub struct Sender<S> {
    sink: Mutex<S>,
    /// Last id handed out; the first event gets 1
    last_id: AtomicU64,
}

impl<S> Sender<S>
where
    S: Sink<Message> + Unpin + Send,
    S::Error: fmt::Display,
{
    /// Wrap the write half of a connection
    pub fn new(sink: S) -> Self {
        Self {
            sink: Mutex::new(sink),
            last_id: AtomicU64::new(0),
        }
    }

    /// Assign the next sequence number to `event` and transmit it as one
    /// frame. Returns the assigned id.
    pub async fn send(&self, mut event: ChatEvent) -> Result<u64, BotError> {
        let mut sink = self.sink.lock().await;

        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        event.id = id;

        let frame = encode_event(&event).map_err(|e| BotError::decode(Stage::Send, e))?;
        sink.send(Message::text(frame))
            .await
            .map_err(|e| BotError::transport(Stage::Send, e))?;

        tracing::trace!("Sent event {} to {}", id, event.channel);
        Ok(id)
    }
}
