//! Receive → filter → dispatch loop
//!
//! The loop reads one frame at a time and decides, in arrival order,
//! whether the event deserves a reply. Matching events are handed to a
//! freshly spawned task that computes and sends the reply; the loop goes
//! straight back to reading. Replies may therefore leave in any order.
//!
//! Any receive failure (transport error, decode error, closed connection)
//! ends the loop. There is no reconnect.

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use futures::{Sink, Stream, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use hb_core::{BotError, Responder, Stage};
use hb_protocol::{decode_event, decode_event_slice, ChatEvent};

use crate::sender::Sender;

/// Whether an inbound event should be answered.
///
/// Only chat messages from someone other than the agent itself whose text
/// contains `trigger` qualify.
pub fn should_reply(event: &ChatEvent, self_id: &str, trigger: &str) -> bool {
    event.is_message() && !event.is_from(self_id) && event.text.contains(trigger)
}

/// Reads events off the connection and dispatches replies
pub struct EventLoop<R, S> {
    inbound: R,
    sender: Arc<Sender<S>>,
    responder: Arc<dyn Responder>,
    self_id: String,
    trigger: String,
}

impl<R, S> EventLoop<R, S>
where
    S: Sink<Message> + Unpin + Send + 'static,
    S::Error: fmt::Display,
{
    pub fn new(
        inbound: R,
        sender: Arc<Sender<S>>,
        responder: Arc<dyn Responder>,
        self_id: impl Into<String>,
        trigger: impl Into<String>,
    ) -> Self {
        Self {
            inbound,
            sender,
            responder,
            self_id: self_id.into(),
            trigger: trigger.into(),
        }
    }

    /// Run until the first receive failure, which is returned
    pub async fn run<E>(mut self) -> Result<Infallible, BotError>
    where
        R: Stream<Item = Result<Message, E>> + Unpin,
        E: fmt::Display,
    {
        loop {
            let event = self.next_event().await?;
            self.dispatch(event);
        }
    }

    /// Spawn a reply task for `event` if it qualifies.
    ///
    /// Returns whether a task was spawned. The task is never awaited; a
    /// failed send is logged and affects nothing else.
    pub fn dispatch(&self, event: ChatEvent) -> bool {
        if !should_reply(&event, &self.self_id, &self.trigger) {
            return false;
        }

        tracing::info!(
            channel = %event.channel,
            user = %event.user,
            "Message received: {}",
            event.text
        );

        let sender = Arc::clone(&self.sender);
        let responder = Arc::clone(&self.responder);
        tokio::spawn(async move {
            let text = responder.reply(&event.text).await;
            match sender.send(event.reply(text)).await {
                Ok(id) => tracing::debug!("Reply {} sent to {}", id, event.channel),
                Err(e) => tracing::error!("Failed to send reply to {}: {}", event.channel, e),
            }
        });

        true
    }

    /// Wait for the next chat event, skipping control frames
    async fn next_event<E>(&mut self) -> Result<ChatEvent, BotError>
    where
        R: Stream<Item = Result<Message, E>> + Unpin,
        E: fmt::Display,
    {
        loop {
            let frame = match self.inbound.next().await {
                Some(Ok(frame)) => frame,
                Some(Err(e)) => return Err(BotError::transport(Stage::Receive, e)),
                None => return Err(BotError::transport(Stage::Receive, "Connection closed")),
            };

            match frame {
                Message::Text(text) => {
                    return decode_event(text.as_str())
                        .map_err(|e| BotError::decode(Stage::Receive, e));
                }
                Message::Binary(data) => {
                    return decode_event_slice(&data)
                        .map_err(|e| BotError::decode(Stage::Receive, e));
                }
                Message::Close(frame) => {
                    let reason = match frame {
                        Some(frame) => {
                            format!("Connection closed by peer ({} {})", frame.code, frame.reason.as_str())
                        }
                        None => "Connection closed by peer".to_string(),
                    };
                    return Err(BotError::transport(Stage::Receive, reason));
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use futures::channel::mpsc;
    use tokio::sync::Semaphore;
    use tokio::time::timeout;
    use tokio_tungstenite::tungstenite::Error as WsError;

    use crate::responder::HelpResponder;

    const SELF_ID: &str = "U123";
    const WAIT: Duration = Duration::from_secs(2);

    type Inbound = mpsc::UnboundedReceiver<Result<Message, WsError>>;
    type Outbound = mpsc::UnboundedSender<Message>;

    fn event(kind: &str, user: &str, text: &str) -> ChatEvent {
        ChatEvent {
            id: 0,
            kind: kind.to_string(),
            channel: "C1".to_string(),
            user: user.to_string(),
            text: text.to_string(),
        }
    }

    fn text_frame(event: &ChatEvent) -> Result<Message, WsError> {
        Ok(Message::text(serde_json::to_string(event).unwrap()))
    }

    fn make_loop(
        responder: Arc<dyn Responder>,
    ) -> (
        EventLoop<Inbound, Outbound>,
        mpsc::UnboundedSender<Result<Message, WsError>>,
        mpsc::UnboundedReceiver<Message>,
    ) {
        let (inbound_tx, inbound_rx) = mpsc::unbounded();
        let (outbound_tx, outbound_rx) = mpsc::unbounded();
        let event_loop = EventLoop::new(
            inbound_rx,
            Arc::new(Sender::new(outbound_tx)),
            responder,
            SELF_ID,
            "help",
        );
        (event_loop, inbound_tx, outbound_rx)
    }

    async fn next_reply(outbound: &mut mpsc::UnboundedReceiver<Message>) -> ChatEvent {
        let frame = timeout(WAIT, outbound.next())
            .await
            .expect("Timed out waiting for reply")
            .expect("Outbound channel closed");
        match frame {
            Message::Text(text) => decode_event(text.as_str()).unwrap(),
            other => panic!("Expected text frame, got {:?}", other),
        }
    }

    /// Records every text it is asked about, then waits for a permit
    struct GatedResponder {
        seen: mpsc::UnboundedSender<String>,
        gate: Arc<Semaphore>,
    }

    #[async_trait]
    impl Responder for GatedResponder {
        async fn reply(&self, text: &str) -> String {
            let _ = self.seen.unbounded_send(text.to_string());
            let permit = self.gate.acquire().await.unwrap();
            permit.forget();
            format!("answer to {}", text)
        }
    }

    #[test]
    fn test_should_reply_filters() {
        assert!(should_reply(&event("message", "U999", "can you help me?"), SELF_ID, "help"));
        // Self-authored
        assert!(!should_reply(&event("message", SELF_ID, "help"), SELF_ID, "help"));
        // Not a chat message
        assert!(!should_reply(&event("user_typing", "U999", "help"), SELF_ID, "help"));
        assert!(!should_reply(&event("", "U999", "help"), SELF_ID, "help"));
        // No trigger
        assert!(!should_reply(&event("message", "U999", "hello there"), SELF_ID, "help"));
        // Case-sensitive substring match
        assert!(!should_reply(&event("message", "U999", "HELP"), SELF_ID, "help"));
        assert!(should_reply(&event("message", "U999", "helpful"), SELF_ID, "help"));
    }

    #[tokio::test]
    async fn test_dispatch_only_spawns_for_matches() {
        let (event_loop, _inbound, mut outbound) = make_loop(Arc::new(HelpResponder::default()));

        assert!(!event_loop.dispatch(event("message", SELF_ID, "help")));
        assert!(!event_loop.dispatch(event("presence_change", "U999", "help")));
        assert!(!event_loop.dispatch(event("message", "U999", "thanks")));
        assert!(event_loop.dispatch(event("message", "U999", "help please")));

        let reply = next_reply(&mut outbound).await;
        assert_eq!(reply.id, 1);
        assert_eq!(reply.channel, "C1");
        assert_eq!(reply.text, "Don't be scared, I'm here to help you!");

        // Exactly one reply
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(outbound.try_next().is_err());
    }

    #[tokio::test]
    async fn test_run_replies_in_sequence() {
        let (event_loop, inbound, mut outbound) = make_loop(Arc::new(HelpResponder::default()));
        let handle = tokio::spawn(event_loop.run());

        let ask = event("message", "U999", "can you help me?");
        inbound.unbounded_send(text_frame(&ask)).unwrap();
        let first = next_reply(&mut outbound).await;
        assert_eq!((first.id, first.channel.as_str()), (1, "C1"));

        inbound.unbounded_send(text_frame(&ask)).unwrap();
        assert_eq!(next_reply(&mut outbound).await.id, 2);

        // Skipped: own message, other kinds, control frames
        inbound
            .unbounded_send(text_frame(&event("message", SELF_ID, "help")))
            .unwrap();
        inbound
            .unbounded_send(Ok(Message::text(r#"{"type":"hello"}"#)))
            .unwrap();
        inbound
            .unbounded_send(Ok(Message::Ping(Vec::new().into())))
            .unwrap();
        inbound.unbounded_send(text_frame(&ask)).unwrap();
        let third = next_reply(&mut outbound).await;
        assert_eq!(third.id, 3);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(outbound.try_next().is_err());

        drop(inbound);
        let err = timeout(WAIT, handle).await.unwrap().unwrap().unwrap_err();
        assert!(matches!(
            err,
            BotError::Transport {
                stage: Stage::Receive,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_slow_reply_does_not_block_reading() {
        let (seen_tx, mut seen_rx) = mpsc::unbounded();
        let gate = Arc::new(Semaphore::new(0));
        let responder = Arc::new(GatedResponder {
            seen: seen_tx,
            gate: Arc::clone(&gate),
        });
        let (event_loop, inbound, mut outbound) = make_loop(responder);
        tokio::spawn(event_loop.run());

        inbound
            .unbounded_send(text_frame(&event("message", "U1", "help one")))
            .unwrap();
        inbound
            .unbounded_send(text_frame(&event("message", "U2", "help two")))
            .unwrap();

        // Both reach the responder while the first is still held
        let mut seen = vec![
            timeout(WAIT, seen_rx.next()).await.unwrap().unwrap(),
            timeout(WAIT, seen_rx.next()).await.unwrap().unwrap(),
        ];
        seen.sort();
        assert_eq!(seen, vec!["help one".to_string(), "help two".to_string()]);
        assert!(outbound.try_next().is_err());

        gate.add_permits(2);
        let mut ids = vec![
            next_reply(&mut outbound).await.id,
            next_reply(&mut outbound).await.id,
        ];
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_decode_failure_is_fatal() {
        let (event_loop, inbound, _outbound) = make_loop(Arc::new(HelpResponder::default()));

        inbound.unbounded_send(Ok(Message::text("not json"))).unwrap();
        let err = event_loop.run().await.unwrap_err();
        assert!(matches!(
            err,
            BotError::Decode {
                stage: Stage::Receive,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_close_frame_is_fatal() {
        let (event_loop, inbound, _outbound) = make_loop(Arc::new(HelpResponder::default()));

        inbound.unbounded_send(Ok(Message::Close(None))).unwrap();
        let err = event_loop.run().await.unwrap_err();
        assert!(err.to_string().contains("closed by peer"));
    }

    #[tokio::test]
    async fn test_transport_error_is_fatal() {
        let (event_loop, inbound, _outbound) = make_loop(Arc::new(HelpResponder::default()));

        inbound
            .unbounded_send(Err(WsError::ConnectionClosed))
            .unwrap();
        let err = event_loop.run().await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Receive));
    }

    #[tokio::test]
    async fn test_send_failure_does_not_stop_loop() {
        let (inbound_tx, inbound_rx) = mpsc::unbounded::<Result<Message, WsError>>();
        let (outbound_tx, outbound_rx) = mpsc::unbounded::<Message>();
        drop(outbound_rx);

        let event_loop = EventLoop::new(
            inbound_rx,
            Arc::new(Sender::new(outbound_tx)),
            Arc::new(HelpResponder::default()),
            SELF_ID,
            "help",
        );
        let handle = tokio::spawn(event_loop.run());

        let ask = event("message", "U999", "help");
        inbound_tx.unbounded_send(text_frame(&ask)).unwrap();
        inbound_tx.unbounded_send(text_frame(&ask)).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());

        drop(inbound_tx);
        let err = timeout(WAIT, handle).await.unwrap().unwrap().unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Receive));
    }
}
