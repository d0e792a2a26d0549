//! Reply seam
//!
//! Deciding what to answer is kept out of the session machinery. The event
//! loop hands the triggering text to a [`Responder`] from inside the
//! spawned reply task, so a slow responder never holds up the read side.

use async_trait::async_trait;

/// Computes the reply body for a triggering message
#[async_trait]
pub trait Responder: Send + Sync {
    /// Reply text for the given inbound text
    async fn reply(&self, text: &str) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Echo;

    #[async_trait]
    impl Responder for Echo {
        async fn reply(&self, text: &str) -> String {
            format!("you said: {}", text)
        }
    }

    #[tokio::test]
    async fn test_responder_behind_arc() {
        let responder: Arc<dyn Responder> = Arc::new(Echo);
        assert_eq!(responder.reply("help").await, "you said: help");
    }
}
