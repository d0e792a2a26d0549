//! hb-agent: Real-time chat agent for helpbot
//!
//! The agent exchanges a bot token for a streaming connection, then reads
//! chat events off that connection and answers the ones asking for help.
//! Each answer is computed and sent from its own task so the read side
//! never waits on a reply.

pub mod event_loop;
pub mod responder;
pub mod sender;
pub mod session;

use std::convert::Infallible;
use std::sync::Arc;

use hb_core::config::BotConfig;
use hb_core::{BotError, Stage};

pub use event_loop::{should_reply, EventLoop};
pub use responder::HelpResponder;
pub use sender::Sender;
pub use session::{ExponentialBackoff, Session, SessionEstablisher};

/// Establish a session and serve it until the first fatal error.
///
/// Bootstrap and connection failures are returned before any event is
/// read. Once the event loop runs, the only way out is a receive failure.
pub async fn run(config: BotConfig) -> Result<Infallible, BotError> {
    let establisher = SessionEstablisher::new(config.connection.clone())?;
    let session = establisher.establish_with_retry().await?;

    tracing::info!("helpbot is running");
    tracing::info!("helpbot id is {}", session.self_id());

    let (sender, inbound, self_id) = session.into_parts();
    let responder = Arc::new(HelpResponder::new(config.bot.reply.clone()));

    EventLoop::new(
        inbound,
        Arc::new(sender),
        responder,
        self_id,
        config.bot.trigger.clone(),
    )
    .run()
    .await
}

/// One-line description of a fatal error, by the stage it happened in
pub fn failure_summary(err: &BotError) -> &'static str {
    match err.stage() {
        Some(Stage::Bootstrap) | Some(Stage::Connect) => "Can't connect to the chat platform",
        Some(Stage::Receive) | Some(Stage::Send) => "Error while getting message",
        None => "Invalid configuration",
    }
}
