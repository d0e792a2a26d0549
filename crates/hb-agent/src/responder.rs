//! Fixed-text help responder

use async_trait::async_trait;

use hb_core::config::DEFAULT_REPLY;
use hb_core::Responder;

/// Answers every help request with the same text
#[derive(Debug, Clone)]
pub struct HelpResponder {
    reply: String,
}

impl HelpResponder {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

impl Default for HelpResponder {
    fn default() -> Self {
        Self::new(DEFAULT_REPLY)
    }
}

#[async_trait]
impl Responder for HelpResponder {
    async fn reply(&self, _text: &str) -> String {
        self.reply.clone()
    }
}
