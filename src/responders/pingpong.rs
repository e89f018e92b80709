use anyhow::Result;
use async_trait::async_trait;

use crate::responder::{OutboundMessage, Responder, ResponderContext, ResponderResult};

/// Simple ping-pong responder for health checks
pub struct PingPongResponder;

impl PingPongResponder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PingPongResponder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Responder for PingPongResponder {
    fn name(&self) -> &str {
        "PingPongResponder"
    }

    fn priority(&self) -> i32 {
        100 // High priority for simple commands
    }

    async fn should_handle(&self, context: &ResponderContext) -> bool {
        context.command().map(str::to_lowercase).as_deref() == Some("ping")
    }

    async fn handle(&self, _context: &ResponderContext) -> Result<ResponderResult> {
        Ok(ResponderResult::Handled(Some(OutboundMessage::plain(
            "Pong!",
        ))))
    }
}
