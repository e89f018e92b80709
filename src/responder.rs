use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

/// How the host should render an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Deliver the body verbatim; the client applies no rich-text
    /// post-processing to it. Reports depend on this.
    Plain,
    /// Let the host render the body as Markdown.
    Markdown,
}

/// One message leaving the bot.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub body: String,
    pub render: RenderMode,
}

impl OutboundMessage {
    pub fn plain(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            render: RenderMode::Plain,
        }
    }

    pub fn markdown(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            render: RenderMode::Markdown,
        }
    }
}

/// Delivery channel back to wherever the command came from.
///
/// Responders may send through this mid-invocation (e.g. a progress notice
/// before a slow fetch); the host delivers messages in the order they are
/// sent. The production sink wraps a Matrix room; tests record instead.
#[async_trait]
pub trait OutboundSink: Send + Sync {
    async fn send(&self, message: OutboundMessage) -> Result<()>;
}

/// Context provided to responders for handling messages
#[derive(Clone)]
pub struct ResponderContext {
    /// User ID of the message sender
    pub sender: String,
    /// The actual message text
    pub message_body: String,
    /// Channel for messages back to the room
    pub outbound: Arc<dyn OutboundSink>,
}

impl ResponderContext {
    /// The command word (first whitespace token, `!` prefix stripped).
    pub fn command(&self) -> Option<&str> {
        self.message_body
            .split_whitespace()
            .next()
            .map(|word| word.strip_prefix('!').unwrap_or(word))
    }

    /// Whitespace-delimited arguments after the command word.
    pub fn args(&self) -> Vec<&str> {
        self.message_body.split_whitespace().skip(1).collect()
    }
}

/// Response from a responder
pub enum ResponderResult {
    /// Message was handled, optionally with a final reply
    Handled(Option<OutboundMessage>),
    /// Message was not handled, pass to next responder
    NotHandled,
}

/// Core trait that all responders must implement
#[async_trait]
pub trait Responder: Send + Sync {
    /// Returns the name of this responder
    fn name(&self) -> &str;

    /// Returns the priority of this responder (higher = checked first)
    /// Default priority is 0
    fn priority(&self) -> i32 {
        0
    }

    /// Check if this responder should handle the message
    /// This is called first as a fast filter before handle()
    async fn should_handle(&self, context: &ResponderContext) -> bool;

    /// Handle the message and return a response
    /// Only called if should_handle() returns true
    async fn handle(&self, context: &ResponderContext) -> Result<ResponderResult>;
}
