use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::responder::{OutboundMessage, Responder, ResponderContext, ResponderResult};

/// Manages registration and routing of responders using Chain of Responsibility pattern
pub struct ResponderManager {
    responders: Vec<Arc<dyn Responder>>,
}

impl ResponderManager {
    /// Create a new empty responder manager
    pub fn new() -> Self {
        Self {
            responders: Vec::new(),
        }
    }

    /// Register a new responder
    /// Responders are automatically sorted by priority (highest first)
    pub fn register(&mut self, responder: Arc<dyn Responder>) {
        info!(
            "📝 Registering responder: {} (priority: {})",
            responder.name(),
            responder.priority()
        );
        self.responders.push(responder);

        // Sort by priority (highest first)
        self.responders
            .sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// Route a message to the first responder that handles it.
    ///
    /// Returns the final reply of the handling responder, if it produced one.
    /// Any mid-invocation messages (progress notices) have already gone out
    /// through the context's outbound sink by the time this returns.
    pub async fn process_message(
        &self,
        context: &ResponderContext,
    ) -> Result<Option<OutboundMessage>> {
        debug!(
            "Processing message through {} responders",
            self.responders.len()
        );

        for responder in &self.responders {
            // Two-phase dispatch: check first, then handle
            if responder.should_handle(context).await {
                info!("✅ Responder '{}' will handle message", responder.name());

                match responder.handle(context).await? {
                    ResponderResult::Handled(response) => {
                        return Ok(response);
                    }
                    ResponderResult::NotHandled => {
                        debug!(
                            "Responder '{}' returned NotHandled, trying next",
                            responder.name()
                        );
                        continue;
                    }
                }
            }
        }

        warn!("⚠️  No responder handled the message");
        Ok(None)
    }

    /// Get the number of registered responders
    pub fn count(&self) -> usize {
        self.responders.len()
    }
}

impl Default for ResponderManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct NullSink;

    #[async_trait]
    impl crate::responder::OutboundSink for NullSink {
        async fn send(&self, _message: OutboundMessage) -> Result<()> {
            Ok(())
        }
    }

    struct FixedResponder {
        word: &'static str,
        reply: &'static str,
        priority: i32,
    }

    #[async_trait]
    impl Responder for FixedResponder {
        fn name(&self) -> &str {
            self.word
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        async fn should_handle(&self, context: &ResponderContext) -> bool {
            context.command() == Some(self.word)
        }

        async fn handle(&self, _context: &ResponderContext) -> Result<ResponderResult> {
            Ok(ResponderResult::Handled(Some(OutboundMessage::plain(
                self.reply,
            ))))
        }
    }

    fn context(body: &str) -> ResponderContext {
        ResponderContext {
            sender: "@tester:example.org".to_string(),
            message_body: body.to_string(),
            outbound: Arc::new(NullSink),
        }
    }

    #[tokio::test]
    async fn routes_to_matching_responder() {
        let mut manager = ResponderManager::new();
        manager.register(Arc::new(FixedResponder {
            word: "a",
            reply: "from a",
            priority: 0,
        }));
        manager.register(Arc::new(FixedResponder {
            word: "b",
            reply: "from b",
            priority: 10,
        }));
        assert_eq!(manager.count(), 2);

        let reply = manager.process_message(&context("b")).await.unwrap();
        assert_eq!(reply.unwrap().body, "from b");
    }

    #[tokio::test]
    async fn unmatched_message_yields_no_reply() {
        let manager = ResponderManager::new();
        let reply = manager.process_message(&context("nothing")).await.unwrap();
        assert!(reply.is_none());
    }
}
