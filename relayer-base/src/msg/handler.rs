use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use relayer_core::{
    ChainCommunicationError, ChainResult, Message, MessageHandler, MessageType, Proposal,
};

/// Registry mapping message type tags to their handler, one instance per
/// destination chain.
///
/// Populated during startup and frozen before the relayer starts. The
/// registry itself implements [`MessageHandler`], so a chain facade holds it
/// as its inbound surface and stays ignorant of the individual tags.
#[derive(Default)]
pub struct MessageHandlerRegistry {
    handlers: HashMap<MessageType, Arc<dyn MessageHandler>>,
}

impl MessageHandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate a handler with a message type, replacing any previous
    /// registration for the same tag. An empty tag is ignored.
    pub fn register_message_handler(
        &mut self,
        message_type: MessageType,
        handler: Arc<dyn MessageHandler>,
    ) {
        if message_type.is_empty() {
            warn!("Ignoring handler registration for empty message type tag");
            return;
        }
        self.handlers.insert(message_type, handler);
    }
}

#[async_trait]
impl MessageHandler for MessageHandlerRegistry {
    /// Call the handler associated with the message's type tag and return
    /// the proposal to be submitted on-chain, if any.
    async fn handle_message(&self, message: &Message) -> ChainResult<Option<Proposal>> {
        let handler = self.handlers.get(&message.message_type).ok_or_else(|| {
            ChainCommunicationError::HandlerNotRegistered(message.message_type.clone())
        })?;
        handler.handle_message(message).await
    }
}
