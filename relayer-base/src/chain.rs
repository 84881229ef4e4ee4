use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use relayer_core::{
    ChainCommunicationError, ChainResult, DomainId, EventListener, Message, MessageHandler,
    Proposal, ProposalExecutor, RelayedChain, U256,
};

/// Per-domain composition of listener, inbound message handler and outbound
/// executor, as registered with the router.
///
/// Any collaborator may be left out: a source-only domain carries no message
/// handler or executor, a sink-only domain no listener. Operations that need
/// a missing collaborator return a "not configured" error instead of
/// crashing, so partially configured domains coexist in one process.
pub struct Chain {
    domain_id: DomainId,
    start_block: Option<U256>,
    listener: Option<Arc<dyn EventListener>>,
    message_handler: Option<Arc<dyn MessageHandler>>,
    executor: Option<Arc<dyn ProposalExecutor>>,
}

impl Chain {
    /// A chain for `domain_id` with no collaborators configured yet.
    pub fn new(domain_id: DomainId) -> Self {
        Self {
            domain_id,
            start_block: None,
            listener: None,
            message_handler: None,
            executor: None,
        }
    }

    /// Resume listening from this block instead of the observed head.
    pub fn with_start_block(mut self, start_block: U256) -> Self {
        self.start_block = Some(start_block);
        self
    }

    /// Attach the domain's event listener.
    pub fn with_listener(mut self, listener: Arc<dyn EventListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Attach the inbound message handler (usually a
    /// [`MessageHandlerRegistry`]).
    ///
    /// [`MessageHandlerRegistry`]: crate::MessageHandlerRegistry
    pub fn with_message_handler(mut self, message_handler: Arc<dyn MessageHandler>) -> Self {
        self.message_handler = Some(message_handler);
        self
    }

    /// Attach the outbound proposal executor.
    pub fn with_executor(mut self, executor: Arc<dyn ProposalExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }
}

#[async_trait]
impl RelayedChain for Chain {
    fn domain_id(&self) -> DomainId {
        self.domain_id
    }

    async fn poll_events(&self, cancel: CancellationToken) {
        let Some(listener) = &self.listener else {
            debug!(domain = self.domain_id, "No listener configured, not polling events");
            return;
        };
        info!(
            domain = self.domain_id,
            start_block = ?self.start_block,
            "Polling blocks"
        );
        listener.listen_to_events(cancel, self.start_block).await
    }

    async fn receive_message(&self, message: &Message) -> ChainResult<Option<Proposal>> {
        let handler =
            self.message_handler
                .as_ref()
                .ok_or(ChainCommunicationError::NotConfigured {
                    collaborator: "message handler",
                    domain: self.domain_id,
                })?;
        handler.handle_message(message).await
    }

    async fn write(&self, proposals: Vec<Proposal>) -> ChainResult<()> {
        let executor = self
            .executor
            .as_ref()
            .ok_or(ChainCommunicationError::NotConfigured {
                collaborator: "proposal executor",
                domain: self.domain_id,
            })?;
        executor.execute(proposals).await
    }
}
