use async_trait::async_trait;

use crate::{ChainResult, Message, Proposal};

/// Converts an incoming [`Message`] into an optional [`Proposal`] for the
/// destination chain.
///
/// Handlers must be pure with respect to relayer state: whatever side
/// effects they have must not cross-couple domains.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Produce the proposal for a message, or `Ok(None)` when the message is
    /// valid but bookkeeping-only.
    async fn handle_message(&self, message: &Message) -> ChainResult<Option<Proposal>>;
}

/// Submits batched proposals on the destination chain. Owns signing, gas and
/// whatever serialization (e.g. nonce management) submission needs.
#[async_trait]
pub trait ProposalExecutor: Send + Sync {
    /// Execute a batch of proposals in one on-chain submission.
    async fn execute(&self, proposals: Vec<Proposal>) -> ChainResult<()>;
}
