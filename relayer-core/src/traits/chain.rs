use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{ChainResult, DomainId, Message, Proposal};

/// One blockchain participating in the relay, as seen by the router.
///
/// Binds the per-domain listener, inbound message handling and outbound
/// writing behind one small surface. A chain may be partially configured —
/// source-only (no executor) or sink-only (no listener) — in which case the
/// unconfigured operations return [`ChainCommunicationError::NotConfigured`].
///
/// [`ChainCommunicationError::NotConfigured`]: crate::ChainCommunicationError::NotConfigured
#[async_trait]
pub trait RelayedChain: Send + Sync {
    /// The domain this chain fronts.
    fn domain_id(&self) -> DomainId;

    /// Run the domain's event listener until cancellation. Returns
    /// immediately when the chain has no listener configured.
    async fn poll_events(&self, cancel: CancellationToken);

    /// Accept a message from a source chain and convert it into a proposal
    /// to be submitted on-chain. `Ok(None)` means the message is valid but
    /// produces nothing to write.
    async fn receive_message(&self, message: &Message) -> ChainResult<Option<Proposal>>;

    /// Submit proposals on-chain. Multiple proposals are expected to be
    /// batchable into one submission.
    async fn write(&self, proposals: Vec<Proposal>) -> ChainResult<()>;
}
