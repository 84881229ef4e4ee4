use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::U256;

/// A per-domain polling loop over finalized chain history.
#[async_trait]
pub trait EventListener: Send + Sync {
    /// Advance through finalized blocks in fixed-size windows, invoking the
    /// registered event handlers over each window, until cancellation.
    ///
    /// When `start_block` is `None` the cursor initializes to the first
    /// observed finalized head. Cancellation is observed between iterations
    /// and during backoff sleeps; an in-flight handler call is awaited, not
    /// aborted.
    async fn listen_to_events(&self, cancel: CancellationToken, start_block: Option<U256>);
}

/// Decodes on-chain events from a block range. Implemented by collaborators
/// and registered with a domain listener.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle all events in the inclusive range `[start_block, end_block]`.
    ///
    /// A window that errors is replayed from its start, so implementations
    /// are expected to be effectively idempotent over a window.
    async fn handle_events(&self, start_block: U256, end_block: U256) -> eyre::Result<()>;
}
