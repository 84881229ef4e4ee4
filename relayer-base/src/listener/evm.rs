use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use relayer_core::{
    BlockDeltaMeter, BlockStorer, DomainId, EventHandler, EventListener, EvmClient, U256,
};

/// Polls an EVM-style chain for finalized blocks and fans each fixed-size
/// window out to the registered event handlers.
pub struct EvmListener {
    client: Arc<dyn EvmClient>,
    event_handlers: Vec<Arc<dyn EventHandler>>,
    blockstore: Arc<dyn BlockStorer>,
    metrics: Arc<dyn BlockDeltaMeter>,

    domain_id: DomainId,
    block_retry_interval: Duration,
    block_interval: U256,
}

impl EvmListener {
    /// Construct a listener for one domain. `block_interval` is the window
    /// size in blocks, `block_retry_interval` the backoff used both for
    /// transient head-fetch failures and for the finality gate.
    pub fn new(
        client: Arc<dyn EvmClient>,
        event_handlers: Vec<Arc<dyn EventHandler>>,
        blockstore: Arc<dyn BlockStorer>,
        metrics: Arc<dyn BlockDeltaMeter>,
        domain_id: DomainId,
        block_retry_interval: Duration,
        block_interval: U256,
    ) -> Self {
        Self {
            client,
            event_handlers,
            blockstore,
            metrics,
            domain_id,
            block_retry_interval,
            block_interval,
        }
    }

    /// Sleep for the retry interval. Returns false if cancelled meanwhile.
    async fn backoff(&self, cancel: &CancellationToken) -> bool {
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = sleep(self.block_retry_interval) => true,
        }
    }
}

#[async_trait]
impl EventListener for EvmListener {
    async fn listen_to_events(&self, cancel: CancellationToken, start_block: Option<U256>) {
        let mut start_block = start_block;
        'listen: while !cancel.is_cancelled() {
            let head = match self.client.latest_block().await {
                Ok(head) => head,
                Err(err) => {
                    warn!(domain = self.domain_id, error = %err, "Failed to fetch latest block");
                    if !self.backoff(&cancel).await {
                        return;
                    }
                    continue;
                }
            };

            // An unset cursor starts at the first observed head.
            let start = *start_block.get_or_insert(head);
            let end = start + self.block_interval;

            // Sleep until the whole window is finalized.
            if head < end {
                if !self.backoff(&cancel).await {
                    return;
                }
                continue;
            }

            self.metrics.track_block_delta(self.domain_id, head, end);
            debug!(
                domain = self.domain_id,
                from = %start,
                to = %end,
                "Fetching evm events for block range"
            );

            for handler in &self.event_handlers {
                if let Err(err) = handler.handle_events(start, end - 1).await {
                    warn!(domain = self.domain_id, error = %err, "Error handling evm events");
                    // Replay the whole window; the cursor stays put.
                    continue 'listen;
                }
            }

            if let Err(err) = self.blockstore.store_block(end, self.domain_id).await {
                error!(
                    domain = self.domain_id,
                    block = %end,
                    error = %err,
                    "Failed to write latest block to blockstore"
                );
            }
            start_block = Some(end);
        }
    }
}
