use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use relayer_core::{
    BlockDeltaMeter, BlockStorer, DomainId, EventHandler, EventListener, SubstrateClient, U256,
};

/// Polls a substrate-style chain for finalized blocks and fans each
/// fixed-size window out to the registered event handlers.
///
/// Substrate only exposes the finalized head as a hash, so every iteration
/// resolves the hash to a block to learn its height.
pub struct SubstrateListener {
    client: Arc<dyn SubstrateClient>,
    event_handlers: Vec<Arc<dyn EventHandler>>,
    blockstore: Arc<dyn BlockStorer>,
    metrics: Arc<dyn BlockDeltaMeter>,

    domain_id: DomainId,
    block_retry_interval: Duration,
    block_interval: U256,
}

impl SubstrateListener {
    /// Construct a listener for one domain.
    pub fn new(
        client: Arc<dyn SubstrateClient>,
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
impl EventListener for SubstrateListener {
    async fn listen_to_events(&self, cancel: CancellationToken, start_block: Option<U256>) {
        let mut start_block = start_block;
        'listen: while !cancel.is_cancelled() {
            let hash = match self.client.finalized_head().await {
                Ok(hash) => hash,
                Err(err) => {
                    warn!(domain = self.domain_id, error = %err, "Failed to fetch finalized header");
                    if !self.backoff(&cancel).await {
                        return;
                    }
                    continue;
                }
            };
            let head = match self.client.block(hash).await {
                Ok(block) => U256::from(block.number()),
                Err(err) => {
                    warn!(domain = self.domain_id, error = %err, "Failed to fetch block");
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
                "Fetching substrate events for block range"
            );

            for handler in &self.event_handlers {
                if let Err(err) = handler.handle_events(start, end - 1).await {
                    warn!(domain = self.domain_id, error = %err, "Error handling substrate events");
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

#[cfg(test)]
mod test {
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    use relayer_core::{ChainCommunicationError, SignedBlock, H256};
    use relayer_test::mocks::{
        MockBlockDeltaMeter, MockBlockStorer, MockEventHandler, MockSubstrateClient,
    };

    use super::*;

    const DOMAIN: DomainId = 3;
    const TEST_TIMEOUT: Duration = Duration::from_secs(5);

    fn listener(
        client: MockSubstrateClient,
        event_handlers: Vec<Arc<dyn EventHandler>>,
        blockstore: MockBlockStorer,
        metrics: MockBlockDeltaMeter,
    ) -> Arc<SubstrateListener> {
        Arc::new(SubstrateListener::new(
            Arc::new(client),
            event_handlers,
            Arc::new(blockstore),
            Arc::new(metrics),
            DOMAIN,
            Duration::from_millis(75),
            U256::from(5),
        ))
    }

    fn permissive_meter() -> MockBlockDeltaMeter {
        let mut meter = MockBlockDeltaMeter::new();
        meter.expect_track_block_delta().returning(|_, _, _| ());
        meter
    }

    #[tokio::test]
    async fn resolves_head_hash_and_processes_window() {
        let mut client = MockSubstrateClient::new();
        let head_hash = H256::repeat_byte(7);
        client
            .expect__finalized_head()
            .returning(move || Ok(head_hash));
        client
            .expect__block()
            .withf(move |hash| *hash == head_hash)
            .returning(|_| Ok(SignedBlock::at_height(109)));

        let mut handler = MockEventHandler::new();
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        handler.expect__handle_events().returning(move |from, to| {
            events_tx.send((from, to)).unwrap();
            Ok(())
        });

        let mut blockstore = MockBlockStorer::new();
        let (store_tx, mut store_rx) = mpsc::unbounded_channel();
        blockstore
            .expect__store_block()
            .returning(move |block, domain| {
                store_tx.send((block, domain)).unwrap();
                Ok(())
            });

        let listener = listener(client, vec![Arc::new(handler)], blockstore, permissive_meter());
        let cancel = CancellationToken::new();
        let task = tokio::spawn({
            let cancel = cancel.clone();
            async move { listener.listen_to_events(cancel, Some(U256::from(100))).await }
        });

        let window = timeout(TEST_TIMEOUT, events_rx.recv())
            .await
            .expect("handler never invoked")
            .unwrap();
        assert_eq!(window, (U256::from(100), U256::from(104)));
        let stored = timeout(TEST_TIMEOUT, store_rx.recv())
            .await
            .expect("checkpoint never stored")
            .unwrap();
        assert_eq!(stored, (U256::from(105), DOMAIN));

        cancel.cancel();
        timeout(TEST_TIMEOUT, task).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn retries_when_block_fetch_fails() {
        let mut client = MockSubstrateClient::new();
        client
            .expect__finalized_head()
            .returning(|| Ok(H256::zero()));
        client
            .expect__block()
            .times(1)
            .returning(|_| Err(ChainCommunicationError::provider("node restarting")));
        client
            .expect__block()
            .returning(|_| Ok(SignedBlock::at_height(109)));

        let mut handler = MockEventHandler::new();
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        handler.expect__handle_events().returning(move |from, to| {
            events_tx.send((from, to)).unwrap();
            Ok(())
        });

        let mut blockstore = MockBlockStorer::new();
        blockstore.expect__store_block().returning(|_, _| Ok(()));

        let listener = listener(client, vec![Arc::new(handler)], blockstore, permissive_meter());
        let cancel = CancellationToken::new();
        let task = tokio::spawn({
            let cancel = cancel.clone();
            async move { listener.listen_to_events(cancel, Some(U256::from(100))).await }
        });

        let window = timeout(TEST_TIMEOUT, events_rx.recv())
            .await
            .expect("handler never invoked after retry")
            .unwrap();
        assert_eq!(window, (U256::from(100), U256::from(104)));

        cancel.cancel();
        timeout(TEST_TIMEOUT, task).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn gates_until_window_is_finalized() {
        let mut client = MockSubstrateClient::new();
        client
            .expect__finalized_head()
            .returning(|| Ok(H256::zero()));
        client
            .expect__block()
            .returning(|_| Ok(SignedBlock::at_height(104)));

        let mut handler = MockEventHandler::new();
        handler.expect__handle_events().never();
        let mut blockstore = MockBlockStorer::new();
        blockstore.expect__store_block().never();
        let mut meter = MockBlockDeltaMeter::new();
        meter.expect_track_block_delta().never();

        let listener = listener(client, vec![Arc::new(handler)], blockstore, meter);
        let cancel = CancellationToken::new();
        let task = tokio::spawn({
            let cancel = cancel.clone();
            async move { listener.listen_to_events(cancel, Some(U256::from(100))).await }
        });

        sleep(Duration::from_millis(200)).await;
        cancel.cancel();
        timeout(TEST_TIMEOUT, task).await.unwrap().unwrap();
    }
}
