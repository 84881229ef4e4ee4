use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use relayer_core::{ChainCommunicationError, ChainResult, DomainId, Message, RelayedChain};

use crate::{MessageMetrics, MessageStatus};

/// The relayer router: owns the registered chains, runs their listeners and
/// dispatches inbound message batches to their destination chain.
pub struct Relayer {
    chains: HashMap<DomainId, Arc<dyn RelayedChain>>,
    metrics: MessageMetrics,
}

impl Relayer {
    /// Construct a router over a set of chains keyed by domain. No I/O
    /// happens here.
    pub fn new(chains: HashMap<DomainId, Arc<dyn RelayedChain>>, metrics: MessageMetrics) -> Self {
        Self { chains, metrics }
    }

    /// Register an additional chain, replacing any previous registration for
    /// the same domain. Only valid before [`start`](Self::start).
    pub fn add_relayed_chain(&mut self, chain: Arc<dyn RelayedChain>) {
        self.chains.insert(chain.domain_id(), chain);
    }

    /// Start polling events on every registered chain and route inbound
    /// message batches until cancellation.
    ///
    /// Every message in a batch is expected to share the same destination
    /// and to be batchable into one write; the router honors
    /// `msgs[0].destination` and does not split mixed batches. Each batch is
    /// routed on its own task, so batches to the same destination may
    /// interleave — serialization, where needed, belongs to the destination
    /// writer.
    pub async fn start(
        self: Arc<Self>,
        cancel: CancellationToken,
        mut messages: mpsc::Receiver<Vec<Message>>,
    ) {
        info!("Starting relayer");

        for chain in self.chains.values() {
            debug!(domain = chain.domain_id(), "Starting chain");
            let chain = chain.clone();
            let cancel = cancel.child_token();
            tokio::spawn(async move { chain.poll_events(cancel).await });
        }

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                batch = messages.recv() => {
                    let Some(batch) = batch else {
                        return;
                    };
                    let relayer = self.clone();
                    tokio::spawn(async move { relayer.route(batch).await });
                }
            }
        }
    }

    /// The chain registered for a destination domain.
    fn destination_chain(&self, domain: DomainId) -> ChainResult<&Arc<dyn RelayedChain>> {
        self.chains
            .get(&domain)
            .ok_or(ChainCommunicationError::UnknownDestination(domain))
    }

    /// Route one batch to its destination chain.
    ///
    /// A missing destination drops the batch; a failing message is skipped;
    /// a failing write is logged and not retried — replay from the source
    /// checkpoint is the recovery path for all three.
    async fn route(&self, msgs: Vec<Message>) {
        let Some(first) = msgs.first() else {
            return;
        };
        let destination = first.destination;
        self.metrics.track_messages(&msgs, MessageStatus::Pending);

        let chain = match self.destination_chain(destination) {
            Ok(chain) => chain,
            Err(err) => {
                error!(domain = destination, error = %err, "Dropping message batch");
                self.metrics.track_messages(&msgs, MessageStatus::Failed);
                return;
            }
        };

        let mut proposals = Vec::new();
        for message in &msgs {
            match chain.receive_message(message).await {
                Ok(Some(proposal)) => proposals.push(proposal),
                Ok(None) => continue,
                Err(err) => {
                    error!(
                        domain = destination,
                        message = %message,
                        error = %err,
                        "Failed receiving message"
                    );
                    self.metrics
                        .track_messages(std::slice::from_ref(message), MessageStatus::Failed);
                    continue;
                }
            }
        }
        if proposals.is_empty() {
            return;
        }

        if let Err(err) = chain.write(proposals).await {
            error!(
                domain = destination,
                error = %err,
                "Failed writing proposals"
            );
            self.metrics.track_messages(&msgs, MessageStatus::Failed);
            return;
        }
        self.metrics.track_messages(&msgs, MessageStatus::Successful);
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use prometheus::Registry;
    use tokio::time::timeout;

    use relayer_core::{ChainCommunicationError, MessageType, Proposal, ProposalType};
    use relayer_test::mocks::MockRelayedChain;

    use crate::CoreMetrics;

    use super::*;

    const TEST_TIMEOUT: Duration = Duration::from_secs(5);

    fn message_metrics() -> MessageMetrics {
        let core = CoreMetrics::new("test", None, Registry::new());
        MessageMetrics::new(&core).unwrap()
    }

    fn message(id: &str) -> Message {
        Message::new(1, 2, id, MessageType::new("fungibleTransfer"), vec![])
    }

    fn proposal(id: &str) -> Proposal {
        Proposal::new(1, 2, vec![], ProposalType::new("fungibleTransfer"), id)
    }

    fn relayer_with(chain: MockRelayedChain, domain: DomainId) -> Relayer {
        let mut chains: HashMap<DomainId, Arc<dyn RelayedChain>> = HashMap::new();
        chains.insert(domain, Arc::new(chain));
        Relayer::new(chains, message_metrics())
    }

    #[tokio::test]
    async fn writes_proposals_in_message_order() {
        let mut chain = MockRelayedChain::new();
        chain
            .expect__receive_message()
            .times(3)
            .returning(|m| match m.id.as_str() {
                // A bookkeeping-only message produces no proposal.
                "1-2" => Ok(None),
                id => Ok(Some(Proposal::new(
                    1,
                    2,
                    vec![],
                    ProposalType::new("fungibleTransfer"),
                    id,
                ))),
            });
        chain
            .expect__write()
            .times(1)
            .withf(|props| {
                props.len() == 2 && props[0].message_id == "1-1" && props[1].message_id == "1-3"
            })
            .returning(|_| Ok(()));

        let relayer = relayer_with(chain, 2);
        relayer
            .route(vec![message("1-1"), message("1-2"), message("1-3")])
            .await;
    }

    #[tokio::test]
    async fn unknown_destination_drops_batch() {
        let mut chain = MockRelayedChain::new();
        chain.expect__receive_message().never();
        chain.expect__write().never();

        // Registered for domain 9; the batch is addressed to domain 2.
        let relayer = relayer_with(chain, 9);
        relayer.route(vec![message("1-1")]).await;
    }

    #[tokio::test]
    async fn destination_lookup_reports_unknown_domain() {
        let relayer = Relayer::new(HashMap::new(), message_metrics());

        assert!(matches!(
            relayer.destination_chain(2),
            Err(ChainCommunicationError::UnknownDestination(2))
        ));
    }

    #[tokio::test]
    async fn receive_failure_isolates_one_message() {
        let mut chain = MockRelayedChain::new();
        chain
            .expect__receive_message()
            .times(2)
            .returning(|m| match m.id.as_str() {
                "1-1" => Err(ChainCommunicationError::HandlerNotRegistered(
                    m.message_type.clone(),
                )),
                id => Ok(Some(Proposal::new(
                    1,
                    2,
                    vec![],
                    ProposalType::new("fungibleTransfer"),
                    id,
                ))),
            });
        chain
            .expect__write()
            .times(1)
            .withf(|props| props.len() == 1 && props[0].message_id == "1-2")
            .returning(|_| Ok(()));

        let relayer = relayer_with(chain, 2);
        relayer.route(vec![message("1-1"), message("1-2")]).await;
    }

    #[tokio::test]
    async fn skips_write_when_nothing_to_submit() {
        let mut chain = MockRelayedChain::new();
        chain.expect__receive_message().times(1).returning(|_| Ok(None));
        chain.expect__write().never();

        let relayer = relayer_with(chain, 2);
        relayer.route(vec![message("1-1")]).await;
    }

    #[tokio::test]
    async fn write_failure_is_not_retried() {
        let mut chain = MockRelayedChain::new();
        chain
            .expect__receive_message()
            .returning(|m| Ok(Some(Proposal::new(
                1,
                2,
                vec![],
                ProposalType::new("fungibleTransfer"),
                m.id.clone(),
            ))));
        // One write per batch: the failed first batch is dropped, the second
        // batch still goes through.
        let mut seq = mockall::Sequence::new();
        chain
            .expect__write()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ChainCommunicationError::provider("gas estimation failed")));
        chain
            .expect__write()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|props| props.len() == 1 && props[0].message_id == "2-1")
            .returning(|_| Ok(()));

        let relayer = relayer_with(chain, 2);
        relayer.route(vec![message("1-1")]).await;
        relayer.route(vec![message("2-1")]).await;
    }

    #[tokio::test]
    async fn start_polls_chains_and_routes_until_cancelled() {
        let mut chain = MockRelayedChain::new();
        chain.expect__domain_id().returning(|| 2);
        chain.expect__poll_events().times(1).returning(|| ());
        chain
            .expect__receive_message()
            .returning(|m| Ok(Some(Proposal::new(
                1,
                2,
                vec![],
                ProposalType::new("fungibleTransfer"),
                m.id.clone(),
            ))));
        let (written_tx, mut written_rx) = mpsc::unbounded_channel();
        chain.expect__write().returning(move |props| {
            written_tx.send(props.len()).unwrap();
            Ok(())
        });

        let relayer = Arc::new({
            let mut relayer = Relayer::new(HashMap::new(), message_metrics());
            relayer.add_relayed_chain(Arc::new(chain));
            relayer
        });

        let (batch_tx, batch_rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        let task = tokio::spawn({
            let cancel = cancel.clone();
            let relayer = relayer.clone();
            async move { relayer.start(cancel, batch_rx).await }
        });

        batch_tx
            .send(vec![message("1-1"), message("1-2")])
            .await
            .unwrap();
        let written = timeout(TEST_TIMEOUT, written_rx.recv())
            .await
            .expect("batch never written")
            .unwrap();
        assert_eq!(written, 2);

        cancel.cancel();
        timeout(TEST_TIMEOUT, task).await.unwrap().unwrap();
    }
}
