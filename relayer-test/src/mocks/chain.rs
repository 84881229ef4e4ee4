#![allow(non_snake_case)]

use async_trait::async_trait;
use mockall::mock;
use tokio_util::sync::CancellationToken;

use relayer_core::{ChainResult, DomainId, Message, Proposal, RelayedChain};

mock! {
    pub RelayedChain {
        pub fn _domain_id(&self) -> DomainId;

        pub fn _poll_events(&self);

        pub fn _receive_message(&self, message: &Message) -> ChainResult<Option<Proposal>>;

        pub fn _write(&self, proposals: Vec<Proposal>) -> ChainResult<()>;
    }
}

impl std::fmt::Debug for MockRelayedChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MockRelayedChain")
    }
}

#[async_trait]
impl RelayedChain for MockRelayedChain {
    fn domain_id(&self) -> DomainId {
        self._domain_id()
    }

    async fn poll_events(&self, cancel: CancellationToken) {
        self._poll_events();
        cancel.cancelled().await
    }

    async fn receive_message(&self, message: &Message) -> ChainResult<Option<Proposal>> {
        self._receive_message(message)
    }

    async fn write(&self, proposals: Vec<Proposal>) -> ChainResult<()> {
        self._write(proposals)
    }
}
