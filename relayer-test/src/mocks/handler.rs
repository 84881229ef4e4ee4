#![allow(non_snake_case)]

use async_trait::async_trait;
use eyre::Result;
use mockall::mock;

use relayer_core::{
    ChainResult, EventHandler, Message, MessageHandler, Proposal, ProposalExecutor, U256,
};

mock! {
    pub EventHandler {
        pub fn _handle_events(&self, start_block: U256, end_block: U256) -> Result<()>;
    }
}

impl std::fmt::Debug for MockEventHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MockEventHandler")
    }
}

#[async_trait]
impl EventHandler for MockEventHandler {
    async fn handle_events(&self, start_block: U256, end_block: U256) -> Result<()> {
        self._handle_events(start_block, end_block)
    }
}

mock! {
    pub MessageHandler {
        pub fn _handle_message(&self, message: &Message) -> ChainResult<Option<Proposal>>;
    }
}

impl std::fmt::Debug for MockMessageHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MockMessageHandler")
    }
}

#[async_trait]
impl MessageHandler for MockMessageHandler {
    async fn handle_message(&self, message: &Message) -> ChainResult<Option<Proposal>> {
        self._handle_message(message)
    }
}

mock! {
    pub ProposalExecutor {
        pub fn _execute(&self, proposals: Vec<Proposal>) -> ChainResult<()>;
    }
}

impl std::fmt::Debug for MockProposalExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MockProposalExecutor")
    }
}

#[async_trait]
impl ProposalExecutor for MockProposalExecutor {
    async fn execute(&self, proposals: Vec<Proposal>) -> ChainResult<()> {
        self._execute(proposals)
    }
}
