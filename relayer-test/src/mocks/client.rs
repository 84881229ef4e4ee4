#![allow(non_snake_case)]

use async_trait::async_trait;
use mockall::mock;

use relayer_core::{ChainResult, EvmClient, SignedBlock, SubstrateClient, H256, U256};

mock! {
    pub EvmClient {
        pub fn _latest_block(&self) -> ChainResult<U256>;
    }
}

impl std::fmt::Debug for MockEvmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MockEvmClient")
    }
}

#[async_trait]
impl EvmClient for MockEvmClient {
    async fn latest_block(&self) -> ChainResult<U256> {
        self._latest_block()
    }
}

mock! {
    pub SubstrateClient {
        pub fn _finalized_head(&self) -> ChainResult<H256>;

        pub fn _block(&self, hash: H256) -> ChainResult<SignedBlock>;
    }
}

impl std::fmt::Debug for MockSubstrateClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MockSubstrateClient")
    }
}

#[async_trait]
impl SubstrateClient for MockSubstrateClient {
    async fn finalized_head(&self) -> ChainResult<H256> {
        self._finalized_head()
    }

    async fn block(&self, hash: H256) -> ChainResult<SignedBlock> {
        self._block(hash)
    }
}
