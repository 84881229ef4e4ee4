use async_trait::async_trait;

use crate::{ChainResult, SignedBlock, H256, U256};

/// Capability surface an EVM-style RPC client must offer the listener.
#[async_trait]
pub trait EvmClient: Send + Sync {
    /// Number of the latest finalized block.
    async fn latest_block(&self) -> ChainResult<U256>;
}

/// Capability surface a substrate-style RPC client must offer the listener.
#[async_trait]
pub trait SubstrateClient: Send + Sync {
    /// Hash of the latest finalized block.
    async fn finalized_head(&self) -> ChainResult<H256>;

    /// Fetch the block with the given hash.
    async fn block(&self, hash: H256) -> ChainResult<SignedBlock>;
}
