#![allow(non_snake_case)]

use async_trait::async_trait;
use eyre::Result;
use mockall::mock;

use relayer_core::{BlockDeltaMeter, BlockStorer, DomainId, U256};

mock! {
    pub BlockStorer {
        pub fn _store_block(&self, block: U256, domain: DomainId) -> Result<()>;
    }
}

impl std::fmt::Debug for MockBlockStorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MockBlockStorer")
    }
}

#[async_trait]
impl BlockStorer for MockBlockStorer {
    async fn store_block(&self, block: U256, domain: DomainId) -> Result<()> {
        self._store_block(block, domain)
    }
}

mock! {
    pub BlockDeltaMeter {}

    impl BlockDeltaMeter for BlockDeltaMeter {
        fn track_block_delta(&self, domain: DomainId, head: U256, current: U256);
    }
}

impl std::fmt::Debug for MockBlockDeltaMeter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MockBlockDeltaMeter")
    }
}
