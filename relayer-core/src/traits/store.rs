use async_trait::async_trait;

use crate::{DomainId, U256};

/// Durable per-domain block cursor.
///
/// `block` is the exclusive upper bound of the last fully processed window;
/// restart resumes at exactly that height. Writes must be atomic-replace so
/// a crash mid-store leaves the previous cursor intact.
#[async_trait]
pub trait BlockStorer: Send + Sync {
    /// Persist the cursor for a domain.
    async fn store_block(&self, block: U256, domain: DomainId) -> eyre::Result<()>;
}
