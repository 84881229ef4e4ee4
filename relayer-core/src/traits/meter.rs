use crate::{DomainId, U256};

/// Observer of per-domain listener progress.
///
/// Called once per listener iteration, before the handler fan-out, so the
/// gauges keep moving even while a gated or failing window replays.
pub trait BlockDeltaMeter: Send + Sync {
    /// Record the observed chain head and the block the listener is
    /// currently processing for `domain`.
    fn track_block_delta(&self, domain: DomainId, head: U256, current: U256);
}
