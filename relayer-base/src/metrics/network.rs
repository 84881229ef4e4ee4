use std::collections::HashMap;
use std::sync::Mutex;

use eyre::Result;
use prometheus::IntGaugeVec;

use relayer_core::{BlockDeltaMeter, DomainId, U256};

use crate::CoreMetrics;

/// Last observed listener progress for one domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockDelta {
    /// Latest finalized head reported by the chain
    pub head: U256,
    /// Block the listener is currently processing
    pub current: U256,
}

impl BlockDelta {
    /// How far the listener trails the chain head.
    pub fn delta(&self) -> U256 {
        self.head.saturating_sub(self.current)
    }
}

/// Gauges of listener progress per domain: the chain head, the processed
/// block and the delta between them.
///
/// Listeners report through the [`BlockDeltaMeter`] trait once per
/// iteration; the mutex-guarded snapshot map is what external readers
/// sample.
#[derive(Debug)]
pub struct NetworkMetrics {
    deltas: Mutex<HashMap<DomainId, BlockDelta>>,

    block_delta: IntGaugeVec,
    chain_head: IntGaugeVec,
    processed_blocks: IntGaugeVec,
}

impl NetworkMetrics {
    /// Register the network gauges with the process registry.
    pub fn new(metrics: &CoreMetrics) -> Result<Self> {
        let block_delta = metrics.new_int_gauge(
            "block_delta",
            "Difference between chain head and currently processed block per domain",
            &["domain"],
        )?;
        let chain_head = metrics.new_int_gauge(
            "chain_head",
            "Latest observed finalized head per domain",
            &["domain"],
        )?;
        let processed_blocks = metrics.new_int_gauge(
            "processed_blocks",
            "Latest processed block per domain",
            &["domain"],
        )?;

        Ok(Self {
            deltas: Mutex::new(HashMap::new()),
            block_delta,
            chain_head,
            processed_blocks,
        })
    }

    /// Snapshot of the last tracked progress for a domain.
    pub fn block_delta(&self, domain: DomainId) -> Option<BlockDelta> {
        self.deltas
            .lock()
            .expect("block delta lock poisoned")
            .get(&domain)
            .copied()
    }
}

impl BlockDeltaMeter for NetworkMetrics {
    fn track_block_delta(&self, domain: DomainId, head: U256, current: U256) {
        let snapshot = BlockDelta { head, current };
        self.deltas
            .lock()
            .expect("block delta lock poisoned")
            .insert(domain, snapshot);

        let domain = domain.to_string();
        self.block_delta
            .with_label_values(&[&domain])
            .set(gauge_value(snapshot.delta()));
        self.chain_head
            .with_label_values(&[&domain])
            .set(gauge_value(head));
        self.processed_blocks
            .with_label_values(&[&domain])
            .set(gauge_value(current));
    }
}

/// Clamp a block height into the gauge's i64 range.
fn gauge_value(value: U256) -> i64 {
    value.min(U256::from(i64::MAX)).as_u64() as i64
}
