//! Prometheus instrumentation for the relayer.

mod core;
mod message;
mod network;

pub use self::core::CoreMetrics;
pub use message::{MessageMetrics, MessageStatus};
pub use network::{BlockDelta, NetworkMetrics};

/// Prefix for all metrics emitted by the relayer.
const NAMESPACE: &str = "relayer";
