use eyre::Result;
use prometheus::{HistogramVec, IntCounterVec};

use relayer_core::Message;

use crate::CoreMetrics;

/// Outcome being recorded for a batch of messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageStatus {
    /// Accepted by the router, not yet written
    Pending,
    /// Dropped after a receive or write failure
    Failed,
    /// Written on the destination chain
    Successful,
}

/// Counters and latency for message relay outcomes, labeled by source and
/// destination domain.
#[derive(Debug, Clone)]
pub struct MessageMetrics {
    total_message_count: IntCounterVec,
    failed_message_count: IntCounterVec,
    successful_message_count: IntCounterVec,
    latency_seconds: HistogramVec,
}

impl MessageMetrics {
    /// Register the message counters with the process registry.
    pub fn new(metrics: &CoreMetrics) -> Result<Self> {
        let total_message_count = metrics.new_int_counter(
            "total_message_count",
            "Total number of messages the relayer has processed",
            &["source", "destination"],
        )?;
        let failed_message_count = metrics.new_int_counter(
            "failed_message_count",
            "Number of messages that have failed",
            &["source", "destination"],
        )?;
        let successful_message_count = metrics.new_int_counter(
            "successful_message_count",
            "Number of messages that were relayed successfully",
            &["source", "destination"],
        )?;
        let latency_seconds = metrics.new_histogram(
            "latency_seconds",
            "Time taken to relay messages",
            &["source", "destination"],
            prometheus::DEFAULT_BUCKETS.to_vec(),
        )?;

        Ok(Self {
            total_message_count,
            failed_message_count,
            successful_message_count,
            latency_seconds,
        })
    }

    /// Record an outcome for every message in a batch. Batches share a
    /// (source, destination) pair, so the first message labels the batch.
    pub fn track_messages(&self, msgs: &[Message], status: MessageStatus) {
        let Some(first) = msgs.first() else {
            return;
        };
        let source = first.source.to_string();
        let destination = first.destination.to_string();
        let labels = [source.as_str(), destination.as_str()];

        match status {
            MessageStatus::Pending => {
                self.total_message_count
                    .with_label_values(&labels)
                    .inc_by(msgs.len() as u64);
            }
            MessageStatus::Failed => {
                self.failed_message_count
                    .with_label_values(&labels)
                    .inc_by(msgs.len() as u64);
            }
            MessageStatus::Successful => {
                self.successful_message_count
                    .with_label_values(&labels)
                    .inc_by(msgs.len() as u64);
                for msg in msgs {
                    let latency = msg.timestamp.elapsed().unwrap_or_default();
                    self.latency_seconds
                        .with_label_values(&labels)
                        .observe(latency.as_secs_f64());
                }
            }
        }
    }
}
