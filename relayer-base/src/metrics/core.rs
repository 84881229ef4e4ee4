use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use eyre::Result;
use prometheus::{
    HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder,
};
use tokio::task::JoinHandle;

use super::NAMESPACE;

/// Metrics registry for one relayer process.
///
/// Component metric structs ([`NetworkMetrics`], [`MessageMetrics`]) create
/// their gauges, counters and histograms through this type so that every
/// series lands in the same registry, carries the shared namespace prefix
/// and is tagged with the agent's constant labels.
///
/// [`NetworkMetrics`]: crate::NetworkMetrics
/// [`MessageMetrics`]: crate::MessageMetrics
pub struct CoreMetrics {
    registry: Registry,
    const_labels: HashMap<String, String>,
    listen_port: Option<u16>,
    agent_name: String,
}

impl CoreMetrics {
    /// Metrics for the agent named `for_agent`, attached to `registry`.
    ///
    /// With `listen_port` unset, [`run_http_server`](Self::run_http_server)
    /// becomes a no-op and the registry is only reachable through
    /// [`gather`](Self::gather).
    pub fn new(for_agent: &str, listen_port: Option<u16>, registry: Registry) -> Self {
        let const_labels = HashMap::from([("agent".to_owned(), for_agent.to_owned())]);

        Self {
            registry,
            const_labels,
            listen_port,
            agent_name: for_agent.to_owned(),
        }
    }

    fn opts(&self, metric_name: &str, help: &str) -> Opts {
        Opts::new(metric_name, help)
            .namespace(NAMESPACE)
            .const_labels(self.const_labels.clone())
    }

    /// Create and register a new int gauge.
    pub fn new_int_gauge(
        &self,
        metric_name: &str,
        help: &str,
        labels: &[&str],
    ) -> Result<IntGaugeVec> {
        let gauge = IntGaugeVec::new(self.opts(metric_name, help), labels)?;
        self.registry.register(Box::new(gauge.clone()))?;
        Ok(gauge)
    }

    /// Create and register a new int counter.
    pub fn new_int_counter(
        &self,
        metric_name: &str,
        help: &str,
        labels: &[&str],
    ) -> Result<IntCounterVec> {
        let counter = IntCounterVec::new(self.opts(metric_name, help), labels)?;
        self.registry.register(Box::new(counter.clone()))?;
        Ok(counter)
    }

    /// Create and register a new histogram.
    pub fn new_histogram(
        &self,
        metric_name: &str,
        help: &str,
        labels: &[&str],
        buckets: Vec<f64>,
    ) -> Result<HistogramVec> {
        let opts = HistogramOpts::new(metric_name, help)
            .namespace(NAMESPACE)
            .const_labels(self.const_labels.clone())
            .buckets(buckets);
        let histogram = HistogramVec::new(opts, labels)?;
        self.registry.register(Box::new(histogram.clone()))?;
        Ok(histogram)
    }

    /// Render everything in the registry as a prometheus text-format report.
    pub fn gather(&self) -> prometheus::Result<String> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }

    /// Spawn an HTTP server answering scrapes on `/metrics`, or an already
    /// finished task when no listen port is configured.
    ///
    /// Replies are plain text, which the prometheus scraper accepts and a
    /// browser renders.
    pub fn run_http_server(self: Arc<Self>) -> JoinHandle<()> {
        use warp::Filter;

        let Some(port) = self.listen_port else {
            tracing::info!("Metrics server disabled, no listen port configured");
            return tokio::spawn(std::future::ready(()));
        };
        tracing::info!(port, "Serving metrics on 0.0.0.0:{port}/metrics");

        tokio::spawn(async move {
            let report = warp::path!("metrics").map(move || match self.gather() {
                Ok(report) => warp::reply::with_status(report, warp::http::StatusCode::OK),
                Err(err) => warp::reply::with_status(
                    format!("failed to encode metrics: {err}"),
                    warp::http::StatusCode::INTERNAL_SERVER_ERROR,
                ),
            });
            warp::serve(report).run(([0, 0, 0, 0], port)).await
        })
    }

    /// Get the name of this agent, e.g. "relayer"
    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }
}

impl Debug for CoreMetrics {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreMetrics")
            .field("agent_name", &self.agent_name)
            .field("listen_port", &self.listen_port)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn namespaces_registered_metrics() {
        let metrics = CoreMetrics::new("test", None, Registry::new());
        let gauge = metrics
            .new_int_gauge("chain_head", "Latest observed chain head", &["domain"])
            .unwrap();
        gauge.with_label_values(&["1"]).set(42);

        let report = metrics.gather().unwrap();
        assert!(report.contains("relayer_chain_head"));
        assert!(report.contains("agent=\"test\""));
    }

    #[test]
    fn rejects_duplicate_registration() {
        let metrics = CoreMetrics::new("test", None, Registry::new());
        metrics
            .new_int_counter("total_message_count", "Total messages", &["source"])
            .unwrap();
        assert!(metrics
            .new_int_counter("total_message_count", "Total messages", &["source"])
            .is_err());
    }
}
