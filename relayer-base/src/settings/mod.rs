//! Settings and configuration for the relayer.
//!
//! Settings are read from an optional JSON/TOML config file plus `RLY_`
//! prefixed environment variable overrides, deserialized into raw
//! string-typed structs and then parsed into validated config. Integers are
//! specified as strings so they can be supplied via env vars.
//!
//! A validation failure here is the only fatal error class in the relayer:
//! nothing is started until the whole configuration parses.

use std::collections::{HashMap, HashSet};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use config::{Config, Environment, File};
use eyre::{bail, eyre, Context, Result};
use serde::Deserialize;
use tokio::sync::mpsc;
use url::Url;

use relayer_core::{DomainId, Message, U256};

use crate::{BlockStore, CoreMetrics};

/// Tracing subscriber management
pub mod trace;

use trace::TracingConfig;

const DEFAULT_BLOCK_INTERVAL: u64 = 5;
const DEFAULT_BLOCK_RETRY_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_CHANNEL_CAPACITY: usize = 100;
const DEFAULT_METRICS_PORT: u16 = 9090;
const DEFAULT_BLOCKSTORE: &str = "./blockstore";

/// Raw per-chain configuration as read from files and env vars.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawChainConf {
    id: Option<String>,
    name: Option<String>,
    endpoint: Option<String>,
    blockinterval: Option<String>,
    /// Seconds between retries of the finalized-head query
    blockretryinterval: Option<String>,
    startblock: Option<String>,
}

/// Validated configuration for one relayed domain.
#[derive(Clone, Debug)]
pub struct ChainConf {
    /// The domain id, unique per relayer instance
    pub id: DomainId,
    /// Human-readable chain name
    pub name: String,
    /// RPC endpoint of the chain node
    pub endpoint: Url,
    /// Window size in blocks for the domain listener
    pub block_interval: U256,
    /// Backoff between finalized-head retries and finality-gate sleeps
    pub block_retry_interval: Duration,
    /// Block to resume listening from; unset means "start at the head"
    pub start_block: Option<U256>,
}

impl RawChainConf {
    fn parse(&self, chain: &str) -> Result<ChainConf> {
        let id = self
            .id
            .as_ref()
            .ok_or_else(|| eyre!("Missing domain id for chain {chain}"))?
            .parse::<DomainId>()
            .with_context(|| format!("Invalid domain id for chain {chain}"))?;
        let name = match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => bail!("Missing name for chain {chain}"),
        };
        let endpoint = match self.endpoint.as_deref() {
            Some(endpoint) if !endpoint.is_empty() => Url::parse(endpoint)
                .with_context(|| format!("Invalid endpoint for chain {chain}"))?,
            _ => bail!("Missing endpoint for chain {chain}"),
        };
        let block_interval = match self.blockinterval.as_deref() {
            Some(interval) => U256::from_dec_str(interval)
                .with_context(|| format!("Invalid block interval for chain {chain}"))?,
            None => DEFAULT_BLOCK_INTERVAL.into(),
        };
        if block_interval.is_zero() {
            bail!("Block interval must be positive for chain {chain}");
        }
        let block_retry_interval = match self.blockretryinterval.as_deref() {
            Some(secs) => Duration::from_secs(
                secs.parse()
                    .with_context(|| format!("Invalid block retry interval for chain {chain}"))?,
            ),
            None => DEFAULT_BLOCK_RETRY_INTERVAL,
        };
        let start_block = self
            .startblock
            .as_deref()
            .map(U256::from_dec_str)
            .transpose()
            .with_context(|| format!("Invalid start block for chain {chain}"))?;

        Ok(ChainConf {
            id,
            name,
            endpoint,
            block_interval,
            block_retry_interval,
            start_block,
        })
    }
}

/// Raw top-level settings as read from files and env vars.
#[derive(Debug, Default, Deserialize)]
pub struct RawSettings {
    chains: Option<HashMap<String, RawChainConf>>,
    channelcapacity: Option<String>,
    blockstore: Option<String>,
    metrics: Option<String>,
    tracing: Option<TracingConfig>,
}

/// Top-level relayer settings.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Configuration for each relayed domain, keyed by chain name
    pub chains: HashMap<String, ChainConf>,
    /// Capacity of the inbound message batch channel
    pub channel_capacity: usize,
    /// Directory holding the per-domain block cursors
    pub blockstore: PathBuf,
    /// Port to listen on for prometheus scrape requests
    pub metrics_port: u16,
    /// The tracing configuration
    pub tracing: TracingConfig,
}

impl Settings {
    /// Load settings from the file named by the `CONFIG_FILE` env var (if
    /// any) with `RLY_` prefixed env vars taking precedence, e.g.
    /// `RLY_CHAINS_GOERLI_ENDPOINT` overrides `chains.goerli.endpoint`.
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder();
        if let Ok(config_file) = env::var("CONFIG_FILE") {
            builder = builder.add_source(File::with_name(&config_file));
        }
        let config = builder
            .add_source(Environment::with_prefix("RLY").separator("_"))
            .build()
            .context("Loading config sources")?;
        Self::from_config(config)
    }

    /// Parse and validate settings out of an assembled [`Config`].
    pub fn from_config(config: Config) -> Result<Self> {
        let raw: RawSettings = config
            .try_deserialize()
            .context("Deserializing raw settings")?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self> {
        let mut chains = HashMap::new();
        let mut seen_domains = HashSet::new();
        for (chain, raw_conf) in raw.chains.unwrap_or_default() {
            let conf = raw_conf.parse(&chain)?;
            if !seen_domains.insert(conf.id) {
                bail!("Duplicate domain id {} for chain {chain}", conf.id);
            }
            chains.insert(chain, conf);
        }

        let channel_capacity = match raw.channelcapacity.as_deref() {
            Some(capacity) => {
                let capacity: usize = capacity.parse().context("Invalid channel capacity")?;
                if capacity == 0 {
                    bail!("Channel capacity must be positive");
                }
                capacity
            }
            None => DEFAULT_CHANNEL_CAPACITY,
        };
        let metrics_port = match raw.metrics.as_deref() {
            Some(port) => port.parse().context("Invalid metrics port")?,
            None => DEFAULT_METRICS_PORT,
        };
        let blockstore = raw
            .blockstore
            .map(PathBuf::from)
            .unwrap_or_else(|| DEFAULT_BLOCKSTORE.into());

        Ok(Self {
            chains,
            channel_capacity,
            blockstore,
            metrics_port,
            tracing: raw.tracing.unwrap_or_default(),
        })
    }

    /// Create the process metrics registry, serving scrapes on the
    /// configured port once [`CoreMetrics::run_http_server`] is spawned.
    pub fn metrics(&self, agent_name: &str) -> Arc<CoreMetrics> {
        Arc::new(CoreMetrics::new(
            agent_name,
            Some(self.metrics_port),
            prometheus::Registry::new(),
        ))
    }

    /// Open the configured block store.
    pub fn block_store(&self) -> Result<BlockStore> {
        BlockStore::new(&self.blockstore)
    }

    /// Build the inbound message batch channel at the configured capacity.
    /// Senders block when the channel is full.
    pub fn message_channel(&self) -> (mpsc::Sender<Vec<Message>>, mpsc::Receiver<Vec<Message>>) {
        mpsc::channel(self.channel_capacity)
    }
}
