/// Mock chain clients
pub mod client;

/// Mock relayed chain
pub mod chain;

/// Mock event and message handlers
pub mod handler;

/// Mock block store and block-delta meter
pub mod store;

pub use chain::MockRelayedChain;
pub use client::{MockEvmClient, MockSubstrateClient};
pub use handler::{MockEventHandler, MockMessageHandler, MockProposalExecutor};
pub use store::{MockBlockDeltaMeter, MockBlockStorer};
