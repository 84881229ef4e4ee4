//! Per-domain block-window listeners over finalized chain history.
//!
//! Both flavors advance the same way: fetch the finalized head, gate until a
//! whole window of `block_interval` blocks is finalized, fan the window out
//! to the registered event handlers, persist the cursor, repeat. A handler
//! failure replays the window from the same start; a checkpoint failure is
//! logged and does not stop the advance.

mod evm;
mod substrate;

pub use evm::EvmListener;
pub use substrate::SubstrateListener;
