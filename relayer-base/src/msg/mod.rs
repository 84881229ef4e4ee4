//! Inbound message handling: the per-destination registry mapping message
//! type tags to the handler that turns a message into a proposal.

mod handler;
pub use handler::MessageHandlerRegistry;
