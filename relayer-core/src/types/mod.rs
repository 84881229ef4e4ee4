//! Domain data model: messages flowing out of source chains and the
//! proposals they become on their destination.

mod block;
mod message;
mod proposal;

pub use block::*;
pub use message::*;
pub use proposal::*;

/// Identifier of one blockchain participating in the relay. Globally unique
/// per relayer instance, assigned by configuration.
pub type DomainId = u8;
