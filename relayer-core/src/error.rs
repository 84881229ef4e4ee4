use std::fmt::Display;

use crate::{DomainId, MessageType};

/// Errors surfaced by chain collaborators and the routing layer.
///
/// Routing code treats these as data, never as a reason to exit: provider
/// errors are retried with backoff by listeners, everything else is logged
/// and isolated to the message, window or batch that produced it.
#[derive(Debug, thiserror::Error)]
pub enum ChainCommunicationError {
    /// An RPC or transport failure talking to a chain node. Transient.
    #[error("chain provider error: {0}")]
    Provider(String),
    /// A collaborator the chain facade needs was never configured.
    #[error("{collaborator} not configured for domain {domain}")]
    NotConfigured {
        /// Name of the missing collaborator
        collaborator: &'static str,
        /// Domain the facade fronts
        domain: DomainId,
    },
    /// No handler is registered for the message type tag.
    #[error("no handler found for type {0}")]
    HandlerNotRegistered(MessageType),
    /// No chain is registered for the destination domain.
    #[error("no chain registered for destination domain {0}")]
    UnknownDestination(DomainId),
    /// Any other error raised by a collaborator.
    #[error(transparent)]
    Other(#[from] eyre::Report),
}

impl ChainCommunicationError {
    /// Wrap a provider/transport error.
    pub fn provider(err: impl Display) -> Self {
        Self::Provider(err.to_string())
    }
}

/// The result of an operation against a chain collaborator.
pub type ChainResult<T> = Result<T, ChainCommunicationError>;
