use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DomainId;

/// Tag describing the on-chain shape of a proposal payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProposalType(String);

impl ProposalType {
    /// Construct a tag from any string-ish value.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The raw tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProposalType {
    fn from(tag: &str) -> Self {
        Self(tag.to_owned())
    }
}

impl fmt::Display for ProposalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A destination-ready artifact derived from a [`Message`] by the
/// destination's handler registry. Lives only long enough to be written.
///
/// [`Message`]: crate::Message
#[derive(Clone, Debug)]
pub struct Proposal {
    /// Domain of the message this proposal was derived from
    pub source: DomainId,
    /// Domain the proposal will be written on; equals the message destination
    pub destination: DomainId,
    /// Encoded proposal payload, opaque to the router
    pub data: Vec<u8>,
    /// On-chain shape of the payload
    pub proposal_type: ProposalType,
    /// Identifier of the message that produced this proposal
    pub message_id: String,
}

impl Proposal {
    /// Construct a proposal.
    pub fn new(
        source: DomainId,
        destination: DomainId,
        data: Vec<u8>,
        proposal_type: ProposalType,
        message_id: impl Into<String>,
    ) -> Self {
        Self {
            source,
            destination,
            data,
            proposal_type,
            message_id: message_id.into(),
        }
    }
}
