/// Header of a finalized substrate block, reduced to what finality gating
/// needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    /// Block height
    pub number: u64,
}

/// Minimal view of a substrate signed block as returned by
/// [`SubstrateClient::block`].
///
/// [`SubstrateClient::block`]: crate::SubstrateClient::block
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedBlock {
    /// The block header
    pub header: Header,
}

impl SignedBlock {
    /// Construct a block at the given height.
    pub fn at_height(number: u64) -> Self {
        Self {
            header: Header { number },
        }
    }

    /// Height of the block.
    pub fn number(&self) -> u64 {
        self.header.number
    }
}
