//! Core primitives shared by the relayer crates: domain types, the trait
//! seams between the relayer machinery and its chain-specific collaborators,
//! and the error taxonomy.

// Forbid unsafe code outside of tests
#![cfg_attr(not(test), forbid(unsafe_code))]
#![warn(missing_docs)]

pub use primitive_types::{H256, U256};

mod error;
pub use error::*;

mod types;
pub use types::*;

mod traits;
pub use traits::*;
