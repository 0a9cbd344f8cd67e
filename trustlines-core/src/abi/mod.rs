//! Contract ABI encoding.
//!
//! Re-exports [`ethabi`] for standard ABI encoding and adds a width-aware
//! implementation of Solidity's `abi.encodePacked`.
pub use ethabi::{self, *};

mod packed;
pub use packed::{encode_packed, EncodePackedError};
