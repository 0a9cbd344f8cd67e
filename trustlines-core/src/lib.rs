#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
//! Trustlines types, cryptography and utilities.
//!
//! This crate provides the primitive building blocks the wallet layer is made of:
//! fixed-width Ethereum types, Keccak-256 hashing, ABI and packed encodings,
//! checksummed addresses, CREATE2 address computation, signature recovery and the
//! EIP-712 helpers used for smart-wallet meta-transactions.
//!
//! ## Computing a counterfactual contract address
//!
//! ```rust
//! use trustlines_core::utils::{get_create2_address, parse_address, to_checksum};
//!
//! let deployer = parse_address("0x0000000000000000000000000000000000000000")?;
//! let address = get_create2_address(deployer, [0u8; 32], [0x00u8]);
//! assert_eq!(to_checksum(&address, None), "0x4D1A2e2bB4F88F0250f26Ffff098B0b30B26BF38");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Recovering a signer
//!
//! Signatures in this workspace are always produced over a 32-byte digest that has
//! already been domain separated, so recovery never applies the EIP-191
//! `"\x19Ethereum Signed Message"` prefix.
pub mod types;

pub mod abi;

/// Various utilities
pub mod utils;

// re-export rand to avoid potential confusion when there's rand version mismatches
pub use rand;

// re-export k256
pub use k256;
