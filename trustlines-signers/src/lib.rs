#![cfg_attr(docsrs, feature(doc_cfg))]
//! Key material for Trustlines wallets.
//!
//! A [`KeyMaterial`] owns exactly one secp256k1 signing key and signs 32-byte digests
//! *as they are*: no `"\x19Ethereum Signed Message"` prefix is applied and the digest is
//! not hashed again. Every hash handed to it must already be domain separated by the
//! caller (see the typed transaction hashing in `trustlines-wallets`).
//!
//! ```no_run
//! use trustlines_core::types::H256;
//! use trustlines_signers::KeyMaterial;
//!
//! # fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let key: KeyMaterial =
//!     "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318".parse()?;
//!
//! let digest = H256::repeat_byte(0x11);
//! let signature = key.sign_hash(digest)?;
//! signature.verify(digest, key.address())?;
//! # Ok(())
//! # }
//! ```
//!
//! Key material can be created at random (always backed by a fresh BIP-39 mnemonic),
//! recovered from a mnemonic phrase, a raw private key, or an encrypted JSON keystore.
mod wallet;
pub use wallet::{KeyError, KeyMaterial, MnemonicBuilder, MnemonicBuilderError, ProgressCallback};

/// Re-export the BIP-39 crate so that wordlists can be accessed conveniently.
pub use coins_bip39;

/// Applies [EIP155](https://github.com/ethereum/EIPs/blob/master/EIPS/eip-155.md)
pub fn to_eip155_v<T: Into<u8>>(recovery_id: T, chain_id: u64) -> u64 {
    (recovery_id.into() as u64) + 35 + chain_id * 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eip155_v_encodes_chain_and_parity() {
        assert_eq!(to_eip155_v(0u8, 1), 37);
        assert_eq!(to_eip155_v(1u8, 1), 38);
        assert_eq!(to_eip155_v(0u8, 4660), 9355);
    }
}
