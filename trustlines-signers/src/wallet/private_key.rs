//! Loading key material from raw private keys and fresh randomness
use super::KeyMaterial;

use crate::wallet::mnemonic::{MnemonicBuilder, MnemonicBuilderError};
use coins_bip32::Bip32Error;
use coins_bip39::{English, MnemonicError};
#[cfg(not(target_arch = "wasm32"))]
use eth_keystore::KeystoreError;
use trustlines_core::{
    k256::ecdsa::{self, SigningKey},
    rand::{CryptoRng, Rng},
};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
/// Error thrown while creating, loading or using key material
pub enum KeyError {
    /// Error propagated from the BIP-32 crate
    #[error(transparent)]
    Bip32Error(#[from] Bip32Error),
    /// Error propagated from the BIP-39 crate
    #[error(transparent)]
    Bip39Error(#[from] MnemonicError),
    /// Underlying eth keystore error
    #[cfg(not(target_arch = "wasm32"))]
    #[error(transparent)]
    EthKeystoreError(#[from] KeystoreError),
    /// Error propagated from k256's ECDSA module
    #[error(transparent)]
    EcdsaError(#[from] ecdsa::Error),
    /// Error propagated from the hex crate.
    #[error(transparent)]
    HexError(#[from] hex::FromHexError),
    /// Error propagated by IO operations
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    /// Error propagated from the mnemonic builder module.
    #[error(transparent)]
    MnemonicBuilderError(#[from] MnemonicBuilderError),
    /// A digest to sign was not a `0x`-prefixed 32-byte hex string
    #[error("invalid digest length {0}, expected a 0x-prefixed 66 character hex string")]
    InvalidDigestLength(usize),
    /// A digest had the right length but was not valid hex
    #[error("invalid digest {0:?}")]
    InvalidDigest(String),
    /// A private key did not decode to 32 bytes
    #[error("invalid private key length {0}, expected 32 bytes")]
    InvalidPrivateKeyLength(usize),
}

impl KeyMaterial {
    /// Creates new key material backed by a fresh 12-word English mnemonic drawn from `rng`.
    ///
    /// The key is derived at `m/44'/60'/0'/0/0`, so the phrase returned by
    /// [`KeyMaterial::mnemonic`] always recovers it.
    pub fn random<R: Rng + CryptoRng>(rng: &mut R) -> Result<Self, KeyError> {
        MnemonicBuilder::<English>::default().build_random(rng)
    }

    /// Recovers key material from an English mnemonic phrase at the default derivation path
    pub fn from_mnemonic(phrase: &str) -> Result<Self, KeyError> {
        MnemonicBuilder::<English>::default().phrase(phrase).build()
    }

    /// Loads key material from a hex encoded 32-byte private key, with or without `0x`
    pub fn from_private_key(private_key: &str) -> Result<Self, KeyError> {
        private_key.parse()
    }

    /// Loads key material from raw private key bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != 32 {
            return Err(KeyError::InvalidPrivateKeyLength(bytes.len()))
        }
        Ok(SigningKey::from_slice(bytes)?.into())
    }
}

impl From<SigningKey> for KeyMaterial {
    fn from(signer: SigningKey) -> Self {
        KeyMaterial::from_signer(signer)
    }
}

impl FromStr for KeyMaterial {
    type Err = KeyError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let src = src.strip_prefix("0x").unwrap_or(src);
        let src = hex::decode(src)?;
        KeyMaterial::from_bytes(&src)
    }
}
