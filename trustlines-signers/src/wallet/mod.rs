mod mnemonic;
pub use mnemonic::{MnemonicBuilder, MnemonicBuilderError};

mod private_key;
pub use private_key::KeyError;

#[cfg(not(target_arch = "wasm32"))]
mod keystore;

use crate::to_eip155_v;
use trustlines_core::{
    k256::{ecdsa::SigningKey, elliptic_curve::sec1::ToEncodedPoint, FieldBytes, PublicKey},
    types::{Address, Bytes, Signature, H256, U256},
    utils::{parse_hash, secret_key_to_address},
};

use std::fmt;

/// Callback receiving the progress, in percent, of a slow keystore operation.
///
/// Invoked zero or more times with non-decreasing values in `0..=100`; whether or not one
/// is supplied never changes the result of the operation.
pub type ProgressCallback = Box<dyn Fn(u8) + Send + Sync>;

/// A secp256k1 private key together with the data it was derived from.
///
/// # Examples
///
/// ## Signing and verifying a digest
///
/// The digest is signed directly, without any message prefix.
///
/// ```
/// use trustlines_core::{rand::thread_rng, types::H256};
/// use trustlines_signers::KeyMaterial;
///
/// # fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let key = KeyMaterial::random(&mut thread_rng())?;
/// assert!(key.mnemonic().is_some());
///
/// let digest = H256::random();
/// let signature = key.sign_hash(digest)?;
/// assert_eq!(signature.recover(digest)?, key.address());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct KeyMaterial {
    /// The private key
    pub(crate) signer: SigningKey,
    /// The address of the key
    pub(crate) address: Address,
    /// BIP-39 phrase the key was derived from, if any
    pub(crate) mnemonic: Option<String>,
    /// BIP-32 path the key was derived at, if derived from a mnemonic
    pub(crate) derivation_path: Option<String>,
}

impl KeyMaterial {
    pub(crate) fn from_signer(signer: SigningKey) -> Self {
        let address = secret_key_to_address(&signer);
        Self { signer, address, mnemonic: None, derivation_path: None }
    }

    /// Signs a 32-byte digest as is. The returned `v` is `27` or `28`.
    pub fn sign_hash(&self, hash: H256) -> Result<Signature, KeyError> {
        let (signature, recovery_id) = self.sign_prehash(hash)?;
        Ok(Signature { v: u8::from(recovery_id) as u64 + 27, ..signature })
    }

    /// Signs a digest given as a `0x`-prefixed, 66 character long hex string.
    ///
    /// Anything else fails with [`KeyError::InvalidDigestLength`]; the input is never
    /// hashed or padded to make it fit.
    pub fn sign_digest_hex(&self, digest: &str) -> Result<Signature, KeyError> {
        if digest.len() != 66 || !digest.starts_with("0x") {
            return Err(KeyError::InvalidDigestLength(digest.len()))
        }
        let hash = parse_hash(digest).map_err(|_| KeyError::InvalidDigest(digest.to_owned()))?;
        self.sign_hash(hash)
    }

    /// Signs a 32-byte digest with an [EIP-155](https://eips.ethereum.org/EIPS/eip-155) `v`,
    /// as required for raw transactions.
    pub fn sign_hash_with_chain_id(&self, hash: H256, chain_id: u64) -> Result<Signature, KeyError> {
        let (signature, recovery_id) = self.sign_prehash(hash)?;
        Ok(Signature { v: to_eip155_v(recovery_id, chain_id), ..signature })
    }

    fn sign_prehash(
        &self,
        hash: H256,
    ) -> Result<(Signature, trustlines_core::k256::ecdsa::RecoveryId), KeyError> {
        let (recoverable_sig, recovery_id) = self.signer.sign_prehash_recoverable(hash.as_ref())?;

        let r_bytes: FieldBytes = recoverable_sig.r().into();
        let s_bytes: FieldBytes = recoverable_sig.s().into();
        let r = U256::from_big_endian(r_bytes.as_slice());
        let s = U256::from_big_endian(s_bytes.as_slice());

        Ok((Signature { r, s, v: 0 }, recovery_id))
    }

    /// Returns the address of the key
    pub fn address(&self) -> Address {
        self.address
    }

    /// Returns the uncompressed SEC1 encoding of the public key (65 bytes, `0x04` tagged)
    pub fn public_key(&self) -> Bytes {
        let public_key = PublicKey::from(self.signer.verifying_key());
        public_key.to_encoded_point(/* compress = */ false).as_bytes().to_vec().into()
    }

    /// Returns the mnemonic phrase the key was derived from, if known
    pub fn mnemonic(&self) -> Option<&str> {
        self.mnemonic.as_deref()
    }

    /// Returns the derivation path of the key, if derived from a mnemonic
    pub fn derivation_path(&self) -> Option<&str> {
        self.derivation_path.as_deref()
    }

    /// Returns the `0x`-prefixed hex encoded private key
    pub fn private_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signer.to_bytes()))
    }

    /// Gets the key's signer
    pub fn signer(&self) -> &SigningKey {
        &self.signer
    }
}

impl PartialEq for KeyMaterial {
    fn eq(&self, other: &Self) -> bool {
        self.signer.to_bytes().eq(&other.signer.to_bytes()) && self.address == other.address
    }
}

impl Eq for KeyMaterial {}

// do not log the signer or the mnemonic
impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("address", &self.address)
            .field("has_mnemonic", &self.mnemonic.is_some())
            .field("derivation_path", &self.derivation_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustlines_core::{rand::thread_rng, types::U256};

    fn key() -> KeyMaterial {
        "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318".parse().unwrap()
    }

    #[test]
    fn signs_digest_without_prefix() {
        let key = key();
        let digest = H256::repeat_byte(0x42);
        let signature = key.sign_hash(digest).unwrap();

        assert!(signature.v == 27 || signature.v == 28);
        assert_eq!(signature.recover(digest).unwrap(), key.address());
    }

    #[test]
    fn signing_is_deterministic() {
        let key = key();
        let digest = H256::repeat_byte(0x42);
        assert_eq!(key.sign_hash(digest).unwrap(), key.sign_hash(digest).unwrap());
    }

    #[test]
    fn signs_hex_digest() {
        let key = key();
        let digest = H256::repeat_byte(0x07);
        let from_hex = key.sign_digest_hex(&format!("{digest:?}")).unwrap();
        assert_eq!(from_hex, key.sign_hash(digest).unwrap());
    }

    #[test]
    fn rejects_digests_of_wrong_length() {
        let key = key();
        for digest in [
            "",
            "0x",
            "0x1234",
            // 32 bytes but missing the prefix
            "0707070707070707070707070707070707070707070707070707070707070707",
            // 33 bytes
            "0x070707070707070707070707070707070707070707070707070707070707070707",
        ] {
            match key.sign_digest_hex(digest) {
                Err(KeyError::InvalidDigestLength(len)) => assert_eq!(len, digest.len()),
                res => panic!("unexpected result for {digest:?}: {res:?}"),
            }
        }
        assert!(matches!(
            key.sign_digest_hex(
                "0xzz07070707070707070707070707070707070707070707070707070707070707"
            ),
            Err(KeyError::InvalidDigest(_))
        ));
    }

    #[test]
    fn eip155_signature_recovers() {
        let key = key();
        let digest = H256::repeat_byte(0x99);
        let signature = key.sign_hash_with_chain_id(digest, 4660).unwrap();
        let recid = (signature.v - 35) % 2;
        assert_eq!(signature.v, 4660 * 2 + 35 + recid);
        assert_eq!(signature.recover(digest).unwrap(), key.address());
    }

    #[test]
    fn signatures_are_low_s() {
        let half_order = U256::from_str_radix(
            "7fffffffffffffffffffffffffffffff5d576e7357a4501ddfe92f46681b20a0",
            16,
        )
        .unwrap();
        let key = KeyMaterial::random(&mut thread_rng()).unwrap();
        for i in 0..16u8 {
            let signature = key.sign_hash(H256::repeat_byte(i)).unwrap();
            assert!(signature.s <= half_order);
        }
    }

    #[test]
    fn exposes_public_key_and_private_key() {
        let key = key();
        let public_key = key.public_key();
        assert_eq!(public_key.len(), 65);
        assert_eq!(public_key[0], 0x04);
        assert_eq!(
            key.private_key_hex(),
            "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318"
        );
        assert_eq!(key.mnemonic(), None);
    }

    #[test]
    fn debug_does_not_leak_secrets() {
        let key = key();
        let debug = format!("{key:?}");
        assert!(!debug.contains("4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318"));
        assert!(debug.contains("address"));
    }
}
