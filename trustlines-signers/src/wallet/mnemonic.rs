//! Creating and recovering key material from BIP-39 mnemonic phrases
use crate::{KeyError, KeyMaterial};

use coins_bip32::path::DerivationPath;
use coins_bip39::{Mnemonic, Wordlist};
use trustlines_core::{k256::ecdsa::SigningKey, utils::secret_key_to_address};
use rand::Rng;
use std::{fmt, marker::PhantomData, str::FromStr};
use thiserror::Error;

const DEFAULT_DERIVATION_PATH_PREFIX: &str = "m/44'/60'/0'/0/";

/// Represents a structure that can resolve into [`KeyMaterial`].
#[derive(Clone, PartialEq, Eq)]
pub struct MnemonicBuilder<W: Wordlist> {
    /// The mnemonic phrase. A builder that has a phrase should `build` the key.
    phrase: Option<String>,
    /// Number of words of a phrase generated at random. By default this is set to 12.
    word_count: usize,
    /// The derivation path at which the extended private key child will be derived at. By default
    /// the mnemonic builder uses the path: "m/44'/60'/0'/0/0".
    derivation_path: DerivationPath,
    /// `derivation_path` as it was given, kept for [`KeyMaterial::derivation_path`]
    derivation_path_str: String,
    /// Optional password for the mnemonic phrase.
    password: Option<String>,
    _wordlist: PhantomData<W>,
}

/// Error produced by the mnemonic builder
#[derive(Error, Debug)]
pub enum MnemonicBuilderError {
    /// Error suggests that a phrase was expected but not found
    #[error("Expected phrase not found")]
    ExpectedPhraseNotFound,
    /// Error suggests that a phrase was not expected but found
    #[error("Unexpected phrase found")]
    UnexpectedPhraseFound,
}

// the phrase and password are secrets
impl<W: Wordlist> fmt::Debug for MnemonicBuilder<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MnemonicBuilder")
            .field("has_phrase", &self.phrase.is_some())
            .field("word_count", &self.word_count)
            .field("derivation_path", &self.derivation_path_str)
            .field("has_password", &self.password.is_some())
            .finish()
    }
}

impl<W: Wordlist> Default for MnemonicBuilder<W> {
    fn default() -> Self {
        let derivation_path_str = format!("{DEFAULT_DERIVATION_PATH_PREFIX}0");
        Self {
            phrase: None,
            word_count: 12usize,
            derivation_path: DerivationPath::from_str(&derivation_path_str)
                .unwrap_or_else(|_| unreachable!("default derivation path is valid")),
            derivation_path_str,
            password: None,
            _wordlist: PhantomData,
        }
    }
}

impl<W: Wordlist> MnemonicBuilder<W> {
    /// Sets the phrase in the mnemonic builder. Once a phrase is provided, the key will be
    /// generated deterministically by calling the `build` method.
    ///
    /// # Example
    ///
    /// ```
    /// use trustlines_signers::{MnemonicBuilder, coins_bip39::English};
    /// # fn foo() -> Result<(), Box<dyn std::error::Error>> {
    ///
    /// let key = MnemonicBuilder::<English>::default()
    ///     .phrase("abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about")
    ///     .build()?;
    ///
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn phrase<P: Into<String>>(mut self, phrase: P) -> Self {
        self.phrase = Some(phrase.into());
        self
    }

    /// Sets the word count of a mnemonic phrase to be generated at random. If the `phrase` field
    /// is set, then `word_count` will be ignored.
    #[must_use]
    pub fn word_count(mut self, count: usize) -> Self {
        self.word_count = count;
        self
    }

    /// Sets the derivation path of the child key to be derived. The derivation path is calculated
    /// using the default derivation path prefix used in Ethereum, i.e. "m/44'/60'/0'/0/{index}".
    pub fn index<U: Into<u32>>(self, index: U) -> Result<Self, KeyError> {
        self.derivation_path(&format!("{DEFAULT_DERIVATION_PATH_PREFIX}{}", index.into()))
    }

    /// Sets the derivation path of the child key to be derived.
    pub fn derivation_path(mut self, path: &str) -> Result<Self, KeyError> {
        self.derivation_path = DerivationPath::from_str(path)?;
        self.derivation_path_str = path.to_owned();
        Ok(self)
    }

    /// Sets the password used to construct the seed from the mnemonic phrase.
    #[must_use]
    pub fn password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    /// Builds [`KeyMaterial`] from the configured phrase. This method expects the phrase
    /// field to be set.
    pub fn build(&self) -> Result<KeyMaterial, KeyError> {
        let mnemonic = match &self.phrase {
            Some(phrase) => Mnemonic::<W>::new_from_phrase(phrase.trim())?,
            None => return Err(MnemonicBuilderError::ExpectedPhraseNotFound.into()),
        };
        self.mnemonic_to_key(&mnemonic)
    }

    /// Builds [`KeyMaterial`] from a phrase drawn from the provided random number generator.
    pub fn build_random<R: Rng>(&self, rng: &mut R) -> Result<KeyMaterial, KeyError> {
        let mnemonic = match &self.phrase {
            None => Mnemonic::<W>::new_with_count(rng, self.word_count)?,
            _ => return Err(MnemonicBuilderError::UnexpectedPhraseFound.into()),
        };
        self.mnemonic_to_key(&mnemonic)
    }

    fn mnemonic_to_key(&self, mnemonic: &Mnemonic<W>) -> Result<KeyMaterial, KeyError> {
        let derived_priv_key =
            mnemonic.derive_key(&self.derivation_path, self.password.as_deref())?;
        let key: &coins_bip32::prelude::SigningKey = derived_priv_key.as_ref();
        let signer = SigningKey::from_bytes(&key.to_bytes())?;
        let address = secret_key_to_address(&signer);

        Ok(KeyMaterial {
            signer,
            address,
            mnemonic: Some(mnemonic.to_phrase()),
            derivation_path: Some(self.derivation_path_str.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::coins_bip39::English;
    use trustlines_core::utils::to_checksum;

    const TEST_DERIVATION_PATH: &str = "m/44'/60'/0'/2/1";

    #[test]
    fn mnemonic_deterministic() {
        // Testcases have been taken from MyCryptoWallet
        const TESTCASES: [(&str, u32, Option<&str>, &str); 4] = [
            (
                "work man father plunge mystery proud hollow address reunion sauce theory bonus",
                0u32,
                Some("TREZOR123"),
                "0x431a00DA1D54c281AeF638A73121B3D153e0b0F6",
            ),
            (
                "inject danger program federal spice bitter term garbage coyote breeze thought funny",
                1u32,
                Some("LEDGER321"),
                "0x231a3D0a05d13FAf93078C779FeeD3752ea1350C",
            ),
            (
                "fire evolve buddy tenant talent favorite ankle stem regret myth dream fresh",
                2u32,
                None,
                "0x1D86AD5eBb2380dAdEAF52f61f4F428C485460E9",
            ),
            (
                "thumb soda tape crunch maple fresh imitate cancel order blind denial giraffe",
                3u32,
                None,
                "0xFB78b25f69A8e941036fEE2A5EeAf349D81D4ccc",
            ),
        ];
        TESTCASES.iter().for_each(|(phrase, index, password, expected_addr)| {
            let mut builder =
                MnemonicBuilder::<English>::default().phrase(*phrase).index(*index).unwrap();
            if let Some(psswd) = password {
                builder = builder.password(psswd);
            }
            let key = builder.build().unwrap();
            assert_eq!(&to_checksum(&key.address(), None), expected_addr);
            assert_eq!(key.mnemonic(), Some(*phrase));
            assert_eq!(key.derivation_path(), Some(format!("m/44'/60'/0'/0/{index}").as_str()));
        })
    }

    #[test]
    fn random_phrase_rebuilds_same_key() {
        let mut rng = rand::thread_rng();
        let key1 = MnemonicBuilder::<English>::default()
            .word_count(24)
            .derivation_path(TEST_DERIVATION_PATH)
            .unwrap()
            .build_random(&mut rng)
            .unwrap();
        let phrase = key1.mnemonic().unwrap();
        assert_eq!(phrase.split_whitespace().count(), 24);

        let key2 = MnemonicBuilder::<English>::default()
            .phrase(phrase)
            .derivation_path(TEST_DERIVATION_PATH)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(key1.address(), key2.address());
        assert_eq!(key2.derivation_path(), Some(TEST_DERIVATION_PATH));
    }

    #[test]
    fn phrase_presence_is_checked() {
        assert!(matches!(
            MnemonicBuilder::<English>::default().build(),
            Err(KeyError::MnemonicBuilderError(MnemonicBuilderError::ExpectedPhraseNotFound))
        ));
        assert!(matches!(
            MnemonicBuilder::<English>::default()
                .phrase("abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about")
                .build_random(&mut rand::thread_rng()),
            Err(KeyError::MnemonicBuilderError(MnemonicBuilderError::UnexpectedPhraseFound))
        ));
    }

    #[test]
    fn rejects_invalid_phrases() {
        // bad checksum word
        let res = MnemonicBuilder::<English>::default()
            .phrase("abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon")
            .build();
        assert!(matches!(res, Err(KeyError::Bip39Error(_))));
    }

    #[test]
    fn debug_hides_phrase() {
        let builder = MnemonicBuilder::<English>::default().phrase("fire evolve buddy").password("pw");
        let debug = format!("{builder:?}");
        assert!(!debug.contains("fire"));
        assert!(!debug.contains("\"pw\""));
    }
}
