//! Web3 Secret Storage (encrypted JSON keystore) import and export.
//!
//! `eth-keystore` only reads and writes keystore files, so the JSON payload is staged
//! through a temporary file that is removed as soon as the operation returns.
use super::{KeyError, KeyMaterial, ProgressCallback};

use trustlines_core::rand::{CryptoRng, Rng};
use std::{fs, io::Write};

const KEYSTORE_FILE_NAME: &str = "keystore";

impl KeyMaterial {
    /// Decrypts a Web3 Secret Storage JSON document into key material.
    ///
    /// `progress`, if supplied, is told `0` before and `100` after the (slow) key
    /// derivation. A keystore only holds the private key, so the result never carries a
    /// mnemonic.
    pub fn from_encrypted_json(
        json: &str,
        password: impl AsRef<[u8]>,
        progress: Option<&ProgressCallback>,
    ) -> Result<Self, KeyError> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(json.as_bytes())?;
        file.flush()?;

        report(progress, 0);
        let secret = eth_keystore::decrypt_key(file.path(), password)?;
        report(progress, 100);

        KeyMaterial::from_bytes(&secret)
    }

    /// Encrypts the private key into a Web3 Secret Storage JSON document.
    pub fn to_encrypted_json<R: Rng + CryptoRng>(
        &self,
        rng: &mut R,
        password: impl AsRef<[u8]>,
        progress: Option<&ProgressCallback>,
    ) -> Result<String, KeyError> {
        let dir = tempfile::tempdir()?;

        report(progress, 0);
        eth_keystore::encrypt_key(
            dir.path(),
            rng,
            self.signer.to_bytes(),
            password,
            Some(KEYSTORE_FILE_NAME),
        )?;
        report(progress, 100);

        Ok(fs::read_to_string(dir.path().join(KEYSTORE_FILE_NAME))?)
    }
}

fn report(progress: Option<&ProgressCallback>, percent: u8) {
    if let Some(progress) = progress {
        progress(percent)
    }
}
