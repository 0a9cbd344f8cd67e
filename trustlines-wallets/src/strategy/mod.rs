//! The wallet strategies and the contract they share.
use crate::{
    relay::{Relay, RelayError},
    FeeDelegationCalculator, NonceMechanism, NonceStrategy, PreparedTransaction, SignedPayload,
    SigningKeyData, StatusQuery, TransactionStatus, TypedTransactionHasher, WalletConfig,
    WalletData, WalletError, WalletKind, WalletMeta, WALLET_DATA_VERSION,
};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};
use trustlines_core::types::{Address, Bytes, PendingTransaction, Signature, H256};
use trustlines_signers::KeyMaterial;
#[cfg(not(target_arch = "wasm32"))]
use trustlines_signers::ProgressCallback;

mod direct;
pub use direct::DirectWallet;

mod identity;
pub use identity::IdentityWallet;

mod smart_wallet;
pub use smart_wallet::SmartWalletProxy;

mod tl_wallet;
pub use tl_wallet::TlWallet;

/// State every wallet kind is built from: the collaborators, the configuration and the
/// loaded account.
///
/// A wallet holds at most one key. Loading another account replaces it; loads must not be
/// interleaved on one instance.
#[derive(Debug)]
pub struct WalletCore<R> {
    relay: R,
    config: WalletConfig,
    hasher: TypedTransactionHasher,
    nonce: NonceStrategy,
    fees: FeeDelegationCalculator,
    key: Option<KeyMaterial>,
    address: Option<Address>,
}

impl<R: Relay> WalletCore<R> {
    /// Fails with [`WalletError::UnsupportedNonceMechanism`] if `kind` cannot use the
    /// configured nonce mechanism. Only identity contracts accept random nonces, the
    /// other account models require sequential ones.
    pub(crate) fn new(kind: WalletKind, relay: R, config: WalletConfig) -> Result<Self, WalletError> {
        let mechanism = config.nonce_mechanism;
        if mechanism == NonceMechanism::Random && kind != WalletKind::Identity {
            return Err(WalletError::UnsupportedNonceMechanism { kind, mechanism })
        }
        Ok(Self {
            relay,
            hasher: TypedTransactionHasher::new(config.chain_id, config.identity_version),
            nonce: NonceStrategy::from_mechanism(mechanism),
            fees: FeeDelegationCalculator,
            config,
            key: None,
            address: None,
        })
    }

    pub fn relay(&self) -> &R {
        &self.relay
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn hasher(&self) -> &TypedTransactionHasher {
        &self.hasher
    }

    pub fn nonce_strategy(&self) -> &NonceStrategy {
        &self.nonce
    }

    /// The loaded key material
    pub fn key(&self) -> Result<&KeyMaterial, WalletError> {
        self.key.as_ref().ok_or(WalletError::NoKeyLoaded)
    }

    /// The address used on the ledger
    pub fn external_address(&self) -> Result<Address, WalletError> {
        self.address.ok_or(WalletError::NoKeyLoaded)
    }

    fn load(&mut self, key: KeyMaterial, address: Address) {
        self.key = Some(key);
        self.address = Some(address);
    }

    /// Asks the relay whether the wallet contract is deployed, checking the reported
    /// address against the derived one
    async fn contract_deployed(&self) -> Result<bool, WalletError> {
        let expected = self.external_address()?;
        match self.relay.get_deployed_contract_address(expected).await {
            Ok(actual) => check_deployed_address(expected, actual).map(|_| true),
            Err(RelayError::NotFound) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

fn check_deployed_address(expected: Address, actual: Address) -> Result<Address, WalletError> {
    if expected != actual {
        warn!(?expected, ?actual, "relay reported a wallet contract at an unexpected address");
        return Err(WalletError::AddressMismatch { expected, actual })
    }
    Ok(actual)
}

/// The operations every account model offers.
///
/// Implementors provide the kind specific hooks (address derivation, deployment and
/// payload signing); account management, preparation, confirmation and status lookup are
/// shared.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait WalletStrategy: Send + Sync {
    type Relay: Relay;

    fn kind(&self) -> WalletKind;

    fn core(&self) -> &WalletCore<Self::Relay>;

    fn core_mut(&mut self) -> &mut WalletCore<Self::Relay>;

    /// The ledger address of the account controlled by `owner`. Pure and deterministic.
    fn derive_address(&self, owner: Address) -> Address;

    /// Makes sure the account exists on chain, returning its address
    async fn deploy_identity(&self) -> Result<Address, WalletError>;

    async fn is_identity_deployed(&self) -> Result<bool, WalletError>;

    /// Signs a prepared transaction into the payload the relay forwards
    fn sign_payload(&self, tx: &PendingTransaction) -> Result<SignedPayload, WalletError>;

    /// The hash the relay indexes `tx` by once submitted
    fn transaction_hash(&self, tx: &PendingTransaction) -> Result<H256, WalletError> {
        self.core().hasher.hash(tx, self.kind())
    }

    /// The address used on the ledger
    async fn address(&self) -> Result<Address, WalletError> {
        self.core().external_address()
    }

    /// The address of the signing key
    fn controlling_address(&self) -> Result<Address, WalletError> {
        Ok(self.core().key()?.address())
    }

    /// Uncompressed public key of the signing key
    fn public_key(&self) -> Result<Bytes, WalletError> {
        Ok(self.core().key()?.public_key())
    }

    fn mnemonic(&self) -> Result<Option<String>, WalletError> {
        Ok(self.core().key()?.mnemonic().map(str::to_owned))
    }

    fn private_key_hex(&self) -> Result<String, WalletError> {
        Ok(self.core().key()?.private_key_hex())
    }

    /// Creates a fresh account. Its ledger address is derived right away, before any
    /// deployment.
    async fn create(&mut self) -> Result<WalletData, WalletError> {
        let key = KeyMaterial::random(&mut rand::thread_rng())?;
        self.load_key(key)
    }

    /// Replaces the loaded account with the one controlled by `key`
    fn load_key(&mut self, key: KeyMaterial) -> Result<WalletData, WalletError> {
        let address = self.derive_address(key.address());
        debug!(kind = %self.kind(), ?address, owner = ?key.address(), "loaded account");
        self.core_mut().load(key, address);
        self.wallet_data()
    }

    /// Loads a previously created account, checking that its stored addresses match the
    /// ones derived from its key
    async fn load_from(&mut self, data: &WalletData) -> Result<Address, WalletError> {
        if data.version != WALLET_DATA_VERSION {
            return Err(WalletError::UnsupportedVersion(data.version))
        }
        if data.kind != self.kind() {
            return Err(WalletError::WrongWalletKind { expected: self.kind(), actual: data.kind })
        }

        let signing_key = &data.meta.signing_key;
        let key = KeyMaterial::from_private_key(&signing_key.private_key)?;
        let key = match &signing_key.mnemonic {
            Some(phrase) => {
                let from_phrase = KeyMaterial::from_mnemonic(phrase)?;
                if from_phrase != key {
                    return Err(WalletError::AddressMismatch {
                        expected: from_phrase.address(),
                        actual: key.address(),
                    })
                }
                from_phrase
            }
            None => key,
        };
        if key.address() != data.meta.owner_address {
            return Err(WalletError::AddressMismatch {
                expected: key.address(),
                actual: data.meta.owner_address,
            })
        }

        let address = self.derive_address(key.address());
        if address != data.address {
            warn!(kind = %self.kind(), expected = ?address, actual = ?data.address, "stored wallet address does not match its key");
            return Err(WalletError::AddressMismatch { expected: address, actual: data.address })
        }
        self.core_mut().load(key, address);
        Ok(address)
    }

    async fn recover_from_seed(&mut self, phrase: &str) -> Result<WalletData, WalletError> {
        let key = KeyMaterial::from_mnemonic(phrase)?;
        self.load_key(key)
    }

    async fn recover_from_private_key(
        &mut self,
        private_key: &str,
    ) -> Result<WalletData, WalletError> {
        let key = KeyMaterial::from_private_key(private_key)?;
        self.load_key(key)
    }

    /// Loads the key of an encrypted JSON keystore. Not available on wasm32, which has no
    /// keystore support.
    #[cfg(not(target_arch = "wasm32"))]
    async fn recover_from_encrypted_json(
        &mut self,
        json: &str,
        password: &str,
        progress: Option<ProgressCallback>,
    ) -> Result<WalletData, WalletError> {
        let key = KeyMaterial::from_encrypted_json(json, password, progress.as_ref())?;
        self.load_key(key)
    }

    /// Exports the signing key as an encrypted JSON keystore
    #[cfg(not(target_arch = "wasm32"))]
    async fn encrypt_to_json(
        &self,
        password: &str,
        progress: Option<ProgressCallback>,
    ) -> Result<String, WalletError> {
        let key = self.core().key()?;
        Ok(key.to_encrypted_json(&mut rand::thread_rng(), password, progress.as_ref())?)
    }

    /// Describes the loaded account, secrets included
    fn wallet_data(&self) -> Result<WalletData, WalletError> {
        let key = self.core().key()?;
        Ok(WalletData {
            version: WALLET_DATA_VERSION,
            kind: self.kind(),
            address: self.core().external_address()?,
            meta: WalletMeta {
                signing_key: SigningKeyData {
                    private_key: key.private_key_hex(),
                    mnemonic: key.mnemonic().map(str::to_owned),
                },
                owner_address: key.address(),
            },
        })
    }

    /// Signs a `0x`-prefixed 32-byte digest as is, for off-chain use
    fn sign_msg_hash(&self, digest: &str) -> Result<Signature, WalletError> {
        Ok(self.core().key()?.sign_digest_hex(digest)?)
    }

    /// Fills in the nonce and then the fees of `tx`. The nonce comes first since fee
    /// estimates may depend on it.
    #[instrument(skip_all, fields(kind = %self.kind()))]
    async fn prepare_transaction(
        &self,
        mut tx: PendingTransaction,
    ) -> Result<PreparedTransaction, WalletError> {
        let core = self.core();
        let address = core.external_address()?;
        if tx.from.is_zero() {
            tx.from = address;
        }
        if tx.nonce.is_none() {
            tx.nonce = Some(core.nonce.next_nonce(&core.relay, address).await?);
        }

        let estimate = core.relay.get_fee_estimate(&tx).await?;
        let fees = core.fees.apply_estimate(self.kind(), &mut tx, &estimate)?;
        Ok(PreparedTransaction { transaction: tx, fees })
    }

    /// Signs a prepared transaction and hands it to the relay, returning the hash to poll
    /// its status with.
    ///
    /// A transaction sent from any address other than the wallet's is refused with
    /// [`WalletError::FromAddressMismatch`].
    #[instrument(skip_all, fields(kind = %self.kind()))]
    async fn confirm(&self, tx: &PendingTransaction) -> Result<H256, WalletError> {
        let address = self.address().await?;
        if tx.from != address {
            warn!(expected = ?address, actual = ?tx.from, "refusing to sign a transaction of another account");
            return Err(WalletError::FromAddressMismatch { expected: address, actual: tx.from })
        }

        let payload = self.sign_payload(tx)?;
        let hash = self.core().relay.submit(payload).await?;
        debug!(?hash, "submitted transaction");
        Ok(hash)
    }

    /// The status of a submitted transaction. Transactions the relay never saw are
    /// [`TransactionStatus::NotFound`], not an error.
    #[instrument(skip_all, fields(kind = %self.kind()))]
    async fn get_transaction_status(
        &self,
        query: StatusQuery,
    ) -> Result<TransactionStatus, WalletError> {
        let hash = match query {
            StatusQuery::Hash(hash) => hash,
            StatusQuery::Pending(tx) => self.transaction_hash(&tx)?,
        };
        match self.core().relay.get_status(hash).await {
            Ok(status) => Ok(status),
            Err(RelayError::NotFound) => Ok(TransactionStatus::NotFound),
            Err(err) => Err(err.into()),
        }
    }
}
