use super::{WalletCore, WalletStrategy};
use crate::{relay::Relay, SignedPayload, WalletConfig, WalletError, WalletKind};
use async_trait::async_trait;
use trustlines_core::{
    types::{Address, Bytes, PendingTransaction, H256},
    utils::keccak256,
};

/// A wallet whose key's own address sends legacy transactions, signed with EIP-155
/// replay protection.
#[derive(Debug)]
pub struct DirectWallet<R> {
    core: WalletCore<R>,
}

impl<R: Relay> DirectWallet<R> {
    /// Fails if `config` asks for random nonces, which plain transactions cannot use
    pub fn new(relay: R, config: WalletConfig) -> Result<Self, WalletError> {
        Ok(Self { core: WalletCore::new(WalletKind::Direct, relay, config)? })
    }

    fn raw_transaction(&self, tx: &PendingTransaction) -> Result<Bytes, WalletError> {
        let key = self.core.key()?;
        let sighash = self.core.hasher.hash(tx, WalletKind::Direct)?;
        let signature = key.sign_hash_with_chain_id(sighash, self.core.hasher.chain_id())?;
        Ok(tx.rlp_signed(&signature)?)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<R: Relay> WalletStrategy for DirectWallet<R> {
    type Relay = R;

    fn kind(&self) -> WalletKind {
        WalletKind::Direct
    }

    fn core(&self) -> &WalletCore<R> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WalletCore<R> {
        &mut self.core
    }

    fn derive_address(&self, owner: Address) -> Address {
        owner
    }

    /// Nothing to deploy, the key's address is the account
    async fn deploy_identity(&self) -> Result<Address, WalletError> {
        self.controlling_address()
    }

    async fn is_identity_deployed(&self) -> Result<bool, WalletError> {
        self.core.external_address().map(|_| true)
    }

    fn sign_payload(&self, tx: &PendingTransaction) -> Result<SignedPayload, WalletError> {
        Ok(SignedPayload::RawTransaction { from: tx.from, raw: self.raw_transaction(tx)? })
    }

    // signing is deterministic, so re-signing yields the submitted transaction's hash
    fn transaction_hash(&self, tx: &PendingTransaction) -> Result<H256, WalletError> {
        Ok(keccak256(self.raw_transaction(tx)?.as_ref()).into())
    }
}
