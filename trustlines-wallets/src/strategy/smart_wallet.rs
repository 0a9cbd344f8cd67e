use super::{check_deployed_address, WalletCore, WalletStrategy};
use crate::{
    address::compute_smart_wallet_address, relay::Relay, DeploymentRequest, SignedPayload,
    SmartWalletMetaTransaction, WalletConfig, WalletError, WalletKind,
};
use async_trait::async_trait;
use tracing::{debug, instrument};
use trustlines_core::types::{Address, PendingTransaction};

/// A wallet acting through a Gnosis Safe proxy with its key as the single owner.
///
/// The proxy address follows from the owner, the singleton, the proxy factory and the
/// configured salt nonce. Transactions are EIP-712 `SafeTx` meta-transactions whose
/// nonces are sequential.
#[derive(Debug)]
pub struct SmartWalletProxy<R> {
    core: WalletCore<R>,
}

impl<R: Relay> SmartWalletProxy<R> {
    /// Fails if `config` asks for random nonces, which Safe contracts reject
    pub fn new(relay: R, config: WalletConfig) -> Result<Self, WalletError> {
        Ok(Self { core: WalletCore::new(WalletKind::SmartWallet, relay, config)? })
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<R: Relay> WalletStrategy for SmartWalletProxy<R> {
    type Relay = R;

    fn kind(&self) -> WalletKind {
        WalletKind::SmartWallet
    }

    fn core(&self) -> &WalletCore<R> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WalletCore<R> {
        &mut self.core
    }

    fn derive_address(&self, owner: Address) -> Address {
        let config = &self.core.config;
        compute_smart_wallet_address(
            owner,
            config.safe_singleton,
            config.safe_proxy_factory,
            &config.safe_proxy_creation_code,
            config.salt_nonce,
        )
    }

    #[instrument(skip(self), fields(kind = "safe"))]
    async fn deploy_identity(&self) -> Result<Address, WalletError> {
        let key = self.core.key()?;
        let expected = self.core.external_address()?;
        let config = &self.core.config;

        let digest = self.core.hasher.smart_wallet_deployment_hash(config.safe_proxy_factory);
        let signature = key.sign_hash(digest)?;
        let request = DeploymentRequest::SmartWallet {
            owner: key.address(),
            singleton: config.safe_singleton,
            proxy_factory: config.safe_proxy_factory,
            salt_nonce: config.salt_nonce,
            signature: signature.to_vec().into(),
        };

        let deployed = self.core.relay.request_deployment(request).await?;
        debug!(?deployed, "smart wallet deployed");
        check_deployed_address(expected, deployed)
    }

    async fn is_identity_deployed(&self) -> Result<bool, WalletError> {
        self.core.contract_deployed().await
    }

    fn sign_payload(&self, tx: &PendingTransaction) -> Result<SignedPayload, WalletError> {
        let hash = self.core.hasher.hash(tx, WalletKind::SmartWallet)?;
        let signature = self.core.key()?.sign_hash(hash)?;
        Ok(SignedPayload::SmartWalletMetaTransaction(SmartWalletMetaTransaction {
            transaction: tx.clone(),
            hash,
            signatures: signature.to_vec().into(),
        }))
    }
}
