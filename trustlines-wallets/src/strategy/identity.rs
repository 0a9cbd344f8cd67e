use super::{check_deployed_address, WalletCore, WalletStrategy};
use crate::{
    address::{compute_proxy_identity_address, identity_init_code},
    relay::Relay,
    DeploymentRequest, IdentityContracts, MetaTransaction, NonceStrategy, SignedPayload,
    WalletConfig, WalletError, WalletKind,
};
use async_trait::async_trait;
use tracing::{debug, instrument};
use trustlines_core::types::{Address, PendingTransaction};

/// A wallet acting through a proxy identity contract owned by its key.
///
/// The identity address is derived from the owner with CREATE2 when the account is
/// created, and the relay deploys the proxy on request. Transactions are packed,
/// hashed identity meta-transactions that the relay forwards and pays for.
#[derive(Debug)]
pub struct IdentityWallet<R> {
    core: WalletCore<R>,
    contracts: IdentityContracts,
}

impl<R: Relay> IdentityWallet<R> {
    /// Fails with [`WalletError::MissingContracts`] unless `config` names the identity
    /// contracts of the deployment.
    pub fn new(relay: R, config: WalletConfig) -> Result<Self, WalletError> {
        let contracts = config.identity_contracts()?.clone();
        Ok(Self { core: WalletCore::new(WalletKind::Identity, relay, config)?, contracts })
    }

    /// Replaces the nonce strategy picked from the configuration, e.g. to inject the
    /// random source of random nonces
    #[must_use]
    pub fn with_nonce_strategy(mut self, nonce: NonceStrategy) -> Self {
        self.core.nonce = nonce;
        self
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<R: Relay> WalletStrategy for IdentityWallet<R> {
    type Relay = R;

    fn kind(&self) -> WalletKind {
        WalletKind::Identity
    }

    fn core(&self) -> &WalletCore<R> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WalletCore<R> {
        &mut self.core
    }

    fn derive_address(&self, owner: Address) -> Address {
        let contracts = &self.contracts;
        compute_proxy_identity_address(contracts.factory, owner, &contracts.proxy_init_code)
    }

    /// Asks the relay to deploy the identity proxy, authorized by a signature over the
    /// factory and implementation. The deployed address must be the derived one.
    #[instrument(skip(self), fields(kind = "identity"))]
    async fn deploy_identity(&self) -> Result<Address, WalletError> {
        let key = self.core.key()?;
        let expected = self.core.external_address()?;
        let IdentityContracts { factory, implementation, proxy_init_code } = &self.contracts;

        let digest = self.core.hasher.identity_deployment_hash(*factory, *implementation)?;
        let signature = key.sign_hash(digest)?;
        let request = DeploymentRequest::Identity {
            owner: key.address(),
            factory: *factory,
            implementation: *implementation,
            init_code: identity_init_code(proxy_init_code, key.address()),
            signature: signature.to_vec().into(),
        };

        let deployed = self.core.relay.request_deployment(request).await?;
        debug!(?deployed, "identity deployed");
        check_deployed_address(expected, deployed)
    }

    async fn is_identity_deployed(&self) -> Result<bool, WalletError> {
        self.core.contract_deployed().await
    }

    fn sign_payload(&self, tx: &PendingTransaction) -> Result<SignedPayload, WalletError> {
        let hash = self.core.hasher.hash(tx, WalletKind::Identity)?;
        let signature = self.core.key()?.sign_hash(hash)?;
        Ok(SignedPayload::IdentityMetaTransaction(MetaTransaction {
            transaction: tx.clone(),
            hash,
            signature: signature.to_vec().into(),
        }))
    }
}
