use super::{DirectWallet, IdentityWallet, SmartWalletProxy, WalletCore, WalletStrategy};
use crate::{relay::Relay, SignedPayload, WalletConfig, WalletData, WalletError, WalletKind};
use async_trait::async_trait;
use trustlines_core::types::{Address, PendingTransaction, H256};

/// A wallet of any kind, chosen at runtime from its [`WalletKind`].
#[derive(Debug)]
pub enum TlWallet<R> {
    Direct(DirectWallet<R>),
    Identity(IdentityWallet<R>),
    SmartWallet(SmartWalletProxy<R>),
}

macro_rules! delegate {
    ($self:ident, $wallet:ident => $e:expr) => {
        match $self {
            TlWallet::Direct($wallet) => $e,
            TlWallet::Identity($wallet) => $e,
            TlWallet::SmartWallet($wallet) => $e,
        }
    };
}

impl<R: Relay> TlWallet<R> {
    /// An empty wallet of `kind`, ready to create or recover an account
    pub fn new(kind: WalletKind, relay: R, config: WalletConfig) -> Result<Self, WalletError> {
        Ok(match kind {
            WalletKind::Direct => TlWallet::Direct(DirectWallet::new(relay, config)?),
            WalletKind::Identity => TlWallet::Identity(IdentityWallet::new(relay, config)?),
            WalletKind::SmartWallet => {
                TlWallet::SmartWallet(SmartWalletProxy::new(relay, config)?)
            }
        })
    }

    /// Restores the wallet described by `data`, whose kind picks the variant
    pub async fn from_wallet_data(
        data: &WalletData,
        relay: R,
        config: WalletConfig,
    ) -> Result<Self, WalletError> {
        let mut wallet = Self::new(data.kind, relay, config)?;
        wallet.load_from(data).await?;
        Ok(wallet)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<R: Relay> WalletStrategy for TlWallet<R> {
    type Relay = R;

    fn kind(&self) -> WalletKind {
        delegate!(self, wallet => wallet.kind())
    }

    fn core(&self) -> &WalletCore<R> {
        delegate!(self, wallet => wallet.core())
    }

    fn core_mut(&mut self) -> &mut WalletCore<R> {
        delegate!(self, wallet => wallet.core_mut())
    }

    fn derive_address(&self, owner: Address) -> Address {
        delegate!(self, wallet => wallet.derive_address(owner))
    }

    async fn deploy_identity(&self) -> Result<Address, WalletError> {
        delegate!(self, wallet => wallet.deploy_identity().await)
    }

    async fn is_identity_deployed(&self) -> Result<bool, WalletError> {
        delegate!(self, wallet => wallet.is_identity_deployed().await)
    }

    fn sign_payload(&self, tx: &PendingTransaction) -> Result<SignedPayload, WalletError> {
        delegate!(self, wallet => wallet.sign_payload(tx))
    }

    fn transaction_hash(&self, tx: &PendingTransaction) -> Result<H256, WalletError> {
        delegate!(self, wallet => wallet.transaction_hash(tx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{relay::MockRelay, NonceMechanism};

    const KINDS: [WalletKind; 3] =
        [WalletKind::Direct, WalletKind::Identity, WalletKind::SmartWallet];

    fn config() -> WalletConfig {
        WalletConfig::default().with_identity_contracts(
            Address::repeat_byte(0x0f),
            Address::repeat_byte(0x1f),
            vec![0x60, 0x80, 0x60, 0x40, 0x52],
        )
    }

    #[tokio::test]
    async fn restores_every_kind() {
        for kind in KINDS {
            let mut wallet = TlWallet::new(kind, MockRelay::new(), config()).unwrap();
            let data = wallet.create().await.unwrap();
            assert_eq!(data.kind, kind);
            assert_eq!(data.address, wallet.derive_address(data.meta.owner_address));

            let restored =
                TlWallet::from_wallet_data(&data, MockRelay::new(), config())
                    .await
                    .unwrap();
            assert_eq!(restored.kind(), kind);
            assert_eq!(restored.address().await.unwrap(), data.address);
            assert_eq!(restored.wallet_data().unwrap(), data);
        }
    }

    #[tokio::test]
    async fn kinds_derive_distinct_addresses() {
        let mut direct =
            TlWallet::new(WalletKind::Direct, MockRelay::new(), config()).unwrap();
        let data = direct.create().await.unwrap();
        let owner = data.meta.owner_address;

        let identity =
            TlWallet::new(WalletKind::Identity, MockRelay::new(), config()).unwrap();
        let safe =
            TlWallet::new(WalletKind::SmartWallet, MockRelay::new(), config())
                .unwrap();
        assert_eq!(direct.derive_address(owner), owner);
        assert_ne!(identity.derive_address(owner), owner);
        assert_ne!(safe.derive_address(owner), owner);
        assert_ne!(identity.derive_address(owner), safe.derive_address(owner));
    }

    #[test]
    fn only_identities_take_random_nonces() {
        let config = config().with_nonce_mechanism(NonceMechanism::Random);
        for kind in KINDS {
            let res = TlWallet::new(kind, MockRelay::new(), config.clone());
            assert_eq!(res.is_ok(), kind == WalletKind::Identity, "{kind}");
        }
    }

    #[test]
    fn only_identities_need_identity_contracts() {
        for kind in KINDS {
            let res = TlWallet::new(kind, MockRelay::new(), WalletConfig::default());
            match kind {
                WalletKind::Identity => assert!(matches!(
                    res,
                    Err(WalletError::MissingContracts(WalletKind::Identity))
                )),
                _ => assert!(res.is_ok(), "{kind}"),
            }
        }
    }

    #[tokio::test]
    async fn empty_wallets_have_no_account() {
        let wallet =
            TlWallet::new(WalletKind::Identity, MockRelay::new(), config()).unwrap();
        assert!(matches!(wallet.address().await, Err(WalletError::NoKeyLoaded)));
        assert!(matches!(wallet.deploy_identity().await, Err(WalletError::NoKeyLoaded)));
        assert!(matches!(wallet.wallet_data(), Err(WalletError::NoKeyLoaded)));
    }
}
