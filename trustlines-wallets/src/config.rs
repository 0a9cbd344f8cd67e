use crate::{
    address::{
        decode_code, DEFAULT_SAFE_PROXY_FACTORY, DEFAULT_SAFE_SINGLETON, SAFE_PROXY_CREATION_CODE,
    },
    NonceMechanism, WalletError, WalletKind,
};
use serde::{Deserialize, Serialize};
use trustlines_core::{
    types::{Address, Bytes, U256},
    utils::parse_address,
};

/// Chain and contract parameters shared by all wallets of one deployment.
///
/// Every field has a default, so a configuration file only needs to name what differs.
/// The identity contracts are the exception: they are specific to each deployment and
/// identity wallets refuse to start without them.
///
/// ```
/// use trustlines_wallets::{NonceMechanism, WalletConfig};
///
/// let config: WalletConfig = serde_json::from_str(
///     r#"{ "chainId": 4660, "nonceMechanism": "random" }"#,
/// )?;
/// assert_eq!(config.chain_id, 4660);
/// assert_eq!(config.nonce_mechanism, NonceMechanism::Random);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WalletConfig {
    /// EIP-155 chain id, also part of every meta-transaction hash
    pub chain_id: u64,
    /// Version byte of the identity contracts, part of identity meta-transaction hashes
    pub identity_version: u8,
    /// Nonce source of identity meta-transactions
    pub nonce_mechanism: NonceMechanism,
    /// Contracts of identity wallets, unset by default
    pub identity: Option<IdentityContracts>,
    pub safe_singleton: Address,
    pub safe_proxy_factory: Address,
    pub safe_proxy_creation_code: Bytes,
    /// Salt nonce of smart-wallet deployments. Fixed per deployment, so one owner key
    /// always maps to the same smart wallet.
    pub salt_nonce: U256,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            identity_version: 1,
            nonce_mechanism: NonceMechanism::Counting,
            identity: None,
            safe_singleton: parse_address(DEFAULT_SAFE_SINGLETON)
                .unwrap_or_else(|_| unreachable!("bundled address is valid")),
            safe_proxy_factory: parse_address(DEFAULT_SAFE_PROXY_FACTORY)
                .unwrap_or_else(|_| unreachable!("bundled address is valid")),
            safe_proxy_creation_code: decode_code(SAFE_PROXY_CREATION_CODE).into(),
            salt_nonce: U256::zero(),
        }
    }
}

impl WalletConfig {
    #[must_use]
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    #[must_use]
    pub fn with_identity_version(mut self, version: u8) -> Self {
        self.identity_version = version;
        self
    }

    #[must_use]
    pub fn with_nonce_mechanism(mut self, mechanism: NonceMechanism) -> Self {
        self.nonce_mechanism = mechanism;
        self
    }

    /// Sets the identity factory, the implementation its proxies delegate to and the
    /// creation code of those proxies
    #[must_use]
    pub fn with_identity_contracts(
        mut self,
        factory: Address,
        implementation: Address,
        proxy_init_code: impl Into<Bytes>,
    ) -> Self {
        self.identity = Some(IdentityContracts {
            factory,
            implementation,
            proxy_init_code: proxy_init_code.into(),
        });
        self
    }

    /// The identity contracts, or an error naming the missing configuration
    pub fn identity_contracts(&self) -> Result<&IdentityContracts, WalletError> {
        self.identity.as_ref().ok_or(WalletError::MissingContracts(WalletKind::Identity))
    }

    /// Sets the smart-wallet singleton and the factory deploying proxies to it
    #[must_use]
    pub fn with_safe_contracts(mut self, singleton: Address, proxy_factory: Address) -> Self {
        self.safe_singleton = singleton;
        self.safe_proxy_factory = proxy_factory;
        self
    }

    #[must_use]
    pub fn with_safe_proxy_creation_code(mut self, creation_code: impl Into<Bytes>) -> Self {
        self.safe_proxy_creation_code = creation_code.into();
        self
    }

    #[must_use]
    pub fn with_salt_nonce(mut self, salt_nonce: impl Into<U256>) -> Self {
        self.salt_nonce = salt_nonce.into();
        self
    }
}

/// Deployment of the identity contracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityContracts {
    /// Factory deploying identity proxies with CREATE2 and a zero salt
    pub factory: Address,
    /// Identity implementation the proxies delegate to
    pub implementation: Address,
    /// Creation code of the identity proxy, without its `address owner` constructor
    /// argument
    pub proxy_init_code: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: WalletConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, WalletConfig::default());
        assert_eq!(config.chain_id, 1);
        assert_eq!(config.nonce_mechanism, NonceMechanism::Counting);
        assert_eq!(config.salt_nonce, U256::zero());
        assert_eq!(config.identity, None);
    }

    #[test]
    fn identity_contracts_are_required() {
        assert!(matches!(
            WalletConfig::default().identity_contracts(),
            Err(WalletError::MissingContracts(WalletKind::Identity))
        ));

        let config: WalletConfig = serde_json::from_str(
            r#"{
                "identity": {
                    "factory": "0x3daB9C8301FC109Fd7bb5C81B5ea4413ef692634",
                    "implementation": "0x7E2439D87052379E8e2a8Ad203a20f546f7f5913",
                    "proxyInitCode": "0x6080604052"
                }
            }"#,
        )
        .unwrap();
        let contracts = config.identity_contracts().unwrap();
        assert_eq!(
            contracts.factory,
            parse_address("0x3daB9C8301FC109Fd7bb5C81B5ea4413ef692634").unwrap()
        );
        assert_eq!(contracts.proxy_init_code.as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);

        // a partial section is not silently completed
        assert!(serde_json::from_str::<WalletConfig>(
            r#"{ "identity": { "factory": "0x3daB9C8301FC109Fd7bb5C81B5ea4413ef692634" } }"#
        )
        .is_err());
    }

    #[test]
    fn rejects_unknown_nonce_mechanism() {
        assert!(serde_json::from_str::<WalletConfig>(r#"{"nonceMechanism": "sequential"}"#)
            .is_err());
    }

    #[test]
    fn builder_setters() {
        let factory = Address::repeat_byte(1);
        let implementation = Address::repeat_byte(2);
        let config = WalletConfig::default()
            .with_chain_id(4660)
            .with_identity_contracts(factory, implementation, vec![0x60, 0x00])
            .with_salt_nonce(3u64);
        assert_eq!(config.chain_id, 4660);
        let contracts = config.identity_contracts().unwrap();
        assert_eq!(contracts.factory, factory);
        assert_eq!(contracts.implementation, implementation);
        assert_eq!(contracts.proxy_init_code.as_ref(), &[0x60, 0x00]);
        assert_eq!(config.salt_nonce, U256::from(3u64));
    }
}
