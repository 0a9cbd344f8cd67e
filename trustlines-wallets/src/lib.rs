#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
//! Wallet strategies for the Trustlines network.
//!
//! A wallet turns a [`PendingTransaction`](trustlines_core::types::PendingTransaction) into a
//! signed payload that an external [`Relay`] forwards to the chain. Three account models
//! share the [`WalletStrategy`] contract:
//!
//! - [`DirectWallet`]: the key's own address sends legacy, EIP-155 signed transactions;
//! - [`IdentityWallet`]: a proxy identity contract executes meta-transactions signed by
//!   the owner key;
//! - [`SmartWalletProxy`]: a single-owner smart-contract wallet executes EIP-712 signed
//!   meta-transactions.
//!
//! [`TlWallet`] is the closed union of the three, selected at runtime by [`WalletKind`].
//!
//! ```no_run
//! use trustlines_core::types::{Address, PendingTransaction};
//! use trustlines_wallets::{
//!     relay::MockRelay, StatusQuery, TlWallet, WalletConfig, WalletKind, WalletStrategy,
//! };
//!
//! # async fn foo(factory: Address, implementation: Address, proxy_init_code: Vec<u8>)
//! # -> Result<(), Box<dyn std::error::Error>> {
//! let config = WalletConfig::default().with_identity_contracts(
//!     factory,
//!     implementation,
//!     proxy_init_code,
//! );
//! let mut wallet = TlWallet::new(WalletKind::Identity, MockRelay::new(), config)?;
//! let descriptor = wallet.create().await?;
//!
//! // the identity address is known before it is deployed
//! wallet.deploy_identity().await?;
//!
//! let tx = PendingTransaction::new().from(descriptor.address).to(descriptor.address);
//! let prepared = wallet.prepare_transaction(tx).await?;
//! let hash = wallet.confirm(&prepared.transaction).await?;
//! let status = wallet.get_transaction_status(StatusQuery::Hash(hash)).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Address derivation is available without any network access through the functions of
//! the [`address`] module.
pub mod address;

mod config;
pub use config::{IdentityContracts, WalletConfig};

mod error;
pub use error::WalletError;

mod fees;
pub use fees::FeeDelegationCalculator;

mod hasher;
pub use hasher::{TypedTransactionHasher, CREATE_PROXY_TYPE_HASH, SAFE_TX_TYPE_HASH};

mod nonce;
pub use nonce::{random_nonce, NonceMechanism, NonceStrategy, SecureRng};

pub mod relay;
pub use relay::{Relay, RelayError};

mod strategy;
pub use strategy::{
    DirectWallet, IdentityWallet, SmartWalletProxy, TlWallet, WalletCore, WalletStrategy,
};

mod types;
pub use types::*;
