#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]
#![deny(rustdoc::broken_intra_doc_links)]
#![doc(test(
    no_crate_inject,
    attr(deny(rust_2018_idioms), allow(dead_code, unused_variables))
))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # trustlines
//!
//! Wallet abstraction and meta-transaction signing for the Trustlines network.
//!
//! # Quickstart
//!
//! A prelude is provided which imports all the important things for you. A wallet is
//! created for one of the three account models and talks to the chain through a
//! [`Relay`](wallets::Relay):
//!
//! ```no_run
//! use trustlines::prelude::*;
//!
//! # async fn foo() -> Result<(), WalletError> {
//! let mut wallet = TlWallet::new(WalletKind::SmartWallet, MockRelay::new(), WalletConfig::default())?;
//! let account = wallet.create().await?;
//! println!("smart wallet at {:?}, owned by {:?}", account.address, account.meta.owner_address);
//! # Ok(())
//! # }
//! ```
//!
//! ## Deriving addresses offline
//!
//! Identity addresses depend on the proxy creation code of the deployment, smart-wallet
//! addresses default to the Safe 1.3.0 contracts:
//!
//! ```
//! use trustlines::wallets::address::{proxy_identity_address, smart_wallet_address};
//!
//! # let proxy_init_code = [0x60, 0x80, 0x60, 0x40, 0x52];
//! let identity = proxy_identity_address(
//!     "0x3daB9C8301FC109Fd7bb5C81B5ea4413ef692634",
//!     "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23",
//!     &proxy_init_code,
//! )?;
//! let safe = smart_wallet_address(
//!     "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23",
//!     "0xd9Db270c1B5E3Bd161E8c8503c55cEABeE709552",
//!     "0xa6B71E26C5e0845f74c812102Ca7114b6a896AB2",
//! )?;
//! assert_eq!(safe, "0x5De5c0B59BdB1E5F96C71eC0CA9310AfE7515251");
//! # Ok::<(), trustlines::wallets::WalletError>(())
//! ```

/// # Ethereum types, hashing and ABI encoding
///
/// Type definitions for the transactions and signatures wallets produce, along with
/// Keccak-256, EIP-55 checksums, CREATE2 and EIP-712 helpers.
pub mod core {
    pub use trustlines_core::*;
}

/// # Key material
///
/// Signing keys created at random, from BIP-39 mnemonics, raw private keys or encrypted
/// JSON keystores.
///
/// ```
/// use trustlines::signers::KeyMaterial;
///
/// let key = KeyMaterial::from_private_key(
///     "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
/// )?;
/// assert_eq!(format!("{:?}", key.address()), "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23");
/// # Ok::<(), trustlines::signers::KeyError>(())
/// ```
pub mod signers {
    pub use trustlines_signers::*;
}

/// # Wallet strategies
///
/// Account models, nonce and fee handling, transaction hashing and the relay interface.
pub mod wallets {
    pub use trustlines_wallets::*;
}

// Re-export trustlines_core::utils
pub use trustlines_core::utils;

/// Easy import of frequently used type definitions and traits
pub mod prelude {
    pub use trustlines_core::types::*;

    pub use trustlines_signers::{KeyError, KeyMaterial, MnemonicBuilder, ProgressCallback};

    pub use trustlines_wallets::{relay::MockRelay, *};
}
