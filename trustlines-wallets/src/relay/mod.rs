//! The relay collaborator wallets hand their payloads to.
//!
//! Transport, retries and timeouts belong to the implementations of [`Relay`]; this crate
//! only ships the in-memory [`MockRelay`].
use crate::{DeploymentRequest, FeeEstimate, SignedPayload, TransactionStatus};
use async_trait::async_trait;
use auto_impl::auto_impl;
use std::{error::Error, fmt::Debug};
use thiserror::Error;
use trustlines_core::types::{Address, PendingTransaction, H256, U256};

mod mock;
pub use mock::MockRelay;

#[derive(Debug, Error)]
/// An error reported by a [`Relay`]
pub enum RelayError {
    /// The relay does not know the requested item (a `404`). Callers decide whether that
    /// is an error.
    #[error("not found")]
    NotFound,
    /// Transport or server failure
    #[error(transparent)]
    ClientError(Box<dyn Error + Send + Sync>),
    /// Any other failure, described by the relay
    #[error("{0}")]
    Custom(String),
}

impl RelayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RelayError::NotFound)
    }
}

/// The network side of a wallet: nonce and fee queries, submission, status and
/// deployment.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[auto_impl(&, Box, Arc)]
pub trait Relay: Debug + Send + Sync {
    /// The transaction counter of `address`
    async fn get_nonce(&self, address: Address) -> Result<U256, RelayError>;

    /// Fee components for a transaction draft, whose nonce is already set for
    /// meta-transactions
    async fn get_fee_estimate(&self, tx: &PendingTransaction) -> Result<FeeEstimate, RelayError>;

    /// Forwards a signed payload, returning the hash it can be polled with
    async fn submit(&self, payload: SignedPayload) -> Result<H256, RelayError>;

    async fn get_status(&self, hash: H256) -> Result<TransactionStatus, RelayError>;

    /// The address of the deployed wallet contract known under `address`, or
    /// [`RelayError::NotFound`] if none has been deployed
    async fn get_deployed_contract_address(&self, address: Address)
        -> Result<Address, RelayError>;

    /// Deploys a wallet contract, returning its address
    async fn request_deployment(&self, request: DeploymentRequest) -> Result<Address, RelayError>;
}
