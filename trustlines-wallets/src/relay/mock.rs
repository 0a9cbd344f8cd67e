use super::{Relay, RelayError};
use crate::{DeploymentRequest, FeeEstimate, SignedPayload, TransactionStatus};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};
use trustlines_core::types::{Address, PendingTransaction, H256, U256};

/// An in-memory [`Relay`] with scripted answers.
///
/// Clones share their state, so a test can keep a handle while a wallet owns another.
/// Submitted payloads become `Pending` and bump the sender's nonce.
#[derive(Debug, Clone, Default)]
pub struct MockRelay {
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    nonces: HashMap<Address, U256>,
    fee_estimate: FeeEstimate,
    statuses: HashMap<H256, TransactionStatus>,
    deployed: HashMap<Address, Address>,
    deployment_answer: Option<Address>,
    failure: Option<String>,
    submitted: Vec<SignedPayload>,
    deployment_requests: Vec<DeploymentRequest>,
    nonce_queries: Vec<Address>,
}

impl MockRelay {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_nonce(&self, address: Address, nonce: impl Into<U256>) {
        self.state().nonces.insert(address, nonce.into());
    }

    pub fn set_fee_estimate(&self, estimate: FeeEstimate) {
        self.state().fee_estimate = estimate;
    }

    pub fn set_status(&self, hash: H256, status: TransactionStatus) {
        self.state().statuses.insert(hash, status);
    }

    /// Marks `address` as a deployed wallet contract, reported as `deployed_at`
    pub fn set_deployed(&self, address: Address, deployed_at: Address) {
        self.state().deployed.insert(address, deployed_at);
    }

    /// Sets the address the next deployments report
    pub fn set_deployment_address(&self, address: Address) {
        self.state().deployment_answer = Some(address);
    }

    /// Makes the next call fail with [`RelayError::Custom`]
    pub fn fail_next(&self, reason: impl Into<String>) {
        self.state().failure = Some(reason.into());
    }

    /// Every payload submitted so far
    pub fn submitted(&self) -> Vec<SignedPayload> {
        self.state().submitted.clone()
    }

    /// Every deployment requested so far
    pub fn deployment_requests(&self) -> Vec<DeploymentRequest> {
        self.state().deployment_requests.clone()
    }

    /// Every address whose nonce was queried so far
    pub fn nonce_queries(&self) -> Vec<Address> {
        self.state().nonce_queries.clone()
    }

    fn check_failure(state: &mut MockState) -> Result<(), RelayError> {
        match state.failure.take() {
            Some(reason) => Err(RelayError::Custom(reason)),
            None => Ok(()),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Relay for MockRelay {
    async fn get_nonce(&self, address: Address) -> Result<U256, RelayError> {
        let mut state = self.state();
        Self::check_failure(&mut state)?;
        state.nonce_queries.push(address);
        Ok(state.nonces.get(&address).copied().unwrap_or_default())
    }

    async fn get_fee_estimate(&self, _tx: &PendingTransaction) -> Result<FeeEstimate, RelayError> {
        let mut state = self.state();
        Self::check_failure(&mut state)?;
        Ok(state.fee_estimate.clone())
    }

    async fn submit(&self, payload: SignedPayload) -> Result<H256, RelayError> {
        let mut state = self.state();
        Self::check_failure(&mut state)?;
        let hash = payload.hash();
        let nonce = state.nonces.entry(payload.sender()).or_default();
        *nonce += U256::one();
        state.statuses.insert(hash, TransactionStatus::Pending);
        state.submitted.push(payload);
        Ok(hash)
    }

    async fn get_status(&self, hash: H256) -> Result<TransactionStatus, RelayError> {
        let mut state = self.state();
        Self::check_failure(&mut state)?;
        state.statuses.get(&hash).copied().ok_or(RelayError::NotFound)
    }

    async fn get_deployed_contract_address(
        &self,
        address: Address,
    ) -> Result<Address, RelayError> {
        let mut state = self.state();
        Self::check_failure(&mut state)?;
        state.deployed.get(&address).copied().ok_or(RelayError::NotFound)
    }

    async fn request_deployment(&self, request: DeploymentRequest) -> Result<Address, RelayError> {
        let mut state = self.state();
        Self::check_failure(&mut state)?;
        let address = state
            .deployment_answer
            .ok_or_else(|| RelayError::Custom("no deployment address scripted".to_owned()))?;
        state.deployed.insert(address, address);
        state.deployment_requests.push(request);
        Ok(address)
    }
}
