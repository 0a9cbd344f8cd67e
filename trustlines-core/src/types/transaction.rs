//! Pending transactions and their legacy RLP encoding.
use crate::{
    types::{Address, Bytes, Signature, H256, U256},
    utils::keccak256,
};
use rlp::RlpStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of tx fields before signing
const NUM_TX_FIELDS: usize = 9;

/// An error involving a transaction that is not ready for encoding
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransactionError {
    /// A field required by the requested encoding has not been filled in
    #[error("transaction field `{0}` has not been set")]
    MissingField(&'static str),
}

/// The kind of call a meta-transaction asks the wallet contract to perform.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum Operation {
    /// A regular message call
    #[default]
    Call = 0,
    /// A delegate call executed in the context of the wallet contract
    DelegateCall = 1,
}

impl From<Operation> for u8 {
    fn from(op: Operation) -> Self {
        op as u8
    }
}

/// A transaction intent created by a caller.
///
/// The nonce and fee fields start out empty. They are filled in while the transaction is
/// prepared and must not change once it has been signed.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PendingTransaction {
    /// The account paying for and authorizing the transaction
    pub from: Address,

    /// Recipient address
    pub to: Address,

    /// Transferred value
    #[serde(default)]
    pub value: U256,

    /// The compiled code of a contract OR the first 4 bytes of the hash of the
    /// invoked method signature and encoded parameters
    #[serde(default)]
    pub data: Bytes,

    /// Supplied gas
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<U256>,

    /// Gas price, denominated in the fee currency for meta-transactions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,

    /// Flat fee paid to the relay on top of the gas based fee
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_fee: Option<U256>,

    /// Transaction nonce
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<U256>,

    /// Receiver of the delegation fees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_recipient: Option<Address>,

    /// Currency network (or token) the delegation fees are paid in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_currency: Option<Address>,

    /// Gas reserved for the inner call of a smart-wallet meta-transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_tx_gas: Option<U256>,

    /// Gas charged for the smart-wallet bookkeeping around the inner call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_gas: Option<U256>,

    /// Call type of a meta-transaction
    #[serde(default)]
    pub operation: Operation,
}

impl PendingTransaction {
    /// Creates an empty transaction request with all fields left empty
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience function for sending a new payment transaction to the receiver.
    pub fn pay<T: Into<Address>, V: Into<U256>>(to: T, value: V) -> Self {
        PendingTransaction { to: to.into(), value: value.into(), ..Default::default() }
    }

    // Builder pattern helpers

    /// Sets the `from` field in the transaction to the provided value
    #[must_use]
    pub fn from<T: Into<Address>>(mut self, from: T) -> Self {
        self.from = from.into();
        self
    }

    /// Sets the `to` field in the transaction to the provided value
    #[must_use]
    pub fn to<T: Into<Address>>(mut self, to: T) -> Self {
        self.to = to.into();
        self
    }

    /// Sets the `value` field in the transaction to the provided value
    #[must_use]
    pub fn value<T: Into<U256>>(mut self, value: T) -> Self {
        self.value = value.into();
        self
    }

    /// Sets the `data` field in the transaction to the provided value
    #[must_use]
    pub fn data<T: Into<Bytes>>(mut self, data: T) -> Self {
        self.data = data.into();
        self
    }

    /// Sets the `gas_limit` field in the transaction to the provided value
    #[must_use]
    pub fn gas_limit<T: Into<U256>>(mut self, gas_limit: T) -> Self {
        self.gas_limit = Some(gas_limit.into());
        self
    }

    /// Sets the `gas_price` field in the transaction to the provided value
    #[must_use]
    pub fn gas_price<T: Into<U256>>(mut self, gas_price: T) -> Self {
        self.gas_price = Some(gas_price.into());
        self
    }

    /// Sets the `base_fee` field in the transaction to the provided value
    #[must_use]
    pub fn base_fee<T: Into<U256>>(mut self, base_fee: T) -> Self {
        self.base_fee = Some(base_fee.into());
        self
    }

    /// Sets the `nonce` field in the transaction to the provided value
    #[must_use]
    pub fn nonce<T: Into<U256>>(mut self, nonce: T) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Sets the `fee_recipient` field in the transaction to the provided value
    #[must_use]
    pub fn fee_recipient<T: Into<Address>>(mut self, fee_recipient: T) -> Self {
        self.fee_recipient = Some(fee_recipient.into());
        self
    }

    /// Sets the `fee_currency` field in the transaction to the provided value
    #[must_use]
    pub fn fee_currency<T: Into<Address>>(mut self, fee_currency: T) -> Self {
        self.fee_currency = Some(fee_currency.into());
        self
    }

    /// Sets the `safe_tx_gas` field in the transaction to the provided value
    #[must_use]
    pub fn safe_tx_gas<T: Into<U256>>(mut self, safe_tx_gas: T) -> Self {
        self.safe_tx_gas = Some(safe_tx_gas.into());
        self
    }

    /// Sets the `base_gas` field in the transaction to the provided value
    #[must_use]
    pub fn base_gas<T: Into<U256>>(mut self, base_gas: T) -> Self {
        self.base_gas = Some(base_gas.into());
        self
    }

    /// Sets the `operation` field in the transaction to the provided value
    #[must_use]
    pub fn operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    /// Hashes the transaction's data
    pub fn data_hash(&self) -> H256 {
        keccak256(self.data.as_ref()).into()
    }

    /// Hash that a key signs for the legacy transaction with EIP-155 replay protection
    pub fn sighash(&self, chain_id: u64) -> Result<H256, TransactionError> {
        Ok(keccak256(self.rlp(chain_id)?.as_ref()).into())
    }

    /// Gets the transaction's RLP encoding, prepared with the chain_id and extra fields for
    /// signing. Assumes the nonce, gas price and gas limit have been filled in.
    pub fn rlp(&self, chain_id: u64) -> Result<Bytes, TransactionError> {
        let mut rlp = RlpStream::new();
        rlp.begin_list(NUM_TX_FIELDS);
        self.rlp_base(&mut rlp)?;
        rlp.append(&chain_id);
        rlp.append(&0u8);
        rlp.append(&0u8);
        Ok(rlp.out().freeze().into())
    }

    /// Produces the RLP encoding of the transaction with the provided signature
    pub fn rlp_signed(&self, signature: &Signature) -> Result<Bytes, TransactionError> {
        let mut rlp = RlpStream::new();
        rlp.begin_list(NUM_TX_FIELDS);
        self.rlp_base(&mut rlp)?;

        // append the signature
        rlp.append(&signature.v);
        rlp.append(&signature.r);
        rlp.append(&signature.s);
        Ok(rlp.out().freeze().into())
    }

    /// Hash under which the network indexes the signed transaction
    pub fn hash_signed(&self, signature: &Signature) -> Result<H256, TransactionError> {
        Ok(keccak256(self.rlp_signed(signature)?.as_ref()).into())
    }

    fn rlp_base(&self, rlp: &mut RlpStream) -> Result<(), TransactionError> {
        rlp.append(&required(self.nonce, "nonce")?);
        rlp.append(&required(self.gas_price, "gasPrice")?);
        rlp.append(&required(self.gas_limit, "gasLimit")?);
        rlp.append(&self.to);
        rlp.append(&self.value);
        rlp.append(&self.data.to_vec());
        Ok(())
    }
}

/// Unwraps a field that must have been filled in by the time the transaction is encoded
pub(crate) fn required<T>(value: Option<T>, field: &'static str) -> Result<T, TransactionError> {
    value.ok_or(TransactionError::MissingField(field))
}
