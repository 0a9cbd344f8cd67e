//! Values exchanged between the wallet strategies, their callers and the relay.
use crate::WalletError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use trustlines_core::{
    types::{Address, Bytes, PendingTransaction, H256, U256},
    utils::keccak256,
};

/// Version written into [`WalletData`] by this library
pub const WALLET_DATA_VERSION: u32 = 1;

/// The account model of a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletKind {
    /// The key's own address sends plain transactions
    #[serde(rename = "ethers")]
    Direct,
    /// A proxy identity contract executes meta-transactions
    #[serde(rename = "identity")]
    Identity,
    /// A smart-contract wallet executes EIP-712 signed meta-transactions
    #[serde(rename = "safe")]
    SmartWallet,
}

impl WalletKind {
    /// Whether transactions of this kind are forwarded as meta-transactions
    pub fn is_meta(&self) -> bool {
        !matches!(self, WalletKind::Direct)
    }
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WalletKind::Direct => "ethers",
            WalletKind::Identity => "identity",
            WalletKind::SmartWallet => "safe",
        };
        f.write_str(s)
    }
}

/// Serializable description of an account, enough to load it again into a wallet.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletData {
    pub version: u32,
    #[serde(rename = "type")]
    pub kind: WalletKind,
    /// The address used on the ledger
    pub address: Address,
    pub meta: WalletMeta,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletMeta {
    pub signing_key: SigningKeyData,
    /// The address of the signing key
    pub owner_address: Address,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningKeyData {
    /// `0x`-prefixed hex private key
    pub private_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mnemonic: Option<String>,
}

impl fmt::Debug for WalletData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletData")
            .field("version", &self.version)
            .field("kind", &self.kind)
            .field("address", &self.address)
            .field("owner_address", &self.meta.owner_address)
            .finish_non_exhaustive()
    }
}

// Debug of the nested parts must not leak either
impl fmt::Debug for WalletMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletMeta").field("owner_address", &self.owner_address).finish_non_exhaustive()
    }
}

impl fmt::Debug for SigningKeyData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeyData").finish_non_exhaustive()
    }
}

/// The state of a submitted transaction as reported by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionStatus {
    Success,
    Failure,
    Pending,
    /// The relay has never seen the transaction. This is a status, not an error.
    NotFound,
}

/// A meta-transaction together with the digest its owner signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaTransaction {
    pub transaction: PendingTransaction,
    /// The signed digest, which the relay indexes the meta-transaction by
    pub hash: H256,
    /// 65-byte `r ‖ s ‖ v` signature of the owner
    pub signature: Bytes,
}

/// A smart-wallet meta-transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartWalletMetaTransaction {
    pub transaction: PendingTransaction,
    pub hash: H256,
    /// Concatenated 65-byte owner signatures, ordered by owner address
    pub signatures: Bytes,
}

/// What a wallet hands to the relay after signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SignedPayload {
    /// A signed legacy transaction, ready for `eth_sendRawTransaction`
    #[serde(rename_all = "camelCase")]
    RawTransaction { from: Address, raw: Bytes },
    IdentityMetaTransaction(MetaTransaction),
    SmartWalletMetaTransaction(SmartWalletMetaTransaction),
}

impl SignedPayload {
    /// The hash the relay indexes the payload by: the transaction hash of raw
    /// transactions, the signed digest of meta-transactions
    pub fn hash(&self) -> H256 {
        match self {
            SignedPayload::RawTransaction { raw, .. } => keccak256(raw.as_ref()).into(),
            SignedPayload::IdentityMetaTransaction(meta) => meta.hash,
            SignedPayload::SmartWalletMetaTransaction(meta) => meta.hash,
        }
    }

    /// The ledger address the payload is sent from
    pub fn sender(&self) -> Address {
        match self {
            SignedPayload::RawTransaction { from, .. } => *from,
            SignedPayload::IdentityMetaTransaction(meta) => meta.transaction.from,
            SignedPayload::SmartWalletMetaTransaction(meta) => meta.transaction.from,
        }
    }
}

/// Signed request asking the relay to deploy a wallet contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DeploymentRequest {
    #[serde(rename_all = "camelCase")]
    Identity {
        owner: Address,
        factory: Address,
        implementation: Address,
        /// Proxy creation code with the owner appended, as the factory deploys it
        init_code: Bytes,
        signature: Bytes,
    },
    #[serde(rename_all = "camelCase")]
    SmartWallet {
        owner: Address,
        singleton: Address,
        proxy_factory: Address,
        salt_nonce: U256,
        signature: Bytes,
    },
}

/// Fee components quoted by the relay for a transaction draft.
///
/// Amounts are exchanged as decimal strings, `0x` hex strings or JSON integers. Negative
/// amounts are rejected while parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeEstimate {
    #[serde(with = "fee_amount", default)]
    pub base_fee: U256,
    #[serde(with = "fee_amount")]
    pub gas_price: U256,
    #[serde(with = "fee_amount::option", default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<U256>,
    #[serde(with = "fee_amount::option", default, skip_serializing_if = "Option::is_none")]
    pub safe_tx_gas: Option<U256>,
    #[serde(with = "fee_amount::option", default, skip_serializing_if = "Option::is_none")]
    pub base_gas: Option<U256>,
    #[serde(default)]
    pub fee_recipient: Address,
    /// The currency network (or token) the fee is paid in
    #[serde(default)]
    pub fee_currency: Address,
}

/// The fees of a prepared transaction, for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeBreakdown {
    pub base_fee: U256,
    pub gas_price: U256,
    /// `gasLimit`, or `baseGas + safeTxGas` for smart-wallet meta-transactions
    pub gas: U256,
    pub total_fee: U256,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_recipient: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_currency: Option<Address>,
}

/// A transaction with its nonce and fee fields filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedTransaction {
    pub transaction: PendingTransaction,
    pub fees: FeeBreakdown,
}

/// Identifies the transaction whose status is queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusQuery {
    /// A hash returned by `confirm`
    Hash(H256),
    /// A prepared transaction, whose hash is recomputed before querying
    Pending(PendingTransaction),
}

impl From<H256> for StatusQuery {
    fn from(hash: H256) -> Self {
        StatusQuery::Hash(hash)
    }
}

impl From<PendingTransaction> for StatusQuery {
    fn from(tx: PendingTransaction) -> Self {
        StatusQuery::Pending(tx)
    }
}

/// Parses a non-negative fee amount given as a decimal or `0x`-prefixed hex string.
pub fn parse_fee_amount(amount: &str) -> Result<U256, WalletError> {
    let amount = amount.trim();
    let invalid = |reason: &str| WalletError::NegativeOrOverflowFee(format!("{amount:?} {reason}"));
    if amount.starts_with('-') {
        return Err(invalid("is negative"))
    }
    if let Some(digits) = amount.strip_prefix("0x") {
        if digits.is_empty() || digits.len() > 64 {
            return Err(invalid("is not a 256-bit amount"))
        }
        return U256::from_str_radix(digits, 16).map_err(|_| invalid("is not a hex amount"))
    }
    if amount.is_empty() || !amount.bytes().all(|c| c.is_ascii_digit()) {
        return Err(invalid("is not a decimal amount"))
    }
    U256::from_dec_str(amount).map_err(|_| invalid("does not fit into 256 bits"))
}

mod fee_amount {
    use super::*;

    // untagged buffering has no 128-bit integers, wider amounts come as strings
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Str(String),
        Num(u64),
        Negative(i64),
    }

    fn parse<'de, D: Deserializer<'de>>(amount: Amount) -> Result<U256, D::Error> {
        let amount = match amount {
            Amount::Str(s) => s,
            Amount::Num(n) => n.to_string(),
            Amount::Negative(n) => n.to_string(),
        };
        parse_fee_amount(&amount).map_err(serde::de::Error::custom)
    }

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        parse::<D>(Amount::deserialize(deserializer)?)
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<U256>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.collect_str(value),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<U256>, D::Error> {
            Option::<Amount>::deserialize(deserializer)?.map(parse::<D>).transpose()
        }
    }
}
