//! Canonical signing digests of transactions, one encoding per wallet kind.
use crate::{WalletError, WalletKind};
use trustlines_core::{
    abi::{encode_packed, ParamType, Token},
    types::{
        eip712::{ChainDomain, Eip712},
        Address, Operation, PendingTransaction, TransactionError, H256, U256,
    },
    utils::keccak256,
};

/// Pre-computed value of the following expression:
///
/// `keccak256("SafeTx(address to,uint256 value,bytes data,uint8 operation,uint256 safeTxGas,uint256 baseGas,uint256 gasPrice,address gasToken,address refundReceiver,uint256 nonce)")`
pub const SAFE_TX_TYPE_HASH: [u8; 32] = [
    187, 131, 16, 212, 134, 54, 141, 182, 189, 111, 132, 148, 2, 253, 215, 58, 213, 61, 49, 107,
    90, 75, 38, 68, 173, 110, 254, 15, 148, 18, 134, 216,
];

/// Pre-computed value of the following expression:
///
/// `keccak256("CreateProxy(address paymentToken,uint256 payment,address paymentReceiver)")`
pub const CREATE_PROXY_TYPE_HASH: [u8; 32] = [
    222, 229, 245, 88, 129, 86, 183, 53, 195, 191, 241, 74, 84, 201, 172, 239, 200, 69, 128, 124,
    236, 145, 183, 253, 8, 9, 250, 61, 236, 202, 179, 99,
];

/// Identity meta-transactions never expire
const IDENTITY_TIME_LIMIT: u64 = 0;

const IDENTITY_OPERATION_CALL: u8 = 0;

/// A smart-wallet transaction as hashed by the wallet contract.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SafeTx {
    domain: ChainDomain,
    to: Address,
    value: U256,
    data_hash: H256,
    operation: u8,
    safe_tx_gas: U256,
    base_gas: U256,
    gas_price: U256,
    gas_token: Address,
    refund_receiver: Address,
    nonce: U256,
}

impl Eip712 for SafeTx {
    const TYPE_HASH: [u8; 32] = SAFE_TX_TYPE_HASH;

    fn domain_separator(&self) -> [u8; 32] {
        self.domain.separator()
    }

    fn encode_data(&self) -> Vec<Token> {
        vec![
            Token::Address(self.to),
            Token::Uint(self.value),
            Token::FixedBytes(self.data_hash.as_bytes().to_vec()),
            Token::Uint(self.operation.into()),
            Token::Uint(self.safe_tx_gas),
            Token::Uint(self.base_gas),
            Token::Uint(self.gas_price),
            Token::Address(self.gas_token),
            Token::Address(self.refund_receiver),
            Token::Uint(self.nonce),
        ]
    }
}

/// Authorization for the proxy factory to deploy a smart wallet without payment.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CreateProxy {
    domain: ChainDomain,
    payment_token: Address,
    payment: U256,
    payment_receiver: Address,
}

impl Eip712 for CreateProxy {
    const TYPE_HASH: [u8; 32] = CREATE_PROXY_TYPE_HASH;

    fn domain_separator(&self) -> [u8; 32] {
        self.domain.separator()
    }

    fn encode_data(&self) -> Vec<Token> {
        vec![
            Token::Address(self.payment_token),
            Token::Uint(self.payment),
            Token::Address(self.payment_receiver),
        ]
    }
}

/// Computes the digest a wallet's key signs for a transaction.
///
/// Hashing is pure: the same transaction always yields the same digest. It only accepts
/// transactions whose nonce and fee fields have been filled in, and a value that does
/// not fit the width it is hashed with is an error rather than being truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedTransactionHasher {
    chain_id: u64,
    identity_version: u8,
}

impl TypedTransactionHasher {
    pub fn new(chain_id: u64, identity_version: u8) -> Self {
        Self { chain_id, identity_version }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// The signing digest of `tx` under the encoding of `kind`:
    ///
    /// - [`WalletKind::Direct`]: the EIP-155 signing hash of the legacy transaction;
    /// - [`WalletKind::Identity`]: the packed identity meta-transaction hash;
    /// - [`WalletKind::SmartWallet`]: the EIP-712 `SafeTx` hash, with `tx.from` as the
    ///   verifying wallet.
    pub fn hash(&self, tx: &PendingTransaction, kind: WalletKind) -> Result<H256, WalletError> {
        match kind {
            WalletKind::Direct => Ok(tx.sighash(self.chain_id)?),
            WalletKind::Identity => self.identity_hash(tx),
            WalletKind::SmartWallet => self.smart_wallet_hash(tx),
        }
    }

    /// `keccak256(0x19 ‖ 0x00 ‖ from ‖ chainId ‖ version ‖ to ‖ value ‖ keccak256(data) ‖
    /// baseFee ‖ gasPrice ‖ gasLimit ‖ feeRecipient ‖ feeCurrency ‖ nonce ‖ timeLimit ‖
    /// operationType)`, tightly packed.
    ///
    /// Identities only execute calls, so `operationType` is always `0` and a
    /// [`Operation::DelegateCall`] is rejected.
    pub fn identity_hash(&self, tx: &PendingTransaction) -> Result<H256, WalletError> {
        if tx.operation != Operation::Call {
            return Err(WalletError::UnsupportedOperation {
                kind: WalletKind::Identity,
                operation: tx.operation,
            })
        }
        let packed = encode_packed(&[
            (ParamType::FixedBytes(1), Token::FixedBytes(vec![0x19])),
            (ParamType::FixedBytes(1), Token::FixedBytes(vec![0x00])),
            (ParamType::Address, Token::Address(tx.from)),
            (ParamType::Uint(256), Token::Uint(self.chain_id.into())),
            (ParamType::Uint(8), Token::Uint(self.identity_version.into())),
            (ParamType::Address, Token::Address(tx.to)),
            (ParamType::Uint(256), Token::Uint(tx.value)),
            (ParamType::FixedBytes(32), Token::FixedBytes(tx.data_hash().as_bytes().to_vec())),
            (ParamType::Uint(64), Token::Uint(required(tx.base_fee, "baseFee")?)),
            (ParamType::Uint(256), Token::Uint(required(tx.gas_price, "gasPrice")?)),
            (ParamType::Uint(256), Token::Uint(required(tx.gas_limit, "gasLimit")?)),
            (ParamType::Address, Token::Address(required(tx.fee_recipient, "feeRecipient")?)),
            (ParamType::Address, Token::Address(required(tx.fee_currency, "feeCurrency")?)),
            (ParamType::Uint(256), Token::Uint(required(tx.nonce, "nonce")?)),
            (ParamType::Uint(256), Token::Uint(IDENTITY_TIME_LIMIT.into())),
            (ParamType::Uint(8), Token::Uint(IDENTITY_OPERATION_CALL.into())),
        ])?;
        Ok(keccak256(packed).into())
    }

    /// EIP-712 hash of the `SafeTx` executing `tx` from the smart wallet at `tx.from`
    pub fn smart_wallet_hash(&self, tx: &PendingTransaction) -> Result<H256, WalletError> {
        let safe_tx = SafeTx {
            domain: ChainDomain::new(self.chain_id, tx.from),
            to: tx.to,
            value: tx.value,
            data_hash: tx.data_hash(),
            operation: tx.operation.into(),
            safe_tx_gas: required(tx.safe_tx_gas, "safeTxGas")?,
            base_gas: required(tx.base_gas, "baseGas")?,
            gas_price: required(tx.gas_price, "gasPrice")?,
            gas_token: required(tx.fee_currency, "feeCurrency")?,
            refund_receiver: required(tx.fee_recipient, "feeRecipient")?,
            nonce: required(tx.nonce, "nonce")?,
        };
        Ok(safe_tx.encode_eip712())
    }

    /// `keccak256(0x19 ‖ 0x00 ‖ factory ‖ implementation)`, signed by the owner to let the
    /// relay deploy its identity proxy.
    ///
    /// The factory recovers the owner from this signature and deploys the proxy at the
    /// owner's CREATE2 address, so the authorization is bound to its signer. It carries no
    /// chain id: replayed on another chain with the same factory it deploys the same
    /// owner's identity with the same implementation, which the owner can always do.
    pub fn identity_deployment_hash(
        &self,
        factory: Address,
        implementation: Address,
    ) -> Result<H256, WalletError> {
        let packed = encode_packed(&[
            (ParamType::FixedBytes(1), Token::FixedBytes(vec![0x19])),
            (ParamType::FixedBytes(1), Token::FixedBytes(vec![0x00])),
            (ParamType::Address, Token::Address(factory)),
            (ParamType::Address, Token::Address(implementation)),
        ])?;
        Ok(keccak256(packed).into())
    }

    /// EIP-712 hash of a payment-free `CreateProxy`, verified by `proxy_factory`
    pub fn smart_wallet_deployment_hash(&self, proxy_factory: Address) -> H256 {
        CreateProxy {
            domain: ChainDomain::new(self.chain_id, proxy_factory),
            payment_token: Address::zero(),
            payment: U256::zero(),
            payment_receiver: Address::zero(),
        }
        .encode_eip712()
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, TransactionError> {
    value.ok_or(TransactionError::MissingField(field))
}
