use crate::{relay::RelayError, NonceMechanism, WalletKind};
use thiserror::Error;
use trustlines_core::{
    abi::EncodePackedError,
    types::{Address, Operation, TransactionError},
    utils::ConversionError,
};
use trustlines_signers::KeyError;

/// Error thrown by the wallet strategies and their building blocks.
///
/// Messages carry the offending public values (addresses, lengths, tags) and never any
/// key material.
#[derive(Error, Debug)]
pub enum WalletError {
    /// An operation needing the account's key ran before the key was created, loaded or
    /// recovered
    #[error("no key material has been loaded into the wallet")]
    NoKeyLoaded,

    /// Malformed address or hash input, see [`ConversionError`]
    #[error(transparent)]
    ConversionError(#[from] ConversionError),

    /// Error creating, loading or using the key (e.g. a digest of invalid length)
    #[error(transparent)]
    KeyError(#[from] KeyError),

    /// The nonce mechanism tag is neither `counting` nor `random`
    #[error("unknown nonce mechanism {0:?}")]
    UnknownNonceMechanism(String),

    /// The wallet kind cannot use the requested nonce mechanism
    #[error("{kind} wallets do not support {mechanism} nonces")]
    UnsupportedNonceMechanism { kind: WalletKind, mechanism: NonceMechanism },

    /// The wallet kind needs deployment-specific contracts the configuration lacks
    #[error("{0} wallets need their contracts configured")]
    MissingContracts(WalletKind),

    /// The wallet kind cannot execute the requested operation type
    #[error("{kind} wallets do not support {operation:?} operations")]
    UnsupportedOperation { kind: WalletKind, operation: Operation },

    /// A fee input is negative, or the fee does not fit into 256 bits
    #[error("negative or overflowing fee: {0}")]
    NegativeOrOverflowFee(String),

    /// A transaction was handed to a wallet other than the one it is sent from
    #[error("transaction is sent from {actual:?}, but the wallet address is {expected:?}")]
    FromAddressMismatch { expected: Address, actual: Address },

    /// An address reported by the relay, or stored in wallet data, differs from the
    /// deterministically derived one
    #[error("expected address {expected:?}, got {actual:?}")]
    AddressMismatch { expected: Address, actual: Address },

    /// Wallet data of one kind was loaded into a wallet of another kind
    #[error("cannot load {actual} wallet data into a {expected} wallet")]
    WrongWalletKind { expected: WalletKind, actual: WalletKind },

    /// Wallet data written by an unknown version of this library
    #[error("unsupported wallet data version {0}")]
    UnsupportedVersion(u32),

    /// A field required for hashing or fee computation is missing
    #[error(transparent)]
    TransactionError(#[from] TransactionError),

    /// A field does not fit the width it is hashed with
    #[error(transparent)]
    EncodePackedError(#[from] EncodePackedError),

    /// Error reported by the relay
    #[error(transparent)]
    RelayError(#[from] RelayError),
}
