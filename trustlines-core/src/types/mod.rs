pub type Selector = [u8; 4];

// Re-export common ethereum datatypes with more specific names

/// A transaction Hash
pub use ethabi::ethereum_types::H256 as TxHash;

pub use ethabi::ethereum_types::{Address, H160, H256, U128, U256, U64};

mod bytes;
pub use self::bytes::{deserialize_bytes, serialize_bytes, Bytes};

mod signature;
pub use signature::{Signature, SignatureError};

mod transaction;
pub use transaction::{Operation, PendingTransaction, TransactionError};

pub mod eip712;
