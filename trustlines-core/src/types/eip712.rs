//! [EIP-712](https://eips.ethereum.org/EIPS/eip-712) typed structured data hashing.
use crate::{
    abi::{encode, Token},
    types::{Address, H256, U256},
    utils::keccak256,
};
use serde::{Deserialize, Serialize};

/// Pre-computed value of the following expression:
///
/// `keccak256("EIP712Domain(uint256 chainId,address verifyingContract)")`
pub const EIP712_CHAIN_DOMAIN_TYPE_HASH: [u8; 32] = [
    71, 231, 149, 52, 162, 69, 149, 46, 139, 22, 137, 58, 51, 107, 133, 163, 217, 234, 159, 168,
    197, 115, 243, 216, 3, 175, 185, 42, 121, 70, 146, 24,
];

/// Helper methods for computing the typed data hash of a struct.
///
/// Implementors provide the domain separator and the `hashStruct` of their value; the
/// final digest is derived from both as `keccak256(0x19 ‖ 0x01 ‖ domainSeparator ‖
/// structHash)`. Type hashes are constants of the implementing type, they are never
/// derived from type strings at runtime.
pub trait Eip712 {
    /// Pre-computed `keccak256` of the canonical type string of the struct
    const TYPE_HASH: [u8; 32];

    /// Returns the domain separator of the contract verifying the struct
    fn domain_separator(&self) -> [u8; 32];

    /// The struct's fields, ABI encoded in their declaration order. Dynamic values
    /// (`bytes`, `string`) must already be replaced by their hash.
    fn encode_data(&self) -> Vec<Token>;

    /// Hash of the struct, according to EIP-712 definition of `hashStruct`
    fn struct_hash(&self) -> [u8; 32] {
        let mut tokens = Vec::with_capacity(11);
        tokens.push(Token::FixedBytes(Self::TYPE_HASH.to_vec()));
        tokens.extend(self.encode_data());
        keccak256(encode(&tokens))
    }

    /// The final EIP-712 digest, ready to be signed
    fn encode_eip712(&self) -> H256 {
        // encode the digest to be compatible with solidity abi.encodePacked()
        let domain_separator = self.domain_separator();
        let struct_hash = self.struct_hash();

        let digest_input = [&[0x19, 0x01], &domain_separator[..], &struct_hash[..]].concat();

        keccak256(digest_input).into()
    }
}

/// EIP-712 domain made of the chain id and the verifying contract only, as used by
/// smart-wallet contracts that do not carry a name or version.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDomain {
    /// The EIP-155 chain id the signature is valid on
    pub chain_id: U256,
    /// The address of the contract that will verify the signature
    pub verifying_contract: Address,
}

impl ChainDomain {
    pub fn new(chain_id: impl Into<U256>, verifying_contract: Address) -> Self {
        Self { chain_id: chain_id.into(), verifying_contract }
    }

    /// `keccak256(abi.encode(DOMAIN_TYPE_HASH, chainId, verifyingContract))`
    pub fn separator(&self) -> [u8; 32] {
        keccak256(encode(&[
            Token::FixedBytes(EIP712_CHAIN_DOMAIN_TYPE_HASH.to_vec()),
            Token::Uint(self.chain_id),
            Token::Address(self.verifying_contract),
        ]))
    }
}
