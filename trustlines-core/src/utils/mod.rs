mod hash;
pub use hash::{id, keccak256};

/// Re-export of the `hex` crate
pub use hex;

use crate::types::{Address, H256};
use k256::{ecdsa::SigningKey, elliptic_curve::sec1::ToEncodedPoint, PublicKey};
use thiserror::Error;

/// Error thrown when converting loosely typed input into fixed-width types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// The input is not 20 bytes of hex, or its mixed-case checksum does not match
    #[error("invalid address: {0:?}")]
    InvalidAddress(String),
    /// The input is not a `0x`-prefixed 32-byte hex string
    #[error("invalid 32-byte hash: {0:?}")]
    InvalidHash(String),
}

/// Parses a hex encoded address, with or without the `0x` prefix.
///
/// All-lowercase and all-uppercase inputs are accepted as is. Mixed-case inputs are
/// treated as [EIP-55](https://eips.ethereum.org/EIPS/eip-55) checksummed and are
/// rejected if the checksum does not match, since a typo in such an address would
/// otherwise silently point somewhere else.
pub fn parse_address(src: &str) -> Result<Address, ConversionError> {
    let invalid = || ConversionError::InvalidAddress(src.to_owned());
    let digits = src.strip_prefix("0x").unwrap_or(src);
    if digits.len() != 40 {
        return Err(invalid())
    }
    let bytes = hex::decode(digits).map_err(|_| invalid())?;
    let address = Address::from_slice(&bytes);

    let has_lower = digits.bytes().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && to_checksum(&address, None)[2..] != *digits {
        return Err(invalid())
    }

    Ok(address)
}

/// Parses a `0x`-prefixed, 66 character long hex string into a 32-byte hash.
pub fn parse_hash(src: &str) -> Result<H256, ConversionError> {
    let invalid = || ConversionError::InvalidHash(src.to_owned());
    let digits = src.strip_prefix("0x").ok_or_else(invalid)?;
    if digits.len() != 64 {
        return Err(invalid())
    }
    let bytes = hex::decode(digits).map_err(|_| invalid())?;
    Ok(H256::from_slice(&bytes))
}

/// Converts an Ethereum address to the checksum encoding
/// Ref: <https://github.com/ethereum/EIPs/blob/master/EIPS/eip-55.md>
/// Ref: <https://github.com/ethereum/EIPs/blob/master/EIPS/eip-1191.md>
pub fn to_checksum(addr: &Address, chain_id: Option<u8>) -> String {
    let addr_hex = hex::encode(addr.as_bytes());
    let prefixed_addr = match chain_id {
        Some(chain_id) => format!("{chain_id}0x{addr_hex}"),
        None => addr_hex.clone(),
    };
    let hash = hex::encode(keccak256(prefixed_addr));

    addr_hex.bytes().zip(hash.bytes()).fold("0x".to_owned(), |mut encoded, (addr, hash)| {
        encoded.push(if hash >= b'8' {
            addr.to_ascii_uppercase() as char
        } else {
            addr.to_ascii_lowercase() as char
        });
        encoded
    })
}

/// Returns the CREATE2 address of a smart contract as specified in
/// [EIP1014](https://github.com/ethereum/EIPs/blob/master/EIPS/eip-1014.md)
///
/// keccak256( 0xff ++ senderAddress ++ salt ++ keccak256(init_code))[12..]
pub fn get_create2_address(
    from: impl Into<Address>,
    salt: impl Into<H256>,
    init_code: impl AsRef<[u8]>,
) -> Address {
    let init_code_hash = keccak256(init_code.as_ref());
    get_create2_address_from_hash(from, salt, init_code_hash)
}

/// Returns the CREATE2 address of a smart contract as specified in
/// [EIP1014](https://github.com/ethereum/EIPs/blob/master/EIPS/eip-1014.md),
/// taking the pre-computed hash of the init code as input.
///
/// keccak256( 0xff ++ senderAddress ++ salt ++ init_code_hash)[12..]
pub fn get_create2_address_from_hash(
    from: impl Into<Address>,
    salt: impl Into<H256>,
    init_code_hash: impl Into<H256>,
) -> Address {
    let from = from.into();
    let salt = salt.into();
    let init_code_hash = init_code_hash.into();

    let mut bytes = Vec::with_capacity(1 + 20 + 32 + 32);
    bytes.push(0xff);
    bytes.extend_from_slice(from.as_bytes());
    bytes.extend_from_slice(salt.as_bytes());
    bytes.extend_from_slice(init_code_hash.as_bytes());

    let hash = keccak256(bytes);
    Address::from_slice(&hash[12..])
}

/// Converts a K256 SigningKey to an Ethereum Address
pub fn secret_key_to_address(secret_key: &SigningKey) -> Address {
    public_key_to_address(&PublicKey::from(secret_key.verifying_key()))
}

/// Converts a K256 public key to an Ethereum Address: the low 20 bytes of the Keccak-256
/// hash of the uncompressed point without its `0x04` tag.
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let point = public_key.to_encoded_point(/* compress = */ false);
    let point = point.as_bytes();
    debug_assert_eq!(point[0], 0x04);
    let hash = keccak256(&point[1..]);
    Address::from_slice(&hash[12..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksums_addresses() {
        // test vectors from EIP-55
        for addr in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ] {
            let parsed = parse_address(&addr.to_lowercase()).unwrap();
            assert_eq!(to_checksum(&parsed, None), addr);
        }
    }

    #[test]
    fn checksums_with_chain_id() {
        // test vectors from EIP-1191
        let addr = parse_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(to_checksum(&addr, Some(30)), "0x5aaEB6053f3e94c9b9a09f33669435E7ef1bEAeD");
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in [
            "",
            "0x",
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeA",
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed00",
            "0xzzAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            // bad checksum: last two characters flipped in case
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAED",
        ] {
            assert_eq!(parse_address(bad), Err(ConversionError::InvalidAddress(bad.to_owned())));
        }
    }

    #[test]
    fn accepts_unprefixed_and_single_case_addresses() {
        let a = parse_address("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        let b = parse_address("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn parses_hashes() {
        let hash = parse_hash(
            "0x1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8",
        )
        .unwrap();
        assert_eq!(hash, H256(keccak256(b"hello")));

        assert!(parse_hash("1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8")
            .is_err());
        assert!(parse_hash("0x1c8aff").is_err());
    }

    #[test]
    // Test vectors from https://github.com/ethereum/EIPs/blob/master/EIPS/eip-1014.md#examples
    fn create2_address() {
        for (from, salt, init_code, expected) in &[
            (
                "0000000000000000000000000000000000000000",
                "0000000000000000000000000000000000000000000000000000000000000000",
                "00",
                "4D1A2e2bB4F88F0250f26Ffff098B0b30B26BF38",
            ),
            (
                "deadbeef00000000000000000000000000000000",
                "000000000000000000000000feed000000000000000000000000000000000000",
                "00",
                "D04116cDd17beBE565EB2422F2497E06cC1C9833",
            ),
            (
                "00000000000000000000000000000000deadbeef",
                "00000000000000000000000000000000000000000000000000000000cafebabe",
                "deadbeef",
                "60f3f640a8508fC6a86d45DF051962668E1e8AC7",
            ),
        ] {
            let from = parse_address(from).unwrap();
            let salt = H256::from_slice(&hex::decode(salt).unwrap());
            let init_code = hex::decode(init_code).unwrap();
            let expected = parse_address(expected).unwrap();
            assert_eq!(expected, get_create2_address(from, salt, init_code.clone()));
            assert_eq!(
                expected,
                get_create2_address_from_hash(from, salt, keccak256(&init_code))
            );
        }
    }

    #[test]
    fn uniswap_pair_address() {
        let factory = parse_address("0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f").unwrap();
        let token_a = parse_address("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48").unwrap();
        let token_b = parse_address("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2").unwrap();
        let salt = keccak256([token_a.as_bytes(), token_b.as_bytes()].concat());
        let init_code_hash = H256::from_slice(
            &hex::decode("96e8ac4277198ff8b6f785478aa9a39f403cb768dd02cbee326c3e7da348845f")
                .unwrap(),
        );

        let pair = get_create2_address_from_hash(factory, salt, init_code_hash);
        assert_eq!(to_checksum(&pair, None), "0xB4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc");
    }

    #[test]
    fn key_to_address() {
        let key = SigningKey::from_slice(
            &hex::decode("0000000000000000000000000000000000000000000000000000000000000001")
                .unwrap(),
        )
        .unwrap();
        assert_eq!(
            to_checksum(&secret_key_to_address(&key), None),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
    }
}
