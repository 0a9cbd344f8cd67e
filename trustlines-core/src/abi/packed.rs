use ethabi::{ParamType, Token};
use thiserror::Error;

use crate::types::U256;

/// An error thrown by [`encode_packed`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EncodePackedError {
    /// The token does not match the declared type
    #[error("cannot pack {token:?} as `{param}`")]
    TypeMismatch { param: ParamType, token: Token },

    /// The value needs more bits than its declared width
    #[error("value {value} does not fit into `uint{bits}`")]
    Overflow { bits: usize, value: U256 },

    /// A fixed bytes value of the wrong length
    #[error("`bytes{expected}` expects {expected} bytes, got {actual}")]
    InvalidBytesLength { expected: usize, actual: usize },

    /// The type cannot be encoded in packed mode by this encoder
    #[error("`{0}` cannot be encoded in packed mode")]
    Unsupported(ParamType),
}

/// Encodes the given values the way Solidity's `abi.encodePacked` does, using each
/// value's *declared* type rather than the smallest width able to hold it:
/// - `uintN` is written as exactly `N / 8` big-endian bytes;
/// - `address` is written as its 20 bytes, `bool` as one byte;
/// - `bytesN` is written as exactly `N` bytes;
/// - dynamic `bytes` and `string` are written in-place without their length.
///
/// Values that do not fit their declared type are rejected instead of being truncated,
/// so a malformed field can never produce a valid looking but wrong hash preimage.
/// Arrays, tuples and signed integers are not needed by any of the hashes in this
/// workspace and are rejected.
///
/// # Examples
///
/// ```
/// # use trustlines_core::abi::{encode_packed, ParamType, Token};
/// # use trustlines_core::types::U256;
/// let packed = encode_packed(&[
///     (ParamType::FixedBytes(1), Token::FixedBytes(vec![0x19])),
///     (ParamType::Uint(64), Token::Uint(U256::from(1))),
/// ])?;
/// assert_eq!(packed, vec![0x19, 0, 0, 0, 0, 0, 0, 0, 1]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn encode_packed(values: &[(ParamType, Token)]) -> Result<Vec<u8>, EncodePackedError> {
    let capacity = values.iter().map(|(param, token)| encoded_length(param, token)).sum();
    let mut bytes = Vec::with_capacity(capacity);
    for (param, token) in values {
        encode_value(param, token, &mut bytes)?;
    }
    Ok(bytes)
}

/// The byte length of the value encoded in packed mode, used for preallocation only.
fn encoded_length(param: &ParamType, token: &Token) -> usize {
    match (param, token) {
        (ParamType::Uint(bits), _) => bits / 8,
        (ParamType::FixedBytes(len), _) => *len,
        (ParamType::Address, _) => 20,
        (ParamType::Bool, _) => 1,
        (_, Token::Bytes(b)) => b.len(),
        (_, Token::String(s)) => s.len(),
        _ => 0,
    }
}

fn encode_value(
    param: &ParamType,
    token: &Token,
    out: &mut Vec<u8>,
) -> Result<(), EncodePackedError> {
    match (param, token) {
        (ParamType::Address, Token::Address(addr)) => out.extend_from_slice(addr.as_bytes()),
        (ParamType::Uint(bits), Token::Uint(n)) => {
            let bits = *bits;
            if bits == 0 || bits % 8 != 0 || bits > 256 {
                return Err(EncodePackedError::Unsupported(param.clone()))
            }
            if n.bits() > bits {
                return Err(EncodePackedError::Overflow { bits, value: *n })
            }
            let mut buf = [0u8; 32];
            n.to_big_endian(&mut buf);
            out.extend_from_slice(&buf[32 - bits / 8..]);
        }
        (ParamType::Bool, Token::Bool(b)) => out.push(*b as u8),
        (ParamType::FixedBytes(len), Token::FixedBytes(bytes)) => {
            if *len == 0 || *len > 32 {
                return Err(EncodePackedError::Unsupported(param.clone()))
            }
            if bytes.len() != *len {
                return Err(EncodePackedError::InvalidBytesLength {
                    expected: *len,
                    actual: bytes.len(),
                })
            }
            out.extend_from_slice(bytes);
        }
        // Encode dynamic types in-place, without their length
        (ParamType::Bytes, Token::Bytes(bytes)) => out.extend_from_slice(bytes),
        (ParamType::String, Token::String(s)) => out.extend_from_slice(s.as_bytes()),
        (
            ParamType::Int(_) |
            ParamType::Array(_) |
            ParamType::FixedArray(..) |
            ParamType::Tuple(_),
            _,
        ) => return Err(EncodePackedError::Unsupported(param.clone())),
        _ => {
            return Err(EncodePackedError::TypeMismatch {
                param: param.clone(),
                token: token.clone(),
            })
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Address;

    #[test]
    fn honours_declared_widths() {
        let packed = encode_packed(&[
            (ParamType::Uint(8), Token::Uint(1.into())),
            (ParamType::Uint(64), Token::Uint(2.into())),
            (ParamType::Uint(256), Token::Uint(3.into())),
        ])
        .unwrap();
        assert_eq!(packed.len(), 1 + 8 + 32);
        assert_eq!(packed[0], 1);
        assert_eq!(&packed[1..9], &[0, 0, 0, 0, 0, 0, 0, 2]);
        assert_eq!(packed[40], 3);
        assert!(packed[9..40].iter().all(|b| *b == 0));
    }

    #[test]
    fn addresses_and_bytes_are_not_padded() {
        let addr = Address::repeat_byte(0x42);
        let packed = encode_packed(&[
            (ParamType::FixedBytes(1), Token::FixedBytes(vec![0x19])),
            (ParamType::FixedBytes(1), Token::FixedBytes(vec![0x00])),
            (ParamType::Address, Token::Address(addr)),
            (ParamType::Bytes, Token::Bytes(vec![0xde, 0xad])),
            (ParamType::String, Token::String("hi".to_owned())),
            (ParamType::Bool, Token::Bool(true)),
        ])
        .unwrap();
        let mut expected = vec![0x19, 0x00];
        expected.extend_from_slice(&[0x42; 20]);
        expected.extend_from_slice(&[0xde, 0xad, b'h', b'i', 1]);
        assert_eq!(packed, expected);
    }

    #[test]
    fn rejects_values_wider_than_declared() {
        let value = U256::from(u64::MAX) + 1;
        assert_eq!(
            encode_packed(&[(ParamType::Uint(64), Token::Uint(value))]),
            Err(EncodePackedError::Overflow { bits: 64, value })
        );
        assert_eq!(
            encode_packed(&[(ParamType::Uint(8), Token::Uint(256.into()))]),
            Err(EncodePackedError::Overflow { bits: 8, value: 256.into() })
        );
        // the maximum value of the declared width still fits
        assert!(encode_packed(&[(ParamType::Uint(64), Token::Uint(u64::MAX.into()))]).is_ok());
    }

    #[test]
    fn rejects_wrong_fixed_bytes_length() {
        assert_eq!(
            encode_packed(&[(ParamType::FixedBytes(32), Token::FixedBytes(vec![0; 31]))]),
            Err(EncodePackedError::InvalidBytesLength { expected: 32, actual: 31 })
        );
    }

    #[test]
    fn rejects_mismatched_and_unsupported_types() {
        assert!(matches!(
            encode_packed(&[(ParamType::Address, Token::Uint(1.into()))]),
            Err(EncodePackedError::TypeMismatch { .. })
        ));
        assert!(matches!(
            encode_packed(&[(ParamType::Uint(12), Token::Uint(1.into()))]),
            Err(EncodePackedError::Unsupported(_))
        ));
        assert!(matches!(
            encode_packed(&[(
                ParamType::Tuple(vec![ParamType::Bool]),
                Token::Tuple(vec![Token::Bool(true)])
            )]),
            Err(EncodePackedError::Unsupported(_))
        ));
    }
}
