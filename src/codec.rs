//! Canonical binary encoding shared by persisted records, signed payloads and
//! request/response messages.
//!
//! Every participant must produce byte-identical output for the same value,
//! because the encoding of a [`SignedPayload`](crate::transaction::SignedPayload)
//! is the exact message that gets hashed and signed. bincode with little-endian
//! fixed-width integers and u64 length prefixes is deterministic for the plain
//! structs used here, and decoding rejects trailing bytes.

use crate::error::{LedgerError, Result};
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Maximum accepted payload size in bytes, to bound decoding of hostile input
pub const MAX_PAYLOAD_SIZE: usize = 64 * 1024;

fn options() -> impl Options {
    bincode::DefaultOptions::new().with_fixint_encoding()
}

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    options()
        .serialize(value)
        .map_err(|e| LedgerError::SerializationError(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    if bytes.len() > MAX_PAYLOAD_SIZE {
        return Err(LedgerError::DecodeError(format!(
            "payload too large: {} bytes (max: {})",
            bytes.len(),
            MAX_PAYLOAD_SIZE
        )));
    }
    // A payload must be consumed exactly; trailing bytes are malformed input.
    options()
        .reject_trailing_bytes()
        .with_limit(MAX_PAYLOAD_SIZE as u64)
        .deserialize(bytes)
        .map_err(|e| LedgerError::DecodeError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Balance;

    #[test]
    fn test_encoding_is_deterministic() {
        let balance = Balance {
            chain_token: vec![7u8; 32],
            amount: 100,
        };
        assert_eq!(encode(&balance).unwrap(), encode(&balance).unwrap());
    }

    #[test]
    fn test_balance_layout() {
        let balance = Balance {
            chain_token: vec![0xAB, 0xCD],
            amount: 5,
        };
        let bytes = encode(&balance).unwrap();
        // u64 length prefix, token bytes, u64 amount
        assert_eq!(bytes.len(), 8 + 2 + 8);
        assert_eq!(&bytes[..8], &2u64.to_le_bytes());
        assert_eq!(&bytes[8..10], &[0xAB, 0xCD]);
        assert_eq!(&bytes[10..], &5u64.to_le_bytes());
    }

    #[test]
    fn test_truncated_input_is_decode_error() {
        let result: Result<Balance> = decode(&[1, 2, 3]);
        assert!(matches!(result, Err(LedgerError::DecodeError(_))));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let balance = Balance {
            chain_token: vec![1u8; 32],
            amount: 100,
        };
        let mut bytes = encode(&balance).unwrap();
        assert_eq!(decode::<Balance>(&bytes).unwrap(), balance);

        bytes.extend_from_slice(b"junk");
        let result: Result<Balance> = decode(&bytes);
        assert!(matches!(result, Err(LedgerError::DecodeError(_))));
    }

    #[test]
    fn test_length_prefix_beyond_limit_rejected() {
        // declared token length far larger than the payload itself
        let mut bytes = (u64::MAX / 2).to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0u8; 16]);
        let result: Result<Balance> = decode(&bytes);
        assert!(matches!(result, Err(LedgerError::DecodeError(_))));
    }

    #[test]
    fn test_oversized_input_rejected() {
        let big = vec![0u8; MAX_PAYLOAD_SIZE + 1];
        let result: Result<Balance> = decode(&big);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("payload too large"));
    }
}
