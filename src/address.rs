//! Mapping between raw account addresses and their state-store keys.
//!
//! An address is the raw public-key byte string supplied by the caller. Its
//! store key is the `0x`-prefixed lowercase hex encoding, which is injective
//! and never changes for a given address.

use crate::error::LedgerError;

pub const KEY_PREFIX: &str = "0x";

/// Store key for an address.
pub fn key_for(address: &[u8]) -> String {
    format!("{}{}", KEY_PREFIX, hex::encode(address))
}

/// Convert a hex string (with or without the `0x` prefix) back to address bytes.
pub fn address_from_hex(hex_str: &str) -> Result<Vec<u8>, LedgerError> {
    let trimmed = hex_str.strip_prefix(KEY_PREFIX).unwrap_or(hex_str);
    hex::decode(trimmed)
        .map_err(|e| LedgerError::DecodeError(format!("Invalid hex address: {}", e)))
}

/// Shortened form of a store key for log lines.
pub(crate) fn short_key(address: &[u8]) -> String {
    let key = key_for(address);
    if key.len() > 18 {
        format!("{}...{}", &key[..10], &key[key.len() - 6..])
    } else {
        key
    }
}
