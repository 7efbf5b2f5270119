//! Cryptographic primitives for sigledger

use crate::error::LedgerError;
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use secp256k1::{
    constants::{COMPACT_SIGNATURE_SIZE, SECRET_KEY_SIZE, UNCOMPRESSED_PUBLIC_KEY_SIZE},
    ecdsa::{RecoverableSignature, RecoveryId, Signature},
    All, Message, PublicKey, Secp256k1, SecretKey,
};
use sha3::{Digest, Keccak256};

/// A thread-safe, lazily initialized Secp256k1 context.
/// This prevents repeated, unnecessary context creation.
static SECP256K1_CONTEXT: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// Size of a recoverable signature: R (32) || S (32) || recovery id (1).
pub const RECOVERABLE_SIGNATURE_SIZE: usize = COMPACT_SIGNATURE_SIZE + 1;

/// 32-byte Keccak-256 digest.
pub type Hash32 = [u8; 32];

/// Keccak-256 (the pre-standard SHA-3 padding, as used by Ethereum).
pub fn keccak256(data: &[u8]) -> Hash32 {
    Keccak256::digest(data).into()
}

#[derive(Debug, Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generates a new random KeyPair using the OS random number generator.
    pub fn generate() -> Self {
        let secret_key = SecretKey::new(&mut OsRng);
        Self::from_secret_key(secret_key)
    }

    /// Creates a KeyPair from an existing SecretKey.
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let public_key = PublicKey::from_secret_key(&SECP256K1_CONTEXT, &secret_key);
        KeyPair {
            secret_key,
            public_key,
        }
    }

    /// Creates a KeyPair from raw secret key bytes.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        let secret_key = SecretKey::from_slice(bytes).map_err(|e| {
            if bytes.len() != SECRET_KEY_SIZE {
                LedgerError::CryptoError(format!(
                    "Secret key must be {} bytes, got {}",
                    SECRET_KEY_SIZE,
                    bytes.len()
                ))
            } else {
                LedgerError::CryptoError(format!("Invalid secret key bytes: {}", e))
            }
        })?;

        Ok(Self::from_secret_key(secret_key))
    }

    /// Creates a KeyPair from a hex-encoded secret key (an optional `0x` prefix is accepted).
    pub fn from_secret_hex(seed: &str) -> Result<Self, LedgerError> {
        let seed = seed.strip_prefix("0x").unwrap_or(seed);
        let bytes = hex::decode(seed)
            .map_err(|e| LedgerError::CryptoError(format!("Invalid secret key hex: {}", e)))?;
        Self::from_secret_bytes(&bytes)
    }

    /// The account address: the uncompressed SEC1 public key (`0x04 || X || Y`).
    pub fn address(&self) -> Vec<u8> {
        self.public_key.serialize_uncompressed().to_vec()
    }

    pub fn secret_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Signs a 32-byte digest and returns `R || S || v` with `v` in {0, 1}.
    pub fn sign_recoverable(&self, digest: &Hash32) -> [u8; RECOVERABLE_SIGNATURE_SIZE] {
        let message = Message::from_digest(*digest);
        let signature = SECP256K1_CONTEXT.sign_ecdsa_recoverable(&message, &self.secret_key);
        let (recovery_id, compact) = signature.serialize_compact();

        let mut out = [0u8; RECOVERABLE_SIGNATURE_SIZE];
        out[..COMPACT_SIGNATURE_SIZE].copy_from_slice(&compact);
        out[COMPACT_SIGNATURE_SIZE] = recovery_id.to_i32() as u8;
        out
    }
}

/// Recovers the signer's uncompressed public key from a digest and a
/// 65-byte recoverable signature.
pub fn recover_public_key(
    digest: &Hash32,
    signature_bytes: &[u8],
) -> Result<[u8; UNCOMPRESSED_PUBLIC_KEY_SIZE], LedgerError> {
    if signature_bytes.len() != RECOVERABLE_SIGNATURE_SIZE {
        return Err(LedgerError::SignatureRecoveryError(format!(
            "Signature must be exactly {} bytes, got {}",
            RECOVERABLE_SIGNATURE_SIZE,
            signature_bytes.len()
        )));
    }

    let v = signature_bytes[COMPACT_SIGNATURE_SIZE];
    if v > 1 {
        return Err(LedgerError::SignatureRecoveryError(format!(
            "Invalid recovery id: {}",
            v
        )));
    }
    let recovery_id = RecoveryId::from_i32(i32::from(v))
        .map_err(|e| LedgerError::SignatureRecoveryError(format!("Invalid recovery id: {}", e)))?;

    let compact = &signature_bytes[..COMPACT_SIGNATURE_SIZE];
    let signature = RecoverableSignature::from_compact(compact, recovery_id)
        .map_err(|e| LedgerError::SignatureRecoveryError(format!("Malformed signature: {}", e)))?;

    let message = Message::from_digest(*digest);
    let public_key = SECP256K1_CONTEXT
        .recover_ecdsa(&message, &signature)
        .map_err(|e| LedgerError::SignatureRecoveryError(e.to_string()))?;

    Ok(public_key.serialize_uncompressed())
}

/// Verifies a 64-byte `R || S` signature over a digest against a serialized public key.
pub fn verify_signature(
    public_key_bytes: &[u8],
    digest: &Hash32,
    signature_bytes: &[u8],
) -> Result<(), LedgerError> {
    if signature_bytes.len() != COMPACT_SIGNATURE_SIZE {
        return Err(LedgerError::InvalidSignature);
    }

    let public_key =
        PublicKey::from_slice(public_key_bytes).map_err(|_| LedgerError::InvalidSignature)?;
    let signature =
        Signature::from_compact(signature_bytes).map_err(|_| LedgerError::InvalidSignature)?;
    let message = Message::from_digest(*digest);

    // libsecp256k1 only accepts lower-S signatures, which rules out malleated copies.
    SECP256K1_CONTEXT
        .verify_ecdsa(&message, &signature, &public_key)
        .map_err(|_| LedgerError::InvalidSignature)
}

/// Curve order `n` of secp256k1, big-endian.
#[cfg(test)]
const CURVE_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// Rewrites `R || S || v` as `R || (n - S) || (v ^ 1)`: the high-S twin that
/// still recovers to the same public key.
#[cfg(test)]
pub(crate) fn high_s_twin(signature: &[u8]) -> Vec<u8> {
    let mut out = signature.to_vec();
    let s = &signature[32..64];
    let mut borrow = 0i16;
    for i in (0..32).rev() {
        let mut diff = i16::from(CURVE_ORDER[i]) - i16::from(s[i]) - borrow;
        borrow = if diff < 0 {
            diff += 256;
            1
        } else {
            0
        };
        out[32 + i] = diff as u8;
    }
    out[COMPACT_SIGNATURE_SIZE] ^= 1;
    out
}
