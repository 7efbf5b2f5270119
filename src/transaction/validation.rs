/// Signature verification for transfers, separated from type definitions
use crate::crypto::{self, Hash32};
use crate::error::LedgerError;
use crate::transaction::types::{SignedPayload, Transaction};
use secp256k1::constants::COMPACT_SIGNATURE_SIZE;

impl Transaction {
    /// Proves that this transfer was authorized by the holder of the sender's
    /// current chain token and returns the digest that becomes the next token.
    ///
    /// The digest is recomputed from the envelope with `expected_prev_token`
    /// embedded, so a signature produced against an older token no longer
    /// matches once the sender's token has advanced.
    pub fn verify_and_advance(&self, expected_prev_token: &[u8]) -> Result<Hash32, LedgerError> {
        let digest = SignedPayload::for_transaction(self, expected_prev_token).digest()?;

        let recovered = crypto::recover_public_key(&digest, &self.signature)?;
        if recovered.as_slice() != self.sender.as_slice() {
            return Err(LedgerError::SenderMismatch);
        }

        crypto::verify_signature(
            &recovered,
            &digest,
            &self.signature[..COMPACT_SIGNATURE_SIZE],
        )?;

        Ok(digest)
    }
}
