//! Transaction module split into types and validation for better modularity

pub mod types;
pub mod validation;

pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::crypto::{high_s_twin, keccak256, KeyPair};
    use crate::error::LedgerError;

    const SEED_A: &str = "fad9c8855b740a0b7ed4c221dbad0f33a83a49cad6b3fe8d5817ac83d38b6a19";
    const SEED_B: &str = "2345234523445a0b7ed4c543abad0f234534563ad6b3fe8d58345634568b6a13";

    fn wallets() -> (KeyPair, KeyPair) {
        (
            KeyPair::from_secret_hex(SEED_A).unwrap(),
            KeyPair::from_secret_hex(SEED_B).unwrap(),
        )
    }

    #[test]
    fn test_verify_success_returns_payload_digest() {
        let (alice, bob) = wallets();
        let token = keccak256(&alice.address());

        let tx = Transaction::signed(&alice, bob.address(), 50, &token).unwrap();
        let digest = tx.verify_and_advance(&token).unwrap();

        let payload = SignedPayload {
            sender: &tx.sender,
            receiver: &tx.receiver,
            amount: 50,
            prev_token: &token,
        };
        assert_eq!(digest, keccak256(&codec::encode(&payload).unwrap()));
    }

    #[test]
    fn test_canonical_message_matches_envelope_layout() {
        // The signed message is the envelope encoding with the token in the signature slot.
        let (alice, bob) = wallets();
        let token = [9u8; 32];
        let mut tx = Transaction::new(alice.address(), bob.address(), 7);
        tx.signature = token.to_vec();

        let message = SignedPayload::for_transaction(&tx, &token)
            .canonical_message()
            .unwrap();
        assert_eq!(message, codec::encode(&tx).unwrap());
    }

    #[test]
    fn test_verification_does_not_mutate_signature() {
        let (alice, bob) = wallets();
        let token = keccak256(&alice.address());
        let tx = Transaction::signed(&alice, bob.address(), 1, &token).unwrap();
        let before = tx.signature.clone();

        tx.verify_and_advance(&token).unwrap();
        assert_eq!(tx.signature, before);
    }

    #[test]
    fn test_stale_token_rejected() {
        let (alice, bob) = wallets();
        let old_token = keccak256(&alice.address());
        let tx = Transaction::signed(&alice, bob.address(), 10, &old_token).unwrap();

        let new_token = tx.verify_and_advance(&old_token).unwrap();
        let result = tx.verify_and_advance(&new_token);
        assert!(matches!(
            result,
            Err(LedgerError::SenderMismatch)
                | Err(LedgerError::SignatureRecoveryError(_))
                | Err(LedgerError::InvalidSignature)
        ));
    }

    #[test]
    fn test_claimed_sender_mismatch() {
        let (alice, bob) = wallets();
        let token = keccak256(&bob.address());

        // Alice signs, but the envelope claims Bob as the sender.
        let mut tx = Transaction::new(bob.address(), alice.address(), 5);
        let digest = SignedPayload::for_transaction(&tx, &token).digest().unwrap();
        tx.signature = alice.sign_recoverable(&digest).to_vec();

        assert_eq!(tx.verify_and_advance(&token), Err(LedgerError::SenderMismatch));
    }

    #[test]
    fn test_malleated_high_s_signature_rejected() {
        let (alice, bob) = wallets();
        let token = keccak256(&alice.address());
        let mut tx = Transaction::signed(&alice, bob.address(), 10, &token).unwrap();
        tx.signature = high_s_twin(&tx.signature);

        assert_eq!(tx.verify_and_advance(&token), Err(LedgerError::InvalidSignature));
    }

    #[test]
    fn test_tampered_amount_rejected() {
        let (alice, bob) = wallets();
        let token = keccak256(&alice.address());
        let mut tx = Transaction::signed(&alice, bob.address(), 10, &token).unwrap();
        tx.amount = 90;

        assert!(tx.verify_and_advance(&token).is_err());
    }

    #[test]
    fn test_malformed_signature_is_recovery_error() {
        let (alice, bob) = wallets();
        let mut tx = Transaction::new(alice.address(), bob.address(), 5);
        tx.signature = vec![0u8; 10];

        let result = tx.verify_and_advance(&[0u8; 32]);
        assert!(matches!(result, Err(LedgerError::SignatureRecoveryError(_))));

        tx.signature = vec![0u8; 65];
        let result = tx.verify_and_advance(&[0u8; 32]);
        assert!(matches!(result, Err(LedgerError::SignatureRecoveryError(_))));
    }
}
