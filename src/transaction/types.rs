/// Transaction types for sigledger
use crate::codec;
use crate::crypto::{keccak256, Hash32, KeyPair};
use crate::error::LedgerError;
use serde::{Deserialize, Serialize};

/// A transfer envelope as submitted by a caller. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(with = "serde_bytes")]
    pub sender: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub receiver: Vec<u8>,
    pub amount: u64,
    /// Recoverable signature `R || S || v` over the canonical message.
    #[serde(with = "serde_bytes")]
    pub signature: Vec<u8>,
}

/// The value that is actually hashed and signed: the envelope with the
/// sender's previous chain token in the signature slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedPayload<'a> {
    #[serde(with = "serde_bytes")]
    pub sender: &'a [u8],
    #[serde(with = "serde_bytes")]
    pub receiver: &'a [u8],
    pub amount: u64,
    #[serde(with = "serde_bytes")]
    pub prev_token: &'a [u8],
}

impl<'a> SignedPayload<'a> {
    pub fn for_transaction(tx: &'a Transaction, prev_token: &'a [u8]) -> Self {
        SignedPayload {
            sender: &tx.sender,
            receiver: &tx.receiver,
            amount: tx.amount,
            prev_token,
        }
    }

    /// The canonical message bytes.
    pub fn canonical_message(&self) -> Result<Vec<u8>, LedgerError> {
        codec::encode(self)
    }

    /// Keccak-256 of the canonical message; the value signed by the sender and,
    /// once verified, the sender's next chain token.
    pub fn digest(&self) -> Result<Hash32, LedgerError> {
        Ok(keccak256(&self.canonical_message()?))
    }
}

impl Transaction {
    pub fn new(sender: Vec<u8>, receiver: Vec<u8>, amount: u64) -> Self {
        Transaction {
            sender,
            receiver,
            amount,
            signature: Vec::new(),
        }
    }

    /// Builds and signs a transfer from `keypair` to `receiver`, chained onto the
    /// sender's current chain token.
    pub fn signed(
        keypair: &KeyPair,
        receiver: Vec<u8>,
        amount: u64,
        prev_token: &[u8],
    ) -> Result<Self, LedgerError> {
        let mut tx = Transaction::new(keypair.address(), receiver, amount);
        tx.sign(keypair, prev_token)?;
        Ok(tx)
    }

    pub fn sign(&mut self, keypair: &KeyPair, prev_token: &[u8]) -> Result<(), LedgerError> {
        let digest = SignedPayload::for_transaction(self, prev_token).digest()?;
        self.signature = keypair.sign_recoverable(&digest).to_vec();
        Ok(())
    }
}
