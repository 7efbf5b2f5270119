//! Account state transitions: register, balance and send.

use crate::address::{key_for, short_key};
use crate::codec;
use crate::crypto::keccak256;
use crate::error::LedgerError;
use crate::persistence::StateStore;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Amount credited to every newly registered account.
pub const GENESIS_AMOUNT: u64 = 100;

/// Per-account record stored under [`key_for`] of the account address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Digest of the last verified transfer sent by this account, or the
    /// genesis token `keccak256(address)` if it never sent one.
    #[serde(with = "serde_bytes")]
    pub chain_token: Vec<u8>,
    pub amount: u64,
}

impl Balance {
    pub fn genesis(address: &[u8]) -> Self {
        Balance {
            chain_token: keccak256(address).to_vec(),
            amount: GENESIS_AMOUNT,
        }
    }
}

/// How `balance` treats an address with no record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupPolicy {
    /// Fail with [`LedgerError::NotRegistered`].
    #[default]
    Strict,
    /// Return a zero record with an empty chain token.
    ZeroOnMissing,
}

/// How `send` treats a transfer larger than the sender's balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverdraftPolicy {
    /// Fail with [`LedgerError::InsufficientFunds`].
    #[default]
    Reject,
    /// Unsigned wraparound on both balances.
    Wrap,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerPolicy {
    #[serde(default)]
    pub lookup: LookupPolicy,
    #[serde(default)]
    pub overdraft: OverdraftPolicy,
}

impl LedgerPolicy {
    /// Permissive mode: zero records for unknown addresses and no funds check.
    pub fn legacy() -> Self {
        LedgerPolicy {
            lookup: LookupPolicy::ZeroOnMissing,
            overdraft: OverdraftPolicy::Wrap,
        }
    }
}

pub struct Ledger<S: StateStore> {
    store: S,
    policy: LedgerPolicy,
}

impl<S: StateStore> Ledger<S> {
    pub fn new(store: S) -> Self {
        Self::with_policy(store, LedgerPolicy::default())
    }

    pub fn with_policy(store: S, policy: LedgerPolicy) -> Self {
        Ledger { store, policy }
    }

    pub fn policy(&self) -> LedgerPolicy {
        self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates the account record for `address` with the genesis amount and token.
    pub fn register(&self, address: &[u8]) -> Result<Balance, LedgerError> {
        let key = key_for(address);
        if self.store.get_state(&key)?.is_some() {
            return Err(LedgerError::AlreadyRegistered(key));
        }

        let balance = Balance::genesis(address);
        self.store.put_state(&key, &codec::encode(&balance)?)?;

        info!("Registered account {}", short_key(address));
        Ok(balance)
    }

    /// Reads the account record for `address`. Never writes.
    pub fn balance(&self, address: &[u8]) -> Result<Balance, LedgerError> {
        let key = key_for(address);
        match self.store.get_state(&key)? {
            Some(bytes) => {
                let balance: Balance = codec::decode(&bytes)?;
                debug!("Loaded balance {} for {}", balance.amount, short_key(address));
                Ok(balance)
            }
            None => match self.policy.lookup {
                LookupPolicy::Strict => Err(LedgerError::NotRegistered(key)),
                LookupPolicy::ZeroOnMissing => Ok(Balance::default()),
            },
        }
    }

    /// Applies a signed transfer and returns the sender's updated record.
    pub fn send(&self, tx: &Transaction) -> Result<Balance, LedgerError> {
        if tx.sender == tx.receiver {
            return Err(LedgerError::InvalidTransaction(
                "Sender and receiver cannot be the same".to_string(),
            ));
        }

        let mut sender = self.balance(&tx.sender)?;
        let mut receiver = self.balance(&tx.receiver)?;

        let digest = tx.verify_and_advance(&sender.chain_token).map_err(|e| {
            warn!("Rejected transfer from {}: {}", short_key(&tx.sender), e);
            e
        })?;

        let (sender_amount, receiver_amount) = match self.policy.overdraft {
            OverdraftPolicy::Reject => {
                let debited = sender.amount.checked_sub(tx.amount).ok_or(
                    LedgerError::InsufficientFunds {
                        balance: sender.amount,
                        requested: tx.amount,
                    },
                )?;
                let credited = receiver.amount.checked_add(tx.amount).ok_or_else(|| {
                    LedgerError::InvalidTransaction("Receiver balance overflow".to_string())
                })?;
                (debited, credited)
            }
            OverdraftPolicy::Wrap => (
                sender.amount.wrapping_sub(tx.amount),
                receiver.amount.wrapping_add(tx.amount),
            ),
        };

        sender.amount = sender_amount;
        sender.chain_token = digest.to_vec();
        receiver.amount = receiver_amount;

        self.store.put_states(&[
            (key_for(&tx.sender), codec::encode(&sender)?),
            (key_for(&tx.receiver), codec::encode(&receiver)?),
        ])?;

        info!(
            "Transferred {} from {} to {}",
            tx.amount,
            short_key(&tx.sender),
            short_key(&tx.receiver)
        );
        Ok(sender)
    }
}
